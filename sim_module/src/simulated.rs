//! Simulated depth sensor.
//!
//! Plays back a small scene of people walking in and out of view and runs a
//! face engine over them, delivering body and face frames from a worker thread
//! the same way a hardware driver would.

use anyhow::{bail, Result};
use api::{
    Body, BodyFrame, CameraSpacePoint, CoordinateMapper, DetectionResult, EventSink,
    FaceFrame, FaceFrameFeatures, FaceFrameResult, FaceFrameSource, FacePointType, FaceProperty,
    FrameDescription, FramePool, FrameReference, ModuleLogger, RectI, SensorDriver, SensorEvent,
    SourceId,
};
use glam::{EulerRot, Quat, Vec3};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::mapper::{color_frame_description, KinectColorMapper, FX};

/// Seconds a person stays in view before stepping out.
const VISIT_SECS: f32 = 10.0;
/// Seconds a person stays out of view.
const ABSENCE_SECS: f32 = 2.0;
/// First tracking id handed out; zero means "no body".
const FIRST_TRACKING_ID: u64 = 72_057_594_037_927_936;

#[derive(Debug, Clone, PartialEq)]
pub struct SimSettings {
    pub body_count: usize,
    pub tracked_bodies: usize,
    pub fps: f32,
    pub availability_flap: Option<Duration>,
    /// Frame buffers per stream.
    pub pool_size: usize,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            body_count: 6,
            tracked_bodies: 2,
            fps: 30.0,
            availability_flap: None,
            pool_size: 4,
        }
    }
}

struct FaceSlot {
    id: SourceId,
    features: FaceFrameFeatures,
    tracking_id: AtomicU64,
    reader_open: AtomicBool,
    disposed: AtomicBool,
}

pub struct SimFaceSource {
    slot: Arc<FaceSlot>,
}

impl FaceFrameSource for SimFaceSource {
    fn id(&self) -> SourceId {
        self.slot.id
    }

    fn features(&self) -> FaceFrameFeatures {
        self.slot.features
    }

    fn tracking_id(&self) -> u64 {
        self.slot.tracking_id.load(Ordering::Acquire)
    }

    fn set_tracking_id(&mut self, tracking_id: u64) {
        self.slot.tracking_id.store(tracking_id, Ordering::Release);
    }

    fn is_tracking_id_valid(&self) -> bool {
        !self.slot.disposed.load(Ordering::Acquire) && self.tracking_id() != 0
    }

    fn open_reader(&mut self) -> Result<()> {
        if self.slot.disposed.load(Ordering::Acquire) {
            bail!("{} has been disposed", self.slot.id);
        }
        self.slot.reader_open.store(true, Ordering::Release);
        Ok(())
    }

    fn dispose(&mut self) {
        self.slot.reader_open.store(false, Ordering::Release);
        self.slot.tracking_id.store(0, Ordering::Release);
        self.slot.disposed.store(true, Ordering::Release);
    }
}

#[derive(Default)]
struct Shared {
    running: AtomicBool,
    available: AtomicBool,
    body_reader_open: AtomicBool,
    faces: Mutex<Vec<Arc<FaceSlot>>>,
}

pub struct SimulatedSensor {
    settings: SimSettings,
    shared: Arc<Shared>,
    logger: Option<ModuleLogger>,
    worker: Option<JoinHandle<()>>,
    next_source: u32,
}

impl SimulatedSensor {
    pub fn new(settings: SimSettings) -> Self {
        let shared = Shared::default();
        shared.available.store(true, Ordering::Release);
        Self {
            settings,
            shared: Arc::new(shared),
            logger: None,
            worker: None,
            next_source: 0,
        }
    }

    fn log_info(&self, message: &str) {
        match &self.logger {
            Some(logger) => logger.info(message),
            None => log::info!("{}", message),
        }
    }
}

impl SensorDriver for SimulatedSensor {
    fn initialize(&mut self, logger: ModuleLogger) -> Result<()> {
        logger.info(&format!(
            "Initializing simulated sensor: {} bodies, {} people, {} fps",
            self.settings.body_count, self.settings.tracked_bodies, self.settings.fps
        ));
        self.logger = Some(logger);
        Ok(())
    }

    fn color_frame_description(&self) -> FrameDescription {
        color_frame_description()
    }

    fn body_count(&self) -> usize {
        self.settings.body_count
    }

    fn open_body_reader(&mut self) -> Result<()> {
        self.shared.body_reader_open.store(true, Ordering::Release);
        Ok(())
    }

    fn close_body_reader(&mut self) {
        self.shared.body_reader_open.store(false, Ordering::Release);
    }

    fn create_face_source(&mut self, features: FaceFrameFeatures) -> Result<Box<dyn FaceFrameSource>> {
        let slot = Arc::new(FaceSlot {
            id: SourceId(self.next_source),
            features,
            tracking_id: AtomicU64::new(0),
            reader_open: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        });
        self.next_source += 1;
        match self.shared.faces.lock() {
            Ok(mut faces) => faces.push(slot.clone()),
            Err(_) => bail!("face source registry poisoned"),
        }
        Ok(Box::new(SimFaceSource { slot }))
    }

    fn coordinate_mapper(&self) -> Arc<dyn CoordinateMapper> {
        Arc::new(KinectColorMapper)
    }

    fn open(&mut self, sink: EventSink) -> Result<()> {
        if self.worker.is_some() {
            bail!("simulated sensor is already open");
        }
        self.shared.running.store(true, Ordering::Release);
        let settings = self.settings.clone();
        let shared = self.shared.clone();
        let logger = self.logger.clone();
        let worker = thread::Builder::new()
            .name("sim-sensor".into())
            .spawn(move || run(settings, shared, sink, logger))?;
        self.worker = Some(worker);
        self.log_info("Simulated sensor open");
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.shared.available.load(Ordering::Acquire)
    }

    fn close(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
            self.log_info("Simulated sensor closed");
        }
    }
}

impl Drop for SimulatedSensor {
    fn drop(&mut self) {
        self.close();
    }
}

/// A person of the scene, always reported at the same body index.
struct Person {
    index: usize,
    phase: f32,
    tracking_id: u64,
    present: bool,
}

struct Scene {
    body_count: usize,
    people: Vec<Person>,
    next_tracking_id: u64,
}

impl Scene {
    fn new(body_count: usize, people: usize) -> Self {
        let people = (0..people.min(body_count))
            .map(|k| Person {
                // spread people over the body array: 0, 2, 4, 1, 3, 5
                index: spread_index(k, body_count),
                phase: k as f32 * 1.7,
                tracking_id: 0,
                present: false,
            })
            .collect();
        Self {
            body_count,
            people,
            next_tracking_id: FIRST_TRACKING_ID,
        }
    }

    fn step(&mut self, t: f32) -> Vec<Body> {
        let mut bodies = vec![Body::default(); self.body_count];
        for (k, person) in self.people.iter_mut().enumerate() {
            let cycle = (t + person.phase * 2.0) % (VISIT_SECS + ABSENCE_SECS);
            let present = cycle < VISIT_SECS;
            if present && !person.present {
                person.tracking_id = self.next_tracking_id;
                self.next_tracking_id += 1;
            }
            person.present = present;
            if present {
                bodies[person.index] = Body::tracked(person.tracking_id, head_position(k, person.phase, t));
            }
        }
        bodies
    }
}

fn spread_index(k: usize, body_count: usize) -> usize {
    let evens = body_count.div_ceil(2);
    if k < evens {
        k * 2
    } else {
        (k - evens) * 2 + 1
    }
}

fn head_position(k: usize, phase: f32, t: f32) -> CameraSpacePoint {
    Vec3::new(
        -0.6 + 0.6 * (k % 3) as f32 + 0.15 * (0.5 * t + phase).sin(),
        0.3 + 0.05 * (0.9 * t + phase).sin(),
        2.0 + 0.3 * (0.3 * t + phase).sin(),
    )
}

fn detection(t: f32, k: usize, property: usize) -> DetectionResult {
    let s = (0.2 * t + k as f32 * 1.3 + property as f32 * 0.7).sin();
    if s > 0.6 {
        DetectionResult::Yes
    } else if s > 0.3 {
        DetectionResult::Maybe
    } else if s > -0.9 {
        DetectionResult::No
    } else {
        DetectionResult::Unknown
    }
}

/// Runs the face engine on one body for the requested features.
fn face_result(
    features: FaceFrameFeatures,
    body: &Body,
    k: usize,
    t: f32,
    relative_time_ms: u64,
    mapper: &dyn CoordinateMapper,
) -> Option<FaceFrameResult> {
    let head = body.head()?;
    let mut result = FaceFrameResult {
        tracking_id: body.tracking_id,
        relative_time_ms,
        ..Default::default()
    };

    if features.contains(FaceFrameFeatures::BOUNDING_BOX_IN_COLOR_SPACE) {
        let center = mapper.map_camera_point_to_color_space(head);
        let half = FX * 0.09 / head.z;
        result.bounding_box = RectI::new(
            (center.x - half) as i32,
            (center.y - half * 1.2) as i32,
            (center.x + half) as i32,
            (center.y + half * 1.1) as i32,
        );
    }

    if features.contains(FaceFrameFeatures::POINTS_IN_COLOR_SPACE) {
        let offsets = [
            (FacePointType::EyeLeft, Vec3::new(-0.03, 0.03, 0.0)),
            (FacePointType::EyeRight, Vec3::new(0.03, 0.03, 0.0)),
            (FacePointType::Nose, Vec3::new(0.0, 0.0, -0.02)),
            (FacePointType::MouthCornerLeft, Vec3::new(-0.025, -0.045, 0.0)),
            (FacePointType::MouthCornerRight, Vec3::new(0.025, -0.045, 0.0)),
        ];
        let points = offsets
            .into_iter()
            .map(|(point, offset)| (point, mapper.map_camera_point_to_color_space(head + offset)))
            .collect();
        result.points = Some(points);
    }

    let properties: BTreeMap<_, _> = FaceProperty::ALL
        .iter()
        .enumerate()
        .filter(|(_, p)| features.contains(FaceFrameFeatures::for_property(**p)))
        .map(|(i, p)| (*p, detection(t, k, i)))
        .collect();
    if !properties.is_empty() {
        result.properties = Some(properties);
    }

    if features.contains(FaceFrameFeatures::ROTATION_ORIENTATION) {
        let phase = k as f32;
        result.rotation = Some(Quat::from_euler(
            EulerRot::YXZ,
            (25.0 * (0.7 * t + phase).sin()).to_radians(),
            (10.0 * (0.5 * t + phase).sin()).to_radians(),
            (8.0 * (0.3 * t + phase).sin()).to_radians(),
        ));
    }

    Some(result)
}

fn trace_exhausted(pool: &FramePool, logger: &Option<ModuleLogger>) {
    if let Some(logger) = logger {
        logger.trace(&format!(
            "All {} {} buffers in use, skipping frame",
            pool.capacity(),
            pool.name()
        ));
    }
}

fn run(settings: SimSettings, shared: Arc<Shared>, sink: EventSink, logger: Option<ModuleLogger>) {
    let body_pool = FramePool::new("body", settings.pool_size.max(1));
    let face_pool = FramePool::new("face", settings.pool_size.max(1) * settings.body_count.max(1));
    let mapper = KinectColorMapper;
    let period = Duration::from_secs_f32(1.0 / settings.fps.max(1.0));
    let start = Instant::now();
    let mut last_flap = start;
    let mut scene = Scene::new(settings.body_count, settings.tracked_bodies);
    let mut dropped: u64 = 0;

    while shared.running.load(Ordering::Acquire) {
        let tick = Instant::now();

        if let Some(flap) = settings.availability_flap {
            if last_flap.elapsed() >= flap {
                last_flap = Instant::now();
                let available = !shared.available.load(Ordering::Acquire);
                shared.available.store(available, Ordering::Release);
                if let Some(logger) = &logger {
                    logger.info(&format!("Simulated sensor available: {}", available));
                }
                sink.send(SensorEvent::AvailabilityChanged {
                    is_available: available,
                });
            }
        }

        if shared.available.load(Ordering::Acquire) {
            let t = start.elapsed().as_secs_f32();
            let relative_time_ms = start.elapsed().as_millis() as u64;
            let bodies = scene.step(t);

            let faces: Vec<Arc<FaceSlot>> = match shared.faces.lock() {
                Ok(faces) => faces.clone(),
                Err(_) => Vec::new(),
            };

            // the engine drops a binding as soon as its body leaves
            for slot in &faces {
                let id = slot.tracking_id.load(Ordering::Acquire);
                if id != 0 && !bodies.iter().any(|b| b.is_tracked && b.tracking_id == id) {
                    slot.tracking_id.store(0, Ordering::Release);
                }
            }

            if shared.body_reader_open.load(Ordering::Acquire) {
                match body_pool.try_lease() {
                    Some(lease) => {
                        let frame = BodyFrame {
                            relative_time_ms,
                            bodies: bodies.clone(),
                        };
                        if !sink.send(SensorEvent::BodyFrameArrived(FrameReference::new(Some(frame), lease))) {
                            dropped += 1;
                        }
                    }
                    None => {
                        dropped += 1;
                        trace_exhausted(&body_pool, &logger);
                    }
                }
            }

            for slot in &faces {
                if !slot.reader_open.load(Ordering::Acquire) || slot.disposed.load(Ordering::Acquire) {
                    continue;
                }
                let id = slot.tracking_id.load(Ordering::Acquire);
                if id == 0 {
                    continue;
                }
                let Some((k, body)) = bodies
                    .iter()
                    .enumerate()
                    .find(|(_, b)| b.is_tracked && b.tracking_id == id)
                else {
                    continue;
                };
                let Some(lease) = face_pool.try_lease() else {
                    dropped += 1;
                    trace_exhausted(&face_pool, &logger);
                    continue;
                };
                let frame = FaceFrame {
                    source: slot.id,
                    result: face_result(slot.features, body, k, t, relative_time_ms, &mapper),
                };
                if !sink.send(SensorEvent::FaceFrameArrived(FrameReference::new(Some(frame), lease))) {
                    dropped += 1;
                }
            }
        }

        if dropped > 0 && dropped % 100 == 0 {
            if let Some(logger) = &logger {
                logger.debug(&format!("{} frames dropped so far", dropped));
            }
        }

        let elapsed = tick.elapsed();
        if elapsed < period {
            thread::sleep(period - elapsed);
        }
    }
}
