#![allow(dead_code)]

use anyhow::{bail, Result};
use api::{
    Body, BodyFrame, CameraSpacePoint, ColorSpacePoint, CoordinateMapper, EventSink,
    FaceFrameFeatures, FaceFrameResult, FaceFrameSource, FacePointType, FrameDescription,
    FramePool, FrameReference, ModuleLogger, RectI, SensorDriver, SourceId,
};
use glam::Vec2;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub const WIDTH: u32 = 1920;
pub const HEIGHT: u32 = 1080;

pub fn display() -> FrameDescription {
    FrameDescription {
        width: WIDTH,
        height: HEIGHT,
    }
}

/// Maps camera space straight onto colour space (x, y).
pub struct IdentityMapper;

impl CoordinateMapper for IdentityMapper {
    fn map_camera_point_to_color_space(&self, point: CameraSpacePoint) -> ColorSpacePoint {
        Vec2::new(point.x, point.y)
    }
}

pub type CallLog = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
pub struct SourceState {
    pub tracking_id: u64,
    /// Simulates the driver losing the bound body.
    pub lost: bool,
    pub disposed: bool,
}

pub struct MockSource {
    pub id: SourceId,
    pub features: FaceFrameFeatures,
    pub state: Arc<Mutex<SourceState>>,
    pub calls: CallLog,
}

impl MockSource {
    pub fn new(id: u32) -> (Self, Arc<Mutex<SourceState>>) {
        let state = Arc::new(Mutex::new(SourceState::default()));
        (
            Self {
                id: SourceId(id),
                features: FaceFrameFeatures::empty(),
                state: state.clone(),
                calls: CallLog::default(),
            },
            state,
        )
    }
}

impl FaceFrameSource for MockSource {
    fn id(&self) -> SourceId {
        self.id
    }

    fn features(&self) -> FaceFrameFeatures {
        self.features
    }

    fn tracking_id(&self) -> u64 {
        self.state.lock().unwrap().tracking_id
    }

    fn set_tracking_id(&mut self, tracking_id: u64) {
        let mut state = self.state.lock().unwrap();
        state.tracking_id = tracking_id;
        state.lost = false;
    }

    fn is_tracking_id_valid(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.tracking_id != 0 && !state.lost && !state.disposed
    }

    fn open_reader(&mut self) -> Result<()> {
        Ok(())
    }

    fn dispose(&mut self) {
        self.calls.lock().unwrap().push(format!("dispose {}", self.id.0));
        self.state.lock().unwrap().disposed = true;
    }
}

pub fn mock_sources(n: usize) -> (Vec<Box<dyn FaceFrameSource>>, Vec<Arc<Mutex<SourceState>>>) {
    let mut sources: Vec<Box<dyn FaceFrameSource>> = Vec::new();
    let mut states = Vec::new();
    for i in 0..n {
        let (source, state) = MockSource::new(i as u32);
        sources.push(Box::new(source));
        states.push(state);
    }
    (sources, states)
}

pub struct MockDriver {
    pub body_count: usize,
    pub available: bool,
    pub fail_open: bool,
    pub calls: CallLog,
    pub source_states: Arc<Mutex<Vec<Arc<Mutex<SourceState>>>>>,
    pub sink: Arc<Mutex<Option<EventSink>>>,
    next_source: u32,
}

impl MockDriver {
    pub fn new(body_count: usize) -> Self {
        Self {
            body_count,
            available: true,
            fail_open: false,
            calls: CallLog::default(),
            source_states: Arc::default(),
            sink: Arc::default(),
            next_source: 0,
        }
    }
}

impl SensorDriver for MockDriver {
    fn initialize(&mut self, _logger: ModuleLogger) -> Result<()> {
        Ok(())
    }

    fn color_frame_description(&self) -> FrameDescription {
        display()
    }

    fn body_count(&self) -> usize {
        self.body_count
    }

    fn open_body_reader(&mut self) -> Result<()> {
        self.calls.lock().unwrap().push("open body reader".into());
        Ok(())
    }

    fn close_body_reader(&mut self) {
        self.calls.lock().unwrap().push("close body reader".into());
    }

    fn create_face_source(&mut self, features: FaceFrameFeatures) -> Result<Box<dyn FaceFrameSource>> {
        let (mut source, state) = MockSource::new(self.next_source);
        self.next_source += 1;
        source.features = features;
        source.calls = self.calls.clone();
        self.source_states.lock().unwrap().push(state);
        Ok(Box::new(source))
    }

    fn coordinate_mapper(&self) -> Arc<dyn CoordinateMapper> {
        Arc::new(IdentityMapper)
    }

    fn open(&mut self, sink: EventSink) -> Result<()> {
        self.calls.lock().unwrap().push("open sensor".into());
        if self.fail_open {
            bail!("sensor unplugged");
        }
        *self.sink.lock().unwrap() = Some(sink);
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn close(&mut self) {
        self.calls.lock().unwrap().push("close sensor".into());
    }
}

pub fn tracked_body(tracking_id: u64, head: CameraSpacePoint) -> Body {
    Body::tracked(tracking_id, head)
}

pub fn body_frame(bodies: Vec<Body>) -> BodyFrame {
    BodyFrame {
        relative_time_ms: 0,
        bodies,
    }
}

pub fn frame_ref<T>(pool: &Arc<FramePool>, frame: Option<T>) -> FrameReference<T> {
    FrameReference::new(frame, pool.try_lease().expect("pool has room"))
}

/// A face that passes validation on the test display.
pub fn valid_face(tracking_id: u64) -> FaceFrameResult {
    let mut points = BTreeMap::new();
    points.insert(FacePointType::EyeLeft, Vec2::new(900.0, 400.0));
    points.insert(FacePointType::EyeRight, Vec2::new(1000.0, 400.0));
    points.insert(FacePointType::Nose, Vec2::new(950.0, 450.0));
    FaceFrameResult {
        tracking_id,
        bounding_box: RectI::new(850, 350, 1050, 550),
        points: Some(points),
        ..Default::default()
    }
}
