use std::sync::Arc;

use api::{
    CoordinateMapper, EventSink, FaceFrameFeatures, FaceFrameSource, FrameDescription,
    SensorDriver,
};
use log::{debug, info, warn};
use thiserror::Error;

use crate::slots::SlotTable;
use crate::status::{
    StatusProperty, NO_SENSOR_STATUS_TEXT, RUNNING_STATUS_TEXT, SENSOR_NOT_AVAILABLE_STATUS_TEXT,
};

/// Everything the viewer asks the face engine for.
pub const FACE_FRAME_FEATURES: FaceFrameFeatures = FaceFrameFeatures::from_bits_truncate(
    FaceFrameFeatures::BOUNDING_BOX_IN_COLOR_SPACE.bits()
        | FaceFrameFeatures::POINTS_IN_COLOR_SPACE.bits()
        | FaceFrameFeatures::ROTATION_ORIENTATION.bits()
        | FaceFrameFeatures::FACE_ENGAGEMENT.bits()
        | FaceFrameFeatures::GLASSES.bits()
        | FaceFrameFeatures::HAPPY.bits()
        | FaceFrameFeatures::LEFT_EYE_CLOSED.bits()
        | FaceFrameFeatures::RIGHT_EYE_CLOSED.bits()
        | FaceFrameFeatures::LOOKING_AWAY.bits()
        | FaceFrameFeatures::MOUTH_MOVED.bits()
        | FaceFrameFeatures::MOUTH_OPEN.bits(),
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Open,
    Closed,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("sensor is already open")]
    AlreadyOpen,
    #[error("sensor has been closed")]
    Closed,
    #[error("failed to {stage}")]
    Driver {
        stage: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl LifecycleError {
    fn driver(stage: &'static str, e: anyhow::Error) -> Self {
        Self::Driver {
            stage,
            source: e.into(),
        }
    }
}

/// Owns the sensor, its body reader and one face source per tracking slot.
pub struct SensorLifecycle {
    driver: Option<Box<dyn SensorDriver>>,
    state: LifecycleState,
    slots: SlotTable,
    display: FrameDescription,
    mapper: Option<Arc<dyn CoordinateMapper>>,
    body_reader_open: bool,
    status: Arc<StatusProperty>,
}

impl SensorLifecycle {
    pub fn new(driver: Box<dyn SensorDriver>, status: Arc<StatusProperty>) -> Self {
        let display = driver.color_frame_description();
        Self {
            driver: Some(driver),
            state: LifecycleState::Uninitialized,
            slots: SlotTable::empty(),
            display,
            mapper: None,
            body_reader_open: false,
            status,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn display(&self) -> FrameDescription {
        self.display
    }

    pub fn slots(&self) -> &SlotTable {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut SlotTable {
        &mut self.slots
    }

    pub fn mapper(&self) -> Option<&dyn CoordinateMapper> {
        self.mapper.as_deref()
    }

    /// Opens the body reader and one face source per body, then starts the sensor
    /// delivering into `sink`. On failure everything opened so far is released and
    /// the lifecycle stays uninitialized.
    pub fn open(&mut self, sink: EventSink) -> Result<(), LifecycleError> {
        match self.state {
            LifecycleState::Open => return Err(LifecycleError::AlreadyOpen),
            LifecycleState::Closed => return Err(LifecycleError::Closed),
            LifecycleState::Uninitialized => {}
        }
        let driver = self.driver.as_mut().ok_or(LifecycleError::Closed)?;

        self.display = driver.color_frame_description();
        let body_count = driver.body_count();
        info!(
            "Sensor reports {}x{} colour frames and {} bodies",
            self.display.width, self.display.height, body_count
        );

        driver
            .open_body_reader()
            .map_err(|e| LifecycleError::driver("open body reader", e))?;
        self.body_reader_open = true;

        let mut sources: Vec<Box<dyn FaceFrameSource>> = Vec::with_capacity(body_count);
        let mut failure = None;
        for i in 0..body_count {
            match driver.create_face_source(FACE_FRAME_FEATURES) {
                Ok(mut source) => {
                    if let Err(e) = source.open_reader() {
                        source.dispose();
                        failure = Some(LifecycleError::driver("open face reader", e));
                        break;
                    }
                    debug!("Slot {}: opened {}", i, source.id());
                    sources.push(source);
                }
                Err(e) => {
                    failure = Some(LifecycleError::driver("create face source", e));
                    break;
                }
            }
        }
        self.slots = SlotTable::new(sources);

        if failure.is_none() {
            self.mapper = Some(driver.coordinate_mapper());
            if let Err(e) = driver.open(sink) {
                failure = Some(LifecycleError::driver("open sensor", e));
            }
        }

        if let Some(e) = failure {
            warn!("Sensor open failed: {}", e);
            self.release_readers();
            self.mapper = None;
            return Err(e);
        }

        let available = driver.is_available();
        self.status.set(if available {
            RUNNING_STATUS_TEXT
        } else {
            NO_SENSOR_STATUS_TEXT
        });
        self.state = LifecycleState::Open;
        info!("Sensor open with {} tracking slots", self.slots.len());
        Ok(())
    }

    /// Reflects sensor availability in the status text. The open/closed state is
    /// not affected.
    pub fn on_availability_changed(&mut self, is_available: bool) {
        if self.driver.is_none() {
            return;
        }
        let text = if is_available {
            RUNNING_STATUS_TEXT
        } else {
            SENSOR_NOT_AVAILABLE_STATUS_TEXT
        };
        if self.status.set(text) {
            info!("Sensor availability changed: {}", text);
        }
    }

    /// Disposes the face sources, then the body reader, then closes the sensor.
    pub fn close(&mut self) {
        if self.state == LifecycleState::Closed {
            return;
        }
        self.release_readers();
        if let Some(mut driver) = self.driver.take() {
            driver.close();
        }
        self.mapper = None;
        self.state = LifecycleState::Closed;
        info!("Sensor closed");
    }

    fn release_readers(&mut self) {
        self.slots.dispose_sources();
        if self.body_reader_open {
            if let Some(driver) = self.driver.as_mut() {
                driver.close_body_reader();
            }
            self.body_reader_open = false;
        }
    }
}

impl Drop for SensorLifecycle {
    fn drop(&mut self) {
        self.close();
    }
}
