use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::mpsc::{Receiver, SyncSender, TrySendError};
use std::sync::Arc;

use crate::{
    BodyFrame, CameraSpacePoint, ColorSpacePoint, FaceFrameFeatures, FaceFrameResult,
    FrameReference, ModuleLogger,
};

/// Identity of a face source, stable for the lifetime of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(pub u32);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "face-source-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDescription {
    pub width: u32,
    pub height: u32,
}

/// Face frame as delivered for one face source.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceFrame {
    pub source: SourceId,
    pub result: Option<FaceFrameResult>,
}

pub enum SensorEvent {
    BodyFrameArrived(FrameReference<BodyFrame>),
    FaceFrameArrived(FrameReference<FaceFrame>),
    AvailabilityChanged { is_available: bool },
}

impl fmt::Debug for SensorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BodyFrameArrived(_) => f.write_str("BodyFrameArrived"),
            Self::FaceFrameArrived(r) => match r.acquire_frame() {
                Some(frame) => write!(f, "FaceFrameArrived({})", frame.source),
                None => f.write_str("FaceFrameArrived(expired)"),
            },
            Self::AvailabilityChanged { is_available } => {
                write!(f, "AvailabilityChanged({})", is_available)
            }
        }
    }
}

/// Where drivers push their notifications. Delivery never blocks the driver:
/// when the consumer falls behind the event is dropped, and with it the frame lease.
#[derive(Clone)]
pub struct EventSink {
    tx: SyncSender<SensorEvent>,
}

impl EventSink {
    pub fn channel(depth: usize) -> (Self, Receiver<SensorEvent>) {
        let (tx, rx) = std::sync::mpsc::sync_channel(depth);
        (Self { tx }, rx)
    }

    /// Returns false if the event was dropped.
    pub fn send(&self, event: SensorEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                log::trace!("Event queue full, dropping {:?}", event);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Projection from camera space into the colour frame.
pub trait CoordinateMapper: Send + Sync {
    fn map_camera_point_to_color_space(&self, point: CameraSpacePoint) -> ColorSpacePoint;
}

/// Face tracking source bound to at most one body at a time.
pub trait FaceFrameSource: Send {
    fn id(&self) -> SourceId;
    fn features(&self) -> FaceFrameFeatures;
    fn tracking_id(&self) -> u64;
    /// Starts tracking the body with `tracking_id`. Zero stops tracking.
    fn set_tracking_id(&mut self, tracking_id: u64);
    /// False when unbound or once the driver lost the bound body.
    fn is_tracking_id_valid(&self) -> bool;
    fn open_reader(&mut self) -> Result<()>;
    /// Stops delivery and releases the source. Must be safe to call twice.
    fn dispose(&mut self);
}

/// A depth sensor with body and face tracking.
pub trait SensorDriver: Send {
    fn initialize(&mut self, logger: ModuleLogger) -> Result<()>;
    fn color_frame_description(&self) -> FrameDescription;
    /// Maximum number of simultaneously tracked bodies.
    fn body_count(&self) -> usize;
    fn open_body_reader(&mut self) -> Result<()>;
    fn close_body_reader(&mut self);
    fn create_face_source(&mut self, features: FaceFrameFeatures) -> Result<Box<dyn FaceFrameSource>>;
    fn coordinate_mapper(&self) -> Arc<dyn CoordinateMapper>;
    /// Starts delivering events from the open readers into `sink`.
    fn open(&mut self, sink: EventSink) -> Result<()>;
    fn is_available(&self) -> bool;
    fn close(&mut self);
}
