pub use api::{
    Body, BodyFrame, DetectionResult, FaceFrameResult, FacePointType, FaceProperty,
    FrameDescription, SensorDriver, SensorEvent,
};

pub mod anchor;
pub mod angles;
mod config;
pub mod lifecycle;
pub mod renderer;
pub mod slots;
mod status;
pub mod validation;
mod viewer;

pub use angles::{extract_face_rotation_in_degrees, quantize_angle, FaceRotation};
pub use config::{
    DriverConfig, DriverRuntime, OutputConfig, OutputMode, RenderStyle, SimulationConfig,
    ViewerConfig,
};
pub use lifecycle::{LifecycleError, LifecycleState, SensorLifecycle};
pub use renderer::{FrameRenderer, RenderSummary};
pub use slots::SlotTable;
pub use status::{
    StatusProperty, SubscriptionId, NO_SENSOR_STATUS_TEXT, RUNNING_STATUS_TEXT,
    SENSOR_NOT_AVAILABLE_STATUS_TEXT,
};
pub use validation::{is_face_valid, validate_face_box_and_points, ValidationFailure};
pub use viewer::{FaceViewer, FrameOutcome};
