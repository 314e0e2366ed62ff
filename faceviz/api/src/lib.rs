mod body;
mod drawing;
mod face;
mod frame;
mod sensor;

pub use body::{Body, BodyFrame, CameraSpacePoint, Joint, JointType, TrackingState};
pub use drawing::{Color, CommandRecorder, DrawCommand, DrawingContext, Rect, RenderedFrame};
pub use face::{
    ColorSpacePoint, DetectionResult, FaceFrameFeatures, FaceFrameResult, FacePointType,
    FaceProperty, RectI,
};
pub use frame::{FrameLease, FramePool, FrameReference};
pub use sensor::{
    CoordinateMapper, EventSink, FaceFrame, FaceFrameSource, FrameDescription, SensorDriver,
    SensorEvent, SourceId,
};

/// log level for driver logging
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

/// logger callback for drivers loaded from native plugins
pub type LogCallback = extern "C" fn(
    level: LogLevel,
    target: *const std::ffi::c_char,
    message: *const std::ffi::c_char,
);

/// Logger handed to a driver on initialization. Native plugins have their own
/// copy of the `log` statics, so they log through the host's callback instead.
#[derive(Clone)]
pub struct ModuleLogger {
    callback: LogCallback,
    module_name: String,
}

impl ModuleLogger {
    pub fn new(callback: LogCallback, module_name: String) -> Self {
        Self {
            callback,
            module_name,
        }
    }

    pub fn name(&self) -> &str {
        &self.module_name
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, message);
    }

    fn log(&self, level: LogLevel, message: &str) {
        // interior NULs would truncate silently on the C side
        let target = std::ffi::CString::new(self.module_name.replace('\0', "")).unwrap_or_default();
        let msg = std::ffi::CString::new(message.replace('\0', "")).unwrap_or_default();
        (self.callback)(level, target.as_ptr(), msg.as_ptr());
    }
}
