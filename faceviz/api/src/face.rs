use glam::{Quat, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Colour space point in pixels, origin at the top left of the colour frame.
pub type ColorSpacePoint = Vec2;

/// Integer rectangle in colour space as reported by the face engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RectI {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl RectI {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FacePointType {
    EyeLeft,
    EyeRight,
    Nose,
    MouthCornerLeft,
    MouthCornerRight,
}

/// Face attributes, in the order they are reported and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FaceProperty {
    Happy,
    Engaged,
    WearingGlasses,
    LeftEyeClosed,
    RightEyeClosed,
    MouthOpen,
    MouthMoved,
    LookingAway,
}

impl FaceProperty {
    pub const ALL: [FaceProperty; 8] = [
        FaceProperty::Happy,
        FaceProperty::Engaged,
        FaceProperty::WearingGlasses,
        FaceProperty::LeftEyeClosed,
        FaceProperty::RightEyeClosed,
        FaceProperty::MouthOpen,
        FaceProperty::MouthMoved,
        FaceProperty::LookingAway,
    ];
}

impl fmt::Display for FaceProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectionResult {
    #[default]
    Unknown,
    No,
    Maybe,
    Yes,
}

impl fmt::Display for DetectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

bitflags::bitflags! {
    /// Feature set a face source is opened with.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct FaceFrameFeatures: u32 {
        const BOUNDING_BOX_IN_INFRARED_SPACE = 1 << 0;
        const POINTS_IN_INFRARED_SPACE       = 1 << 1;
        const BOUNDING_BOX_IN_COLOR_SPACE    = 1 << 2;
        const POINTS_IN_COLOR_SPACE          = 1 << 3;
        const ROTATION_ORIENTATION           = 1 << 4;
        const HAPPY                          = 1 << 5;
        const RIGHT_EYE_CLOSED               = 1 << 6;
        const LEFT_EYE_CLOSED                = 1 << 7;
        const MOUTH_OPEN                     = 1 << 8;
        const MOUTH_MOVED                    = 1 << 9;
        const LOOKING_AWAY                   = 1 << 10;
        const GLASSES                        = 1 << 11;
        const FACE_ENGAGEMENT                = 1 << 12;
    }
}

impl FaceFrameFeatures {
    /// Feature flag that makes the engine report `property`.
    pub const fn for_property(property: FaceProperty) -> Self {
        match property {
            FaceProperty::Happy => Self::HAPPY,
            FaceProperty::Engaged => Self::FACE_ENGAGEMENT,
            FaceProperty::WearingGlasses => Self::GLASSES,
            FaceProperty::LeftEyeClosed => Self::LEFT_EYE_CLOSED,
            FaceProperty::RightEyeClosed => Self::RIGHT_EYE_CLOSED,
            FaceProperty::MouthOpen => Self::MOUTH_OPEN,
            FaceProperty::MouthMoved => Self::MOUTH_MOVED,
            FaceProperty::LookingAway => Self::LOOKING_AWAY,
        }
    }
}

/// Result of one face frame for one face source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceFrameResult {
    pub tracking_id: u64,
    pub relative_time_ms: u64,
    pub bounding_box: RectI,
    pub points: Option<BTreeMap<FacePointType, ColorSpacePoint>>,
    pub properties: Option<BTreeMap<FaceProperty, DetectionResult>>,
    pub rotation: Option<Quat>,
}
