use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Camera space point in metres, sensor at the origin, +Z facing away from the sensor.
pub type CameraSpacePoint = Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JointType {
    SpineBase,
    SpineMid,
    Neck,
    Head,
    ShoulderLeft,
    ElbowLeft,
    WristLeft,
    HandLeft,
    ShoulderRight,
    ElbowRight,
    WristRight,
    HandRight,
    HipLeft,
    KneeLeft,
    AnkleLeft,
    FootLeft,
    HipRight,
    KneeRight,
    AnkleRight,
    FootRight,
    SpineShoulder,
    HandTipLeft,
    ThumbLeft,
    HandTipRight,
    ThumbRight,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingState {
    #[default]
    NotTracked,
    Tracked,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub position: CameraSpacePoint,
    pub tracking_state: TrackingState,
}

/// One entry of a body frame. A body that is not tracked keeps whatever
/// joints the driver last wrote, so readers must check `is_tracked` first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub is_tracked: bool,
    pub tracking_id: u64,
    pub joints: BTreeMap<JointType, Joint>,
}

impl Body {
    pub fn tracked(tracking_id: u64, head: CameraSpacePoint) -> Self {
        let mut joints = BTreeMap::new();
        joints.insert(
            JointType::Head,
            Joint {
                position: head,
                tracking_state: TrackingState::Tracked,
            },
        );
        Self {
            is_tracked: true,
            tracking_id,
            joints,
        }
    }

    pub fn joint(&self, joint: JointType) -> Option<&Joint> {
        self.joints.get(&joint)
    }

    pub fn head(&self) -> Option<CameraSpacePoint> {
        self.joint(JointType::Head).map(|j| j.position)
    }
}

/// Body data delivered by one body frame. `bodies.len()` equals the sensor's body count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyFrame {
    pub relative_time_ms: u64,
    pub bodies: Vec<Body>,
}

impl BodyFrame {
    /// Copies the frame's bodies into `bodies`, keeping its length. Entries without a
    /// counterpart in the frame are reset to an untracked body.
    pub fn get_and_refresh_body_data(&self, bodies: &mut [Body]) {
        for (i, slot) in bodies.iter_mut().enumerate() {
            match self.bodies.get(i) {
                Some(body) => slot.clone_from(body),
                None => *slot = Body::default(),
            }
        }
    }
}
