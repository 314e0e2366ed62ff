use glam::Quat;
use serde::{Deserialize, Serialize};

/// Step the displayed rotation is snapped to, so sub-degree jitter does not
/// rewrite the text every frame.
pub const FACE_ROTATION_INCREMENT_DEGREES: f64 = 5.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRotation {
    pub pitch: i32,
    pub yaw: i32,
    pub roll: i32,
}

/// Converts a face orientation quaternion to pitch/yaw/roll in whole degrees,
/// snapped to [`FACE_ROTATION_INCREMENT_DEGREES`].
pub fn extract_face_rotation_in_degrees(rotation: Quat) -> FaceRotation {
    let (pitch, yaw, roll) = euler_degrees(rotation);
    FaceRotation {
        pitch: quantize_angle(pitch, FACE_ROTATION_INCREMENT_DEGREES),
        yaw: quantize_angle(yaw, FACE_ROTATION_INCREMENT_DEGREES),
        roll: quantize_angle(roll, FACE_ROTATION_INCREMENT_DEGREES),
    }
}

/// Unquantized (pitch, yaw, roll) in degrees.
pub fn euler_degrees(rotation: Quat) -> (f64, f64, f64) {
    let x = rotation.x as f64;
    let y = rotation.y as f64;
    let z = rotation.z as f64;
    let w = rotation.w as f64;

    let pitch = (2.0 * (y * z + w * x)).atan2(w * w - x * x - y * y + z * z);
    let yaw = (2.0 * (w * y - x * z)).clamp(-1.0, 1.0).asin();
    let roll = (2.0 * (x * y + w * z)).atan2(w * w + x * x - y * y - z * z);

    (pitch.to_degrees(), yaw.to_degrees(), roll.to_degrees())
}

/// Rounds `value` to the nearest multiple of `increment`, halves away from zero.
/// Non-finite input maps to 0.
pub fn quantize_angle(value: f64, increment: f64) -> i32 {
    if !value.is_finite() || increment <= 0.0 {
        return 0;
    }
    let magnitude = ((value.abs() + increment / 2.0) / increment).floor() * increment;
    (magnitude.copysign(value)) as i32
}
