use api::{CameraSpacePoint, ColorSpacePoint, CoordinateMapper, FrameDescription};
use glam::Vec2;

/// Colour camera of the simulated sensor.
pub const COLOR_WIDTH: u32 = 1920;
pub const COLOR_HEIGHT: u32 = 1080;

/// Focal length X (pixels) at 1920x1080
pub const FX: f32 = 1081.37;
/// Focal length Y (pixels) at 1920x1080
pub const FY: f32 = 1081.37;
/// Principal point X (pixels)
pub const CX: f32 = 959.5;
/// Principal point Y (pixels)
pub const CY: f32 = 539.5;

pub fn color_frame_description() -> FrameDescription {
    FrameDescription {
        width: COLOR_WIDTH,
        height: COLOR_HEIGHT,
    }
}

/// Pinhole projection from camera space (metres, +Y up) to colour pixels (+Y down).
/// Points at or behind the sensor map to negative infinity, as the hardware mapper does.
#[derive(Debug, Clone, Copy, Default)]
pub struct KinectColorMapper;

impl CoordinateMapper for KinectColorMapper {
    fn map_camera_point_to_color_space(&self, point: CameraSpacePoint) -> ColorSpacePoint {
        if point.z <= f32::EPSILON {
            return Vec2::splat(f32::NEG_INFINITY);
        }
        Vec2::new(CX + FX * point.x / point.z, CY - FY * point.y / point.z)
    }
}
