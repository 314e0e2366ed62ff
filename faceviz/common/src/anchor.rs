use api::{Body, CameraSpacePoint, ColorSpacePoint, CoordinateMapper};

/// Camera-space offset from the head joint to the face text, in metres.
pub const TEXT_LAYOUT_OFFSET_X: f32 = -0.1;
pub const TEXT_LAYOUT_OFFSET_Y: f32 = -0.15;

/// Position of the face text of `slot` in colour space: the head joint of the body
/// at the same index, nudged by the text offset and projected through `mapper`.
/// `None` if that body is missing, untracked or has no head joint.
pub fn face_text_position_in_color_space(
    bodies: &[Body],
    slot: usize,
    mapper: &dyn CoordinateMapper,
) -> Option<ColorSpacePoint> {
    let body = bodies.get(slot)?;
    if !body.is_tracked {
        return None;
    }
    let head = body.head()?;
    let text_point = CameraSpacePoint::new(
        head.x + TEXT_LAYOUT_OFFSET_X,
        head.y + TEXT_LAYOUT_OFFSET_Y,
        head.z,
    );
    Some(mapper.map_camera_point_to_color_space(text_point))
}
