use api::{FaceFrameResult, FacePointType, FrameDescription};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ValidationFailure {
    #[error("no face result")]
    Missing,
    #[error("empty bounding box ({width}x{height})")]
    EmptyBox { width: i64, height: i64 },
    #[error("bounding box right/bottom ({right}, {bottom}) outside the display")]
    BoxOutOfBounds { right: i32, bottom: i32 },
    #[error("face point {point:?} at ({x}, {y}) outside the display")]
    PointOutOfBounds { point: FacePointType, x: f32, y: f32 },
}

/// Checks that a face result can be drawn on a display of the given size.
///
/// Only the right and bottom edges of the box are checked against the display.
/// Face points must lie strictly inside it.
pub fn validate_face_box_and_points(
    result: Option<&FaceFrameResult>,
    display: FrameDescription,
) -> Result<(), ValidationFailure> {
    let result = result.ok_or(ValidationFailure::Missing)?;
    let width = display.width as i64;
    let height = display.height as i64;

    let face_box = result.bounding_box;
    let box_width = face_box.right as i64 - face_box.left as i64;
    let box_height = face_box.bottom as i64 - face_box.top as i64;
    if box_width <= 0 || box_height <= 0 {
        return Err(ValidationFailure::EmptyBox {
            width: box_width,
            height: box_height,
        });
    }
    if face_box.right as i64 > width || face_box.bottom as i64 > height {
        return Err(ValidationFailure::BoxOutOfBounds {
            right: face_box.right,
            bottom: face_box.bottom,
        });
    }

    if let Some(points) = &result.points {
        let (w, h) = (display.width as f32, display.height as f32);
        for (&point, position) in points {
            let inside = position.x > 0.0 && position.y > 0.0 && position.x < w && position.y < h;
            if !inside {
                return Err(ValidationFailure::PointOutOfBounds {
                    point,
                    x: position.x,
                    y: position.y,
                });
            }
        }
    }

    Ok(())
}

pub fn is_face_valid(result: Option<&FaceFrameResult>, display: FrameDescription) -> bool {
    validate_face_box_and_points(result, display).is_ok()
}
