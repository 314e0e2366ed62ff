use std::fmt::Write as _;

use api::{Color, CoordinateMapper, DrawingContext, FaceFrameResult, FrameDescription, Rect};
use glam::Vec2;
use log::trace;

use crate::anchor::face_text_position_in_color_space;
use crate::angles::extract_face_rotation_in_degrees;
use crate::config::RenderStyle;
use crate::slots::SlotTable;

pub const FACE_NOT_TRACKED_TEXT: &str = "No bodies or faces are tracked ...";
pub const FACE_NOT_TRACKED_POSITION: Vec2 = Vec2::new(10.0, 10.0);

/// One colour per slot, indexed by slot.
pub const FACE_PALETTE: [Color; 6] = [
    Color::WHITE,
    Color::ORANGE,
    Color::GREEN,
    Color::RED,
    Color::LIGHT_BLUE,
    Color::YELLOW,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub faces_drawn: usize,
    pub texts_skipped: usize,
}

pub struct FrameRenderer {
    display: FrameDescription,
    style: RenderStyle,
}

impl FrameRenderer {
    pub fn new(display: FrameDescription, style: RenderStyle) -> Self {
        Self { display, style }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn display_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.display.width as f32, self.display.height as f32)
    }

    /// Draws one frame: background, every bound slot with a stored result, and the
    /// placeholder text if no face made it to the screen.
    pub fn render(
        &self,
        slots: &SlotTable,
        mapper: &dyn CoordinateMapper,
        dc: &mut dyn DrawingContext,
    ) -> RenderSummary {
        let mut summary = RenderSummary::default();
        dc.fill_rect(Color::BLACK, self.display_rect());

        for slot in 0..slots.len() {
            if let Some(result) = slots.drawable(slot) {
                if !self.draw_face_frame_result(slot, result, slots, mapper, dc) {
                    summary.texts_skipped += 1;
                }
                summary.faces_drawn += 1;
            }
        }

        if summary.faces_drawn == 0 {
            dc.draw_text(
                FACE_NOT_TRACKED_TEXT,
                self.style.text_font_size,
                Color::WHITE,
                FACE_NOT_TRACKED_POSITION,
            );
        }

        dc.clip(self.display_rect());
        summary
    }

    /// Returns false if the text block could not be placed.
    fn draw_face_frame_result(
        &self,
        slot: usize,
        result: &FaceFrameResult,
        slots: &SlotTable,
        mapper: &dyn CoordinateMapper,
        dc: &mut dyn DrawingContext,
    ) -> bool {
        let color = slot_color(slot);
        let thickness = self.style.face_shape_thickness;

        let face_box = result.bounding_box;
        dc.stroke_rect(
            color,
            thickness,
            Rect::new(
                face_box.left as f32,
                face_box.top as f32,
                face_box.right as f32 - face_box.left as f32,
                face_box.bottom as f32 - face_box.top as f32,
            ),
        );

        if let Some(points) = &result.points {
            let radius = self.style.face_point_radius;
            for point in points.values() {
                dc.stroke_ellipse(color, thickness, *point, radius, radius);
            }
        }

        let text = face_text(result);
        // the mapper reports points it cannot project as infinities
        match face_text_position_in_color_space(slots.bodies(), slot, mapper) {
            Some(origin) if origin.is_finite() => {
                dc.draw_text(&text, self.style.text_font_size, color, origin);
                true
            }
            _ => {
                trace!("Slot {}: no text anchor, skipping face text", slot);
                false
            }
        }
    }
}

pub fn slot_color(slot: usize) -> Color {
    FACE_PALETTE.get(slot).copied().unwrap_or(FACE_PALETTE[0])
}

/// Text block of a face: one `Property : Value` line per reported property,
/// followed by the rotation if the result carries one.
pub fn face_text(result: &FaceFrameResult) -> String {
    let mut text = String::new();
    if let Some(properties) = &result.properties {
        for (property, value) in properties {
            let _ = writeln!(text, "{} : {}", property, value);
        }
    }
    if let Some(rotation) = result.rotation {
        let rotation = extract_face_rotation_in_degrees(rotation);
        let _ = writeln!(text, "FaceYaw : {}", rotation.yaw);
        let _ = writeln!(text, "FacePitch : {}", rotation.pitch);
        let _ = writeln!(text, "FaceRoll : {}", rotation.roll);
    }
    text
}
