use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const LIGHT_BLUE: Color = Color::rgb(173, 216, 230);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Immediate-mode drawing backend, one frame at a time.
pub trait DrawingContext {
    fn fill_rect(&mut self, color: Color, rect: Rect);
    fn stroke_rect(&mut self, color: Color, thickness: f32, rect: Rect);
    fn stroke_ellipse(&mut self, color: Color, thickness: f32, center: Vec2, radius_x: f32, radius_y: f32);
    fn draw_text(&mut self, text: &str, font_size: f32, color: Color, origin: Vec2);
    fn clip(&mut self, rect: Rect);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    FillRect {
        color: Color,
        rect: Rect,
    },
    StrokeRect {
        color: Color,
        thickness: f32,
        rect: Rect,
    },
    StrokeEllipse {
        color: Color,
        thickness: f32,
        center: Vec2,
        radius_x: f32,
        radius_y: f32,
    },
    DrawText {
        text: String,
        font_size: f32,
        color: Color,
        origin: Vec2,
    },
    Clip {
        rect: Rect,
    },
}

/// Records the commands of one frame so they can be shipped to any backend.
#[derive(Debug, Clone, Default)]
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::DrawText { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl DrawingContext for CommandRecorder {
    fn fill_rect(&mut self, color: Color, rect: Rect) {
        self.commands.push(DrawCommand::FillRect { color, rect });
    }

    fn stroke_rect(&mut self, color: Color, thickness: f32, rect: Rect) {
        self.commands.push(DrawCommand::StrokeRect {
            color,
            thickness,
            rect,
        });
    }

    fn stroke_ellipse(&mut self, color: Color, thickness: f32, center: Vec2, radius_x: f32, radius_y: f32) {
        self.commands.push(DrawCommand::StrokeEllipse {
            color,
            thickness,
            center,
            radius_x,
            radius_y,
        });
    }

    fn draw_text(&mut self, text: &str, font_size: f32, color: Color, origin: Vec2) {
        self.commands.push(DrawCommand::DrawText {
            text: text.to_string(),
            font_size,
            color,
            origin,
        });
    }

    fn clip(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Clip { rect });
    }
}

/// One rendered frame as shipped by the output strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedFrame {
    pub sequence: u64,
    pub width: u32,
    pub height: u32,
    pub status: String,
    pub faces_drawn: usize,
    pub commands: Vec<DrawCommand>,
}
