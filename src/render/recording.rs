//! Headless recording surface
//!
//! Records every draw call instead of rasterizing it. The CLI host renders into it
//! and tests use it to assert draw order.

use egui::{Color32, ColorImage, Pos2, Rect, Vec2, vec2};

use super::surface::Surface;
use crate::error::SurfaceError;

/// Handle of an uploaded bitmap: index into the upload list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RecordedTexture(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Rect),
    FillRect {
        rect: Rect,
        color: Color32,
    },
    FillPath {
        points: Vec<Pos2>,
        color: Color32,
    },
    FillCircle {
        center: Pos2,
        radius: f32,
        color: Color32,
    },
    Image {
        texture: RecordedTexture,
        top_left: Pos2,
        size: Vec2,
    },
    Text {
        text: String,
        pos: Pos2,
        font_size: f32,
        color: Color32,
    },
}

#[derive(Debug)]
pub struct RecordingSurface {
    size: Vec2,
    commands: Vec<DrawCommand>,
    uploads: Vec<String>,
    released: bool,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: vec2(width, height),
            commands: Vec::new(),
            uploads: Vec::new(),
            released: false,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the recorded commands, e.g. once per frame
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of textures uploaded so far
    pub fn uploads(&self) -> usize {
        self.uploads.len()
    }

    pub fn texture_name(&self, texture: RecordedTexture) -> Option<&str> {
        self.uploads.get(texture.0).map(String::as_str)
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn record(&mut self, command: DrawCommand) {
        if !self.released {
            self.commands.push(command);
        }
    }
}

impl Surface for RecordingSurface {
    type Texture = RecordedTexture;

    fn size(&self) -> Vec2 {
        self.size
    }

    fn upload_texture(&mut self, name: &str, _image: &ColorImage) -> RecordedTexture {
        self.uploads.push(name.to_owned());
        RecordedTexture(self.uploads.len() - 1)
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.record(DrawCommand::Clear(rect));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        self.record(DrawCommand::FillRect { rect, color });
    }

    fn fill_path(&mut self, points: Vec<Pos2>, color: Color32) {
        self.record(DrawCommand::FillPath { points, color });
    }

    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32) {
        self.record(DrawCommand::FillCircle { center, radius, color });
    }

    fn draw_image(&mut self, texture: &RecordedTexture, top_left: Pos2, size: Vec2) {
        self.record(DrawCommand::Image {
            texture: *texture,
            top_left,
            size,
        });
    }

    fn fill_text(&mut self, text: &str, pos: Pos2, font_size: f32, color: Color32) {
        self.record(DrawCommand::Text {
            text: text.to_owned(),
            pos,
            font_size,
            color,
        });
    }

    /// Shrinks the surface to zero and drops the recording
    fn release(&mut self) -> Result<(), SurfaceError> {
        if self.released {
            return Err(SurfaceError::Released);
        }
        self.released = true;
        self.size = Vec2::ZERO;
        self.commands.clear();
        Ok(())
    }
}
