//! egui-backed surface
//!
//! egui paints in immediate mode, so the surface is re-attached to a fresh
//! `Painter` every frame. Sprite bitmaps become egui textures once and are
//! blitted with `Painter::image`.

use egui::{Align2, Color32, ColorImage, Context, FontId, Painter, Pos2, Rect, Shape, Stroke, Vec2, pos2};

use super::surface::Surface;
use crate::driver::{FrameHandle, FrameScheduler};
use crate::error::SurfaceError;

pub struct EguiSurface {
    ctx: Context,
    painter: Option<Painter>,
    released: bool,
}

impl EguiSurface {
    pub fn new(ctx: Context, painter: Painter) -> Self {
        Self {
            ctx,
            painter: Some(painter),
            released: false,
        }
    }

    /// Point the surface at this frame's painter
    pub fn attach(&mut self, painter: Painter) {
        if !self.released {
            self.painter = Some(painter);
        }
    }

    fn origin(&self) -> Option<Pos2> {
        self.painter.as_ref().map(|p| p.clip_rect().min)
    }

    /// Surface-local rect to screen rect
    fn to_screen(&self, rect: Rect) -> Rect {
        match self.origin() {
            Some(origin) => rect.translate(origin.to_vec2()),
            None => rect,
        }
    }
}

impl Surface for EguiSurface {
    type Texture = egui::TextureHandle;

    fn size(&self) -> Vec2 {
        self.painter
            .as_ref()
            .map_or(Vec2::ZERO, |p| p.clip_rect().size())
    }

    fn upload_texture(&mut self, name: &str, image: &ColorImage) -> egui::TextureHandle {
        self.ctx
            .load_texture(name, image.clone(), egui::TextureOptions::LINEAR)
    }

    /// egui starts every frame from an empty shape list
    fn clear_rect(&mut self, _rect: Rect) {}

    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        let rect = self.to_screen(rect);
        if let Some(painter) = &self.painter {
            painter.rect_filled(rect, 0.0, color);
        }
    }

    fn fill_path(&mut self, points: Vec<Pos2>, color: Color32) {
        let Some(painter) = &self.painter else { return };
        let offset = painter.clip_rect().min.to_vec2();
        let points = points.into_iter().map(|p| p + offset).collect();
        painter.add(Shape::convex_polygon(points, color, Stroke::NONE));
    }

    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32) {
        let Some(painter) = &self.painter else { return };
        painter.circle_filled(center + painter.clip_rect().min.to_vec2(), radius, color);
    }

    fn draw_image(&mut self, texture: &egui::TextureHandle, top_left: Pos2, size: Vec2) {
        let rect = self.to_screen(Rect::from_min_size(top_left, size));
        if let Some(painter) = &self.painter {
            painter.image(
                texture.id(),
                rect,
                Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                Color32::WHITE,
            );
        }
    }

    fn fill_text(&mut self, text: &str, pos: Pos2, font_size: f32, color: Color32) {
        let Some(painter) = &self.painter else { return };
        painter.text(
            pos + painter.clip_rect().min.to_vec2(),
            Align2::LEFT_BOTTOM,
            text,
            FontId::proportional(font_size),
            color,
        );
    }

    fn release(&mut self) -> Result<(), SurfaceError> {
        if self.released {
            return Err(SurfaceError::Released);
        }
        self.released = true;
        self.painter = None;
        Ok(())
    }
}

/// Frame pacing through egui repaint requests
pub struct RepaintScheduler {
    ctx: Context,
    next: u64,
}

impl RepaintScheduler {
    pub fn new(ctx: Context) -> Self {
        Self { ctx, next: 0 }
    }
}

impl FrameScheduler for RepaintScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.ctx.request_repaint();
        self.next += 1;
        FrameHandle(self.next)
    }

    /// A repaint request cannot be withdrawn; the extra frame finds the loop stopped
    fn cancel_frame(&mut self, _handle: FrameHandle) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{LayerId, vec2};

    fn surface_at(min: Pos2, size: Vec2) -> EguiSurface {
        let ctx = Context::default();
        let painter = Painter::new(ctx.clone(), LayerId::background(), Rect::from_min_size(min, size));
        EguiSurface::new(ctx, painter)
    }

    #[test]
    fn test_size_follows_attached_painter() {
        let mut surface = surface_at(pos2(10.0, 20.0), vec2(300.0, 200.0));
        assert_eq!(surface.size(), vec2(300.0, 200.0));
        assert!(surface.is_usable());
        assert_eq!(surface.to_screen(Rect::from_min_size(Pos2::ZERO, vec2(1.0, 1.0))).min, pos2(10.0, 20.0));

        let ctx = surface.ctx.clone();
        surface.attach(Painter::new(ctx, LayerId::background(), Rect::from_min_size(Pos2::ZERO, vec2(640.0, 480.0))));
        assert_eq!(surface.size(), vec2(640.0, 480.0));
    }

    #[test]
    fn test_release() {
        let mut surface = surface_at(Pos2::ZERO, vec2(300.0, 200.0));
        assert_eq!(surface.release(), Ok(()));
        assert_eq!(surface.size(), Vec2::ZERO);
        // Drawing after release is ignored
        surface.fill_circle(pos2(5.0, 5.0), 2.0, Color32::RED);
        assert_eq!(surface.release(), Err(SurfaceError::Released));
    }
}
