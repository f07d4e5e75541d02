//! Drawing surface abstraction
//!
//! The engine draws through this trait only. Coordinates are surface-local pixels
//! with the origin at the top-left corner.

use egui::{Color32, ColorImage, Pos2, Rect, Vec2};

use crate::error::SurfaceError;

/// 2D immediate-mode drawing target
pub trait Surface {
    /// Backend handle of an uploaded bitmap
    type Texture;

    /// Current drawable size. Read-only; the engine never resizes the surface.
    fn size(&self) -> Vec2;

    /// Upload a bitmap once; the handle is reused by `draw_image` every frame
    fn upload_texture(&mut self, name: &str, image: &ColorImage) -> Self::Texture;

    fn clear_rect(&mut self, rect: Rect);

    fn fill_rect(&mut self, rect: Rect, color: Color32);

    /// Fill a closed convex polygon
    fn fill_path(&mut self, points: Vec<Pos2>, color: Color32);

    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32);

    /// Blit a texture with its top-left corner at `top_left`
    fn draw_image(&mut self, texture: &Self::Texture, top_left: Pos2, size: Vec2);

    /// Draw text with its baseline-left corner at `pos`
    fn fill_text(&mut self, text: &str, pos: Pos2, font_size: f32, color: Color32);

    /// Release backend resources. Drawing after release is a no-op.
    fn release(&mut self) -> Result<(), SurfaceError>;

    /// Whole-surface rectangle
    fn bounds(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, self.size())
    }

    /// True when the surface has a finite, non-empty drawable area
    fn is_usable(&self) -> bool {
        let size = self.size();
        size.x.is_finite() && size.y.is_finite() && size.x > 0.0 && size.y > 0.0
    }
}
