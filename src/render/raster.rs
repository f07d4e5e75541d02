//! CPU rasterization of sprite bitmaps
//!
//! Sprites are anti-aliased discs filled into a `tiny_skia::Pixmap`, whose
//! premultiplied RGBA buffer becomes an `egui::ColorImage`.

use egui::{Color32, ColorImage, Vec2};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};
use tracing::warn;

use crate::config::TrailConfig;

fn side(radius: f32) -> usize {
    (radius * 2.0).ceil().max(1.0) as usize
}

/// Pixel size of the circle sprite
pub fn circle_size(radius: f32) -> Vec2 {
    let s = side(radius) as f32;
    Vec2::new(s, s)
}

/// Trail length behind the circle centre: one radius per segment
pub fn trail_length(radius: f32, trail: &TrailConfig) -> f32 {
    radius * trail.segments as f32
}

/// Pixel size of the trail sprite
pub fn trail_size(radius: f32, trail: &TrailConfig) -> Vec2 {
    let w = (radius * 2.0 + trail_length(radius, trail)).ceil().max(1.0);
    Vec2::new(w, side(radius) as f32)
}

fn new_pixmap(size: Vec2) -> Option<Pixmap> {
    let pixmap = Pixmap::new(size.x as u32, size.y as u32);
    if pixmap.is_none() {
        warn!(width = size.x, height = size.y, "Failed to allocate sprite pixmap");
    }
    pixmap
}

/// Source-over fill of one disc at `opacity`
fn fill_disc(pixmap: &mut Pixmap, cx: f32, cy: f32, radius: f32, color: Color32, opacity: f32) {
    if radius <= 0.0 || opacity <= 0.0 {
        return;
    }
    let Some(path) = PathBuilder::from_circle(cx, cy, radius) else {
        return;
    };

    let mut c = tiny_skia::Color::from_rgba8(color.r(), color.g(), color.b(), 255);
    c.apply_opacity(opacity.min(1.0));
    let mut paint = Paint::default();
    paint.set_color(c);
    paint.anti_alias = true;

    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
}

fn to_image(pixmap: &Pixmap) -> ColorImage {
    ColorImage::from_rgba_premultiplied(
        [pixmap.width() as usize, pixmap.height() as usize],
        pixmap.data(),
    )
}

fn blank(size: Vec2) -> ColorImage {
    ColorImage::new([size.x as usize, size.y as usize], Color32::TRANSPARENT)
}

/// Solid disc filling a `2r x 2r` bitmap
pub fn circle_sprite(radius: f32, color: Color32) -> ColorImage {
    let size = circle_size(radius);
    let Some(mut pixmap) = new_pixmap(size) else {
        return blank(size);
    };
    fill_disc(&mut pixmap, radius, radius, radius, color, 1.0);
    to_image(&pixmap)
}

/// Fading comet tail. Segment `i` sits `spacing * i` left of the sprite centre
/// with radius `r - i` and opacity `fade_factor * (segments - i)`.
pub fn trail_sprite(radius: f32, color: Color32, trail: &TrailConfig) -> ColorImage {
    let size = trail_size(radius, trail);
    let Some(mut pixmap) = new_pixmap(size) else {
        return blank(size);
    };

    let cx = radius + trail_length(radius, trail) / 2.0;
    for i in 0..trail.segments {
        let r = radius - i as f32;
        if r <= 0.0 {
            break;
        }
        let opacity = trail.fade_factor * (trail.segments - i) as f32;
        fill_disc(&mut pixmap, cx - trail.spacing * i as f32, radius, r, color, opacity);
    }
    to_image(&pixmap)
}
