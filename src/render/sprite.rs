//! Sprite cache
//!
//! One pre-rendered bitmap per (shape, latency bucket), rasterized and uploaded on
//! first use and reused every frame after.

use egui::{Color32, ColorImage, Vec2};
use tracing::debug;

use super::raster;
use super::surface::Surface;
use crate::config::{EngineConfig, Palette, TrailConfig};
use crate::core::LatencyBucket;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    Circle,
    Trail,
}

impl SpriteKind {
    pub const ALL: [SpriteKind; 2] = [SpriteKind::Circle, SpriteKind::Trail];

    fn name(self) -> &'static str {
        match self {
            SpriteKind::Circle => "circle",
            SpriteKind::Trail => "trail",
        }
    }
}

/// A cached bitmap and its uploaded texture
pub struct Sprite<T> {
    pub texture: T,
    pub size: Vec2,
    image: ColorImage,
}

impl<T> Sprite<T> {
    pub fn image(&self) -> &ColorImage {
        &self.image
    }
}

pub struct SpriteCache<T> {
    table: [[Option<Sprite<T>>; 3]; 2],
    radius: f32,
    trail: TrailConfig,
    palette: Palette,
}

impl<T> SpriteCache<T> {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            table: Default::default(),
            radius: config.circle.radius,
            trail: config.trail.clone(),
            palette: config.palette.clone(),
        }
    }

    /// Cached sprite for the key, rendering and uploading it on a miss
    pub fn get<S>(&mut self, kind: SpriteKind, bucket: LatencyBucket, surface: &mut S) -> &Sprite<T>
    where
        S: Surface<Texture = T>,
    {
        let color = bucket.color(&self.palette);
        let (radius, trail) = (self.radius, &self.trail);
        self.table[kind as usize][bucket.index()].get_or_insert_with(|| {
            let (image, size) = render(kind, radius, color, trail);
            let name = format!("{}-{:?}", kind.name(), bucket);
            debug!(sprite = %name, width = size.x, height = size.y, "Rendered sprite");
            let texture = surface.upload_texture(&name, &image);
            Sprite { texture, size, image }
        })
    }

    /// Number of populated entries
    pub fn len(&self) -> usize {
        self.table.iter().flatten().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zero every bitmap and drop it along with its texture
    pub fn release(&mut self) {
        let released = self.drain_zeroed().len();
        if released > 0 {
            debug!(released, "Released sprite cache");
        }
    }

    /// Empty the table, handing back each sprite with its pixels cleared
    fn drain_zeroed(&mut self) -> Vec<Sprite<T>> {
        self.table
            .iter_mut()
            .flatten()
            .filter_map(Option::take)
            .map(|mut sprite| {
                sprite.image.pixels.fill(Color32::TRANSPARENT);
                sprite
            })
            .collect()
    }
}

fn render(kind: SpriteKind, radius: f32, color: Color32, trail: &TrailConfig) -> (ColorImage, Vec2) {
    match kind {
        SpriteKind::Circle => (raster::circle_sprite(radius, color), raster::circle_size(radius)),
        SpriteKind::Trail => (
            raster::trail_sprite(radius, color, trail),
            raster::trail_size(radius, trail),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::RecordingSurface;

    #[test]
    fn test_lazy_population_and_reuse() {
        let config = EngineConfig::default();
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut cache = SpriteCache::new(&config);
        assert!(cache.is_empty());

        let first = cache.get(SpriteKind::Circle, LatencyBucket::Slow, &mut surface).texture;
        let again = cache.get(SpriteKind::Circle, LatencyBucket::Slow, &mut surface).texture;
        assert_eq!(first, again);
        assert_eq!(surface.uploads(), 1, "second lookup is a hit");
        assert_eq!(cache.len(), 1);

        let trail = cache.get(SpriteKind::Trail, LatencyBucket::Slow, &mut surface);
        assert_eq!(trail.size, Vec2::new(960.0, 60.0));
        assert_eq!(surface.uploads(), 2);
    }

    #[test]
    fn test_full_table() {
        let config = EngineConfig::default();
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut cache = SpriteCache::new(&config);
        for kind in SpriteKind::ALL {
            for bucket in LatencyBucket::ALL {
                cache.get(kind, bucket, &mut surface);
            }
        }
        assert_eq!(cache.len(), 6);
        assert_eq!(surface.uploads(), 6);

        // Circle color follows the bucket
        let sprite = cache.get(SpriteKind::Circle, LatencyBucket::Normal, &mut surface);
        let c = sprite.image().pixels[30 * 60 + 30];
        assert_eq!(c, Color32::from_rgb(0xff, 0x98, 0x00));
    }

    #[test]
    fn test_release_empties_cache() {
        let config = EngineConfig::default();
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut cache = SpriteCache::new(&config);
        cache.get(SpriteKind::Trail, LatencyBucket::Fast, &mut surface);
        cache.get(SpriteKind::Circle, LatencyBucket::Fast, &mut surface);

        cache.release();
        assert!(cache.is_empty());
        // Idempotent
        cache.release();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_release_zeroes_pixels() {
        let config = EngineConfig::default();
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut cache = SpriteCache::new(&config);
        for kind in SpriteKind::ALL {
            let sprite = cache.get(kind, LatencyBucket::Slow, &mut surface);
            assert!(sprite.image().pixels.iter().any(|p| p.a() > 0));
        }

        let drained = cache.drain_zeroed();
        assert_eq!(drained.len(), 2);
        assert!(cache.is_empty());
        for sprite in &drained {
            assert!(!sprite.image().pixels.is_empty());
            assert!(sprite.image().pixels.iter().all(|p| *p == Color32::TRANSPARENT));
        }
    }
}
