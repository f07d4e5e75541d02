//! Composition pipeline
//!
//! Draws one frame in fixed z-order:
//! 1. clear + background
//! 2. right halves of the formation
//! 3. circles, each as trail then head
//! 4. left halves of the formation
//! 5. info overlay
//!
//! Circles pass between the two halves, so they appear to run through the formation.

use egui::{Pos2, pos2};
use tracing::trace;

use super::circles::{self, Placement};
use super::formation::{self, Formation};
use super::raster;
use super::sprite::{SpriteCache, SpriteKind};
use super::surface::Surface;
use crate::config::EngineConfig;
use crate::core::{BucketCounts, EventItem, LatencyBucket, Phase};
use crate::theme::{rgb, with_opacity};

/// Per-frame drawing summary
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub slots: usize,
    pub circles_drawn: usize,
    /// Tracked items with no circle on screen this frame
    pub circles_culled: usize,
}

pub struct Compositor<T> {
    config: EngineConfig,
    formation: Formation,
    sprites: SpriteCache<T>,
}

impl<T> Compositor<T> {
    pub fn new(config: EngineConfig) -> Self {
        let sprites = SpriteCache::new(&config);
        Self {
            config,
            formation: Formation::new(),
            sprites,
        }
    }

    pub fn formation(&self) -> &Formation {
        &self.formation
    }

    pub fn sprites(&self) -> &SpriteCache<T> {
        &self.sprites
    }

    /// Clear and redraw the whole surface from `items`
    pub fn draw<S>(&mut self, surface: &mut S, items: &[EventItem]) -> FrameStats
    where
        S: Surface<Texture = T>,
    {
        let bounds = surface.bounds();
        let width = bounds.width();
        let center_x = width / 2.0;

        surface.clear_rect(bounds);
        surface.fill_rect(bounds, rgb(self.config.palette.background));

        let active = || items.iter().filter(|item| item.is_active());
        let count = formation::slot_count(active().count(), &self.config.formation);
        self.formation.resize(count, center_x, &self.config.formation);
        self.formation.step(center_x, &self.config.formation);

        let slot_colors: Vec<_> = BucketCounts::tally(active(), &self.config.buckets)
            .slot_buckets(count)
            .into_iter()
            .map(|bucket| with_opacity(bucket.color(&self.config.palette), self.config.formation.opacity))
            .collect();

        for (slot, color) in self.formation.slots().iter().zip(&slot_colors) {
            surface.fill_path(formation::right_half(*slot, &self.config.formation), *color);
        }

        let mut stats = FrameStats {
            slots: count,
            ..FrameStats::default()
        };
        let (first_x, last_x) = (self.formation.first_x(), self.formation.last_x());
        for item in items {
            let Placement { center, visible } = circles::place(item, width, first_x, last_x, &self.config.circle);
            if !visible {
                stats.circles_culled += 1;
                continue;
            }
            let bucket = circles::circle_bucket(item, &self.config.buckets);
            self.draw_circle(surface, center, bucket);
            stats.circles_drawn += 1;
        }

        for (slot, color) in self.formation.slots().iter().zip(&slot_colors) {
            surface.fill_path(formation::left_half(*slot, &self.config.formation), *color);
        }

        self.draw_overlay(surface, items, center_x);

        trace!(
            items = items.len(),
            slots = stats.slots,
            drawn = stats.circles_drawn,
            culled = stats.circles_culled,
            "Frame composed"
        );
        stats
    }

    fn draw_circle<S>(&mut self, surface: &mut S, center: Pos2, bucket: LatencyBucket)
    where
        S: Surface<Texture = T>,
    {
        let r = self.config.circle.radius;
        let trail_len = raster::trail_length(r, &self.config.trail);

        let trail = self.sprites.get(SpriteKind::Trail, bucket, surface);
        let top_left = pos2(center.x - r - trail_len / 2.0, center.y - r);
        let size = trail.size;
        surface.draw_image(&trail.texture, top_left, size);

        let head = self.sprites.get(SpriteKind::Circle, bucket, surface);
        let size = head.size;
        surface.draw_image(&head.texture, pos2(center.x - r, center.y - r), size);
    }

    /// Bucket counts across the top, start count top-left, end count top-right
    fn draw_overlay<S>(&self, surface: &mut S, items: &[EventItem], center_x: f32)
    where
        S: Surface<Texture = T>,
    {
        if items.is_empty() {
            return;
        }
        let cfg = &self.config.overlay;
        let palette = &self.config.palette;
        let y = cfg.margin_y;
        let step = cfg.spacing * 2.0;

        let counts = BucketCounts::tally(items, &self.config.buckets);
        for (i, bucket) in LatencyBucket::ALL.into_iter().enumerate() {
            let x = center_x + (i as f32 - 1.0) * step;
            surface.fill_text(&counts.get(bucket).to_string(), pos2(x, y), cfg.font_size, bucket.color(palette));
        }

        let starting = items.iter().filter(|i| i.phase() == Phase::Start).count();
        let ending = items.iter().filter(|i| i.phase() == Phase::End).count();
        let text = rgb(palette.text);
        let width = surface.size().x;
        surface.fill_text(&starting.to_string(), pos2(50.0, y), cfg.font_size, text);
        surface.fill_text(&ending.to_string(), pos2(width - 70.0, y), cfg.font_size, text);
    }

    /// Drop cached sprites and slots
    pub fn release(&mut self) {
        self.sprites.release();
        self.formation.clear();
    }
}
