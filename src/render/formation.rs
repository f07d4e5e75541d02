//! Rectangle formation
//!
//! A row of slanted rectangles, one slot per `items_per_slot` active items. Slot
//! positions chase their targets with an exponential ease, so count changes slide
//! the row apart or together instead of jumping.

use egui::{Pos2, pos2};
use tracing::debug;

use crate::config::FormationConfig;

/// Animated position of one formation slot
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FormationSlot {
    pub x: f32,
    pub y: f32,
}

/// Slot count for a given number of active items
pub fn slot_count(active: usize, cfg: &FormationConfig) -> usize {
    active.div_ceil(cfg.items_per_slot.max(1)).min(cfg.max_slots)
}

#[derive(Debug, Default)]
pub struct Formation {
    slots: Vec<FormationSlot>,
}

impl Formation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[FormationSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// x of the leftmost slot
    pub fn first_x(&self) -> Option<f32> {
        self.slots.first().map(|s| s.x)
    }

    /// x of the rightmost slot
    pub fn last_x(&self) -> Option<f32> {
        self.slots.last().map(|s| s.x)
    }

    /// Grow or shrink to `count` slots. Existing slots keep their index and position;
    /// new ones appear at the last slot, or at `center_x` when there is none.
    pub fn resize(&mut self, count: usize, center_x: f32, cfg: &FormationConfig) {
        let before = self.slots.len();
        if count == before {
            return;
        }

        let rest_y = cfg.top_y + cfg.vertical_offset;
        while self.slots.len() < count {
            let x = self.last_x().unwrap_or(center_x);
            self.slots.push(FormationSlot { x, y: rest_y });
        }
        self.slots.truncate(count);

        debug!(from = before, to = count, "Formation resized");
    }

    /// Resting position of slot `index` in a formation of `count`
    pub fn target(index: usize, count: usize, center_x: f32, cfg: &FormationConfig) -> Pos2 {
        let offset = index as f32 - (count / 2) as f32;
        pos2(
            center_x + offset * cfg.gap - cfg.width / 2.0,
            cfg.top_y + cfg.vertical_offset,
        )
    }

    /// Move every slot `convergence_rate` of the way to its target
    pub fn step(&mut self, center_x: f32, cfg: &FormationConfig) {
        let count = self.slots.len();
        let rate = cfg.convergence_rate;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let target = Self::target(i, count, center_x, cfg);
            slot.x += (target.x - slot.x) * rate;
            slot.y += (target.y - slot.y) * rate;
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

/// Left half of a slot's parallelogram, drawn above the circles
pub fn left_half(slot: FormationSlot, cfg: &FormationConfig) -> Vec<Pos2> {
    let mid = slot.x + cfg.width / 2.0;
    vec![
        pos2(slot.x, slot.y),
        pos2(mid, cfg.top_y + cfg.slant),
        pos2(mid, cfg.top_y + cfg.height + cfg.slant),
        pos2(slot.x, slot.y + cfg.height),
    ]
}

/// Right half of a slot's parallelogram, drawn below the circles
pub fn right_half(slot: FormationSlot, cfg: &FormationConfig) -> Vec<Pos2> {
    let mid = slot.x + cfg.width / 2.0;
    let right = slot.x + cfg.width;
    vec![
        pos2(mid, slot.y - cfg.slant),
        pos2(right, cfg.top_y),
        pos2(right, cfg.top_y + cfg.height),
        pos2(mid, slot.y + cfg.height - cfg.slant),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_count() {
        let cfg = FormationConfig::default();
        assert_eq!(slot_count(0, &cfg), 0);
        assert_eq!(slot_count(1, &cfg), 1);
        assert_eq!(slot_count(100, &cfg), 1);
        assert_eq!(slot_count(101, &cfg), 2);
        assert_eq!(slot_count(1500, &cfg), 15);
        assert_eq!(slot_count(90_000, &cfg), 15, "capped at max_slots");
    }

    #[test]
    fn test_resize_appends_and_retires_at_end() {
        let cfg = FormationConfig::default();
        let mut f = Formation::new();

        f.resize(1, 600.0, &cfg);
        assert_eq!(f.slots(), &[FormationSlot { x: 600.0, y: 240.0 }]);

        f.slots[0].x = 420.0;
        f.resize(3, 600.0, &cfg);
        assert!(f.slots().iter().all(|s| s.x == 420.0), "new slots spawn at the last slot");

        f.slots[1].x = 500.0;
        f.resize(2, 600.0, &cfg);
        assert_eq!(f.len(), 2);
        assert_eq!(f.slots()[1].x, 500.0, "surviving slots are not reindexed");

        f.resize(0, 600.0, &cfg);
        assert!(f.is_empty());
        assert_eq!(f.first_x(), None);
    }

    #[test]
    fn test_targets_are_centered() {
        let cfg = FormationConfig::default();
        let xs: Vec<f32> = (0..3).map(|i| Formation::target(i, 3, 600.0, &cfg).x).collect();
        assert_eq!(xs, vec![500.0, 550.0, 600.0]);

        let t = Formation::target(0, 1, 600.0, &cfg);
        assert_eq!(t, pos2(550.0, 240.0));
    }

    #[test]
    fn test_step_eases_toward_target() {
        let mut cfg = FormationConfig::default();
        cfg.convergence_rate = 0.5;
        let mut f = Formation::new();
        f.resize(1, 600.0, &cfg);

        f.step(600.0, &cfg);
        assert_eq!(f.slots()[0].x, 575.0);
        f.step(600.0, &cfg);
        assert_eq!(f.slots()[0].x, 562.5);

        // Converges without overshoot
        let mut last = f.slots()[0].x;
        for _ in 0..100 {
            f.step(600.0, &cfg);
            let x = f.slots()[0].x;
            assert!(x <= last && x >= 550.0);
            last = x;
        }
        assert!((last - 550.0).abs() < 1e-3);
    }

    #[test]
    fn test_parallelogram_halves() {
        let cfg = FormationConfig::default();
        let slot = FormationSlot { x: 100.0, y: 240.0 };

        assert_eq!(
            left_half(slot, &cfg),
            vec![pos2(100.0, 240.0), pos2(150.0, 190.0), pos2(150.0, 510.0), pos2(100.0, 560.0)]
        );
        assert_eq!(
            right_half(slot, &cfg),
            vec![pos2(150.0, 190.0), pos2(200.0, 140.0), pos2(200.0, 460.0), pos2(150.0, 510.0)]
        );
    }
}
