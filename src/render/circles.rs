//! Circle placement
//!
//! Start-phase circles slide in from the left edge to the first formation slot;
//! end-phase circles leave from the last slot toward the right edge. Nothing is
//! drawn in flight or inside the formation.

use egui::{Pos2, pos2};

use crate::config::{BucketThresholds, CircleConfig};
use crate::core::{EventItem, LatencyBucket, Phase};

/// Screen position of one item's circle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub center: Pos2,
    pub visible: bool,
}

impl Placement {
    const HIDDEN: Placement = Placement {
        center: Pos2::ZERO,
        visible: false,
    };
}

/// Row of the item: `lanes[id mod lanes]`, or the default row for non-numeric ids
pub fn lane_y(item: &EventItem, cfg: &CircleConfig) -> f32 {
    match item.id.lane_key() {
        Some(key) if !cfg.lanes.is_empty() => cfg.lanes[(key % cfg.lanes.len() as u64) as usize],
        _ => cfg.default_lane_y,
    }
}

/// Bucket that colors the item's circle. Entrances always use the fast color.
pub fn circle_bucket(item: &EventItem, thresholds: &BucketThresholds) -> LatencyBucket {
    match item.phase() {
        Phase::Start => LatencyBucket::Fast,
        _ => LatencyBucket::classify(item.timing.execution_time, thresholds),
    }
}

/// Place one item's circle.
///
/// `first_x`/`last_x` are the outermost formation slots; with no formation every
/// circle is hidden.
pub fn place(
    item: &EventItem,
    canvas_width: f32,
    first_x: Option<f32>,
    last_x: Option<f32>,
    cfg: &CircleConfig,
) -> Placement {
    let (Some(first_x), Some(last_x)) = (first_x, last_x) else {
        return Placement::HIDDEN;
    };
    if !item.is_active() {
        return Placement::HIDDEN;
    }

    let position = item.state.position as f32;
    let x = match item.phase() {
        Phase::Progress => return Placement::HIDDEN,
        _ if position >= 1.0 => return Placement::HIDDEN,
        Phase::Start => canvas_width * cfg.start_fraction + first_x * position + cfg.padding,
        Phase::End => {
            last_x + cfg.end_offset + (canvas_width - last_x - cfg.margin) * position
        }
    };

    // Never drawn over the formation itself
    if x > first_x + cfg.margin && x < last_x {
        return Placement::HIDDEN;
    }

    Placement {
        center: pos2(x, lane_y(item, cfg)),
        visible: true,
    }
}
