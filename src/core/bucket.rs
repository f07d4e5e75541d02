//! Latency buckets
//!
//! Items are classified fast / normal / slow by execution time. The formation
//! shows the mix by giving each slot one bucket color, in proportion to the counts.

use egui::Color32;

use super::item::EventItem;
use crate::config::{BucketThresholds, Palette};
use crate::theme::rgb;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LatencyBucket {
    Fast,
    Normal,
    Slow,
}

impl LatencyBucket {
    /// All buckets in allocation order
    pub const ALL: [LatencyBucket; 3] = [LatencyBucket::Fast, LatencyBucket::Normal, LatencyBucket::Slow];

    /// Classify an execution time. Both thresholds are inclusive.
    pub fn classify(execution_time: f64, thresholds: &BucketThresholds) -> Self {
        if execution_time <= thresholds.fast_max {
            LatencyBucket::Fast
        } else if execution_time <= thresholds.normal_max {
            LatencyBucket::Normal
        } else {
            LatencyBucket::Slow
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn color(self, palette: &Palette) -> Color32 {
        match self {
            LatencyBucket::Fast => rgb(palette.fast),
            LatencyBucket::Normal => rgb(palette.normal),
            LatencyBucket::Slow => rgb(palette.slow),
        }
    }
}

/// Per-bucket item counts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BucketCounts {
    pub fast: usize,
    pub normal: usize,
    pub slow: usize,
}

impl BucketCounts {
    /// Count items into buckets by execution time
    pub fn tally<'a>(items: impl IntoIterator<Item = &'a EventItem>, thresholds: &BucketThresholds) -> Self {
        let mut counts = Self::default();
        for item in items {
            match LatencyBucket::classify(item.timing.execution_time, thresholds) {
                LatencyBucket::Fast => counts.fast += 1,
                LatencyBucket::Normal => counts.normal += 1,
                LatencyBucket::Slow => counts.slow += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.fast + self.normal + self.slow
    }

    pub fn get(&self, bucket: LatencyBucket) -> usize {
        match bucket {
            LatencyBucket::Fast => self.fast,
            LatencyBucket::Normal => self.normal,
            LatencyBucket::Slow => self.slow,
        }
    }

    fn get_mut(&mut self, bucket: LatencyBucket) -> &mut usize {
        match bucket {
            LatencyBucket::Fast => &mut self.fast,
            LatencyBucket::Normal => &mut self.normal,
            LatencyBucket::Slow => &mut self.slow,
        }
    }

    /// Share of each bucket. An empty tally splits evenly.
    pub fn ratios(&self) -> [(LatencyBucket, f64); 3] {
        let total = self.total();
        LatencyBucket::ALL.map(|bucket| {
            let ratio = if total > 0 {
                self.get(bucket) as f64 / total as f64
            } else {
                1.0 / 3.0
            };
            (bucket, ratio)
        })
    }

    /// Split `count` slots between the buckets in proportion to this tally.
    ///
    /// Each bucket gets `floor(count * ratio)`; the truncation remainder goes out one
    /// slot at a time, cycling through buckets from the largest share down. Ties keep
    /// fast, normal, slow order.
    pub fn allocate(&self, count: usize) -> BucketCounts {
        let mut ratios = self.ratios();

        let mut out = BucketCounts::default();
        for (bucket, ratio) in ratios {
            *out.get_mut(bucket) = (count as f64 * ratio).floor() as usize;
        }

        let remain = count.saturating_sub(out.total());
        // Stable sort: equal shares keep their bucket order
        ratios.sort_by(|a, b| b.1.total_cmp(&a.1));
        for i in 0..remain {
            *out.get_mut(ratios[i % ratios.len()].0) += 1;
        }
        out
    }

    /// Bucket of every slot index: the fast block first, then normal, then slow
    pub fn slot_buckets(&self, count: usize) -> Vec<LatencyBucket> {
        let split = self.allocate(count);
        let mut slots = Vec::with_capacity(count);
        for bucket in LatencyBucket::ALL {
            slots.extend(std::iter::repeat(bucket).take(split.get(bucket)));
        }
        slots.truncate(count);
        slots
    }
}
