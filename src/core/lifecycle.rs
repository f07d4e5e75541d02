//! Lifecycle manager - owns every tracked item
//!
//! Ingested records wait in a pending queue and join the live collection at the
//! start of the next tick. Each tick then:
//! 1. sweeps items that fail the eviction predicate (every `cleanup_interval`)
//! 2. advances every item through the phase state machine
//! 3. stable-sorts by end time, items without one first

use serde_json::Value;
use tracing::{debug, trace, warn};

use super::item::{EventItem, Phase, RawEvent};
use super::phase;

/// Outcome of one ingestion call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub accepted: usize,
    pub rejected: usize,
}

/// Number of tracked items in each phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseCounts {
    pub start: usize,
    pub progress: usize,
    pub end: usize,
}

/// Default eviction predicate.
///
/// Keeps active items, and briefly keeps inactive items that are not in flight so
/// freshly started or ended items do not pop out of view.
#[inline]
pub fn survives(item: &EventItem, grace: f64) -> bool {
    item.state.is_active || (item.state.elapsed <= grace && item.state.phase != Phase::Progress)
}

/// Stable sort by end time. Items without an end time come first.
pub fn sort_by_end_time(items: &mut [EventItem]) {
    items.sort_by(|a, b| match (a.end_time(), b.end_time()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (None, Some(_)) => std::cmp::Ordering::Less,
        (Some(_), None) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

#[derive(Debug)]
pub struct LifecycleManager {
    /// Live items, sorted after every tick
    items: Vec<EventItem>,
    /// Ingested since the last tick
    pending: Vec<EventItem>,
    cleanup_interval: f64,
    eviction_grace: f64,
    last_tick: Option<f64>,
    last_sweep: Option<f64>,
}

impl LifecycleManager {
    pub fn new(cleanup_interval: f64, eviction_grace: f64) -> Self {
        Self {
            items: Vec::new(),
            pending: Vec::new(),
            cleanup_interval,
            eviction_grace,
            last_tick: None,
            last_sweep: None,
        }
    }

    /// Validate and queue a batch of raw records, stamped with `now`.
    ///
    /// Malformed records are dropped individually; duplicate ids are kept.
    pub fn ingest(&mut self, records: &[Value], now: f64) -> IngestReport {
        let mut report = IngestReport::default();
        self.pending.reserve(records.len());

        for (index, record) in records.iter().enumerate() {
            match RawEvent::from_value(record) {
                Ok(raw) => {
                    self.pending.push(EventItem::new(raw, now));
                    report.accepted += 1;
                }
                Err(e) => {
                    warn!(index, error = %e, "Rejected event record");
                    report.rejected += 1;
                }
            }
        }

        trace!(
            accepted = report.accepted,
            rejected = report.rejected,
            pending = self.pending.len(),
            "Ingested batch"
        );
        report
    }

    /// Run one logic update at wall-clock `now` and return the sorted items
    pub fn tick(&mut self, now: f64) -> &[EventItem] {
        let delta = match self.last_tick {
            Some(prev) => (now - prev).max(0.0),
            None => 0.0,
        };
        self.last_tick = Some(now);

        if !self.pending.is_empty() {
            self.items.append(&mut self.pending);
        }

        match self.last_sweep {
            None => self.last_sweep = Some(now),
            Some(prev) if now - prev > self.cleanup_interval => {
                self.sweep();
                self.last_sweep = Some(now);
            }
            Some(_) => {}
        }

        for item in &mut self.items {
            item.state = phase::advance(item.state, item.timing, delta, now);
        }

        sort_by_end_time(&mut self.items);

        trace!(delta, items = self.items.len(), "Lifecycle tick");
        &self.items
    }

    /// Drop every item failing the eviction predicate. Returns the number removed.
    pub fn sweep(&mut self) -> usize {
        let before = self.items.len();
        let grace = self.eviction_grace;
        self.items.retain(|item| survives(item, grace));
        let evicted = before - self.items.len();
        if evicted > 0 {
            debug!(evicted, remaining = self.items.len(), "Evicted finished items");
        }
        evicted
    }

    /// Live items in their current order
    pub fn items(&self) -> &[EventItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items waiting for the next tick
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn phase_counts(&self) -> PhaseCounts {
        let mut counts = PhaseCounts::default();
        for item in &self.items {
            match item.phase() {
                Phase::Start => counts.start += 1,
                Phase::Progress => counts.progress += 1,
                Phase::End => counts.end += 1,
            }
        }
        counts
    }

    /// Forget every item and timer
    pub fn clear(&mut self) {
        self.items.clear();
        self.pending.clear();
        self.last_tick = None;
        self.last_sweep = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::item::{EventId, PhaseState, Timing};
    use serde_json::json;

    fn manager() -> LifecycleManager {
        LifecycleManager::new(2.0, 1.0)
    }

    fn item_with(id: &str, state: PhaseState) -> EventItem {
        EventItem {
            id: EventId::new(id),
            timing: Timing {
                execution_time: 10.0,
                start_offset: 0.0,
            },
            start_time: 0.0,
            state,
        }
    }

    fn state(phase: Phase, elapsed: f64, is_active: bool, end_time: Option<f64>) -> PhaseState {
        PhaseState {
            phase,
            elapsed,
            position: elapsed.clamp(0.0, 1.0),
            is_active,
            end_time,
        }
    }

    #[test]
    fn test_ingest_rejects_per_record() {
        let mut lm = manager();
        let batch = vec![
            json!({"id": 1, "executionTime": 12, "startOffset": 0.2}),
            json!({"id": 2}),
            json!("garbage"),
            json!({"id": 3, "executionTime": 90}),
        ];
        let report = lm.ingest(&batch, 5.0);
        assert_eq!(report, IngestReport { accepted: 2, rejected: 2 });
        assert_eq!(lm.pending_len(), 2);
        assert!(lm.is_empty(), "records wait for the next tick");

        lm.tick(5.0);
        assert_eq!(lm.len(), 2);
        assert_eq!(lm.pending_len(), 0);
        assert!(lm.items().iter().all(|i| i.start_time == 5.0));
    }

    #[test]
    fn test_duplicate_ids_tracked_independently() {
        let mut lm = manager();
        let batch = vec![
            json!({"id": 7, "executionTime": 12}),
            json!({"id": 7, "executionTime": 50}),
        ];
        lm.ingest(&batch, 0.0);
        lm.tick(0.0);
        assert_eq!(lm.len(), 2);
    }

    #[test]
    fn test_first_tick_is_baseline() {
        let mut lm = manager();
        lm.ingest(&[json!({"id": 1, "executionTime": 12})], 100.0);
        let items = lm.tick(100.0);
        assert_eq!(items[0].state, PhaseState::initial());

        // Same `now` again: zero delta, nothing moves
        let before = lm.items().to_vec();
        lm.tick(100.0);
        assert_eq!(lm.items(), &before[..]);

        lm.tick(100.5);
        assert!((lm.items()[0].state.position - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_sort_puts_unfinished_first_and_is_stable() {
        let mut items = vec![
            item_with("a", state(Phase::End, 0.2, true, Some(30.0))),
            item_with("b", state(Phase::Start, 0.1, true, None)),
            item_with("c", state(Phase::End, 0.2, true, Some(10.0))),
            item_with("d", state(Phase::Progress, 3.0, true, Some(20.0))),
            item_with("e", state(Phase::Start, 0.4, true, None)),
            item_with("f", state(Phase::End, 0.9, true, Some(10.0))),
        ];
        sort_by_end_time(&mut items);
        let order: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(order, vec!["b", "e", "c", "f", "d", "a"]);
    }

    #[test]
    fn test_eviction_predicate() {
        let grace = 1.0;
        // Active items always survive
        assert!(survives(&item_with("a", state(Phase::Progress, 50.0, true, None)), grace));
        // Inactive start/end items survive within the grace window
        assert!(survives(&item_with("b", state(Phase::Start, 0.8, false, None)), grace));
        assert!(survives(&item_with("c", state(Phase::End, 1.0, false, Some(1.0))), grace));
        // ...but not past it
        assert!(!survives(&item_with("d", state(Phase::End, 1.5, false, Some(1.0))), grace));
        // Inactive in-flight items never survive
        assert!(!survives(&item_with("e", state(Phase::Progress, 0.5, false, None)), grace));
    }

    #[test]
    fn test_sweep_independent_of_order() {
        let items = vec![
            item_with("keep-active", state(Phase::Progress, 5.0, true, Some(9.0))),
            item_with("drop-end", state(Phase::End, 1.5, false, Some(2.0))),
            item_with("keep-start", state(Phase::Start, 0.5, false, None)),
            item_with("drop-progress", state(Phase::Progress, 0.2, false, None)),
            item_with("keep-end", state(Phase::End, 0.3, true, Some(4.0))),
        ];

        let survivors = |input: Vec<EventItem>| {
            let mut lm = manager();
            lm.items = input;
            lm.sweep();
            let mut ids: Vec<String> = lm.items().iter().map(|i| i.id.to_string()).collect();
            ids.sort();
            ids
        };

        let forward = survivors(items.clone());
        let mut reversed_input = items;
        reversed_input.reverse();
        let reversed = survivors(reversed_input);

        assert_eq!(forward, vec!["keep-active", "keep-end", "keep-start"]);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_cleanup_runs_on_interval() {
        let mut lm = manager();
        lm.items = vec![item_with("done", state(Phase::End, 1.5, false, Some(0.0)))];

        lm.tick(0.0); // baseline, starts the sweep timer
        lm.tick(1.0);
        assert_eq!(lm.len(), 1, "interval not yet exceeded");
        lm.tick(2.0);
        assert_eq!(lm.len(), 1, "must exceed, not reach, the interval");
        lm.tick(2.1);
        assert_eq!(lm.len(), 0);
    }

    #[test]
    fn test_scenario_finished_item_evicted() {
        // An end-phase item at elapsed 1.5 is inactive and goes on the next sweep
        let mut lm = manager();
        let mut s = state(Phase::End, 1.4, true, Some(0.0));
        s = phase::advance(s, Timing { execution_time: 10.0, start_offset: 0.0 }, 0.1, 0.1);
        assert!((s.elapsed - 1.5).abs() < 1e-9);
        assert!(!s.is_active);

        lm.items = vec![item_with("x", s)];
        lm.tick(0.0);
        lm.tick(2.5);
        assert!(lm.is_empty());
    }

    #[test]
    fn test_full_lifecycle_through_manager() {
        let mut lm = manager();
        lm.ingest(&[json!({"id": 1, "executionTime": 3, "startOffset": 0})], 0.0);

        let mut now = 0.0;
        let mut phases = Vec::new();
        while now < 10.0 {
            let items = lm.tick(now);
            if let Some(item) = items.first() {
                if phases.last() != Some(&item.phase()) {
                    phases.push(item.phase());
                }
            }
            now += 0.1;
        }
        assert_eq!(phases, vec![Phase::Start, Phase::Progress, Phase::End]);
        assert!(lm.is_empty(), "finished item is evicted eventually");
    }

    #[test]
    fn test_phase_counts_and_clear() {
        let mut lm = manager();
        lm.items = vec![
            item_with("a", state(Phase::Start, 0.1, true, None)),
            item_with("b", state(Phase::Progress, 2.0, true, Some(3.0))),
            item_with("c", state(Phase::End, 0.5, true, Some(1.0))),
            item_with("d", state(Phase::End, 0.7, true, Some(2.0))),
        ];
        assert_eq!(lm.phase_counts(), PhaseCounts { start: 1, progress: 1, end: 2 });

        lm.ingest(&[json!({"id": 9, "executionTime": 1})], 0.0);
        lm.clear();
        assert!(lm.is_empty());
        assert_eq!(lm.pending_len(), 0);
    }
}
