//! Platform-agnostic engine core - item model, phase machine, lifecycle

pub mod bucket;
pub mod item;
pub mod lifecycle;
pub mod parser;
pub mod phase;

pub use bucket::{BucketCounts, LatencyBucket};
pub use item::{EventId, EventItem, Phase, PhaseState, RawEvent, Timing};
pub use lifecycle::{IngestReport, LifecycleManager, PhaseCounts};
pub use parser::parse_payload;
