//! Mock data source
//!
//! Produces request batches shaped like the dashboard API:
//! `{"data": [{"id", "executionTime", "startOffset"}, ...]}`.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::Value;

/// Records per batch, inclusive
const BATCH_SIZE: (usize, usize) = (1, 100);
/// Execution time range in seconds, inclusive
const EXECUTION_TIME: (u32, u32) = (1, 100);

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MockRecord {
    id: u64,
    execution_time: u32,
    start_offset: f64,
}

#[derive(Serialize)]
struct Payload<'a> {
    data: &'a [MockRecord],
}

pub struct MockSource {
    rng: SmallRng,
    next_id: u64,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
            next_id: 1,
        }
    }

    /// Deterministic source for tests and reproducible runs
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            next_id: 1,
        }
    }

    fn records(&mut self) -> Vec<MockRecord> {
        let len = self.rng.gen_range(BATCH_SIZE.0..=BATCH_SIZE.1);
        (0..len)
            .map(|_| {
                let id = self.next_id;
                self.next_id += 1;
                MockRecord {
                    id,
                    execution_time: self.rng.gen_range(EXECUTION_TIME.0..=EXECUTION_TIME.1),
                    start_offset: self.rng.gen::<f64>(),
                }
            })
            .collect()
    }

    /// One batch as raw JSON records, ready for ingestion
    pub fn next_batch(&mut self) -> Vec<Value> {
        self.records()
            .iter()
            .filter_map(|r| serde_json::to_value(r).ok())
            .collect()
    }

    /// One batch as a wire payload
    pub fn payload(&mut self) -> String {
        let records = self.records();
        serde_json::to_string(&Payload { data: &records }).unwrap_or_else(|_| r#"{"data":[]}"#.to_owned())
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}
