//! Event items - the unit of animation
//!
//! - RawEvent: a validated record from the data source
//! - Timing: immutable per-item durations
//! - PhaseState: the per-tick mutable part, advanced by `phase::advance`
//! - EventItem: id + timing + ingestion time + state

use std::fmt;

use serde_json::Value;

use crate::error::RecordError;

/// Lifecycle stage of an item. Only ever moves forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Entrance animation
    Start,
    /// Invisible in-flight traversal
    Progress,
    /// Exit animation; terminal until evicted
    End,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Start => "start",
            Phase::Progress => "progress",
            Phase::End => "end",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Item identifier as sent by the data source (number or string)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Integer value of the id, used to pick a stable lane.
    /// Leading digits are read and the rest ignored, so `3.7` and `12abc`
    /// give 3 and 12. None when the id does not start with a digit.
    pub fn lane_key(&self) -> Option<u64> {
        let s = self.0.trim_start();
        let s = s.strip_prefix('+').unwrap_or(s);
        let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        s[..end].parse().ok()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable durations of an item
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timing {
    /// Nominal duration of the request (seconds)
    pub execution_time: f64,
    /// Delay before the entrance animation begins (seconds, nominally 0..1)
    pub start_offset: f64,
}

/// Mutable animation state of an item
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseState {
    pub phase: Phase,
    /// Time accumulated in the current animation cycle
    pub elapsed: f64,
    /// Normalized progress in the current phase, always within [0, 1]
    pub position: f64,
    /// Whether the item should currently be drawn
    pub is_active: bool,
    /// Wall-clock time the item entered `End` (provisional while in `Progress`)
    pub end_time: Option<f64>,
}

impl PhaseState {
    /// State of a freshly ingested item
    pub const fn initial() -> Self {
        Self {
            phase: Phase::Start,
            elapsed: 0.0,
            position: 0.0,
            is_active: true,
            end_time: None,
        }
    }
}

impl Default for PhaseState {
    fn default() -> Self {
        Self::initial()
    }
}

/// A validated record from the data source
#[derive(Clone, Debug, PartialEq)]
pub struct RawEvent {
    pub id: EventId,
    pub execution_time: f64,
    pub start_offset: f64,
}

impl RawEvent {
    /// Validate one JSON record.
    ///
    /// Requires `id` (string or number) and a positive finite `executionTime`.
    /// `startOffset` defaults to 0 when absent and is otherwise taken as given.
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        let obj = value.as_object().ok_or(RecordError::NotAnObject)?;

        let id = match obj.get("id") {
            None | Some(Value::Null) => return Err(RecordError::MissingField("id")),
            Some(Value::String(s)) => EventId::new(s.as_str()),
            Some(Value::Number(n)) => EventId::new(n.to_string()),
            Some(_) => {
                return Err(RecordError::InvalidField {
                    field: "id",
                    reason: "expected a string or number",
                })
            }
        };

        let execution_time = match obj.get("executionTime") {
            None | Some(Value::Null) => return Err(RecordError::MissingField("executionTime")),
            Some(v) => v.as_f64().ok_or(RecordError::InvalidField {
                field: "executionTime",
                reason: "expected a number",
            })?,
        };
        if !(execution_time.is_finite() && execution_time > 0.0) {
            return Err(RecordError::InvalidField {
                field: "executionTime",
                reason: "must be a positive finite number",
            });
        }

        let start_offset = match obj.get("startOffset") {
            None | Some(Value::Null) => 0.0,
            Some(v) => v
                .as_f64()
                .filter(|o| o.is_finite())
                .ok_or(RecordError::InvalidField {
                    field: "startOffset",
                    reason: "expected a finite number",
                })?,
        };

        Ok(Self {
            id,
            execution_time,
            start_offset,
        })
    }
}

/// One tracked request on its way through the animation
#[derive(Clone, Debug, PartialEq)]
pub struct EventItem {
    pub id: EventId,
    pub timing: Timing,
    /// Wall-clock ingestion time
    pub start_time: f64,
    pub state: PhaseState,
}

impl EventItem {
    /// Build a fresh item stamped with the ingestion time
    pub fn new(raw: RawEvent, now: f64) -> Self {
        Self {
            id: raw.id,
            timing: Timing {
                execution_time: raw.execution_time,
                start_offset: raw.start_offset,
            },
            start_time: now,
            state: PhaseState::initial(),
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state.is_active
    }

    #[inline]
    pub fn end_time(&self) -> Option<f64> {
        self.state.end_time
    }
}
