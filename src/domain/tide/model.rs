//! Tide domain types: raw samples, extremes, and derived gate events.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One tide-height measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub at: DateTime<Utc>,
    /// Height in metres above chart datum.
    pub height: f64,
}

/// Chronologically ordered tide-height series.
///
/// Invariant: timestamps are strictly increasing. The constructor enforces
/// this by keeping the first sample at any timestamp and dropping anything
/// not strictly later than the last kept sample, so an out-of-order or
/// duplicated upstream payload degrades to a shorter series instead of a
/// broken one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSeries {
    samples: Vec<Sample>,
}

impl SampleSeries {
    pub fn new(samples: Vec<Sample>) -> Self {
        let mut kept: Vec<Sample> = Vec::with_capacity(samples.len());
        let mut dropped = 0usize;
        for sample in samples {
            match kept.last() {
                Some(last) if sample.at <= last.at => dropped += 1,
                _ => kept.push(sample),
            }
        }
        if dropped > 0 {
            debug!(dropped, "dropped non-monotonic tide samples");
        }
        Self { samples: kept }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Direction in which the interpolated series crossed the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Crossing {
    Up,
    Down,
}

impl Crossing {
    /// Physical gate motion is the inverse of the series direction: a rising
    /// tide above the threshold lowers the gate.
    pub fn gate_action(self) -> &'static str {
        match self {
            Crossing::Up => "lower",
            Crossing::Down => "raise",
        }
    }
}

/// A derived gate operation instant.
#[derive(Debug, Clone, PartialEq)]
pub struct GateEvent {
    pub at: DateTime<Utc>,
    pub kind: Crossing,
    pub threshold: f64,
}

/// Gate events grouped by local calendar date of the interpolated instant.
/// BTreeMap iteration order doubles as dayKey order.
pub type GateEventsByDay = BTreeMap<NaiveDate, Vec<GateEvent>>;

/// Kind of a tide extreme reported by the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtremeKind {
    High,
    Low,
}

/// A high or low water event.
#[derive(Debug, Clone, PartialEq)]
pub struct TideExtreme {
    pub at: DateTime<Utc>,
    pub height: f64,
    pub kind: ExtremeKind,
}
