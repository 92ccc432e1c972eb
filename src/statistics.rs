//! Statistics over a replay session.
//!
//! # Key Features
//!
//! - **RunningStats**: Online mean/std/min/max (Welford's algorithm)
//! - **SessionStats**: Per-run summary of top-of-book snapshots (how often a
//!   side was empty, crossed books, best-level size and spread distributions)

use crate::types::{EventRecord, TopOfBook};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Running Statistics (Welford's Algorithm)
// ============================================================================

/// Online algorithm for computing running mean and standard deviation.
///
/// Uses Welford's algorithm for numerical stability with large datasets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunningStats {
    /// Number of observations
    pub count: u64,
    /// Running mean
    pub mean: f64,
    /// Running M2 (sum of squared differences from mean)
    m2: f64,
    /// Minimum value observed
    #[serde(serialize_with = "finite_or_null", deserialize_with = "null_as_pos_inf")]
    pub min: f64,
    /// Maximum value observed
    #[serde(serialize_with = "finite_or_null", deserialize_with = "null_as_neg_inf")]
    pub max: f64,
}

// JSON has no infinities; an empty tracker stores its bounds as null.
fn finite_or_null<S: Serializer>(value: &f64, s: S) -> std::result::Result<S::Ok, S::Error> {
    if value.is_finite() {
        s.serialize_some(value)
    } else {
        s.serialize_none()
    }
}

fn null_as_pos_inf<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::INFINITY))
}

fn null_as_neg_inf<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NEG_INFINITY))
}

impl Default for RunningStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningStats {
    /// Create a new running statistics tracker.
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Update statistics with a new value. NaN/Inf are skipped.
    #[inline]
    pub fn update(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }

        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;

        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Get the population variance.
    #[inline]
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    /// Get the population standard deviation.
    #[inline]
    pub fn std(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Check if any values have been recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

// ============================================================================
// Session Statistics
// ============================================================================

/// Summary of the snapshots produced during one replay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    /// Snapshots observed
    pub snapshots: u64,

    /// Both sides empty
    pub empty_snapshots: u64,

    /// Exactly one side present
    pub one_sided_snapshots: u64,

    /// Both sides present
    pub two_sided_snapshots: u64,

    /// Both sides present with bid >= ask
    pub crossed_snapshots: u64,

    /// Best bid aggregate quantity
    pub best_bid_quantity: RunningStats,

    /// Best ask aggregate quantity
    pub best_ask_quantity: RunningStats,

    /// Ask minus bid, in price ticks (two-sided, uncrossed snapshots only)
    pub spread_ticks: RunningStats,

    /// First source timestamp
    pub first_source_time: Option<u64>,

    /// Last source timestamp
    pub last_source_time: Option<u64>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update with one output record.
    pub fn update(&mut self, record: &EventRecord) {
        let ts = record.event.source_time;
        if self.first_source_time.is_none() {
            self.first_source_time = Some(ts);
        }
        self.last_source_time = Some(ts);

        self.update_top(&record.top);
    }

    /// Update with a snapshot only.
    pub fn update_top(&mut self, top: &TopOfBook) {
        self.snapshots += 1;

        if let Some(bid) = top.bid {
            self.best_bid_quantity.update(bid.quantity as f64);
        }
        if let Some(ask) = top.ask {
            self.best_ask_quantity.update(ask.quantity as f64);
        }

        match (top.bid, top.ask) {
            (None, None) => self.empty_snapshots += 1,
            (Some(bid), Some(ask)) => {
                self.two_sided_snapshots += 1;
                if top.is_crossed() {
                    self.crossed_snapshots += 1;
                } else {
                    self.spread_ticks.update((ask.price - bid.price) as f64);
                }
            }
            _ => self.one_sided_snapshots += 1,
        }
    }
}
