//! Optional timing around the apply step.
//!
//! [`TimedProcessor`] wraps an [`EventProcessor`] and measures each
//! `apply` call with a monotonic clock. The state machine itself never
//! reads the clock.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::processor::EventProcessor;
use crate::statistics::RunningStats;
use crate::types::{BookEvent, TopOfBook};

/// Anything that turns one event into a top-of-book snapshot.
pub trait ApplyEvent {
    fn apply_event(&mut self, event: &BookEvent) -> TopOfBook;
}

impl ApplyEvent for EventProcessor {
    #[inline]
    fn apply_event(&mut self, event: &BookEvent) -> TopOfBook {
        self.apply(event)
    }
}

/// Timing results for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingReport {
    /// Events timed
    pub events: u64,

    /// Sum of per-event apply times, microseconds
    pub total_us: f64,

    /// Mean apply time per event, microseconds
    pub avg_us: f64,

    /// Per-event apply time distribution, nanoseconds
    pub per_event_ns: RunningStats,
}

/// [`EventProcessor`] with per-event and total apply timing.
#[derive(Debug, Clone, Default)]
pub struct TimedProcessor {
    inner: EventProcessor,
    per_event_ns: RunningStats,
    total: Duration,
}

impl TimedProcessor {
    pub fn new(inner: EventProcessor) -> Self {
        Self {
            inner,
            per_event_ns: RunningStats::new(),
            total: Duration::ZERO,
        }
    }

    /// Apply one event, recording how long it took.
    #[inline]
    pub fn apply(&mut self, event: &BookEvent) -> TopOfBook {
        let start = Instant::now();
        let top = self.inner.apply(event);
        let elapsed = start.elapsed();

        self.total += elapsed;
        self.per_event_ns.update(elapsed.as_nanos() as f64);
        top
    }

    /// Total time spent inside `apply`.
    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn report(&self) -> TimingReport {
        let events = self.per_event_ns.count;
        let total_us = self.total.as_secs_f64() * 1e6;
        TimingReport {
            events,
            total_us,
            avg_us: if events > 0 {
                total_us / events as f64
            } else {
                0.0
            },
            per_event_ns: self.per_event_ns.clone(),
        }
    }

    pub fn processor(&self) -> &EventProcessor {
        &self.inner
    }

    pub fn into_inner(self) -> EventProcessor {
        self.inner
    }
}

impl ApplyEvent for TimedProcessor {
    #[inline]
    fn apply_event(&mut self, event: &BookEvent) -> TopOfBook {
        self.apply(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BestLevel, Side};

    #[test]
    fn test_timing_does_not_change_results() {
        let events = [
            BookEvent::add(Side::Bid, 1, 100, 50),
            BookEvent::add(Side::Ask, 2, 101, 20),
            BookEvent::remove(Side::Bid, 1, 100),
        ];

        let mut plain = EventProcessor::new();
        let mut timed = TimedProcessor::new(EventProcessor::new());
        for event in &events {
            assert_eq!(plain.apply_event(event), timed.apply_event(event));
        }
        assert_eq!(
            timed.processor().top_of_book().ask,
            Some(BestLevel::new(101, 20, 1))
        );
    }

    #[test]
    fn test_report_counts_events() {
        let mut timed = TimedProcessor::new(EventProcessor::new());
        for id in 0..100u64 {
            timed.apply(&BookEvent::add(Side::Ask, id, 200 + (id % 5) as u32, 1));
        }
        let report = timed.report();
        assert_eq!(report.events, 100);
        assert!(report.total_us >= 0.0);
        assert!(report.avg_us <= report.total_us);
        assert_eq!(timed.into_inner().stats().events_processed, 100);
    }

    #[test]
    fn test_empty_report() {
        let timed = TimedProcessor::default();
        let report = timed.report();
        assert_eq!(report.events, 0);
        assert_eq!(report.avg_us, 0.0);
        assert_eq!(timed.total(), Duration::ZERO);
    }
}
