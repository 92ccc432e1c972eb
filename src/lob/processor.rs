//! Event processor: applies one event to the bid and ask books and reports
//! the best level of each side.
//!
//! The processor holds no state of its own beyond the two books and some
//! counters; every event is dispatched on its action tag:
//!
//! | Action | Effect |
//! |--------|--------|
//! | Clear (`Y`/`F`) | clear both sides |
//! | Add (`A`) | `add_order` on the event's side |
//! | Modify (`M`) | `modify_order` on the event's side |
//! | Remove (`D`) | `remove_order` on the event's side |
//! | anything else | nothing |
//!
//! A snapshot of both sides is produced after every event, mutating or not.

use serde::{Deserialize, Serialize};

use super::ranking::RankDirection;
use super::side_book::{AskBook, BidBook, ModifyPolicy, SideBook};
use crate::types::{Action, BookEvent, EventRecord, Side, TopOfBook};

/// Configuration for event processing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// What a Modify does with the order's previous price level
    pub modify_policy: ModifyPolicy,
}

impl ProcessorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set modify handling policy.
    pub fn with_modify_policy(mut self, policy: ModifyPolicy) -> Self {
        self.modify_policy = policy;
        self
    }
}

/// Counters for monitoring a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorStats {
    /// Total events applied (including ignored ones)
    pub events_processed: u64,

    pub clears: u64,
    pub adds: u64,
    pub modifies: u64,
    pub removes: u64,

    /// Events with an unrecognized action tag
    pub unknown_actions: u64,

    /// Add/Modify/Remove events without a bid or ask side
    pub missing_side: u64,

    /// Removes that matched no order on their side
    pub removes_not_found: u64,

    /// Last source timestamp seen
    pub last_source_time: Option<u64>,
}

/// Two-sided book driven by [`BookEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct EventProcessor {
    config: ProcessorConfig,
    bids: BidBook,
    asks: AskBook,
    stats: ProcessorStats,
}

impl EventProcessor {
    /// Create a processor with the default configuration.
    ///
    /// # Example
    /// ```
    /// use tob_reconstructor::{BookEvent, EventProcessor, Side};
    ///
    /// let mut processor = EventProcessor::new();
    /// let top = processor.apply(&BookEvent::add(Side::Bid, 1, 100, 50));
    /// assert_eq!(top.bid.map(|level| level.quantity), Some(50));
    /// assert!(top.ask.is_none());
    /// ```
    pub fn new() -> Self {
        Self::with_config(ProcessorConfig::default())
    }

    /// Create a processor with a custom configuration.
    pub fn with_config(config: ProcessorConfig) -> Self {
        Self {
            config,
            bids: BidBook::new(),
            asks: AskBook::new(),
            stats: ProcessorStats::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Apply one event and return the best level of both sides.
    #[inline]
    pub fn apply(&mut self, event: &BookEvent) -> TopOfBook {
        self.stats.events_processed += 1;
        self.stats.last_source_time = Some(event.source_time);

        match event.action() {
            Some(Action::Clear) => {
                self.stats.clears += 1;
                self.bids.clear();
                self.asks.clear();
            }
            Some(action) => self.apply_to_side(action, event),
            None => {
                self.stats.unknown_actions += 1;
                log::debug!(
                    "Ignoring event with unknown action tag 0x{:02x} (order {}, event #{})",
                    event.action_tag,
                    event.order_id,
                    self.stats.events_processed
                );
            }
        }

        self.top_of_book()
    }

    /// Apply one event and pair it with the resulting snapshot.
    #[inline]
    pub fn apply_record(&mut self, event: &BookEvent) -> EventRecord {
        let top = self.apply(event);
        EventRecord { event: *event, top }
    }

    /// Apply a sequence of events, collecting one record per event.
    pub fn apply_all<'a>(
        &mut self,
        events: impl IntoIterator<Item = &'a BookEvent>,
    ) -> Vec<EventRecord> {
        events
            .into_iter()
            .map(|event| self.apply_record(event))
            .collect()
    }

    fn apply_to_side(&mut self, action: Action, event: &BookEvent) {
        match action {
            Action::Add => self.stats.adds += 1,
            Action::Modify => self.stats.modifies += 1,
            Action::Remove => self.stats.removes += 1,
            Action::Clear => {}
        }

        let found = match event.side() {
            Side::Bid => Self::dispatch(&mut self.bids, action, event, self.config.modify_policy),
            Side::Ask => Self::dispatch(&mut self.asks, action, event, self.config.modify_policy),
            Side::None => {
                self.stats.missing_side += 1;
                log::debug!(
                    "Ignoring {:?} for order {} with side tag 0x{:02x}",
                    action,
                    event.order_id,
                    event.side_tag
                );
                return;
            }
        };

        if !found {
            self.stats.removes_not_found += 1;
        }
    }

    /// Returns false only for a remove that matched nothing.
    #[inline]
    fn dispatch<D: RankDirection>(
        book: &mut SideBook<D>,
        action: Action,
        event: &BookEvent,
        policy: ModifyPolicy,
    ) -> bool {
        match action {
            Action::Add => book.add_order(event.price, event.order_id, event.qty),
            Action::Modify => book.modify_order(event.price, event.order_id, event.qty, policy),
            Action::Remove => return book.remove_order(event.price, event.order_id),
            Action::Clear => book.clear(),
        }
        true
    }

    /// Best level of each side right now.
    #[inline]
    pub fn top_of_book(&self) -> TopOfBook {
        TopOfBook {
            bid: self.bids.best_level(),
            ask: self.asks.best_level(),
        }
    }

    /// Bid side book.
    pub fn bids(&self) -> &BidBook {
        &self.bids
    }

    /// Ask side book.
    pub fn asks(&self) -> &AskBook {
        &self.asks
    }

    /// Get current statistics.
    pub fn stats(&self) -> &ProcessorStats {
        &self.stats
    }

    /// Reset both books and the statistics.
    pub fn reset(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.stats = ProcessorStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BestLevel;

    #[test]
    fn test_new_processor() {
        let processor = EventProcessor::new();
        assert!(processor.top_of_book().is_empty());
        assert_eq!(processor.stats().events_processed, 0);
        assert_eq!(processor.config().modify_policy, ModifyPolicy::Retain);
    }

    #[test]
    fn test_basic_add_best_scenario() {
        let mut processor = EventProcessor::new();

        let top = processor.apply(&BookEvent::add(Side::Bid, 1, 100, 50));
        assert_eq!(top.bid, Some(BestLevel::new(100, 50, 1)));

        let top = processor.apply(&BookEvent::add(Side::Bid, 2, 105, 30));
        assert_eq!(top.bid, Some(BestLevel::new(105, 30, 1)));

        let top = processor.apply(&BookEvent::remove(Side::Bid, 2, 105));
        assert_eq!(top.bid, Some(BestLevel::new(100, 50, 1)));
        assert_eq!(top.ask, None);
    }

    #[test]
    fn test_ask_ordering_scenario() {
        let mut processor = EventProcessor::new();
        processor.apply(&BookEvent::add(Side::Ask, 3, 200, 10));
        let top = processor.apply(&BookEvent::add(Side::Ask, 4, 190, 20));
        assert_eq!(top.ask, Some(BestLevel::new(190, 20, 1)));
    }

    #[test]
    fn test_clear_resets_both_sides() {
        let mut processor = EventProcessor::new();
        processor.apply(&BookEvent::add(Side::Bid, 1, 100, 50));
        processor.apply(&BookEvent::add(Side::Bid, 2, 99, 50));
        processor.apply(&BookEvent::add(Side::Ask, 3, 101, 50));
        processor.apply(&BookEvent::add(Side::Ask, 4, 102, 50));

        let top = processor.apply(&BookEvent::clear());
        assert_eq!(top.bid, None);
        assert_eq!(top.ask, None);
        assert_eq!(processor.bids().order_count(), 0);
        assert_eq!(processor.stats().clears, 1);

        // Second clear changes nothing
        let top = processor.apply(&BookEvent::from_tags(0, b'0', b'F', 0, 0, 0));
        assert!(top.is_empty());
        assert_eq!(processor.stats().clears, 2);
    }

    #[test]
    fn test_unknown_action_still_snapshots() {
        let mut processor = EventProcessor::new();
        processor.apply(&BookEvent::add(Side::Ask, 1, 200, 10));

        let top = processor.apply(&BookEvent::from_tags(5, b'2', b'Z', 1, 200, 0));
        assert_eq!(top.ask, Some(BestLevel::new(200, 10, 1)));
        assert_eq!(processor.stats().unknown_actions, 1);
        assert_eq!(processor.stats().events_processed, 2);
        assert_eq!(processor.stats().last_source_time, Some(5));
    }

    #[test]
    fn test_missing_side_is_ignored() {
        let mut processor = EventProcessor::new();
        let top = processor.apply(&BookEvent::from_tags(0, b'9', b'A', 1, 100, 10));
        assert!(top.is_empty());
        assert_eq!(processor.stats().missing_side, 1);
        assert_eq!(processor.stats().adds, 1);
    }

    #[test]
    fn test_remove_unknown_order_counted() {
        let mut processor = EventProcessor::new();
        let top = processor.apply(&BookEvent::remove(Side::Bid, 42, 100));
        assert!(top.is_empty());
        assert_eq!(processor.stats().removes_not_found, 1);
    }

    #[test]
    fn test_sides_are_independent() {
        let mut processor = EventProcessor::new();
        processor.apply(&BookEvent::add(Side::Bid, 1, 100, 5));
        processor.apply(&BookEvent::add(Side::Ask, 1, 101, 7));

        // Same id on the other side is a different order
        let top = processor.apply(&BookEvent::remove(Side::Ask, 1, 101));
        assert_eq!(top.bid, Some(BestLevel::new(100, 5, 1)));
        assert_eq!(top.ask, None);
    }

    #[test]
    fn test_modify_policy_is_applied() {
        let events = [
            BookEvent::add(Side::Bid, 1, 100, 50),
            BookEvent::modify(Side::Bid, 1, 98, 20),
        ];

        let mut retain = EventProcessor::new();
        let records = retain.apply_all(events.iter());
        assert_eq!(records[1].top.bid, Some(BestLevel::new(100, 20, 1)));

        let config = ProcessorConfig::new().with_modify_policy(ModifyPolicy::Relocate);
        let mut relocate = EventProcessor::with_config(config);
        let records = relocate.apply_all(events.iter());
        assert_eq!(records[1].top.bid, Some(BestLevel::new(98, 20, 1)));
    }

    #[test]
    fn test_apply_record_echoes_event() {
        let mut processor = EventProcessor::new();
        let event = BookEvent::add(Side::Ask, 9, 300, 3).with_source_time(77);
        let record = processor.apply_record(&event);
        assert_eq!(record.event, event);
        assert_eq!(record.top.ask, Some(BestLevel::new(300, 3, 1)));
    }

    #[test]
    fn test_reset() {
        let mut processor = EventProcessor::new();
        processor.apply(&BookEvent::add(Side::Bid, 1, 100, 50));
        processor.reset();
        assert!(processor.top_of_book().is_empty());
        assert_eq!(processor.stats(), &ProcessorStats::default());
    }
}
