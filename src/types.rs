//! Core data types for order events and top-of-book snapshots.
//!
//! Events keep their raw side/action tags so the output layer can echo them
//! verbatim; typed views are obtained through [`BookEvent::side`] and
//! [`BookEvent::action`].

use serde::{Deserialize, Serialize};

/// Order side as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    /// Buy side
    Bid = b'1',
    /// Sell side
    Ask = b'2',
    /// Any other tag (e.g. clear events carry no side)
    None = 0,
}

impl Side {
    /// Parse side from a byte. Unknown tags map to [`Side::None`].
    #[inline]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'1' => Side::Bid,
            b'2' => Side::Ask,
            _ => Side::None,
        }
    }

    /// Convert to byte representation.
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Event action (what happened to the book).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Wipe both sides (`'Y'` or `'F'` on the wire)
    Clear,
    /// Place an order (`'A'`)
    Add,
    /// Replace an order's quantity and placement (`'M'`)
    Modify,
    /// Delete an order (`'D'`)
    Remove,
}

impl Action {
    /// Parse action from a byte. Returns `None` for unrecognized tags.
    #[inline]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'Y' | b'F' => Some(Action::Clear),
            b'A' => Some(Action::Add),
            b'M' => Some(Action::Modify),
            b'D' => Some(Action::Remove),
            _ => None,
        }
    }

    /// Canonical byte for this action. Clear encodes as `'Y'`.
    pub fn to_byte(self) -> u8 {
        match self {
            Action::Clear => b'Y',
            Action::Add => b'A',
            Action::Modify => b'M',
            Action::Remove => b'D',
        }
    }
}

/// A single decoded order event, host byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookEvent {
    /// Source timestamp as sent by the venue
    pub source_time: u64,
    /// Raw side tag
    pub side_tag: u8,
    /// Raw action tag
    pub action_tag: u8,
    /// Order identifier
    pub order_id: u64,
    /// Price in venue ticks
    pub price: u32,
    /// Outstanding quantity
    pub qty: u32,
}

impl BookEvent {
    /// Create an event from typed side and action.
    pub fn new(action: Action, side: Side, order_id: u64, price: u32, qty: u32) -> Self {
        Self {
            source_time: 0,
            side_tag: side.to_byte(),
            action_tag: action.to_byte(),
            order_id,
            price,
            qty,
        }
    }

    /// Create an event from raw wire tags.
    pub fn from_tags(
        source_time: u64,
        side_tag: u8,
        action_tag: u8,
        order_id: u64,
        price: u32,
        qty: u32,
    ) -> Self {
        Self {
            source_time,
            side_tag,
            action_tag,
            order_id,
            price,
            qty,
        }
    }

    /// Shorthand for an add event.
    pub fn add(side: Side, order_id: u64, price: u32, qty: u32) -> Self {
        Self::new(Action::Add, side, order_id, price, qty)
    }

    /// Shorthand for a modify event.
    pub fn modify(side: Side, order_id: u64, price: u32, qty: u32) -> Self {
        Self::new(Action::Modify, side, order_id, price, qty)
    }

    /// Shorthand for a remove event.
    pub fn remove(side: Side, order_id: u64, price: u32) -> Self {
        Self::new(Action::Remove, side, order_id, price, 0)
    }

    /// Shorthand for a clear event.
    pub fn clear() -> Self {
        Self::new(Action::Clear, Side::None, 0, 0, 0)
    }

    /// Set the source timestamp.
    pub fn with_source_time(mut self, source_time: u64) -> Self {
        self.source_time = source_time;
        self
    }

    /// Typed side.
    #[inline]
    pub fn side(&self) -> Side {
        Side::from_byte(self.side_tag)
    }

    /// Typed action, `None` if the tag is not recognized.
    #[inline]
    pub fn action(&self) -> Option<Action> {
        Action::from_byte(self.action_tag)
    }
}

/// Aggregate view of one price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BestLevel {
    pub price: u32,
    /// Sum of member orders' outstanding quantities (wrapping)
    pub quantity: u32,
    /// Number of orders resting at the price
    pub order_count: u32,
}

impl BestLevel {
    pub fn new(price: u32, quantity: u32, order_count: u32) -> Self {
        Self {
            price,
            quantity,
            order_count,
        }
    }
}

/// Best level on each side after an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopOfBook {
    pub bid: Option<BestLevel>,
    pub ask: Option<BestLevel>,
}

impl TopOfBook {
    /// Returns true if neither side has a level.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bid.is_none() && self.ask.is_none()
    }

    /// Best level for a side. [`Side::None`] yields `None`.
    pub fn side(&self, side: Side) -> Option<BestLevel> {
        match side {
            Side::Bid => self.bid,
            Side::Ask => self.ask,
            Side::None => None,
        }
    }

    /// Returns true if both sides are present and bid >= ask.
    pub fn is_crossed(&self) -> bool {
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) => bid.price >= ask.price,
            _ => false,
        }
    }
}

/// One output record: the event and the book top it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event: BookEvent,
    pub top: TopOfBook,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_from_byte() {
        assert_eq!(Side::from_byte(b'1'), Side::Bid);
        assert_eq!(Side::from_byte(b'2'), Side::Ask);
        assert_eq!(Side::from_byte(b'0'), Side::None);
        assert_eq!(Side::from_byte(b' '), Side::None);
    }

    #[test]
    fn test_action_from_byte() {
        assert_eq!(Action::from_byte(b'Y'), Some(Action::Clear));
        assert_eq!(Action::from_byte(b'F'), Some(Action::Clear));
        assert_eq!(Action::from_byte(b'A'), Some(Action::Add));
        assert_eq!(Action::from_byte(b'M'), Some(Action::Modify));
        assert_eq!(Action::from_byte(b'D'), Some(Action::Remove));
        assert_eq!(Action::from_byte(b'X'), None);
        assert_eq!(Action::from_byte(b'a'), None);
    }

    #[test]
    fn test_event_keeps_raw_tags() {
        let event = BookEvent::from_tags(7, b'F', b'F', 0, 0, 0);
        assert_eq!(event.action(), Some(Action::Clear));
        assert_eq!(event.action_tag, b'F');
        assert_eq!(event.side(), Side::None);
    }

    #[test]
    fn test_event_builders() {
        let event = BookEvent::add(Side::Ask, 42, 1900, 5).with_source_time(123);
        assert_eq!(event.side(), Side::Ask);
        assert_eq!(event.action(), Some(Action::Add));
        assert_eq!(event.source_time, 123);

        let event = BookEvent::remove(Side::Bid, 42, 1900);
        assert_eq!(event.action_tag, b'D');
        assert_eq!(event.qty, 0);
    }

    #[test]
    fn test_top_of_book_crossed() {
        let mut top = TopOfBook::default();
        assert!(top.is_empty());
        assert!(!top.is_crossed());

        top.bid = Some(BestLevel::new(101, 10, 1));
        top.ask = Some(BestLevel::new(100, 10, 1));
        assert!(top.is_crossed());
        assert_eq!(top.side(Side::Bid).map(|l| l.price), Some(101));
        assert_eq!(top.side(Side::None), None);
    }
}
