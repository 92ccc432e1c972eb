//! Price level: the set of orders resting at one price.
//!
//! A level only stores order identifiers. Quantities live in the
//! [`OrderRegistry`], so the aggregate is derived on demand by
//! [`PriceLevel::aggregate`]. The owning side book caches the aggregate for
//! the best level only.
//!
//! # Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | `insert` | O(1) amortized |
//! | `remove` | O(1) amortized |
//! | `order_count` | O(1) |
//! | `aggregate` | O(n) in level size |

use ahash::AHashSet;

use super::registry::OrderRegistry;
use crate::types::BestLevel;

/// Orders resting at one price on one side.
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    orders: AHashSet<u64>,
}

impl PriceLevel {
    /// Create a new empty price level.
    #[inline]
    pub fn new() -> Self {
        Self {
            orders: AHashSet::new(),
        }
    }

    /// Add an order id. Returns false if it was already a member.
    #[inline]
    pub fn insert(&mut self, order_id: u64) -> bool {
        self.orders.insert(order_id)
    }

    /// Remove an order id. Returns false if it was not a member.
    #[inline]
    pub fn remove(&mut self, order_id: u64) -> bool {
        self.orders.remove(&order_id)
    }

    /// Check if an order rests at this level.
    #[inline]
    pub fn contains(&self, order_id: u64) -> bool {
        self.orders.contains(&order_id)
    }

    /// Check if the price level has no orders.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Get the number of orders at this price level.
    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Sum member quantities from the registry (wrapping on overflow).
    ///
    /// A member without a registry entry contributes zero.
    pub fn total_quantity(&self, registry: &OrderRegistry) -> u32 {
        self.orders.iter().fold(0u32, |acc, id| {
            acc.wrapping_add(registry.get(*id).unwrap_or(0))
        })
    }

    /// Aggregate view of this level at `price`.
    #[inline]
    pub fn aggregate(&self, price: u32, registry: &OrderRegistry) -> BestLevel {
        BestLevel::new(
            price,
            self.total_quantity(registry),
            self.orders.len() as u32,
        )
    }

    /// Iterate over member order ids (unordered).
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &u64> {
        self.orders.iter()
    }
}
