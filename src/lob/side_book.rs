//! One side of the book.
//!
//! Composes three containers that must stay mutually consistent:
//! - [`OrderRegistry`]: order id → outstanding quantity
//! - level map: price → [`PriceLevel`] (order id set); a price is active iff
//!   it has a level, and levels are never left empty
//! - [`PriceRanking`]: heap over prices with lazy purge
//!
//! plus a cached [`BestLevel`] so the per-event snapshot does not re-sum the
//! best level. The cache is refreshed whenever the best price may have moved
//! or the best level's membership or quantities changed.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;

use super::price_level::PriceLevel;
use super::ranking::{Ascending, Descending, PriceRanking, RankDirection};
use super::registry::OrderRegistry;
use crate::error::{Result, TobError};
use crate::types::BestLevel;

/// What a Modify does to the order's previous placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModifyPolicy {
    /// Upsert at the new price only. If the price changed, the order stays a
    /// member of its old level as well.
    #[default]
    Retain,

    /// Strip the order from its previous level first when the price changed.
    Relocate,
}

/// Bid side: highest price is best.
pub type BidBook = SideBook<Descending>;

/// Ask side: lowest price is best.
pub type AskBook = SideBook<Ascending>;

/// Order book for a single side, ranked by `D`.
#[derive(Debug, Clone)]
pub struct SideBook<D: RankDirection> {
    registry: OrderRegistry,
    levels: AHashMap<u32, PriceLevel>,
    ranking: PriceRanking<D>,
    /// Last price each order was placed at
    placements: AHashMap<u64, u32>,
    /// Cached aggregate of the best level
    best: Option<BestLevel>,
}

impl<D: RankDirection> Default for SideBook<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: RankDirection> SideBook<D> {
    pub fn new() -> Self {
        Self {
            registry: OrderRegistry::new(),
            levels: AHashMap::new(),
            ranking: PriceRanking::new(),
            placements: AHashMap::new(),
            best: None,
        }
    }

    /// Place (or overwrite) an order at `price`.
    ///
    /// The cached best level is refreshed when `price` is the best price, and
    /// also when the order already belongs to the best level (its quantity
    /// change moves the best aggregate).
    #[inline]
    pub fn add_order(&mut self, price: u32, order_id: u64, qty: u32) {
        self.upsert(price, order_id, qty);
    }

    /// Modify an order. Same upsert as [`add_order`](Self::add_order); the
    /// policy decides whether a differing previous placement is cleaned up.
    pub fn modify_order(&mut self, price: u32, order_id: u64, qty: u32, policy: ModifyPolicy) {
        let relocated = match policy {
            ModifyPolicy::Retain => false,
            ModifyPolicy::Relocate => match self.placements.get(&order_id).copied() {
                Some(previous) if previous != price => self.detach(previous, order_id),
                _ => false,
            },
        };

        self.upsert(price, order_id, qty);

        if relocated {
            self.refresh_best();
        }
    }

    /// Remove an order from the registry and from the level at `price`.
    ///
    /// Returns true if the order was known to the registry or the level.
    pub fn remove_order(&mut self, price: u32, order_id: u64) -> bool {
        let in_registry = self.registry.remove(order_id).is_some();
        if self.placements.get(&order_id) == Some(&price) {
            self.placements.remove(&order_id);
        }
        let in_level = self.detach(price, order_id);

        self.refresh_best();

        in_registry || in_level
    }

    /// Drop every order, level and ranked price.
    pub fn clear(&mut self) {
        self.ranking.clear();
        self.levels.clear();
        self.registry.clear();
        self.placements.clear();
        self.best = None;
    }

    /// Check if any price level is active.
    #[inline]
    pub fn has_any_level(&self) -> bool {
        !self.levels.is_empty()
    }

    /// Cached best level, `None` when the side is empty.
    #[inline]
    pub fn best_level(&self) -> Option<BestLevel> {
        if self.has_any_level() {
            self.best
        } else {
            None
        }
    }

    /// Best price, `None` when the side is empty.
    #[inline]
    pub fn best_price(&self) -> Option<u32> {
        self.best_level().map(|level| level.price)
    }

    /// Aggregate of an arbitrary level, computed on demand.
    pub fn level(&self, price: u32) -> Option<BestLevel> {
        self.levels
            .get(&price)
            .map(|level| level.aggregate(price, &self.registry))
    }

    /// Number of active price levels.
    #[inline]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Number of orders in the registry.
    #[inline]
    pub fn order_count(&self) -> usize {
        self.registry.len()
    }

    /// Outstanding quantity of an order.
    #[inline]
    pub fn quantity_of(&self, order_id: u64) -> Option<u32> {
        self.registry.get(order_id)
    }

    /// Active prices, best first.
    pub fn prices(&self) -> Vec<u32> {
        let mut prices: Vec<u32> = self.levels.keys().copied().collect();
        prices.sort_unstable_by(|a, b| D::key(*b).cmp(&D::key(*a)));
        prices
    }

    /// Recompute everything from scratch and compare with the incremental state.
    pub fn verify_invariants(&self) -> Result<()> {
        for (&price, level) in &self.levels {
            if level.is_empty() {
                return Err(TobError::inconsistent(format!(
                    "level {price} is empty but still active"
                )));
            }
            if !self.ranking.contains(price) {
                return Err(TobError::inconsistent(format!(
                    "level {price} is missing from the ranking"
                )));
            }
        }

        let expected = self
            .levels
            .keys()
            .copied()
            .reduce(|a, b| if D::is_better(a, b) { a } else { b })
            .and_then(|price| self.level(price));

        if expected != self.best_level() {
            return Err(TobError::inconsistent(format!(
                "cached best {:?} differs from recomputed {:?}",
                self.best_level(),
                expected
            )));
        }

        if let Some(top) = self.ranking.peek() {
            if !self.levels.contains_key(&top) {
                return Err(TobError::inconsistent(format!(
                    "ranking top {top} is stale after a completed update"
                )));
            }
        }

        Ok(())
    }

    /// Check that every order rests at exactly one level, and that the level
    /// members are exactly the registry contents.
    ///
    /// Holds whenever modifies use [`ModifyPolicy::Relocate`]; with
    /// [`ModifyPolicy::Retain`] a price-changing modify leaves the order at
    /// its old level too.
    pub fn verify_unique_membership(&self) -> Result<()> {
        let mut seen: AHashMap<u64, u32> = AHashMap::with_capacity(self.registry.len());

        for (&price, level) in &self.levels {
            for &order_id in level.iter() {
                if let Some(other) = seen.insert(order_id, price) {
                    return Err(TobError::inconsistent(format!(
                        "order {order_id} rests at both {other} and {price}"
                    )));
                }
                if !self.registry.contains(order_id) {
                    return Err(TobError::inconsistent(format!(
                        "order {order_id} at level {price} has no registry entry"
                    )));
                }
            }
        }

        if seen.len() != self.registry.len() {
            return Err(TobError::inconsistent(format!(
                "{} orders registered but {} rest at a level",
                self.registry.len(),
                seen.len()
            )));
        }

        Ok(())
    }

    /// Shared by add and modify: upsert quantity and ensure level membership.
    #[inline]
    fn upsert(&mut self, price: u32, order_id: u64, qty: u32) {
        let level = match self.levels.entry(price) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                self.ranking.insert(price);
                entry.insert(PriceLevel::new())
            }
        };
        level.insert(order_id);
        self.registry.set(order_id, qty);
        self.placements.insert(order_id, price);

        // A quantity change for a member of the best level also stales the
        // cache, even when the order was placed elsewhere.
        let member_of_best = self
            .best
            .and_then(|best| self.levels.get(&best.price))
            .is_some_and(|level| level.contains(order_id));

        if self.best_active_price() == Some(price) || member_of_best {
            self.refresh_best();
        }
    }

    /// Take an order out of the level at `price`, deleting the level if it
    /// empties. Does not touch the registry or the cache.
    fn detach(&mut self, price: u32, order_id: u64) -> bool {
        let Some(level) = self.levels.get_mut(&price) else {
            return false;
        };
        let removed = level.remove(order_id);
        if level.is_empty() {
            self.levels.remove(&price);
            self.ranking.remove_if_best(price);
        }
        removed
    }

    #[inline]
    fn best_active_price(&mut self) -> Option<u32> {
        let levels = &self.levels;
        self.ranking.best_active(|price| levels.contains_key(&price))
    }

    fn refresh_best(&mut self) {
        let best_price = self.best_active_price();
        self.best = best_price.and_then(|price| self.level(price));
    }
}
