//! Price ranking: best-price extraction over a dynamic set of prices.
//!
//! A [`BinaryHeap`] only supports peek/pop of its extreme, so arbitrary
//! removal is deferred. The owner keeps the authoritative set of active
//! prices (its level map); when a non-best price goes away the heap keeps a
//! stale entry, and [`PriceRanking::best_active`] discards stale entries as
//! they surface at the top (lazy purge). When the removed price *is* the top,
//! [`PriceRanking::remove_if_best`] pops it directly.
//!
//! Each distinct price is held at most once: `present` mirrors the heap's
//! contents, stale entries included.
//!
//! # Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | `insert` | O(log n) |
//! | `remove_if_best` | O(log n) |
//! | `best_active` | O(1) when clean, amortized O(log n) per purged entry |

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::marker::PhantomData;

use ahash::AHashSet;

/// Ordering direction of a ranking: which price counts as "best".
pub trait RankDirection {
    /// Heap key; the heap's maximum key is the best price.
    type Key: Ord + Copy + std::fmt::Debug;

    fn key(price: u32) -> Self::Key;

    fn price(key: Self::Key) -> u32;

    /// Returns true if `a` ranks strictly ahead of `b`.
    #[inline]
    fn is_better(a: u32, b: u32) -> bool {
        Self::key(a) > Self::key(b)
    }
}

/// Highest price first (bid side).
#[derive(Debug, Clone, Copy, Default)]
pub struct Descending;

/// Lowest price first (ask side).
#[derive(Debug, Clone, Copy, Default)]
pub struct Ascending;

impl RankDirection for Descending {
    type Key = u32;

    #[inline(always)]
    fn key(price: u32) -> u32 {
        price
    }

    #[inline(always)]
    fn price(key: u32) -> u32 {
        key
    }
}

impl RankDirection for Ascending {
    type Key = Reverse<u32>;

    #[inline(always)]
    fn key(price: u32) -> Reverse<u32> {
        Reverse(price)
    }

    #[inline(always)]
    fn price(key: Reverse<u32>) -> u32 {
        key.0
    }
}

/// Heap of prices with lazy removal.
#[derive(Debug, Clone)]
pub struct PriceRanking<D: RankDirection> {
    heap: BinaryHeap<D::Key>,
    present: AHashSet<u32>,
    _direction: PhantomData<D>,
}

impl<D: RankDirection> Default for PriceRanking<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: RankDirection> PriceRanking<D> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            present: AHashSet::new(),
            _direction: PhantomData,
        }
    }

    /// Add a price. No-op if the heap already holds it (stale or not).
    #[inline]
    pub fn insert(&mut self, price: u32) {
        if self.present.insert(price) {
            self.heap.push(D::key(price));
        }
    }

    /// Raw top of the heap, possibly stale.
    #[inline]
    pub fn peek(&self) -> Option<u32> {
        self.heap.peek().map(|&key| D::price(key))
    }

    /// Best price among those for which `is_active` holds.
    ///
    /// Stale entries found at the top are popped and forgotten.
    pub fn best_active(&mut self, is_active: impl Fn(u32) -> bool) -> Option<u32> {
        while let Some(&key) = self.heap.peek() {
            let price = D::price(key);
            if is_active(price) {
                return Some(price);
            }
            self.heap.pop();
            self.present.remove(&price);
        }
        None
    }

    /// Pop `price` if it is the raw top. Otherwise the heap is left as is and
    /// the entry goes stale until a later purge reaches it.
    #[inline]
    pub fn remove_if_best(&mut self, price: u32) -> bool {
        match self.heap.peek() {
            Some(&key) if D::price(key) == price => {
                self.heap.pop();
                self.present.remove(&price);
                true
            }
            _ => false,
        }
    }

    /// Check if the heap holds an entry for `price` (stale or not).
    #[inline]
    pub fn contains(&self, price: u32) -> bool {
        self.present.contains(&price)
    }

    /// Number of heap entries, stale ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.present.clear();
    }
}
