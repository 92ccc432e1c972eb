//! Order registry: order id → outstanding quantity.
//!
//! Last write wins; removing an unknown id is a no-op.

use ahash::AHashMap;

/// Outstanding quantity per order for one side.
#[derive(Debug, Clone, Default)]
pub struct OrderRegistry {
    orders: AHashMap<u64, u32>,
}

impl OrderRegistry {
    #[inline]
    pub fn new() -> Self {
        Self {
            orders: AHashMap::new(),
        }
    }

    /// Insert or overwrite an order's quantity. Returns the previous quantity.
    #[inline]
    pub fn set(&mut self, order_id: u64, qty: u32) -> Option<u32> {
        self.orders.insert(order_id, qty)
    }

    /// Remove an order. Returns its quantity if it was present.
    #[inline]
    pub fn remove(&mut self, order_id: u64) -> Option<u32> {
        self.orders.remove(&order_id)
    }

    #[inline]
    pub fn get(&self, order_id: u64) -> Option<u32> {
        self.orders.get(&order_id).copied()
    }

    #[inline]
    pub fn contains(&self, order_id: u64) -> bool {
        self.orders.contains_key(&order_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.orders.clear();
    }
}
