//! Authoritative order store: id-indexed, append-only creation, in-place
//! status mutation, no deletion. Terminal orders are retained for audit and
//! historical query.

use crate::domain::{Order, OrderFilter, OrderId, OrderView};
use std::collections::BTreeMap;

/// In-memory map from order id to record. Ids are assigned sequentially
/// starting at 1 and never reused; the BTreeMap keeps scans in ascending-id
/// (insertion) order, which is what the pagination law relies on.
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: BTreeMap<i64, Order>,
    next_id: i64,
}

impl OrderStore {
    pub fn new() -> Self {
        OrderStore {
            orders: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Rebuild the store from persisted orders (startup recovery).
    pub fn restore(orders: Vec<Order>) -> Self {
        let next_id = orders.iter().map(|o| o.id.as_i64()).max().unwrap_or(0) + 1;
        let orders = orders.into_iter().map(|o| (o.id.as_i64(), o)).collect();
        OrderStore { orders, next_id }
    }

    /// The id the next created order will receive.
    pub fn next_id(&self) -> OrderId {
        OrderId::new(self.next_id)
    }

    /// Insert a newly created order. The order must carry the id returned by
    /// [`next_id`](Self::next_id); creation is append-only.
    pub fn insert(&mut self, order: Order) {
        debug_assert_eq!(order.id.as_i64(), self.next_id);
        self.next_id = order.id.as_i64() + 1;
        self.orders.insert(order.id.as_i64(), order);
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id.as_i64())
    }

    pub fn get_mut(&mut self, id: OrderId) -> Option<&mut Order> {
        self.orders.get_mut(&id.as_i64())
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Read-only filtered scan in ascending-id order, starting at the
    /// filter's offset and capped at its page size. Never mutates anything;
    /// repeated calls with stepped offsets paginate without duplicates or
    /// gaps.
    pub fn filtered(&self, filter: &OrderFilter) -> Vec<OrderView> {
        self.orders
            .values()
            .filter(|order| filter.matches(order))
            .skip(filter.offset)
            .take(filter.page_size())
            .map(OrderView::from)
            .collect()
    }
}
