//! Per-order broadcast groups.
//!
//! # Responsibilities
//! - Create a group on first join
//! - Fan a published frame out to every member of the group
//! - Remove the group when its last member leaves
//!
//! # Design Decisions
//! - One `broadcast` channel per order; slow members lag rather than block senders
//! - Join and leave both take the shard write lock, so a leave never races a join

use std::sync::Arc;

use axum::extract::ws::Utf8Bytes;
use dashmap::DashMap;
use tokio::sync::broadcast;

/// A text frame relayed within an order group.
#[derive(Debug, Clone)]
pub struct OrderMessage {
    pub order_id: Arc<str>,
    pub text: Utf8Bytes,
}

/// Registry of live order groups.
#[derive(Debug, Clone)]
pub struct OrderGroups {
    groups: Arc<DashMap<Arc<str>, broadcast::Sender<OrderMessage>>>,
    capacity: usize,
}

impl OrderGroups {
    /// `capacity` is the per-group buffer; it must be non-zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            groups: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Join an order's group, creating it if needed.
    pub fn join(&self, order_id: &str) -> broadcast::Receiver<OrderMessage> {
        self.groups
            .entry(Arc::from(order_id))
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Deliver a frame to every member of its group. Returns the number of members reached.
    pub fn publish(&self, message: OrderMessage) -> usize {
        match self.groups.get(&message.order_id) {
            Some(tx) => tx.send(message).unwrap_or(0),
            None => 0,
        }
    }

    /// Drop the group if nobody is subscribed any more.
    ///
    /// Call after the member's receiver has been dropped.
    pub fn leave(&self, order_id: &str) {
        if self
            .groups
            .remove_if(order_id, |_, tx| tx.receiver_count() == 0)
            .is_some()
        {
            tracing::debug!(order_id = %order_id, "Order group closed");
        }
    }

    /// Number of open groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of members in an order's group.
    pub fn member_count(&self, order_id: &str) -> usize {
        self.groups
            .get(order_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}
