//! Order Repository
//!
//! Layout in the store:
//!
//! - `order:<id>` holds the order as JSON
//! - `orders` is a set with the key of every stored order
//!
//! Record and index entry are always written or removed in the same batch.

use std::sync::Arc;

use shared::models::Order;

use super::{RepoError, RepoResult, StoreContext};
use crate::store::{KvStore, StoreBatch};

/// Set holding the key of every stored order
pub const INDEX_KEY: &str = "orders";

const KEY_PREFIX: &str = "order:";

/// Store key for an order id
pub fn order_key(id: u64) -> String {
    format!("{KEY_PREFIX}{id}")
}

/// Where a listing resumes and how much to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindAllPage {
    /// 0 starts from the beginning
    pub cursor: u64,
    pub size: u64,
}

impl FindAllPage {
    pub fn new(cursor: u64, size: u64) -> Self {
        Self { cursor, size }
    }
}

/// One page of orders plus the cursor to continue from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindResult {
    pub orders: Vec<Order>,
    /// 0 once the listing is complete
    pub cursor: u64,
}

#[derive(Clone)]
pub struct OrderRepository {
    store: Arc<dyn KvStore>,
}

impl OrderRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Store a new order; fails with `AlreadyExists` if its key is taken
    pub async fn insert(&self, order: &Order) -> RepoResult<()> {
        let key = order_key(order.order_id);
        let json = encode(&key, order)?;

        let mut batch = StoreBatch::new();
        batch.set_if_absent(&key, json).set_add(INDEX_KEY, &key);
        let replies = self
            .store
            .exec(batch)
            .await
            .context(format!("insert {key}"))?;

        // SADD of an already indexed key is a no-op, so a refused SET NX leaves
        // both record and index as they were
        if replies.first().copied() != Some(1) {
            return Err(RepoError::AlreadyExists(key));
        }

        tracing::debug!(key = %key, "Order inserted");
        Ok(())
    }

    pub async fn find_by_id(&self, id: u64) -> RepoResult<Order> {
        let key = order_key(id);
        let json = self
            .store
            .get(&key)
            .await
            .context(format!("read {key}"))?
            .ok_or_else(|| RepoError::NotFound(key.clone()))?;
        decode(&key, &json)
    }

    /// Overwrite an existing order; fails with `NotFound` if it is gone
    pub async fn update(&self, order: &Order) -> RepoResult<()> {
        let key = order_key(order.order_id);
        let json = encode(&key, order)?;

        let written = self
            .store
            .set_if_present(&key, &json)
            .await
            .context(format!("update {key}"))?;
        if !written {
            return Err(RepoError::NotFound(key));
        }

        tracing::debug!(key = %key, "Order updated");
        Ok(())
    }

    /// Remove an order and its index entry
    pub async fn delete_by_id(&self, id: u64) -> RepoResult<()> {
        let key = order_key(id);

        let mut batch = StoreBatch::new();
        batch.delete(&key).set_remove(INDEX_KEY, &key);
        let replies = self
            .store
            .exec(batch)
            .await
            .context(format!("delete {key}"))?;

        if replies.first().copied().unwrap_or(0) == 0 {
            return Err(RepoError::NotFound(key));
        }

        tracing::debug!(key = %key, "Order deleted");
        Ok(())
    }

    /// Fetch one page of orders by scanning the index
    ///
    /// The page size is a hint passed to the scan; a page may hold fewer (or,
    /// with Redis, more) orders. A zero cursor in the result means the scan is
    /// complete. Keys whose record disappeared mid-listing are skipped.
    pub async fn find_all(&self, page: FindAllPage) -> RepoResult<FindResult> {
        let scan = self
            .store
            .scan_set(INDEX_KEY, page.cursor, "*", page.size)
            .await
            .context(format!("scan {INDEX_KEY} from cursor {}", page.cursor))?;

        if scan.members.is_empty() {
            return Ok(FindResult {
                orders: Vec::new(),
                cursor: scan.cursor,
            });
        }

        let values = self
            .store
            .multi_get(&scan.members)
            .await
            .context(format!("read {} orders", scan.members.len()))?;

        let mut orders = Vec::with_capacity(values.len());
        for (key, value) in scan.members.iter().zip(values) {
            match value {
                Some(json) => orders.push(decode(key, &json)?),
                None => tracing::debug!(key = %key, "Indexed order vanished before read, skipping"),
            }
        }

        Ok(FindResult {
            orders,
            cursor: scan.cursor,
        })
    }
}

fn encode(key: &str, order: &Order) -> RepoResult<String> {
    serde_json::to_string(order).map_err(|source| RepoError::Serialization {
        key: key.to_string(),
        source,
    })
}

fn decode(key: &str, json: &str) -> RepoResult<Order> {
    serde_json::from_str(json).map_err(|source| RepoError::Serialization {
        key: key.to_string(),
        source,
    })
}
