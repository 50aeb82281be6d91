//! Key-Value Store
//!
//! The one capability the repository layer depends on. It covers string
//! get/set (plain, if-absent, if-present), delete, set membership, cursor
//! scans over a set, bulk reads, and transactional batching.
//!
//! # Implementations
//!
//! | Type | Backend | Use |
//! |------|---------|-----|
//! | [`RedisStore`] | Redis via `ConnectionManager` | production |
//! | [`MemoryStore`] | in-process maps | tests, local development |
//!
//! # Batches
//!
//! Mutations that must land together are queued in a [`StoreBatch`] and handed
//! to [`KvStore::exec`], which applies all of them or none. Dropping a batch
//! without executing it discards it.
//!
//! ```ignore
//! let mut batch = StoreBatch::new();
//! batch.set_if_absent("order:1", "{...}").set_add("orders", "order:1");
//! let replies = store.exec(batch).await?; // [1, 1]
//! ```

pub mod memory;
pub mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use async_trait::async_trait;
use thiserror::Error;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached (connection refused, dropped, timed out)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected a command
    #[error("Store command failed: {0}")]
    Command(String),

    /// A batch was aborted and nothing was applied
    #[error("Transaction aborted: {0}")]
    Transaction(String),

    /// The store answered with a reply of the wrong shape
    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A single queued mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Set { key: String, value: String },
    SetIfAbsent { key: String, value: String },
    SetIfPresent { key: String, value: String },
    Delete { key: String },
    SetAdd { set: String, member: String },
    SetRemove { set: String, member: String },
}

/// Mutations queued client-side for one atomic [`KvStore::exec`] call
///
/// `exec` returns one count per queued op, in order:
///
/// | Op | Reply |
/// |----|-------|
/// | `Set` | always 1 |
/// | `SetIfAbsent` / `SetIfPresent` | 1 if written, 0 if the condition failed |
/// | `Delete` | number of keys removed |
/// | `SetAdd` / `SetRemove` | number of members added / removed |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreBatch {
    ops: Vec<StoreOp>,
}

impl StoreBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.ops.push(StoreOp::Set {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn set_if_absent(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.ops.push(StoreOp::SetIfAbsent {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn set_if_present(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.ops.push(StoreOp::SetIfPresent {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn delete(&mut self, key: impl Into<String>) -> &mut Self {
        self.ops.push(StoreOp::Delete { key: key.into() });
        self
    }

    pub fn set_add(&mut self, set: impl Into<String>, member: impl Into<String>) -> &mut Self {
        self.ops.push(StoreOp::SetAdd {
            set: set.into(),
            member: member.into(),
        });
        self
    }

    pub fn set_remove(&mut self, set: impl Into<String>, member: impl Into<String>) -> &mut Self {
        self.ops.push(StoreOp::SetRemove {
            set: set.into(),
            member: member.into(),
        });
        self
    }

    pub fn ops(&self) -> &[StoreOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_ops(self) -> Vec<StoreOp> {
        self.ops
    }
}

/// One step of a cursor scan over a set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor to resume from; 0 once the scan is complete
    pub cursor: u64,
    pub members: Vec<String>,
}

/// Key-value store capability
///
/// Single-key mutations default to a one-op batch through [`KvStore::exec`];
/// backends with native commands override them.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Backend name for health reporting
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> StoreResult<()>;

    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Read many keys at once; missing keys come back as `None` in place
    async fn multi_get(&self, keys: &[String]) -> StoreResult<Vec<Option<String>>>;

    /// Scan up to roughly `count` members of `set` matching the glob `pattern`
    async fn scan_set(
        &self,
        set: &str,
        cursor: u64,
        pattern: &str,
        count: u64,
    ) -> StoreResult<ScanPage>;

    /// Apply every op in `batch` atomically, or none of them
    async fn exec(&self, batch: StoreBatch) -> StoreResult<Vec<u64>>;

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut batch = StoreBatch::new();
        batch.set(key, value);
        self.exec(batch).await.map(|_| ())
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> StoreResult<bool> {
        let mut batch = StoreBatch::new();
        batch.set_if_absent(key, value);
        first_reply(self.exec(batch).await?).map(|n| n == 1)
    }

    async fn set_if_present(&self, key: &str, value: &str) -> StoreResult<bool> {
        let mut batch = StoreBatch::new();
        batch.set_if_present(key, value);
        first_reply(self.exec(batch).await?).map(|n| n == 1)
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut batch = StoreBatch::new();
        batch.delete(key);
        first_reply(self.exec(batch).await?).map(|n| n > 0)
    }

    async fn set_add(&self, set: &str, member: &str) -> StoreResult<bool> {
        let mut batch = StoreBatch::new();
        batch.set_add(set, member);
        first_reply(self.exec(batch).await?).map(|n| n > 0)
    }

    async fn set_remove(&self, set: &str, member: &str) -> StoreResult<bool> {
        let mut batch = StoreBatch::new();
        batch.set_remove(set, member);
        first_reply(self.exec(batch).await?).map(|n| n > 0)
    }
}

fn first_reply(replies: Vec<u64>) -> StoreResult<u64> {
    replies
        .first()
        .copied()
        .ok_or_else(|| StoreError::UnexpectedReply("empty transaction reply".to_string()))
}

/// Glob match supporting `*` (any run) and `?` (any single char)
pub(crate) fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((sp, st)) = star {
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|c| *c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_queues_in_order() {
        let mut batch = StoreBatch::new();
        batch.set_if_absent("order:1", "{}").set_add("orders", "order:1");

        assert_eq!(batch.len(), 2);
        assert_eq!(
            batch.ops(),
            &[
                StoreOp::SetIfAbsent {
                    key: "order:1".to_string(),
                    value: "{}".to_string()
                },
                StoreOp::SetAdd {
                    set: "orders".to_string(),
                    member: "order:1".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*", ""));
        assert!(glob_match("*", "order:42"));
        assert!(glob_match("order:*", "order:42"));
        assert!(glob_match("order:?", "order:4"));
        assert!(!glob_match("order:?", "order:42"));
        assert!(glob_match("*:42", "order:42"));
        assert!(glob_match("o*r:*2", "order:42"));
        assert!(!glob_match("item:*", "order:42"));
        assert!(!glob_match("", "order"));
    }
}
