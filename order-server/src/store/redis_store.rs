//! Redis-backed store
//!
//! Uses a `ConnectionManager`, which reconnects on its own and is cheap to
//! clone, so every call works on its own handle. Batches run as a
//! `MULTI`/`EXEC` pipeline.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError, Value};

use super::{KvStore, ScanPage, StoreBatch, StoreError, StoreOp, StoreResult};

impl From<RedisError> for StoreError {
    fn from(err: RedisError) -> Self {
        if err.is_io_error()
            || err.is_connection_refusal()
            || err.is_connection_dropped()
            || err.is_timeout()
        {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Command(err.to_string())
        }
    }
}

#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Open a managed connection to `url` (e.g. `redis://127.0.0.1:6379`)
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let client = Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        tracing::debug!(url = %url, "Redis connection established");
        Ok(Self { conn })
    }
}

fn reply_count(value: &Value) -> StoreResult<u64> {
    match value {
        Value::Okay | Value::SimpleString(_) => Ok(1),
        Value::Nil => Ok(0),
        Value::Int(n) => u64::try_from(*n)
            .map_err(|_| StoreError::UnexpectedReply(format!("negative count {n}"))),
        other => Err(StoreError::UnexpectedReply(format!("{other:?}"))),
    }
}

#[async_trait]
impl KvStore for RedisStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn multi_get(&self, keys: &[String]) -> StoreResult<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        let values: Vec<Option<String>> = redis::cmd("MGET").arg(keys).query_async(&mut conn).await?;
        if values.len() != keys.len() {
            return Err(StoreError::UnexpectedReply(format!(
                "MGET returned {} values for {} keys",
                values.len(),
                keys.len()
            )));
        }
        Ok(values)
    }

    async fn scan_set(
        &self,
        set: &str,
        cursor: u64,
        pattern: &str,
        count: u64,
    ) -> StoreResult<ScanPage> {
        let mut conn = self.conn.clone();
        let (cursor, members): (u64, Vec<String>) = redis::cmd("SSCAN")
            .arg(set)
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(count.max(1))
            .query_async(&mut conn)
            .await?;
        Ok(ScanPage { cursor, members })
    }

    async fn exec(&self, batch: StoreBatch) -> StoreResult<Vec<u64>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for op in batch.ops() {
            match op {
                StoreOp::Set { key, value } => {
                    pipe.cmd("SET").arg(key).arg(value);
                }
                StoreOp::SetIfAbsent { key, value } => {
                    pipe.cmd("SET").arg(key).arg(value).arg("NX");
                }
                StoreOp::SetIfPresent { key, value } => {
                    pipe.cmd("SET").arg(key).arg(value).arg("XX");
                }
                StoreOp::Delete { key } => {
                    pipe.cmd("DEL").arg(key);
                }
                StoreOp::SetAdd { set, member } => {
                    pipe.cmd("SADD").arg(set).arg(member);
                }
                StoreOp::SetRemove { set, member } => {
                    pipe.cmd("SREM").arg(set).arg(member);
                }
            }
        }

        let mut conn = self.conn.clone();
        let replies: Vec<Value> = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| match StoreError::from(e) {
                StoreError::Command(msg) => StoreError::Transaction(msg),
                other => other,
            })?;

        if replies.len() != batch.len() {
            return Err(StoreError::UnexpectedReply(format!(
                "EXEC returned {} replies for {} commands",
                replies.len(),
                batch.len()
            )));
        }
        replies.iter().map(reply_count).collect()
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        let written: bool = conn.set_nx(key, value).await?;
        Ok(written)
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(key).await?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_count() {
        assert_eq!(reply_count(&Value::Okay).unwrap(), 1);
        assert_eq!(reply_count(&Value::Nil).unwrap(), 0);
        assert_eq!(reply_count(&Value::Int(3)).unwrap(), 3);
        assert!(matches!(
            reply_count(&Value::Int(-1)),
            Err(StoreError::UnexpectedReply(_))
        ));
        assert!(matches!(
            reply_count(&Value::Array(vec![])),
            Err(StoreError::UnexpectedReply(_))
        ));
    }

    #[test]
    fn test_connection_refused_is_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: StoreError = RedisError::from(io).into();
        assert!(matches!(err, StoreError::Unavailable(_)), "{err:?}");
    }

    #[test]
    fn test_bad_url_is_command_error() {
        let err: StoreError = Client::open("not-a-url").unwrap_err().into();
        assert!(matches!(err, StoreError::Command(_)));
    }
}
