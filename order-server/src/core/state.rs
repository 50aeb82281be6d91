use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::{Config, Result};
use crate::repository::OrderRepository;
use crate::store::{KvStore, RedisStore};

/// 订单 ID 生成器
pub type OrderIdSource = Arc<dyn Fn() -> u64 + Send + Sync>;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 每个请求拿到一份浅拷贝，所有字段都是 Arc 或可廉价克隆的句柄。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Arc<Config> | 配置项 (不可变) |
/// | store | Arc<dyn KvStore> | 键值存储 |
/// | orders | OrderRepository | 订单仓储 |
/// | order_ids | OrderIdSource | 新订单 ID 来源 |
/// | started_at | Instant | 状态创建时刻，用于 uptime |
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub store: Arc<dyn KvStore>,
    pub orders: OrderRepository,
    order_ids: OrderIdSource,
    started_at: Instant,
}

impl ServerState {
    /// 使用已有存储创建状态 (测试或嵌入场景)
    pub fn new(config: Config, store: Arc<dyn KvStore>) -> Self {
        Self {
            orders: OrderRepository::new(store.clone()),
            store,
            config: Arc::new(config),
            order_ids: Arc::new(shared::util::order_id),
            started_at: Instant::now(),
        }
    }

    /// 替换订单 ID 来源
    pub fn with_order_ids<F>(mut self, source: F) -> Self
    where
        F: Fn() -> u64 + Send + Sync + 'static,
    {
        self.order_ids = Arc::new(source);
        self
    }

    /// 连接 Redis 并创建状态
    ///
    /// 启动时 PING 一次，存储不可达则直接失败。
    pub async fn initialize(config: &Config) -> Result<Self> {
        tracing::info!(url = %config.redis_url, "Connecting to Redis");
        let store = RedisStore::connect(&config.redis_url).await?;
        store.ping().await?;
        tracing::info!("Redis connection ready");

        Ok(Self::new(config.clone(), Arc::new(store)))
    }

    pub fn page_size(&self) -> u64 {
        self.config.orders_page_size
    }

    /// 生成一个候选订单 ID
    pub fn next_order_id(&self) -> u64 {
        (self.order_ids)()
    }

    /// 自启动以来经过的时间
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn test_order_id_source_is_replaceable() {
        let counter = Arc::new(AtomicU64::new(10));
        let state = ServerState::new(Config::default(), Arc::new(MemoryStore::new()))
            .with_order_ids(move || counter.fetch_add(1, Ordering::SeqCst));

        assert_eq!(state.next_order_id(), 10);
        assert_eq!(state.clone().next_order_id(), 11);
    }

    #[test]
    fn test_default_order_ids_are_non_zero() {
        let state = ServerState::new(Config::default(), Arc::new(MemoryStore::new()));
        assert_ne!(state.next_order_id(), 0);
    }
}
