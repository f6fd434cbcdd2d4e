//! 进程内内存缓存后端
//!
//! 基于 Moka 的异步缓存，TTL 与容量在创建时由全局配置决定。
//! 作为默认后端，也是 Redis 不可用时的回退选择。

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::declare_object_cache_plugin;

declare_object_cache_plugin!("moka", MokaCacheWrapper);

pub struct MokaCacheWrapper {
    inner: Cache<String, String>,
}

impl MokaCacheWrapper {
    pub fn new() -> Result<Self, String> {
        let config = AppConfig::get();
        let inner = Cache::builder()
            .max_capacity(config.cache.memory.max_capacity)
            .time_to_live(std::time::Duration::from_secs(config.cache.default_ttl))
            .build();

        debug!(
            "MokaCacheWrapper initialized (capacity: {}, ttl: {}s)",
            config.cache.memory.max_capacity, config.cache.default_ttl
        );
        Ok(Self { inner })
    }
}

#[async_trait]
impl ObjectCache for MokaCacheWrapper {
    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        match self.inner.get(key).await {
            Some(value) => CacheResult::Found(value),
            None => CacheResult::NotFound,
        }
    }

    async fn insert_raw(&self, key: String, value: String, ttl: u64) {
        // Moka 的 TTL 在构建缓存时全局设定，条目级 ttl 在此后端不生效
        if ttl != 0 {
            debug!("Moka cache ignores per-item TTL, global TTL applies");
        }
        self.inner.insert(key, value).await;
    }

    async fn remove(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    async fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_moka_roundtrip() {
        let cache = MokaCacheWrapper::new().unwrap();

        cache
            .insert_raw("session:1".to_string(), "open".to_string(), 0)
            .await;
        assert_eq!(
            cache.get_raw("session:1").await,
            CacheResult::Found("open".to_string())
        );

        cache.remove("session:1").await;
        assert_eq!(cache.get_raw("session:1").await, CacheResult::NotFound);
    }
}
