//! 缓存装饰器
//!
//! 在任意 `DiscoveryClient` 外层缓存实例列表，过期后重新拉取

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::config::CacheProperties;
use crate::discovery::client::{DiscoveryClient, ListInstances, ListServices};
use crate::discovery::instance::ServiceInstance;

struct CacheEntry {
    instances: Vec<ServiceInstance>,
    loaded_at: Instant,
}

/// 带 TTL 的缓存服务发现客户端
pub struct CachingDiscoveryClient {
    delegate: Arc<dyn DiscoveryClient>,
    ttl: Duration,
    capacity: usize,
    cache: RwLock<HashMap<String, CacheEntry>>,
}

impl CachingDiscoveryClient {
    /// 创建缓存装饰器
    pub fn new(delegate: Arc<dyn DiscoveryClient>, ttl: Duration, capacity: usize) -> Self {
        Self {
            delegate,
            ttl,
            capacity,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// 从配置创建
    pub fn from_properties(
        delegate: Arc<dyn DiscoveryClient>,
        properties: &CacheProperties,
    ) -> Self {
        Self::new(
            delegate,
            Duration::from_secs(properties.ttl_secs),
            properties.capacity,
        )
    }

    /// 移除某个服务的缓存
    pub fn evict(&self, service_id: &str) {
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        cache.remove(service_id);
    }

    /// 清空缓存
    pub fn clear(&self) {
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        cache.clear();
    }

    /// 当前缓存的服务数量
    pub fn cached_services(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn lookup(&self, service_id: &str) -> Option<Vec<ServiceInstance>> {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        cache
            .get(service_id)
            .filter(|entry| entry.loaded_at.elapsed() < self.ttl)
            .map(|entry| entry.instances.clone())
    }

    fn store(&self, service_id: &str, instances: &[ServiceInstance]) {
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        if !cache.contains_key(service_id) && cache.len() >= self.capacity {
            // 先清理过期项，仍然满则淘汰最旧的一项
            let ttl = self.ttl;
            cache.retain(|_, entry| entry.loaded_at.elapsed() < ttl);
            if cache.len() >= self.capacity {
                let oldest = cache
                    .iter()
                    .min_by_key(|(_, entry)| entry.loaded_at)
                    .map(|(key, _)| key.clone());
                if let Some(key) = oldest {
                    cache.remove(&key);
                }
            }
        }
        if self.capacity == 0 {
            return;
        }
        cache.insert(
            service_id.to_string(),
            CacheEntry {
                instances: instances.to_vec(),
                loaded_at: Instant::now(),
            },
        );
    }
}

impl ListInstances for CachingDiscoveryClient {
    fn instances(&self, service_id: &str) -> Vec<ServiceInstance> {
        if let Some(instances) = self.lookup(service_id) {
            tracing::debug!(service_id, "Instance cache hit");
            return instances;
        }

        tracing::debug!(service_id, "Instance cache miss, querying delegate");
        let instances = self.delegate.instances(service_id);
        self.store(service_id, &instances);
        instances
    }
}

impl ListServices for CachingDiscoveryClient {
    fn services(&self) -> Vec<String> {
        self.delegate.services()
    }
}

impl DiscoveryClient for CachingDiscoveryClient {
    fn description(&self) -> &str {
        "Caching Discovery Client"
    }

    fn local_service_instance(&self) -> Option<ServiceInstance> {
        self.delegate.local_service_instance()
    }

    fn order(&self) -> i32 {
        self.delegate.order()
    }

    fn probe(&self) -> crate::error::Result<()> {
        self.delegate.probe()
    }
}
