//! 组合服务发现客户端（同步）

use std::collections::HashSet;
use std::sync::Arc;

use crate::discovery::client::{DiscoveryClient, ListInstances, ListServices};
use crate::discovery::instance::ServiceInstance;

/// 组合服务发现客户端
///
/// 按优先级依次询问下游客户端，取第一个非空结果
pub struct CompositeDiscoveryClient {
    delegates: Vec<Arc<dyn DiscoveryClient>>,
}

impl CompositeDiscoveryClient {
    /// 创建组合客户端
    ///
    /// 下游按 `order()` 稳定排序一次，调用时不再重排
    pub fn new(mut delegates: Vec<Arc<dyn DiscoveryClient>>) -> Self {
        delegates.sort_by_key(|client| client.order());
        Self { delegates }
    }

    /// 下游客户端（已排序）
    pub fn delegates(&self) -> &[Arc<dyn DiscoveryClient>] {
        &self.delegates
    }
}

impl ListInstances for CompositeDiscoveryClient {
    fn instances(&self, service_id: &str) -> Vec<ServiceInstance> {
        for delegate in &self.delegates {
            let instances = delegate.instances(service_id);
            if !instances.is_empty() {
                tracing::debug!(
                    service_id,
                    source = delegate.description(),
                    count = instances.len(),
                    "Resolved instances from discovery delegate"
                );
                return instances;
            }
        }
        Vec::new()
    }
}

impl ListServices for CompositeDiscoveryClient {
    fn services(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut services = Vec::new();
        for delegate in &self.delegates {
            for service in delegate.services() {
                if seen.insert(service.clone()) {
                    services.push(service);
                }
            }
        }
        services
    }
}

impl DiscoveryClient for CompositeDiscoveryClient {
    fn description(&self) -> &str {
        "Composite Discovery Client"
    }

    fn local_service_instance(&self) -> Option<ServiceInstance> {
        self.delegates
            .iter()
            .find_map(|delegate| delegate.local_service_instance())
    }

    fn probe(&self) -> crate::error::Result<()> {
        for delegate in &self.delegates {
            delegate.probe()?;
        }
        Ok(())
    }
}
