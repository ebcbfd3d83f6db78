//! 对接服务发现的基础提供者

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;

use crate::discovery::{DiscoveryClient, ReactiveDiscoveryClient, ServiceInstance};
use crate::loadbalancer::request::Request;
use crate::loadbalancer::supplier::ServiceInstanceListSupplier;

/// 服务发现来源
#[derive(Clone)]
pub enum DiscoverySource {
    /// 同步客户端，在调用方任务上直接执行
    Blocking(Arc<dyn DiscoveryClient>),
    /// 流式客户端，收集完整个流
    Reactive(Arc<dyn ReactiveDiscoveryClient>),
}

impl DiscoverySource {
    pub fn description(&self) -> &str {
        match self {
            DiscoverySource::Blocking(client) => client.description(),
            DiscoverySource::Reactive(client) => client.description(),
        }
    }
}

/// 从服务发现获取实例列表
pub struct DiscoveryClientServiceInstanceListSupplier {
    service_id: String,
    source: DiscoverySource,
}

impl DiscoveryClientServiceInstanceListSupplier {
    pub fn new(service_id: impl Into<String>, source: DiscoverySource) -> Self {
        Self {
            service_id: service_id.into(),
            source,
        }
    }
}

#[async_trait]
impl ServiceInstanceListSupplier for DiscoveryClientServiceInstanceListSupplier {
    fn service_id(&self) -> &str {
        &self.service_id
    }

    async fn get(&self, _request: &Request) -> Vec<ServiceInstance> {
        match &self.source {
            DiscoverySource::Blocking(client) => client.instances(&self.service_id),
            DiscoverySource::Reactive(client) => {
                let mut stream = client.instances(&self.service_id);
                let mut instances = Vec::new();
                while let Some(item) = stream.next().await {
                    match item {
                        Ok(instance) => instances.push(instance),
                        Err(e) => {
                            // 发现失败按“当前无实例”处理
                            tracing::warn!(
                                service_id = %self.service_id,
                                source = client.description(),
                                error = %e,
                                "Failed to fetch service instances"
                            );
                            return Vec::new();
                        }
                    }
                }
                instances
            }
        }
    }
}

/// 固定实例列表
#[derive(Debug, Clone)]
pub struct FixedServiceInstanceListSupplier {
    service_id: String,
    instances: Vec<ServiceInstance>,
}

impl FixedServiceInstanceListSupplier {
    pub fn new(service_id: impl Into<String>, instances: Vec<ServiceInstance>) -> Self {
        Self {
            service_id: service_id.into(),
            instances,
        }
    }
}

#[async_trait]
impl ServiceInstanceListSupplier for FixedServiceInstanceListSupplier {
    fn service_id(&self) -> &str {
        &self.service_id
    }

    async fn get(&self, _request: &Request) -> Vec<ServiceInstance> {
        self.instances.clone()
    }
}
