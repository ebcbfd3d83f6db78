//! 基于静态配置的流式服务发现客户端

use std::collections::BTreeMap;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;

use crate::config::SimpleDiscoveryProperties;
use crate::discovery::client::DiscoveryClient;
use crate::discovery::instance::ServiceInstance;
use crate::discovery::reactive::{InstanceStream, ReactiveDiscoveryClient, ServiceStream};
use crate::discovery::simple::SimpleDiscoveryClient;

/// 简单流式服务发现客户端
#[derive(Debug, Clone, Default)]
pub struct SimpleReactiveDiscoveryClient {
    instances: BTreeMap<String, Vec<ServiceInstance>>,
    order: i32,
}

impl SimpleReactiveDiscoveryClient {
    /// 从配置创建
    pub fn from_properties(properties: &SimpleDiscoveryProperties) -> Self {
        Self::from_client(&SimpleDiscoveryClient::from_properties(properties))
    }

    /// 复用同步客户端的实例快照，保证两边实例 ID 一致
    pub fn from_client(client: &SimpleDiscoveryClient) -> Self {
        Self {
            instances: client.snapshot().clone(),
            order: client.order(),
        }
    }
}

#[async_trait]
impl ReactiveDiscoveryClient for SimpleReactiveDiscoveryClient {
    fn description(&self) -> &str {
        "Simple Reactive Discovery Client"
    }

    fn instances(&self, service_id: &str) -> InstanceStream {
        let instances = self.instances.get(service_id).cloned().unwrap_or_default();
        stream::iter(instances.into_iter().map(Ok)).boxed()
    }

    fn services(&self) -> ServiceStream {
        let services: Vec<String> = self.instances.keys().cloned().collect();
        stream::iter(services.into_iter().map(Ok)).boxed()
    }

    fn order(&self) -> i32 {
        self.order
    }
}
