//! 组合流式服务发现客户端

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;

use crate::discovery::reactive::race::first_with_value;
use crate::discovery::reactive::{InstanceStream, ReactiveDiscoveryClient, ServiceStream};

/// 组合流式服务发现客户端
///
/// - `instances`: 并发订阅全部下游，只转发第一个产出值的流，其余取消
/// - `services`: 合并全部下游的服务名流，不去重
pub struct ReactiveCompositeDiscoveryClient {
    delegates: Vec<Arc<dyn ReactiveDiscoveryClient>>,
}

impl ReactiveCompositeDiscoveryClient {
    /// 创建组合客户端，下游按 `order()` 稳定排序
    pub fn new(mut delegates: Vec<Arc<dyn ReactiveDiscoveryClient>>) -> Self {
        delegates.sort_by_key(|client| client.order());
        Self { delegates }
    }

    /// 下游客户端（已排序）
    pub fn delegates(&self) -> &[Arc<dyn ReactiveDiscoveryClient>] {
        &self.delegates
    }
}

#[async_trait]
impl ReactiveDiscoveryClient for ReactiveCompositeDiscoveryClient {
    fn description(&self) -> &str {
        "Composite Reactive Discovery Client"
    }

    fn instances(&self, service_id: &str) -> InstanceStream {
        if self.delegates.is_empty() {
            return stream::empty().boxed();
        }
        let sources = self
            .delegates
            .iter()
            .map(|delegate| delegate.instances(service_id))
            .collect();
        first_with_value(sources)
    }

    fn services(&self) -> ServiceStream {
        if self.delegates.is_empty() {
            return stream::empty().boxed();
        }
        stream::select_all(self.delegates.iter().map(|delegate| delegate.services())).boxed()
    }

    async fn probe(&self) -> crate::error::Result<()> {
        for delegate in &self.delegates {
            delegate.probe().await?;
        }
        Ok(())
    }
}
