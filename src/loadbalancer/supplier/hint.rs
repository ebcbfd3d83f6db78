//! hint 路由
//!
//! hint 的来源优先级：请求头 > 请求上下文 > 配置。
//! 有 hint 时只保留元数据 `hint` 相同的实例，没有匹配时返回全部。

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::HintProperties;
use crate::discovery::ServiceInstance;
use crate::loadbalancer::request::Request;
use crate::loadbalancer::supplier::ServiceInstanceListSupplier;

/// 实例元数据中表示 hint 的 key
pub const HINT_METADATA_KEY: &str = "hint";

pub struct HintBasedServiceInstanceListSupplier {
    delegate: Arc<dyn ServiceInstanceListSupplier>,
    properties: HintProperties,
}

impl HintBasedServiceInstanceListSupplier {
    pub fn new(delegate: Arc<dyn ServiceInstanceListSupplier>, properties: HintProperties) -> Self {
        Self {
            delegate,
            properties,
        }
    }

    fn resolve_hint<'r>(&'r self, request: &'r Request) -> Option<&'r str> {
        let context = request.context();
        context
            .client_request
            .as_ref()
            .and_then(|data| data.header(&self.properties.header_name))
            .filter(|hint| !hint.is_empty())
            .or(context.hint.as_deref().filter(|hint| !hint.is_empty()))
            .or_else(|| self.properties.hint_for(self.delegate.service_id()))
    }
}

#[async_trait]
impl ServiceInstanceListSupplier for HintBasedServiceInstanceListSupplier {
    fn service_id(&self) -> &str {
        self.delegate.service_id()
    }

    async fn get(&self, request: &Request) -> Vec<ServiceInstance> {
        let instances = self.delegate.get(request).await;
        let Some(hint) = self.resolve_hint(request) else {
            return instances;
        };

        let hinted: Vec<ServiceInstance> = instances
            .iter()
            .filter(|instance| instance.metadata_value(HINT_METADATA_KEY) == Some(hint))
            .cloned()
            .collect();

        if hinted.is_empty() {
            tracing::debug!(
                service_id = self.delegate.service_id(),
                hint,
                "No instances match hint, using all instances"
            );
            instances
        } else {
            hinted
        }
    }
}
