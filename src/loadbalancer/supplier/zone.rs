//! 可用区优先

use std::sync::Arc;

use async_trait::async_trait;

use crate::discovery::ServiceInstance;
use crate::loadbalancer::request::Request;
use crate::loadbalancer::supplier::ServiceInstanceListSupplier;

/// 实例元数据中表示可用区的 key
pub const ZONE_METADATA_KEY: &str = "zone";

/// 优先返回与配置可用区相同的实例；没有匹配时返回全部
pub struct ZonePreferenceServiceInstanceListSupplier {
    delegate: Arc<dyn ServiceInstanceListSupplier>,
    zone: Option<String>,
}

impl ZonePreferenceServiceInstanceListSupplier {
    pub fn new(delegate: Arc<dyn ServiceInstanceListSupplier>, zone: Option<String>) -> Self {
        Self { delegate, zone }
    }
}

#[async_trait]
impl ServiceInstanceListSupplier for ZonePreferenceServiceInstanceListSupplier {
    fn service_id(&self) -> &str {
        self.delegate.service_id()
    }

    async fn get(&self, request: &Request) -> Vec<ServiceInstance> {
        let instances = self.delegate.get(request).await;
        let Some(zone) = self.zone.as_deref() else {
            return instances;
        };

        let same_zone: Vec<ServiceInstance> = instances
            .iter()
            .filter(|instance| {
                instance
                    .metadata_value(ZONE_METADATA_KEY)
                    .map(|z| z.eq_ignore_ascii_case(zone))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        if same_zone.is_empty() {
            instances
        } else {
            same_zone
        }
    }
}
