//! 基于静态配置的服务发现客户端

use std::collections::BTreeMap;

use crate::config::{InstanceProperties, SimpleDiscoveryProperties};
use crate::discovery::client::{DiscoveryClient, ListInstances, ListServices};
use crate::discovery::instance::ServiceInstance;

/// 简单服务发现客户端
///
/// 实例来自配置，构造后不再变化
#[derive(Debug, Clone, Default)]
pub struct SimpleDiscoveryClient {
    instances: BTreeMap<String, Vec<ServiceInstance>>,
    local: Option<ServiceInstance>,
    order: i32,
}

impl SimpleDiscoveryClient {
    /// 创建空的客户端
    pub fn new() -> Self {
        Self::default()
    }

    /// 从配置创建
    pub fn from_properties(properties: &SimpleDiscoveryProperties) -> Self {
        let instances = properties
            .instances
            .iter()
            .map(|(service_id, list)| {
                let resolved = list
                    .iter()
                    .map(|props| props.to_instance(service_id))
                    .collect();
                (service_id.clone(), resolved)
            })
            .collect();

        let local = properties.local.as_ref().map(|props| {
            let service_id = props.service_id.clone().unwrap_or_default();
            props.to_instance(&service_id)
        });

        Self {
            instances,
            local,
            order: properties.order,
        }
    }

    /// 添加实例
    pub fn with_instance(mut self, instance: ServiceInstance) -> Self {
        self.instances
            .entry(instance.service_id.clone())
            .or_default()
            .push(instance);
        self
    }

    /// 设置本地实例
    pub fn with_local_instance(mut self, instance: ServiceInstance) -> Self {
        self.local = Some(instance);
        self
    }

    /// 设置优先级
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub(crate) fn snapshot(&self) -> &BTreeMap<String, Vec<ServiceInstance>> {
        &self.instances
    }
}

impl ListInstances for SimpleDiscoveryClient {
    fn instances(&self, service_id: &str) -> Vec<ServiceInstance> {
        self.instances.get(service_id).cloned().unwrap_or_default()
    }
}

impl ListServices for SimpleDiscoveryClient {
    fn services(&self) -> Vec<String> {
        self.instances.keys().cloned().collect()
    }
}

impl DiscoveryClient for SimpleDiscoveryClient {
    fn description(&self) -> &str {
        "Simple Discovery Client"
    }

    fn local_service_instance(&self) -> Option<ServiceInstance> {
        self.local.clone()
    }

    fn order(&self) -> i32 {
        self.order
    }
}

impl InstanceProperties {
    /// 转换为服务实例，缺省的实例 ID 用 UUID 生成
    pub fn to_instance(&self, service_id: &str) -> ServiceInstance {
        let instance_id = self
            .instance_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        ServiceInstance {
            service_id: service_id.to_string(),
            instance_id,
            host: self.host.clone(),
            port: self.port,
            secure: self.secure,
            metadata: self.metadata.clone(),
        }
    }
}
