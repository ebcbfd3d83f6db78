//! 提供者链构建器

use std::sync::Arc;

use crate::config::HintProperties;
use crate::discovery::ServiceInstance;
use crate::loadbalancer::supplier::{
    DiscoveryClientServiceInstanceListSupplier, DiscoverySource, FixedServiceInstanceListSupplier,
    HintBasedServiceInstanceListSupplier, ServiceInstanceListSupplier,
    ZonePreferenceServiceInstanceListSupplier,
};

type SharedSupplier = Arc<dyn ServiceInstanceListSupplier>;

type DelegateCreator = Box<dyn FnOnce(SharedSupplier) -> SharedSupplier + Send>;

/// 提供者链构建器
///
/// 装饰器按添加顺序由内向外包装基础提供者
pub struct ServiceInstanceListSupplierBuilder {
    base: Arc<dyn ServiceInstanceListSupplier>,
    creators: Vec<DelegateCreator>,
}

impl ServiceInstanceListSupplierBuilder {
    /// 以服务发现为基础
    pub fn from_source(service_id: impl Into<String>, source: DiscoverySource) -> Self {
        Self::from_supplier(Arc::new(DiscoveryClientServiceInstanceListSupplier::new(
            service_id, source,
        )))
    }

    /// 以固定实例列表为基础
    pub fn from_instances(service_id: impl Into<String>, instances: Vec<ServiceInstance>) -> Self {
        Self::from_supplier(Arc::new(FixedServiceInstanceListSupplier::new(
            service_id, instances,
        )))
    }

    pub fn from_supplier(base: Arc<dyn ServiceInstanceListSupplier>) -> Self {
        Self {
            base,
            creators: Vec::new(),
        }
    }

    pub fn with_zone_preference(mut self, zone: Option<String>) -> Self {
        self.creators.push(Box::new(move |delegate: SharedSupplier| -> SharedSupplier {
            Arc::new(ZonePreferenceServiceInstanceListSupplier::new(delegate, zone))
        }));
        self
    }

    pub fn with_hints(mut self, properties: HintProperties) -> Self {
        self.creators.push(Box::new(move |delegate: SharedSupplier| -> SharedSupplier {
            Arc::new(HintBasedServiceInstanceListSupplier::new(delegate, properties))
        }));
        self
    }

    pub fn build(self) -> Arc<dyn ServiceInstanceListSupplier> {
        self.creators
            .into_iter()
            .fold(self.base, |supplier, creator| creator(supplier))
    }
}
