//! 实例列表提供者
//!
//! 负载均衡器从这里拿到候选实例。基础提供者对接服务发现，
//! 装饰器（可用区优先、hint 路由）在其上过滤。

pub mod builder;
pub mod discovery;
pub mod hint;
pub mod zone;

pub use builder::ServiceInstanceListSupplierBuilder;
pub use discovery::{
    DiscoveryClientServiceInstanceListSupplier, DiscoverySource, FixedServiceInstanceListSupplier,
};
pub use hint::HintBasedServiceInstanceListSupplier;
pub use zone::ZonePreferenceServiceInstanceListSupplier;

use async_trait::async_trait;

use crate::discovery::ServiceInstance;
use crate::loadbalancer::request::Request;

/// 实例列表提供者 trait
#[async_trait]
pub trait ServiceInstanceListSupplier: Send + Sync {
    /// 对应的服务 ID
    fn service_id(&self) -> &str;

    /// 获取当前候选实例；没有可用实例时返回空列表
    async fn get(&self, request: &Request) -> Vec<ServiceInstance>;
}
