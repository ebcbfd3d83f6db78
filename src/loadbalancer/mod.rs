//! 客户端负载均衡模块
//!
//! 选择（轮询、随机）、实例列表提供者、生命周期观察者以及执行包装器

pub mod client;
pub mod completion;
pub mod factory;
pub mod lifecycle;
pub mod random;
pub mod request;
pub mod response;
pub mod round_robin;
pub mod stats;
pub mod supplier;

pub use client::{LoadBalancerClient, reconstruct_uri};
pub use completion::{ClientResponse, CompletionContext, CompletionStatus};
pub use factory::LoadBalancerFactory;
pub use lifecycle::{LifecycleTypes, LoadBalancerLifecycle, LoggingLoadBalancerLifecycle};
pub use random::RandomLoadBalancer;
pub use request::{DefaultRequestContext, Request, RequestData};
pub use response::Response;
pub use round_robin::RoundRobinLoadBalancer;
pub use stats::{ServiceStats, StatsLoadBalancerLifecycle};
pub use supplier::{
    DiscoveryClientServiceInstanceListSupplier, DiscoverySource, FixedServiceInstanceListSupplier,
    HintBasedServiceInstanceListSupplier, ServiceInstanceListSupplier,
    ServiceInstanceListSupplierBuilder, ZonePreferenceServiceInstanceListSupplier,
};

use async_trait::async_trait;

/// 负载均衡器 trait
///
/// 一个实例只服务一个逻辑服务
#[async_trait]
pub trait ReactiveLoadBalancer: Send + Sync {
    /// 选择一个实例；没有可用实例时返回 `Response::Empty`
    async fn choose(&self, request: &request::Request) -> response::Response;
}
