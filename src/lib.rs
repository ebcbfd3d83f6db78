//! Flare Load Balancer Core
//!
//! 服务发现抽象（同步 / 流式）与客户端负载均衡：
//! 组合发现、轮询与随机选择、带生命周期通知的执行包装器。

pub mod config;
pub mod discovery;
pub mod error;
pub mod health;
pub mod loadbalancer;
pub mod telemetry;

// Re-exports
pub use config::{
    CacheProperties, Config, HintProperties, InstanceProperties, LoadBalanceStrategy,
    LoadBalancerProperties, LoggingConfig, SimpleDiscoveryProperties,
};
pub use discovery::{
    CachingDiscoveryClient, CompositeDiscoveryClient, DiscoveryClient, ListInstances,
    ListServices, ReactiveCompositeDiscoveryClient, ReactiveDiscoveryClient, ServiceInstance,
    SimpleDiscoveryClient, SimpleReactiveDiscoveryClient,
};
pub use error::{BoxError, ErrorCategory, ErrorCode, LoadBalancerError, Result};
pub use health::{ClientHealth, DiscoveryHealthIndicator, HealthStatus};
pub use loadbalancer::{
    CompletionContext, CompletionStatus, LoadBalancerClient, LoadBalancerFactory,
    LoadBalancerLifecycle, RandomLoadBalancer, ReactiveLoadBalancer, Request, Response,
    RoundRobinLoadBalancer,
};
pub use telemetry::init_tracing;
