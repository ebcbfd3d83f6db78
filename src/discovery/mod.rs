//! 服务发现模块
//!
//! 提供同步与流式两套服务发现抽象，以及静态、组合、缓存三种实现

pub mod caching;
pub mod client;
pub mod composite;
pub mod instance;
pub mod reactive;
pub mod simple;

pub use caching::CachingDiscoveryClient;
pub use client::{DiscoveryClient, ListInstances, ListServices};
pub use composite::CompositeDiscoveryClient;
pub use instance::ServiceInstance;
pub use reactive::{
    InstanceStream, ReactiveCompositeDiscoveryClient, ReactiveDiscoveryClient, ServiceStream,
    SimpleReactiveDiscoveryClient,
};
pub use simple::SimpleDiscoveryClient;
