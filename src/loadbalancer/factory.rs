//! 负载均衡器工厂
//!
//! 每个服务 ID 懒创建一个负载均衡器并缓存，游标等状态不会在服务之间共享

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::{Config, LoadBalanceStrategy, LoadBalancerProperties};
use crate::discovery::{CachingDiscoveryClient, DiscoveryClient, SimpleDiscoveryClient};
use crate::loadbalancer::ReactiveLoadBalancer;
use crate::loadbalancer::random::RandomLoadBalancer;
use crate::loadbalancer::round_robin::RoundRobinLoadBalancer;
use crate::loadbalancer::supplier::{DiscoverySource, ServiceInstanceListSupplierBuilder};

pub struct LoadBalancerFactory {
    properties: LoadBalancerProperties,
    source: DiscoverySource,
    balancers: RwLock<HashMap<String, Arc<dyn ReactiveLoadBalancer>>>,
}

impl LoadBalancerFactory {
    pub fn new(properties: LoadBalancerProperties, source: DiscoverySource) -> Self {
        Self {
            properties,
            source,
            balancers: RwLock::new(HashMap::new()),
        }
    }

    /// 从配置创建：静态服务发现，按配置决定是否套一层缓存
    pub fn from_config(config: &Config) -> Self {
        let simple: Arc<dyn DiscoveryClient> =
            Arc::new(SimpleDiscoveryClient::from_properties(&config.discovery.simple));

        let client: Arc<dyn DiscoveryClient> = if config.discovery.cache.enabled {
            Arc::new(CachingDiscoveryClient::from_properties(
                simple,
                &config.discovery.cache,
            ))
        } else {
            simple
        };

        Self::new(config.loadbalancer.clone(), DiscoverySource::Blocking(client))
    }

    pub fn properties(&self) -> &LoadBalancerProperties {
        &self.properties
    }

    /// 获取服务对应的负载均衡器，不存在时创建
    pub async fn get_instance(&self, service_id: &str) -> Arc<dyn ReactiveLoadBalancer> {
        {
            let balancers = self.balancers.read().await;
            if let Some(balancer) = balancers.get(service_id) {
                return balancer.clone();
            }
        }

        let mut balancers = self.balancers.write().await;
        balancers
            .entry(service_id.to_string())
            .or_insert_with(|| self.create(service_id))
            .clone()
    }

    /// 为服务注册自定义的负载均衡器，覆盖按配置创建的实例
    pub async fn register(
        &self,
        service_id: impl Into<String>,
        balancer: Arc<dyn ReactiveLoadBalancer>,
    ) {
        let mut balancers = self.balancers.write().await;
        balancers.insert(service_id.into(), balancer);
    }

    fn create(&self, service_id: &str) -> Arc<dyn ReactiveLoadBalancer> {
        let supplier =
            ServiceInstanceListSupplierBuilder::from_source(service_id, self.source.clone())
            .with_zone_preference(self.properties.zone.clone())
            .with_hints(self.properties.hint.clone())
            .build();

        let strategy = self.properties.strategy_for(service_id);
        tracing::debug!(
            service_id,
            ?strategy,
            source = self.source.description(),
            "Creating load balancer"
        );

        match strategy {
            LoadBalanceStrategy::RoundRobin => Arc::new(RoundRobinLoadBalancer::new(supplier)),
            LoadBalanceStrategy::Random => Arc::new(RandomLoadBalancer::new(supplier)),
        }
    }
}
