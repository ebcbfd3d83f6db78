//! 随机负载均衡器

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::loadbalancer::ReactiveLoadBalancer;
use crate::loadbalancer::request::Request;
use crate::loadbalancer::response::Response;
use crate::loadbalancer::supplier::ServiceInstanceListSupplier;

/// 随机负载均衡器
///
/// 每次在 `[0, size)` 中均匀取一个下标，调用之间只共享随机数发生器
pub struct RandomLoadBalancer {
    service_id: String,
    supplier: Arc<dyn ServiceInstanceListSupplier>,
    rng: Mutex<StdRng>,
}

impl RandomLoadBalancer {
    pub fn new(supplier: Arc<dyn ServiceInstanceListSupplier>) -> Self {
        Self::with_rng(supplier, StdRng::from_entropy())
    }

    /// 固定种子，便于复现
    pub fn with_seed(supplier: Arc<dyn ServiceInstanceListSupplier>, seed: u64) -> Self {
        Self::with_rng(supplier, StdRng::seed_from_u64(seed))
    }

    fn with_rng(supplier: Arc<dyn ServiceInstanceListSupplier>, rng: StdRng) -> Self {
        Self {
            service_id: supplier.service_id().to_string(),
            supplier,
            rng: Mutex::new(rng),
        }
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    fn next_index(&self, size: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(0..size)
    }
}

#[async_trait]
impl ReactiveLoadBalancer for RandomLoadBalancer {
    async fn choose(&self, request: &Request) -> Response {
        let instances = self.supplier.get(request).await;
        if instances.is_empty() {
            tracing::warn!(service_id = %self.service_id, "No servers available for service");
            return Response::Empty;
        }

        let index = self.next_index(instances.len());
        instances.into_iter().nth(index).into()
    }
}
