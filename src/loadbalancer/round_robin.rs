//! 轮询负载均衡器

use std::sync::Arc;
use std::sync::atomic::{AtomicIsize, Ordering};

use async_trait::async_trait;

use crate::loadbalancer::ReactiveLoadBalancer;
use crate::loadbalancer::request::Request;
use crate::loadbalancer::response::Response;
use crate::loadbalancer::supplier::ServiceInstanceListSupplier;

/// 轮询负载均衡器
///
/// 每个服务一个实例，游标归该实例所有，初始值为 -1，
/// 第一次选择落在下标 0。
pub struct RoundRobinLoadBalancer {
    service_id: String,
    supplier: Arc<dyn ServiceInstanceListSupplier>,
    position: AtomicIsize,
}

impl RoundRobinLoadBalancer {
    pub fn new(supplier: Arc<dyn ServiceInstanceListSupplier>) -> Self {
        Self {
            service_id: supplier.service_id().to_string(),
            supplier,
            position: AtomicIsize::new(-1),
        }
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// 当前游标值
    pub fn position(&self) -> isize {
        self.position.load(Ordering::Acquire)
    }

    /// 以 `size` 为模推进游标，返回新值；`size` 为 0 时不推进，返回 None
    ///
    /// CAS 失败时重试，并发调用者不会拿到相同的游标值。
    /// 取模用的是本次观察到的 `size`，列表随后缩小时，
    /// 该下标可能越过新列表的边界，这里不做钳制。
    pub fn next_position(&self, size: usize) -> Option<usize> {
        if size == 0 {
            return None;
        }
        let size = size as isize;
        let mut current = self.position.load(Ordering::Acquire);
        loop {
            let next = (current + 1).rem_euclid(size);
            match self.position.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some(next as usize),
                Err(actual) => current = actual,
            }
        }
    }
}

#[async_trait]
impl ReactiveLoadBalancer for RoundRobinLoadBalancer {
    async fn choose(&self, request: &Request) -> Response {
        let instances = self.supplier.get(request).await;
        let Some(index) = self.next_position(instances.len()) else {
            tracing::warn!(service_id = %self.service_id, "No servers available for service");
            return Response::Empty;
        };

        instances.into_iter().nth(index).into()
    }
}
