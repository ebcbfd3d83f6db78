//! 负载均衡执行包装器
//!
//! 选择实例 → 执行调用方请求 → 通知观察者结果

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use http::Uri;

use crate::discovery::ServiceInstance;
use crate::error::{BoxError, LoadBalancerError, Result};
use crate::loadbalancer::completion::{ClientResponse, CompletionContext};
use crate::loadbalancer::factory::LoadBalancerFactory;
use crate::loadbalancer::lifecycle::{LifecycleTypes, LoadBalancerLifecycle};
use crate::loadbalancer::request::{DefaultRequestContext, Request};
use crate::loadbalancer::response::Response;

/// 负载均衡客户端
pub struct LoadBalancerClient {
    factory: Arc<LoadBalancerFactory>,
    lifecycles: Vec<Arc<dyn LoadBalancerLifecycle>>,
}

impl LoadBalancerClient {
    /// 创建客户端
    ///
    /// 观察者在这里按类型组合过滤一次，不支持的观察者之后不会被调用
    pub fn new(
        factory: Arc<LoadBalancerFactory>,
        lifecycles: Vec<Arc<dyn LoadBalancerLifecycle>>,
    ) -> Self {
        let types = Self::lifecycle_types();
        let lifecycles = lifecycles
            .into_iter()
            .filter(|lifecycle| lifecycle.supports(&types))
            .collect();
        Self {
            factory,
            lifecycles,
        }
    }

    /// 本客户端通知观察者时使用的类型组合
    pub fn lifecycle_types() -> LifecycleTypes {
        LifecycleTypes::of::<DefaultRequestContext, ClientResponse, ServiceInstance>()
    }

    /// 过滤后的观察者数量
    pub fn lifecycle_count(&self) -> usize {
        self.lifecycles.len()
    }

    /// 为服务选择一个实例
    pub async fn choose(&self, service_id: &str, request: &Request) -> Option<ServiceInstance> {
        let balancer = self.factory.get_instance(service_id).await;
        balancer.choose(request).await.into_server()
    }

    /// 选择实例并执行请求
    pub async fn execute<T, F, Fut>(&self, service_id: &str, request_fn: F) -> Result<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce(ServiceInstance) -> Fut + Send,
        Fut: Future<Output = std::result::Result<T, BoxError>> + Send,
    {
        self.execute_with_request(service_id, Request::default(), request_fn)
            .await
    }

    /// 带请求上下文的 `execute`
    pub async fn execute_with_request<T, F, Fut>(
        &self,
        service_id: &str,
        request: Request,
        request_fn: F,
    ) -> Result<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce(ServiceInstance) -> Fut + Send,
        Fut: Future<Output = std::result::Result<T, BoxError>> + Send,
    {
        for lifecycle in &self.lifecycles {
            lifecycle.on_start(&request);
        }

        let balancer = self.factory.get_instance(service_id).await;
        let response = balancer.choose(&request).await;
        self.execute_response(service_id, request, response, request_fn)
            .await
    }

    /// 在已选定的实例上执行请求；`instance` 为 None 时按无可用实例处理
    pub async fn execute_on<T, F, Fut>(
        &self,
        service_id: &str,
        instance: Option<ServiceInstance>,
        request: Request,
        request_fn: F,
    ) -> Result<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce(ServiceInstance) -> Fut + Send,
        Fut: Future<Output = std::result::Result<T, BoxError>> + Send,
    {
        self.execute_response(service_id, request, Response::from(instance), request_fn)
            .await
    }

    /// 用选中实例的地址替换原始 URI 的协议、主机和端口
    pub fn reconstruct_uri(&self, instance: &ServiceInstance, original: &Uri) -> Result<Uri> {
        reconstruct_uri(instance, original)
    }

    async fn execute_response<T, F, Fut>(
        &self,
        service_id: &str,
        request: Request,
        response: Response,
        request_fn: F,
    ) -> Result<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce(ServiceInstance) -> Fut + Send,
        Fut: Future<Output = std::result::Result<T, BoxError>> + Send,
    {
        let Some(instance) = response.server().cloned() else {
            self.notify(&CompletionContext::discard(service_id, &request, &response));
            return Err(LoadBalancerError::no_instances(service_id));
        };

        for lifecycle in &self.lifecycles {
            lifecycle.on_start_request(&request, &response);
        }

        let started = Instant::now();
        let outcome = AssertUnwindSafe(request_fn(instance)).catch_unwind().await;
        let elapsed = started.elapsed();

        match outcome {
            Ok(Ok(value)) => {
                self.notify(&CompletionContext::success(
                    service_id, &request, &response, &value, elapsed,
                ));
                Ok(value)
            }
            Ok(Err(err)) => match err.downcast::<std::io::Error>() {
                Ok(io_err) => {
                    self.notify(&CompletionContext::failed(
                        service_id, &request, &response, &*io_err, elapsed,
                    ));
                    Err(LoadBalancerError::Io(*io_err))
                }
                Err(other) => {
                    self.notify(&CompletionContext::failed(
                        service_id,
                        &request,
                        &response,
                        &*other,
                        elapsed,
                    ));
                    Err(LoadBalancerError::Request(other))
                }
            },
            Err(panic) => {
                let error = LoadBalancerError::unexpected("load-balanced request panicked");
                self.notify(&CompletionContext::failed(
                    service_id, &request, &response, &error, elapsed,
                ));
                std::panic::resume_unwind(panic)
            }
        }
    }

    fn notify(&self, completion: &CompletionContext<'_>) {
        for lifecycle in &self.lifecycles {
            lifecycle.on_complete(completion);
        }
    }
}

/// 用选中实例的地址替换原始 URI 的协议、主机和端口，保留路径和查询串
///
/// `ws`/`wss` 按实例是否安全映射，其他协议取实例自身的 `http`/`https`
pub fn reconstruct_uri(instance: &ServiceInstance, original: &Uri) -> Result<Uri> {
    let scheme = match original.scheme_str() {
        Some("ws") | Some("wss") => {
            if instance.secure {
                "wss"
            } else {
                "ws"
            }
        }
        _ => instance.scheme(),
    };

    let path_and_query = original
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    Uri::builder()
        .scheme(scheme)
        .authority(format!("{}:{}", instance.host, instance.port))
        .path_and_query(path_and_query)
        .build()
        .map_err(|e| LoadBalancerError::configuration(format!("invalid reconstructed uri: {}", e)))
}
