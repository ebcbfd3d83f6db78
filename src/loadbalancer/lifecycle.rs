//! 负载均衡生命周期观察者
//!
//! 由执行包装器按注册顺序直接调用，没有事件总线

use std::any::TypeId;

use crate::loadbalancer::completion::{CompletionContext, CompletionStatus};
use crate::loadbalancer::request::Request;
use crate::loadbalancer::response::Response;

/// 观察者可以声明支持的类型组合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LifecycleTypes {
    pub request_context: TypeId,
    pub client_response: TypeId,
    pub server: TypeId,
}

impl LifecycleTypes {
    pub fn of<C, R, S>() -> Self
    where
        C: ?Sized + 'static,
        R: ?Sized + 'static,
        S: ?Sized + 'static,
    {
        Self {
            request_context: TypeId::of::<C>(),
            client_response: TypeId::of::<R>(),
            server: TypeId::of::<S>(),
        }
    }
}

/// 生命周期观察者 trait
pub trait LoadBalancerLifecycle: Send + Sync {
    /// 是否支持该类型组合；只在构造执行包装器时检查一次
    fn supports(&self, _types: &LifecycleTypes) -> bool {
        true
    }

    /// 选择之前
    fn on_start(&self, _request: &Request) {}

    /// 选中实例、发出请求之前
    fn on_start_request(&self, _request: &Request, _response: &Response) {}

    /// 执行结束
    fn on_complete(&self, completion: &CompletionContext<'_>);
}

/// 以 tracing 输出每次执行的结果
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLoadBalancerLifecycle;

impl LoggingLoadBalancerLifecycle {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancerLifecycle for LoggingLoadBalancerLifecycle {
    fn on_start_request(&self, _request: &Request, response: &Response) {
        if let Some(instance) = response.server() {
            tracing::debug!(
                service_id = %instance.service_id,
                instance_id = %instance.instance_id,
                "Executing load-balanced request"
            );
        }
    }

    fn on_complete(&self, completion: &CompletionContext<'_>) {
        let service_id = completion.service_id;
        let instance = completion.load_balancer_response.server();
        let instance_id = instance.map(|i| i.instance_id.as_str()).unwrap_or("");
        let elapsed_ms = completion.elapsed.map(|d| d.as_millis() as u64);

        match completion.status {
            CompletionStatus::Success => {
                tracing::info!(
                    service_id,
                    instance_id,
                    ?elapsed_ms,
                    "Load-balanced request succeeded"
                );
            }
            CompletionStatus::Failed => {
                let error = completion.error.map(|e| e.to_string()).unwrap_or_default();
                tracing::error!(
                    service_id,
                    instance_id,
                    ?elapsed_ms,
                    error = %error,
                    "Load-balanced request failed"
                );
            }
            CompletionStatus::Discard => {
                tracing::warn!(service_id, "Load-balanced request discarded, no instance chosen");
            }
        }
    }
}
