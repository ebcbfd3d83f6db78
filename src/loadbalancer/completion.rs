//! 执行结果上下文

use std::any::Any;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::loadbalancer::request::Request;
use crate::loadbalancer::response::Response;

/// 观察者看到的客户端响应类型（类型已擦除）
pub type ClientResponse = dyn Any + Send + Sync;

/// 执行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionStatus {
    Success,
    Failed,
    /// 没有选中实例，请求未发出
    Discard,
}

/// 一次执行尝试的结果，只在通知观察者期间存在
pub struct CompletionContext<'a> {
    pub status: CompletionStatus,
    pub service_id: &'a str,
    pub request: &'a Request,
    pub load_balancer_response: &'a Response,
    pub client_response: Option<&'a ClientResponse>,
    pub error: Option<&'a (dyn std::error::Error + Send + Sync + 'static)>,
    /// 请求耗时（Discard 时为 None）
    pub elapsed: Option<Duration>,
}

impl<'a> CompletionContext<'a> {
    pub fn discard(service_id: &'a str, request: &'a Request, response: &'a Response) -> Self {
        Self {
            status: CompletionStatus::Discard,
            service_id,
            request,
            load_balancer_response: response,
            client_response: None,
            error: None,
            elapsed: None,
        }
    }

    pub fn success(
        service_id: &'a str,
        request: &'a Request,
        response: &'a Response,
        client_response: &'a ClientResponse,
        elapsed: Duration,
    ) -> Self {
        Self {
            status: CompletionStatus::Success,
            service_id,
            request,
            load_balancer_response: response,
            client_response: Some(client_response),
            error: None,
            elapsed: Some(elapsed),
        }
    }

    pub fn failed(
        service_id: &'a str,
        request: &'a Request,
        response: &'a Response,
        error: &'a (dyn std::error::Error + Send + Sync + 'static),
        elapsed: Duration,
    ) -> Self {
        Self {
            status: CompletionStatus::Failed,
            service_id,
            request,
            load_balancer_response: response,
            client_response: None,
            error: Some(error),
            elapsed: Some(elapsed),
        }
    }

    /// 按具体类型读取客户端响应
    pub fn client_response_as<T: Any>(&self) -> Option<&T> {
        self.client_response.and_then(|r| r.downcast_ref::<T>())
    }
}
