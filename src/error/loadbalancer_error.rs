//! 负载均衡统一错误类型

use super::code::ErrorCode;
use thiserror::Error;

/// 调用方请求返回的错误类型
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 负载均衡统一错误类型
#[derive(Error, Debug)]
pub enum LoadBalancerError {
    /// 选择时没有可用实例（终止性失败，不在本层重试）
    #[error("No instances available for {service_id}")]
    NoInstancesAvailable { service_id: String },

    /// 下游请求 IO 失败，原样透传
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// 下游请求的其他失败
    #[error("request failed: {0}")]
    Request(#[source] BoxError),

    /// 服务发现错误（仅出现在流式发现的信号中）
    #[error("discovery error: {0}")]
    Discovery(String),

    /// 配置错误
    #[error("configuration error: {0}")]
    Configuration(String),

    /// 非预期的内部错误
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl LoadBalancerError {
    /// 创建无可用实例错误
    pub fn no_instances(service_id: impl Into<String>) -> Self {
        LoadBalancerError::NoInstancesAvailable {
            service_id: service_id.into(),
        }
    }

    /// 创建服务发现错误
    pub fn discovery(msg: impl Into<String>) -> Self {
        LoadBalancerError::Discovery(msg.into())
    }

    /// 创建配置错误
    pub fn configuration(msg: impl Into<String>) -> Self {
        LoadBalancerError::Configuration(msg.into())
    }

    /// 创建非预期错误
    pub fn unexpected(msg: impl Into<String>) -> Self {
        LoadBalancerError::Unexpected(msg.into())
    }

    /// 获取错误代码
    pub fn code(&self) -> ErrorCode {
        match self {
            LoadBalancerError::NoInstancesAvailable { .. } => ErrorCode::NoInstancesAvailable,
            LoadBalancerError::Io(_) => ErrorCode::RequestIo,
            LoadBalancerError::Request(_) => ErrorCode::RequestFailed,
            LoadBalancerError::Discovery(_) => ErrorCode::DiscoveryUnavailable,
            LoadBalancerError::Configuration(_) => ErrorCode::ConfigurationError,
            LoadBalancerError::Unexpected(_) => ErrorCode::InternalError,
        }
    }

    /// 判断是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }

    /// 若为 IO 错误，返回底层的 `std::io::Error`
    pub fn as_io(&self) -> Option<&std::io::Error> {
        match self {
            LoadBalancerError::Io(err) => Some(err),
            _ => None,
        }
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, LoadBalancerError>;
