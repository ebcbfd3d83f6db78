//! 错误处理模块
//!
//! 提供统一的错误类型和错误代码分类

pub mod code;
pub mod loadbalancer_error;

pub use code::{ErrorCategory, ErrorCode};
pub use loadbalancer_error::{BoxError, LoadBalancerError, Result};
