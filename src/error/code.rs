//! 错误代码和错误类别定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 错误代码枚举
///
/// 错误代码按类别分组，每个类别占用1000个代码范围：
/// - 1000-1999: 选择相关错误
/// - 2000-2999: 服务发现相关错误
/// - 3000-3999: 请求执行相关错误
/// - 6000-6999: 系统相关错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum ErrorCode {
    // ============================================================
    // 选择相关错误 (1000-1999)
    // ============================================================
    NoInstancesAvailable = 1000,

    // ============================================================
    // 服务发现相关错误 (2000-2999)
    // ============================================================
    DiscoveryUnavailable = 2000,

    // ============================================================
    // 请求执行相关错误 (3000-3999)
    // ============================================================
    RequestIo = 3000,
    RequestFailed = 3001,

    // ============================================================
    // 系统相关错误 (6000-6999)
    // ============================================================
    InternalError = 6000,
    ConfigurationError = 6003,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ErrorCode {
    /// 获取错误代码的数字值
    #[inline]
    pub fn as_u32(&self) -> u32 {
        *self as u32
    }

    /// 从数字值创建错误代码
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            1000 => Some(ErrorCode::NoInstancesAvailable),
            2000 => Some(ErrorCode::DiscoveryUnavailable),
            3000 => Some(ErrorCode::RequestIo),
            3001 => Some(ErrorCode::RequestFailed),
            6000 => Some(ErrorCode::InternalError),
            6003 => Some(ErrorCode::ConfigurationError),
            _ => None,
        }
    }

    /// 获取错误代码的英文标识符
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NoInstancesAvailable => "NO_INSTANCES_AVAILABLE",
            ErrorCode::DiscoveryUnavailable => "DISCOVERY_UNAVAILABLE",
            ErrorCode::RequestIo => "REQUEST_IO",
            ErrorCode::RequestFailed => "REQUEST_FAILED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
        }
    }

    /// 获取错误代码的类别
    pub fn category(&self) -> ErrorCategory {
        match self.as_u32() {
            1000..=1999 => ErrorCategory::Selection,
            2000..=2999 => ErrorCategory::Discovery,
            3000..=3999 => ErrorCategory::Execution,
            _ => ErrorCategory::System,
        }
    }

    /// 判断是否为可重试的错误
    ///
    /// 本模块不做重试，该标记供外部重试策略参考
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::NoInstancesAvailable | ErrorCode::DiscoveryUnavailable | ErrorCode::RequestIo
        )
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Selection,
    Discovery,
    Execution,
    System,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Selection => write!(f, "SELECTION"),
            ErrorCategory::Discovery => write!(f, "DISCOVERY"),
            ErrorCategory::Execution => write!(f, "EXECUTION"),
            ErrorCategory::System => write!(f, "SYSTEM"),
        }
    }
}
