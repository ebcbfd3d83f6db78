//! 服务实例定义

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 服务实例
///
/// 创建后不可变，按值比较
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceInstance {
    /// 服务 ID（逻辑名，如 "user-service"）
    pub service_id: String,

    /// 实例 ID（唯一标识）
    pub instance_id: String,

    /// 主机名或 IP
    pub host: String,

    /// 端口
    pub port: u16,

    /// 是否使用安全连接（https）
    #[serde(default)]
    pub secure: bool,

    /// 元数据（如 zone、hint）
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ServiceInstance {
    /// 创建新的服务实例
    pub fn new(
        service_id: impl Into<String>,
        instance_id: impl Into<String>,
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            service_id: service_id.into(),
            instance_id: instance_id.into(),
            host: host.into(),
            port,
            secure: false,
            metadata: HashMap::new(),
        }
    }

    /// 设置是否安全连接
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// 添加元数据
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// 协议：secure 时为 https，否则为 http
    pub fn scheme(&self) -> &'static str {
        if self.secure { "https" } else { "http" }
    }

    /// 转换为 URI（格式：scheme://host:port）
    pub fn uri(&self) -> String {
        format!("{}://{}:{}", self.scheme(), self.host, self.port)
    }

    /// 获取元数据值
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}
