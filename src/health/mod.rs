//! 服务发现健康检查模块

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::discovery::{DiscoveryClient, ReactiveDiscoveryClient};

/// 健康状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Unknown,
    Up,
    Down,
}

/// 单个发现客户端的健康信息
#[derive(Debug, Clone)]
pub struct ClientHealth {
    /// 客户端描述；同类客户端的描述可能相同
    pub client: String,
    pub status: HealthStatus,
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

/// 服务发现健康检查
///
/// 对每个发现客户端调用 `probe()`，每个注册的客户端各占一条结果，按注册顺序排列
pub struct DiscoveryHealthIndicator {
    blocking: Vec<Arc<dyn DiscoveryClient>>,
    reactive: Vec<Arc<dyn ReactiveDiscoveryClient>>,
    statuses: Arc<RwLock<Vec<ClientHealth>>>,
}

impl DiscoveryHealthIndicator {
    pub fn new() -> Self {
        Self {
            blocking: Vec::new(),
            reactive: Vec::new(),
            statuses: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_client(mut self, client: Arc<dyn DiscoveryClient>) -> Self {
        self.blocking.push(client);
        self
    }

    pub fn with_reactive_client(mut self, client: Arc<dyn ReactiveDiscoveryClient>) -> Self {
        self.reactive.push(client);
        self
    }

    /// 探测全部客户端并返回结果（先同步客户端，后流式客户端）
    pub async fn check(&self) -> Vec<ClientHealth> {
        let mut results = Vec::with_capacity(self.blocking.len() + self.reactive.len());

        for client in &self.blocking {
            results.push(Self::to_health(client.description(), client.probe()));
        }
        for client in &self.reactive {
            results.push(Self::to_health(client.description(), client.probe().await));
        }

        for health in results.iter().filter(|h| h.status == HealthStatus::Down) {
            tracing::warn!(
                client = %health.client,
                error = health.error.as_deref().unwrap_or(""),
                "Discovery client probe failed"
            );
        }

        let mut statuses = self.statuses.write().await;
        *statuses = results.clone();
        results
    }

    /// 最近一次检查中某类客户端的状态；同描述的多个客户端取最差的状态
    pub async fn get_status(&self, description: &str) -> HealthStatus {
        let statuses = self.statuses.read().await;
        Self::aggregate(statuses.iter().filter(|h| h.client == description))
    }

    /// 汇总状态：任一 Down 即 Down，全部 Up 才是 Up
    pub async fn overall(&self) -> HealthStatus {
        let statuses = self.statuses.read().await;
        Self::aggregate(statuses.iter())
    }

    fn aggregate<'a>(entries: impl Iterator<Item = &'a ClientHealth>) -> HealthStatus {
        let mut status = HealthStatus::Unknown;
        for health in entries {
            if health.status == HealthStatus::Down {
                return HealthStatus::Down;
            }
            status = HealthStatus::Up;
        }
        status
    }

    fn to_health(description: &str, result: crate::error::Result<()>) -> ClientHealth {
        let (status, error) = match result {
            Ok(()) => (HealthStatus::Up, None),
            Err(e) => (HealthStatus::Down, Some(e.to_string())),
        };
        ClientHealth {
            client: description.to_string(),
            status,
            error,
            checked_at: Utc::now(),
        }
    }
}

impl Default for DiscoveryHealthIndicator {
    fn default() -> Self {
        Self::new()
    }
}
