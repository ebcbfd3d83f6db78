//! 执行结果统计

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use crate::loadbalancer::completion::{CompletionContext, CompletionStatus};
use crate::loadbalancer::lifecycle::LoadBalancerLifecycle;

/// 保留的最近耗时条数
const MAX_DURATION_SAMPLES: usize = 1000;

/// 单个服务的统计数据
#[derive(Debug, Clone, Default)]
pub struct ServiceStats {
    pub requests_total: u64,
    pub requests_success: u64,
    pub requests_failed: u64,
    pub requests_discarded: u64,
    pub request_duration_ms: VecDeque<u64>,
}

/// 统计观察者
///
/// 按服务统计成功/失败/丢弃次数
#[derive(Clone, Default)]
pub struct StatsLoadBalancerLifecycle {
    stats: Arc<RwLock<HashMap<String, ServiceStats>>>,
}

impl StatsLoadBalancerLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// 某个服务的统计快照
    pub fn get_stats(&self, service_id: &str) -> ServiceStats {
        let stats = self.stats.read().unwrap_or_else(|e| e.into_inner());
        stats.get(service_id).cloned().unwrap_or_default()
    }

    /// 全部统计快照
    pub fn snapshot(&self) -> HashMap<String, ServiceStats> {
        self.stats.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl LoadBalancerLifecycle for StatsLoadBalancerLifecycle {
    fn on_complete(&self, completion: &CompletionContext<'_>) {
        let mut stats = self.stats.write().unwrap_or_else(|e| e.into_inner());
        let entry = stats.entry(completion.service_id.to_string()).or_default();
        entry.requests_total += 1;

        match completion.status {
            CompletionStatus::Success => entry.requests_success += 1,
            CompletionStatus::Failed => entry.requests_failed += 1,
            CompletionStatus::Discard => entry.requests_discarded += 1,
        }

        if let Some(elapsed) = completion.elapsed {
            if entry.request_duration_ms.len() == MAX_DURATION_SAMPLES {
                entry.request_duration_ms.pop_front();
            }
            entry.request_duration_ms.push_back(elapsed.as_millis() as u64);
        }
    }
}
