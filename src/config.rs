//! 配置模块
//!
//! 服务发现、负载均衡和日志配置，支持 TOML / JSON 文件以及环境变量覆盖

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{LoadBalancerError, Result};

/// 默认的 hint 请求头
pub const DEFAULT_HINT_HEADER: &str = "X-SC-LB-Hint";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub discovery: DiscoveryProperties,
    #[serde(default)]
    pub loadbalancer: LoadBalancerProperties,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DiscoveryProperties {
    #[serde(default)]
    pub simple: SimpleDiscoveryProperties,
    #[serde(default)]
    pub cache: CacheProperties,
}

/// 静态服务发现配置
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SimpleDiscoveryProperties {
    /// 服务 ID -> 实例列表
    #[serde(default)]
    pub instances: BTreeMap<String, Vec<InstanceProperties>>,
    /// 当前进程自身的实例
    pub local: Option<InstanceProperties>,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstanceProperties {
    /// 缺省时自动生成
    pub instance_id: Option<String>,
    /// 仅 `local` 使用；列表中的实例取所在的 key
    pub service_id: Option<String>,
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// 实例缓存配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheProperties {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheProperties {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_cache_ttl(),
            capacity: default_cache_capacity(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cache_ttl() -> u64 {
    35
}

fn default_cache_capacity() -> usize {
    256
}

/// 负载均衡配置
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoadBalancerProperties {
    #[serde(default)]
    pub strategy: LoadBalanceStrategy,
    /// 优先选择的可用区（匹配实例元数据 `zone`）
    pub zone: Option<String>,
    #[serde(default)]
    pub hint: HintProperties,
    /// 按服务覆盖的配置
    #[serde(default)]
    pub clients: HashMap<String, ClientProperties>,
}

impl LoadBalancerProperties {
    /// 某个服务实际使用的策略
    pub fn strategy_for(&self, service_id: &str) -> LoadBalanceStrategy {
        self.clients
            .get(service_id)
            .and_then(|client| client.strategy)
            .unwrap_or(self.strategy)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClientProperties {
    pub strategy: Option<LoadBalanceStrategy>,
}

/// hint 路由配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HintProperties {
    #[serde(default = "default_hint_header")]
    pub header_name: String,
    pub default: Option<String>,
    #[serde(default)]
    pub per_service: HashMap<String, String>,
}

impl Default for HintProperties {
    fn default() -> Self {
        Self {
            header_name: default_hint_header(),
            default: None,
            per_service: HashMap::new(),
        }
    }
}

impl HintProperties {
    /// 某个服务配置的 hint，按服务配置优先
    pub fn hint_for(&self, service_id: &str) -> Option<&str> {
        self.per_service
            .get(service_id)
            .or(self.default.as_ref())
            .map(String::as_str)
    }
}

fn default_hint_header() -> String {
    DEFAULT_HINT_HEADER.to_string()
}

/// 负载均衡策略
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalanceStrategy {
    /// 轮询
    #[default]
    RoundRobin,
    /// 随机
    Random,
}

impl std::str::FromStr for LoadBalanceStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "round_robin" | "roundrobin" => Ok(LoadBalanceStrategy::RoundRobin),
            "random" => Ok(LoadBalanceStrategy::Random),
            _ => Err(format!("Unknown load balance strategy: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// 从文件加载，`.json` 按 JSON 解析，其余按 TOML 解析
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LoadBalancerError::configuration(format!("failed to read {}: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| LoadBalancerError::configuration(e.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| LoadBalancerError::configuration(e.to_string()))
    }

    /// 应用环境变量覆盖
    ///
    /// - `FLARE_LB_STRATEGY`: 默认策略
    /// - `FLARE_LB_ZONE`: 优先可用区
    /// - `FLARE_LOG_LEVEL`: 日志级别
    pub fn apply_env_overrides(self) -> Result<Self> {
        self.apply_overrides_with(|key| std::env::var(key).ok())
    }

    /// 按给定的查找函数应用覆盖，键与 `apply_env_overrides` 相同
    pub fn apply_overrides_with(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        if let Some(strategy) = lookup("FLARE_LB_STRATEGY") {
            self.loadbalancer.strategy = strategy
                .parse()
                .map_err(LoadBalancerError::configuration)?;
        }
        if let Some(zone) = lookup("FLARE_LB_ZONE") {
            self.loadbalancer.zone = Some(zone);
        }
        if let Some(level) = lookup("FLARE_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(self)
    }
}
