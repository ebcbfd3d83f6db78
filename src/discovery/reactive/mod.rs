//! 流式（异步）服务发现
//!
//! 与同步 `DiscoveryClient` 对应，结果以 `Stream` 形式返回，错误作为流中的信号

pub mod composite;
pub mod race;
pub mod simple;

pub use composite::ReactiveCompositeDiscoveryClient;
pub use race::first_with_value;
pub use simple::SimpleReactiveDiscoveryClient;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;

use crate::discovery::instance::ServiceInstance;
use crate::error::Result;

/// 实例流
pub type InstanceStream = BoxStream<'static, Result<ServiceInstance>>;

/// 服务名流
pub type ServiceStream = BoxStream<'static, Result<String>>;

/// 流式服务发现客户端
#[async_trait]
pub trait ReactiveDiscoveryClient: Send + Sync {
    /// 描述信息
    fn description(&self) -> &str;

    /// 获取服务实例流（惰性，订阅时才开始拉取）
    fn instances(&self, service_id: &str) -> InstanceStream;

    /// 获取服务名流
    fn services(&self) -> ServiceStream;

    /// 优先级，数值越小越优先
    fn order(&self) -> i32 {
        0
    }

    /// 健康探测
    ///
    /// 默认实现是消费一次服务名流，遇到错误即返回
    async fn probe(&self) -> Result<()> {
        let mut services = self.services();
        while let Some(item) = services.next().await {
            item?;
        }
        Ok(())
    }
}
