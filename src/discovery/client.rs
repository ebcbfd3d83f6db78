//! 同步服务发现能力定义

use crate::discovery::instance::ServiceInstance;
use crate::error::Result;

/// 按服务 ID 解析实例的能力
pub trait ListInstances {
    /// 获取服务的全部已知实例
    ///
    /// 未知服务或后端不可达时返回空列表，不返回错误
    fn instances(&self, service_id: &str) -> Vec<ServiceInstance>;
}

/// 列出已知服务名的能力
pub trait ListServices {
    /// 获取全部已知服务名（去重，同一来源内顺序稳定）
    fn services(&self) -> Vec<String>;
}

/// 同步服务发现客户端
///
/// 所有同步发现来源（静态配置、组合、缓存装饰器）都需要实现这个 trait
pub trait DiscoveryClient: ListInstances + ListServices + Send + Sync {
    /// 描述信息
    fn description(&self) -> &str;

    /// 当前进程自身对应的实例（不适用时返回 None）
    fn local_service_instance(&self) -> Option<ServiceInstance> {
        None
    }

    /// 优先级，数值越小越优先
    fn order(&self) -> i32 {
        0
    }

    /// 健康探测
    ///
    /// 默认实现是列一次服务
    fn probe(&self) -> Result<()> {
        self.services();
        Ok(())
    }
}
