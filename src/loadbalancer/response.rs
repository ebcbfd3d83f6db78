//! 选择结果

use crate::discovery::ServiceInstance;

/// 一次 `choose()` 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// 选中了实例
    Default(ServiceInstance),
    /// 没有可用实例
    Empty,
}

impl Response {
    pub fn has_server(&self) -> bool {
        matches!(self, Response::Default(_))
    }

    pub fn server(&self) -> Option<&ServiceInstance> {
        match self {
            Response::Default(instance) => Some(instance),
            Response::Empty => None,
        }
    }

    pub fn into_server(self) -> Option<ServiceInstance> {
        match self {
            Response::Default(instance) => Some(instance),
            Response::Empty => None,
        }
    }
}

impl From<Option<ServiceInstance>> for Response {
    fn from(instance: Option<ServiceInstance>) -> Self {
        instance.map(Response::Default).unwrap_or(Response::Empty)
    }
}
