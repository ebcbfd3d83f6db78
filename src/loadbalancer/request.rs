//! 负载均衡请求上下文

use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};

/// 原始客户端请求数据（用于从请求头中读取 hint 等信息）
#[derive(Debug, Clone, Default)]
pub struct RequestData {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl RequestData {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// 读取请求头的字符串值
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// 默认请求上下文
#[derive(Debug, Clone, Default)]
pub struct DefaultRequestContext {
    /// 调用方指定的 hint
    pub hint: Option<String>,
    /// 原始客户端请求
    pub client_request: Option<RequestData>,
}

/// 负载均衡请求
#[derive(Debug, Clone, Default)]
pub struct Request {
    context: DefaultRequestContext,
}

impl Request {
    pub fn new(context: DefaultRequestContext) -> Self {
        Self { context }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.context.hint = Some(hint.into());
        self
    }

    pub fn with_client_request(mut self, request: RequestData) -> Self {
        self.context.client_request = Some(request);
        self
    }

    pub fn context(&self) -> &DefaultRequestContext {
        &self.context
    }
}
