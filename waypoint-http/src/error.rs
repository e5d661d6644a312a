//! 消息模型与 Cookie 的错误类型

use thiserror::Error;

/// HTTP 消息构造/修改错误
///
/// 都属于调用方的参数错误，不应重试
#[derive(Debug, Error)]
pub enum MessageError {
    /// 不支持的协议版本
    #[error("Unknown HTTP version \"{version}\". Supported values: {supported}.")]
    UnknownProtocolVersion { version: String, supported: String },

    /// 非法的头部名称或值
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    /// 非法的请求方法
    #[error("Invalid HTTP method \"{0}\"")]
    InvalidMethod(String),

    /// 非法的状态码
    #[error("Invalid status code {0}")]
    InvalidStatus(u16),

    /// URI 无法解析
    #[error("Invalid URI \"{uri}\": {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: http::uri::InvalidUri,
    },

    /// 有主机但无法确定 scheme
    #[error("Cannot build an absolute URI for host \"{host}\" without a scheme")]
    MissingScheme { host: String },
}

pub type MessageResult<T> = Result<T, MessageError>;

/// `Set-Cookie` 解析错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CookieError {
    #[error("Cookie line has no name")]
    MissingName,

    #[error("Invalid SameSite value \"{0}\": expected Strict, Lax or None")]
    InvalidSameSite(String),

    #[error("Invalid Max-Age value \"{0}\"")]
    InvalidMaxAge(String),
}
