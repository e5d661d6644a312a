//! 路由错误类型
//!
//! - [`RoutingError`]：注册阶段的参数错误，属于调用方的 bug，应当在启动时暴露
//! - [`RouteError`]：解析和执行阶段的内部故障，库不会把它们转换成响应
//! - [`HandlerError`]：回调和前置处理器的返回错误，其中 [`HttpException`] 会被恢复成响应

use thiserror::Error;
use waypoint_core::CoreError;

use super::signature::ReturnKind;
use crate::message::Response;

/// 携带一个预先构造好的响应的异常
///
/// 处理器在调用栈深处返回它即可中止执行，[`Route::run`](super::Route::run)
/// 会直接使用其中的响应作为结果
#[derive(Debug, Clone, Error)]
#[error("{}", .response.status_text())]
pub struct HttpException {
    response: Response,
}

impl HttpException {
    pub fn new(response: Response) -> Self {
        Self { response }
    }

    /// 响应的状态码
    pub fn status_code(&self) -> u16 {
        self.response.status_code()
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn into_response(self) -> Response {
        self.response
    }
}

impl From<Response> for HttpException {
    fn from(response: Response) -> Self {
        Self::new(response)
    }
}

/// 回调或前置处理器的错误
#[derive(Debug, Error)]
pub enum HandlerError {
    /// 以携带的响应中止，会被恢复
    #[error(transparent)]
    Http(#[from] HttpException),

    /// 其他任何错误，原样交给调用方
    #[error(transparent)]
    Other(anyhow::Error),
}

/// 经过 `anyhow` 传递的 [`HttpException`] 仍然归为 `Http`
impl From<anyhow::Error> for HandlerError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<HttpException>() {
            Ok(exception) => HandlerError::Http(exception),
            Err(other) => HandlerError::Other(other),
        }
    }
}

/// 路由注册错误
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("Invalid parameter type \"{0}\": allowed types are string, string..., Request, ServerInfo")]
    InvalidParameterType(String),

    #[error("Cannot route callback due to invalid parameter types: {0}")]
    InvalidSignature(String),

    #[error("Route callables must have a return type")]
    MissingReturnType,

    #[error("Invalid return type \"{0}\": allowed types are string, Stringable, Response")]
    InvalidReturnType(String),

    #[error("Class method callback {type_name}::{method} requires constructor arguments")]
    MissingConstructorArgs {
        type_name: &'static str,
        method: String,
    },

    #[error("Invalid prelude name \"{0}\"")]
    InvalidPreludeName(String),

    #[error("Invalid HTTP method \"{0}\"")]
    InvalidMethod(String),

    #[error("Invalid pattern '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("Route {method} /{path} uses unknown pattern ':{pattern}'")]
    UnknownPattern {
        method: String,
        path: String,
        pattern: String,
    },

    #[error("Route {method} /{path} uses unknown prelude '{prelude}'")]
    UnknownPrelude {
        method: String,
        path: String,
        prelude: String,
    },

    #[error("Route {method} /{path} captures {available} segment(s) but its callback needs {required}")]
    InsufficientCaptures {
        method: String,
        path: String,
        required: usize,
        available: usize,
    },

    #[error("Router configuration error: {0}")]
    Config(#[from] CoreError),
}

pub type RoutingResult<T> = Result<T, RoutingError>;

/// 路由解析和执行错误
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Failed to create prelude '{name}': {source}")]
    PreludeConstruction {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Prelude '{0}' is not registered")]
    UnknownPrelude(String),

    #[error("Received an unexpected {kind} result from a route callback (allowed: {allowed})")]
    UnexpectedResult { kind: ReturnKind, allowed: String },

    #[error("Route handler failed: {0}")]
    Handler(#[source] anyhow::Error),

    #[error("Internal routing error: {0}")]
    Internal(String),
}

pub type RouteResult<T> = Result<T, RouteError>;
