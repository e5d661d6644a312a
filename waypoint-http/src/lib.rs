//! # Waypoint HTTP
//!
//! HTTP 消息模型与路由
//!
//! ## 核心特性
//!
//! - **消息模型** - 请求和响应，多行头部、Cookie、消息体
//! - **路由** - 字面量路径段、正则约束的命名捕获、路由前缀
//! - **前置处理器** - 按顺序执行，可以中断请求
//! - **异常恢复** - 处理器可以用 `HttpException` 携带响应中止执行

pub mod constants;
pub mod cookie;
pub mod error;
pub mod message;
pub mod routing;
pub mod server;

pub mod prelude {
    //! 预导入模块

    pub use crate::cookie::{RequestCookie, ResponseCookie, SameSite};
    pub use crate::error::{CookieError, MessageError, MessageResult};
    pub use crate::message::{Body, Message, ProtocolVersion, Request, RequestBuilder, Response};
    pub use crate::routing::*;
    pub use crate::server::ServerInfo;

    pub use http::{Method, StatusCode, Uri};
}
