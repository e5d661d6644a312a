//! 路由
//!
//! 注册阶段通过 [`RouterBuilder`] 登记路由、模式、前缀和前置处理器，
//! 解析阶段由不可变的 [`Router`] 把请求解析成一次性的 [`Route`]，
//! 最后 [`Route::run`] 生成响应。

mod callback;
mod error;
mod prelude;
mod route;
mod router;
mod signature;
mod tree;

pub use callback::{Arg, Args, Callback, HandlerResult, Invocable, Reply, RouteTarget};
pub use error::{HandlerError, HttpException, RouteError, RouteResult, RoutingError, RoutingResult};
pub use prelude::{FromPreludeContext, Prelude, PreludeContext};
pub use route::Route;
pub use router::{Router, RouterBuilder};
pub use signature::{ParamKind, ReturnKind, Signature};
