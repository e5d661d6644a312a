//! 前置处理器模块
//!
//! 前置处理器在路由回调之前按顺序执行，可以放行（返回 `None`），
//! 也可以返回一个结果直接中断请求，后续的前置处理器和回调都不会再执行

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::callback::{HandlerResult, Reply};
use crate::message::Request;
use crate::server::ServerInfo;

/// 前置处理器 trait
pub trait Prelude: Send {
    /// 返回 `Some` 表示中断请求，其中的值会被转换成响应
    fn run(&mut self) -> HandlerResult<Option<Reply>>;
}

impl<F> Prelude for F
where
    F: FnMut() -> HandlerResult<Option<Reply>> + Send,
{
    fn run(&mut self) -> HandlerResult<Option<Reply>> {
        self()
    }
}

/// 创建前置处理器时可用的依赖
pub struct PreludeContext<'a> {
    /// 当前请求
    pub request: &'a Arc<Request>,

    /// 服务器信息，调用方没有提供时为空
    pub server_info: &'a Arc<ServerInfo>,

    /// 注册前置处理器时给出的参数
    pub parameters: &'a [Value],
}

/// 可以从 [`PreludeContext`] 创建的前置处理器
pub trait FromPreludeContext: Prelude + Sized + 'static {
    fn from_context(context: &PreludeContext<'_>) -> anyhow::Result<Self>;
}

type PreludeFactory =
    dyn Fn(&PreludeContext<'_>) -> anyhow::Result<Box<dyn Prelude>> + Send + Sync;

/// 已注册的前置处理器：参数加上工厂
#[derive(Clone)]
pub(crate) struct PreludeDefinition {
    type_name: &'static str,
    parameters: Vec<Value>,
    factory: Arc<PreludeFactory>,
}

impl PreludeDefinition {
    pub(crate) fn of<P: FromPreludeContext>(parameters: Vec<Value>) -> Self {
        Self::with(parameters, P::from_context)
    }

    pub(crate) fn with<P, F>(parameters: Vec<Value>, factory: F) -> Self
    where
        P: Prelude + 'static,
        F: Fn(&PreludeContext<'_>) -> anyhow::Result<P> + Send + Sync + 'static,
    {
        let factory = move |context: &PreludeContext<'_>| -> anyhow::Result<Box<dyn Prelude>> {
            Ok(Box::new(factory(context)?))
        };

        Self {
            type_name: std::any::type_name::<P>(),
            parameters,
            factory: Arc::new(factory),
        }
    }

    pub(crate) fn instantiate(
        &self,
        request: &Arc<Request>,
        server_info: &Arc<ServerInfo>,
    ) -> anyhow::Result<Box<dyn Prelude>> {
        let context = PreludeContext {
            request,
            server_info,
            parameters: &self.parameters,
        };
        (self.factory)(&context)
    }
}

impl fmt::Debug for PreludeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreludeDefinition")
            .field("type_name", &self.type_name)
            .field("parameters", &self.parameters)
            .finish()
    }
}
