//! 路由器
//!
//! 注册阶段和解析阶段分开：
//!
//! - [`RouterBuilder`] 持有所有可变状态（前缀栈、当前前置处理器、模式表、路由表），
//!   `build()` 校验整张路由表后生成 [`Router`]
//! - [`Router`] 不可变，可以在线程间共享，只负责把请求解析成 [`Route`]
//!
//! ```ignore
//! let mut builder = Router::builder();
//! builder
//!     .set_pattern("int", "^[0-9]+$")?
//!     .push_prefix("users")
//!     .set_callable_route("GET", ":int", Signature::text().string(), |args| {
//!         Ok(format!("User {}", args.string(0).unwrap_or_default()).into())
//!     })?;
//! let router = builder.build()?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};
use waypoint_core::{CoreError, Environment, ROUTER_PATTERNS};

use super::callback::{Arg, Args, Callback, HandlerResult, Invocable, RouteTarget};
use super::error::{RouteError, RouteResult, RoutingError, RoutingResult};
use super::prelude::{FromPreludeContext, Prelude, PreludeContext, PreludeDefinition};
use super::route::Route;
use super::signature::{ParamKind, Signature};
use super::tree::RouteNode;
use crate::constants::{PATH_SEPARATOR, PATTERN_TOKEN_PREFIX};
use crate::message::Request;
use crate::server::ServerInfo;

fn parse_method(method: &str) -> RoutingResult<Method> {
    Method::from_bytes(method.trim().to_uppercase().as_bytes())
        .map_err(|_| RoutingError::InvalidMethod(method.to_string()))
}

fn split_path(path: &str) -> Vec<String> {
    let path = path.trim_matches(PATH_SEPARATOR);
    if path.is_empty() {
        Vec::new()
    } else {
        path.split(PATH_SEPARATOR).map(String::from).collect()
    }
}

/// 路由注册器
#[derive(Debug, Default)]
pub struct RouterBuilder {
    active_preludes: Vec<String>,
    patterns: Vec<(String, Regex)>,
    prefixes: Vec<String>,
    preludes: HashMap<String, PreludeDefinition>,
    routes: HashMap<Method, RouteNode>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个前置处理器
    pub fn add_prelude<P: FromPreludeContext>(
        &mut self,
        name: &str,
        parameters: Vec<Value>,
    ) -> &mut Self {
        debug!(prelude = %name, type_name = std::any::type_name::<P>(), "Registered prelude");
        self.preludes
            .insert(name.to_string(), PreludeDefinition::of::<P>(parameters));
        self
    }

    /// 用自定义工厂注册前置处理器
    pub fn add_prelude_with<P, F>(
        &mut self,
        name: &str,
        parameters: Vec<Value>,
        factory: F,
    ) -> &mut Self
    where
        P: Prelude + 'static,
        F: Fn(&PreludeContext<'_>) -> anyhow::Result<P> + Send + Sync + 'static,
    {
        debug!(prelude = %name, type_name = std::any::type_name::<P>(), "Registered prelude");
        self.preludes
            .insert(name.to_string(), PreludeDefinition::with(parameters, factory));
        self
    }

    /// 设置之后注册的路由使用的前置处理器，传入空列表即清除
    pub fn set_preludes<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active_preludes = names.into_iter().map(Into::into).collect();
        self
    }

    /// 压入路径前缀，首尾的斜杠会被去掉
    pub fn push_prefix(&mut self, path: &str) -> &mut Self {
        self.prefixes
            .push(path.trim_matches(PATH_SEPARATOR).to_string());
        self
    }

    /// 弹出最后压入的前缀
    pub fn pop_prefix(&mut self) -> &mut Self {
        self.prefixes.pop();
        self
    }

    /// 注册捕获模式，之后可以在路径中以 `:name` 使用
    ///
    /// 重新注册同名模式会替换正则，但保留它原来的匹配顺序
    pub fn set_pattern(&mut self, name: &str, regex: &str) -> RoutingResult<&mut Self> {
        let compiled = Regex::new(regex).map_err(|source| RoutingError::InvalidPattern {
            name: name.to_string(),
            source,
        })?;

        match self.patterns.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = compiled,
            None => self.patterns.push((name.to_string(), compiled)),
        }
        debug!(pattern = name, regex, "Registered pattern");
        Ok(self)
    }

    /// 从配置中读取捕获模式（`waypoint.router.patterns`）
    pub fn configure(&mut self, environment: &Environment) -> RoutingResult<&mut Self> {
        let Some(entries) = environment.get_array(ROUTER_PATTERNS)? else {
            return Ok(self);
        };

        let invalid = |message: &str| {
            RoutingError::Config(CoreError::InvalidConfigValue {
                key: ROUTER_PATTERNS.to_string(),
                message: message.to_string(),
            })
        };

        for entry in &entries {
            let table = entry
                .as_object()
                .ok_or_else(|| invalid("pattern entries must be tables"))?;
            let name = table
                .get("name")
                .and_then(|v| v.as_str())
                .ok_or_else(|| invalid("pattern entry is missing 'name'"))?;
            let regex = table
                .get("regex")
                .and_then(|v| v.as_str())
                .ok_or_else(|| invalid("pattern entry is missing 'regex'"))?;
            self.set_pattern(name, regex)?;
        }

        Ok(self)
    }

    /// 注册函数或闭包路由
    pub fn set_callable_route<F>(
        &mut self,
        method: &str,
        path: &str,
        signature: Signature,
        handler: F,
    ) -> RoutingResult<&mut Self>
    where
        F: Fn(&Args) -> HandlerResult + Send + Sync + 'static,
    {
        self.set_route(method, path, Invocable::function(handler), signature, None)
    }

    /// 注册方法路由
    ///
    /// 每次执行时先用 `constructor_args` 构造 `T`，再调用 `handler`
    pub fn set_class_route<T, F>(
        &mut self,
        method: &str,
        path: &str,
        signature: Signature,
        method_name: &str,
        handler: F,
        constructor_args: Vec<Value>,
    ) -> RoutingResult<&mut Self>
    where
        T: RouteTarget,
        F: Fn(&T, &Args) -> HandlerResult + Send + Sync + 'static,
    {
        let invocable = Invocable::method::<T, F>(method_name, handler);
        self.set_route(method, path, invocable, signature, Some(constructor_args))
    }

    /// 注册任意可调用对象，附带当前的前缀和前置处理器
    pub fn set_route(
        &mut self,
        method: &str,
        path: &str,
        invocable: Invocable,
        signature: Signature,
        constructor_args: Option<Vec<Value>>,
    ) -> RoutingResult<&mut Self> {
        let method = parse_method(method)?;
        let segments = self.route_segments(path);
        let full_path = segments.join("/");

        signature.validate()?;
        let available = segments
            .iter()
            .filter(|s| s.starts_with(PATTERN_TOKEN_PREFIX))
            .count();
        let required = signature.required_captures();
        if required > available {
            return Err(RoutingError::InsufficientCaptures {
                method: method.to_string(),
                path: full_path,
                required,
                available,
            });
        }

        let callback = Callback::new(
            invocable,
            signature,
            constructor_args,
            self.active_preludes.clone(),
        )?;

        debug!(
            method = %method,
            path = %full_path,
            preludes = ?self.active_preludes,
            "Registered route"
        );
        let replaced = self
            .routes
            .entry(method.clone())
            .or_default()
            .insert(&segments, callback);
        if replaced.is_some() {
            warn!(method = %method, path = %full_path, "Route overwritten");
        }

        Ok(self)
    }

    /// 当前前缀加上路径后的全部路径段
    fn route_segments(&self, path: &str) -> Vec<String> {
        self.prefixes
            .iter()
            .flat_map(|prefix| split_path(prefix))
            .chain(split_path(path))
            .collect()
    }

    /// 校验并生成不可变的路由器
    ///
    /// 路径中的每个 `:token` 必须是已注册的模式，每个前置处理器名称必须已注册
    pub fn build(self) -> RoutingResult<Router> {
        let mut problem: Option<RoutingError> = None;

        for (method, root) in &self.routes {
            root.walk(&mut Vec::new(), &mut |segments: &[String], callback: &Callback| {
                if problem.is_some() {
                    return;
                }
                let path = || segments.join("/");

                let unknown_pattern = segments
                    .iter()
                    .filter_map(|s| s.strip_prefix(PATTERN_TOKEN_PREFIX))
                    .find(|name| !self.patterns.iter().any(|(n, _)| n == name));
                if let Some(pattern) = unknown_pattern {
                    problem = Some(RoutingError::UnknownPattern {
                        method: method.to_string(),
                        path: path(),
                        pattern: pattern.to_string(),
                    });
                    return;
                }

                let unknown_prelude = callback
                    .prelude_names()
                    .iter()
                    .find(|name| !self.preludes.contains_key(name.as_str()));
                if let Some(prelude) = unknown_prelude {
                    problem = Some(RoutingError::UnknownPrelude {
                        method: method.to_string(),
                        path: path(),
                        prelude: prelude.clone(),
                    });
                }
            });
        }

        if let Some(error) = problem {
            return Err(error);
        }

        debug!(
            methods = self.routes.len(),
            patterns = self.patterns.len(),
            preludes = self.preludes.len(),
            "Router built"
        );
        Ok(Router {
            patterns: self.patterns,
            preludes: self.preludes,
            routes: self.routes,
        })
    }
}

/// 不可变的路由表
#[derive(Debug)]
pub struct Router {
    patterns: Vec<(String, Regex)>,
    preludes: HashMap<String, PreludeDefinition>,
    routes: HashMap<Method, RouteNode>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// 已注册的模式，按匹配顺序
    pub fn patterns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.patterns.iter().map(|(n, r)| (n.as_str(), r.as_str()))
    }

    /// 为请求查找路由
    ///
    /// 没有匹配的路由时返回 `Ok(None)`。没有提供服务器信息时注入一个空的。
    pub fn find_route(
        &self,
        request: Arc<Request>,
        server_info: Option<Arc<ServerInfo>>,
    ) -> RouteResult<Option<Route>> {
        let Some(root) = self.routes.get(request.method()) else {
            debug!(method = %request.method(), "No routes for method");
            return Ok(None);
        };

        let path = request.path();
        let segments: Vec<&str> = if path.is_empty() {
            Vec::new()
        } else {
            path.split(PATH_SEPARATOR).collect()
        };

        let Some((callback, captures)) = root.find(&segments, &self.patterns) else {
            debug!(method = %request.method(), path = %path, "No route found");
            return Ok(None);
        };
        debug!(
            method = %request.method(),
            path = %path,
            callback = ?callback.invocable(),
            "Route found"
        );

        let server_info = server_info.unwrap_or_default();

        let mut preludes = Vec::with_capacity(callback.prelude_names().len());
        for name in callback.prelude_names() {
            let definition = self
                .preludes
                .get(name)
                .ok_or_else(|| RouteError::UnknownPrelude(name.clone()))?;
            let prelude = definition
                .instantiate(&request, &server_info)
                .map_err(|source| RouteError::PreludeConstruction {
                    name: name.clone(),
                    source,
                })?;
            preludes.push(prelude);
        }

        let args = Self::resolve_args(callback.signature(), captures, &request, &server_info)?;

        Ok(Some(Route::new(callback.clone(), args, preludes)))
    }

    /// 按签名把捕获段、请求和服务器信息排成位置参数
    fn resolve_args(
        signature: &Signature,
        captures: Vec<String>,
        request: &Arc<Request>,
        server_info: &Arc<ServerInfo>,
    ) -> RouteResult<Args> {
        let mut captures = captures.into_iter();
        let mut args = Vec::with_capacity(signature.params().len());

        for param in signature.params() {
            let arg = match param {
                ParamKind::String => Arg::Str(captures.next().ok_or_else(|| {
                    RouteError::Internal("not enough captured segments for the callback".to_string())
                })?),
                ParamKind::StringVariadic => Arg::Strs(captures.by_ref().collect()),
                ParamKind::Request => Arg::Request(request.clone()),
                ParamKind::ServerInfo => Arg::ServerInfo(server_info.clone()),
            };
            args.push(arg);
        }

        Ok(Args::new(args))
    }
}
