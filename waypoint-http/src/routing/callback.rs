//! 路由回调
//!
//! [`Callback`] 把一个可调用对象（函数或者“类型 + 方法”）、
//! 构造参数和前置处理器名称打包成一个不可变的单元。
//! 方法回调在注册时就被解析成闭包，调用时不需要任何反射。

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::error::{HandlerError, RoutingError, RoutingResult};
use super::signature::{ReturnKind, Signature};
use crate::message::{Request, Response};
use crate::server::ServerInfo;

/// 回调和前置处理器的返回值
pub enum Reply {
    Text(String),
    Display(Box<dyn fmt::Display + Send + Sync>),
    Response(Response),
}

impl Reply {
    /// 包装任何可格式化的值
    pub fn display(value: impl fmt::Display + Send + Sync + 'static) -> Self {
        Reply::Display(Box::new(value))
    }

    pub fn kind(&self) -> ReturnKind {
        match self {
            Reply::Text(_) => ReturnKind::String,
            Reply::Display(_) => ReturnKind::Stringable,
            Reply::Response(_) => ReturnKind::Response,
        }
    }

    /// 转换成响应
    ///
    /// 文本包装成 `text/html` 响应，响应对象原样返回
    pub fn into_response(self) -> Response {
        match self {
            Reply::Text(text) => Response::html(text),
            Reply::Display(value) => Response::html(value.to_string()),
            Reply::Response(response) => response,
        }
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Reply::Display(value) => f.debug_tuple("Display").field(&value.to_string()).finish(),
            Reply::Response(response) => f.debug_tuple("Response").field(response).finish(),
        }
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Text(text.to_string())
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Reply::Response(response)
    }
}

pub type HandlerResult<T = Reply> = Result<T, HandlerError>;

/// 解析好的单个位置参数
#[derive(Debug, Clone)]
pub enum Arg {
    Str(String),
    Strs(Vec<String>),
    Request(Arc<Request>),
    ServerInfo(Arc<ServerInfo>),
}

/// 按签名顺序解析好的参数列表
#[derive(Debug, Clone, Default)]
pub struct Args(Vec<Arg>);

impl Args {
    pub fn new(args: Vec<Arg>) -> Self {
        Self(args)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arg> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arg> {
        self.0.iter()
    }

    pub fn string(&self, index: usize) -> Option<&str> {
        match self.get(index) {
            Some(Arg::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn strings(&self, index: usize) -> Option<&[String]> {
        match self.get(index) {
            Some(Arg::Strs(s)) => Some(s),
            _ => None,
        }
    }

    pub fn request(&self, index: usize) -> Option<&Request> {
        match self.get(index) {
            Some(Arg::Request(r)) => Some(r),
            _ => None,
        }
    }

    pub fn server_info(&self, index: usize) -> Option<&ServerInfo> {
        match self.get(index) {
            Some(Arg::ServerInfo(s)) => Some(s),
            _ => None,
        }
    }
}

impl From<Vec<Arg>> for Args {
    fn from(args: Vec<Arg>) -> Self {
        Self(args)
    }
}

/// 可以由构造参数创建并作为方法回调接收者的类型
pub trait RouteTarget: Sized + 'static {
    fn construct(args: &[Value]) -> anyhow::Result<Self>;
}

type FunctionHandler = dyn Fn(&Args) -> HandlerResult + Send + Sync;
type MethodHandler = dyn Fn(&[Value], &Args) -> HandlerResult + Send + Sync;

/// 可调用对象
#[derive(Clone)]
pub enum Invocable {
    /// 直接调用的函数或闭包
    Function(Arc<FunctionHandler>),

    /// 每次调用时用构造参数创建接收者，再调用它的方法
    Method {
        type_name: &'static str,
        method: String,
        call: Arc<MethodHandler>,
    },
}

impl Invocable {
    pub fn function<F>(handler: F) -> Self
    where
        F: Fn(&Args) -> HandlerResult + Send + Sync + 'static,
    {
        Invocable::Function(Arc::new(handler))
    }

    pub fn method<T, F>(method: impl Into<String>, handler: F) -> Self
    where
        T: RouteTarget,
        F: Fn(&T, &Args) -> HandlerResult + Send + Sync + 'static,
    {
        let call = move |constructor_args: &[Value], args: &Args| -> HandlerResult {
            let receiver = T::construct(constructor_args)?;
            handler(&receiver, args)
        };

        Invocable::Method {
            type_name: std::any::type_name::<T>(),
            method: method.into(),
            call: Arc::new(call),
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self, Invocable::Method { .. })
    }
}

impl fmt::Debug for Invocable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocable::Function(_) => f.write_str("Function"),
            Invocable::Method {
                type_name, method, ..
            } => write!(f, "Method({}::{})", type_name, method),
        }
    }
}

/// 路由回调
#[derive(Debug, Clone)]
pub struct Callback {
    invocable: Invocable,
    signature: Signature,
    constructor_args: Option<Vec<Value>>,
    prelude_names: Vec<String>,
}

impl Callback {
    /// 创建回调
    ///
    /// 方法回调必须提供构造参数；前置处理器名称不能为空
    pub fn new(
        invocable: Invocable,
        signature: Signature,
        constructor_args: Option<Vec<Value>>,
        prelude_names: Vec<String>,
    ) -> RoutingResult<Self> {
        if let Invocable::Method {
            type_name, method, ..
        } = &invocable
        {
            if constructor_args.is_none() {
                return Err(RoutingError::MissingConstructorArgs {
                    type_name: *type_name,
                    method: method.clone(),
                });
            }
        }

        if let Some(name) = prelude_names.iter().find(|n| n.trim().is_empty()) {
            return Err(RoutingError::InvalidPreludeName(name.clone()));
        }

        Ok(Self {
            invocable,
            signature,
            constructor_args,
            prelude_names,
        })
    }

    pub fn invocable(&self) -> &Invocable {
        &self.invocable
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn constructor_args(&self) -> Option<&[Value]> {
        self.constructor_args.as_deref()
    }

    pub fn prelude_names(&self) -> &[String] {
        &self.prelude_names
    }

    pub fn invoke(&self, args: &Args) -> HandlerResult {
        match &self.invocable {
            Invocable::Function(handler) => handler(args),
            Invocable::Method { call, .. } => call(self.constructor_args().unwrap_or_default(), args),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use anyhow::Context;
    use serde_json::json;

    struct Greeter {
        greeting: String,
        name: String,
    }

    impl RouteTarget for Greeter {
        fn construct(args: &[Value]) -> anyhow::Result<Self> {
            let text = |i: usize| {
                args.get(i)
                    .and_then(Value::as_str)
                    .map(String::from)
                    .with_context(|| format!("missing string argument {}", i))
            };
            Ok(Self {
                greeting: text(0)?,
                name: text(1)?,
            })
        }
    }

    impl Greeter {
        fn greet(&self, _args: &Args) -> HandlerResult {
            Ok(format!("{}, {}!", self.greeting, self.name).into())
        }
    }

    #[test]
    fn test_function_callback() {
        let callback = Callback::new(
            Invocable::function(|args| Ok(format!("Hello, {}!", args.string(0).unwrap_or("?")).into())),
            Signature::text().string(),
            None,
            vec!["foo".to_string(), "bar".to_string()],
        )
        .unwrap();

        assert!(!callback.invocable().is_method());
        assert!(callback.constructor_args().is_none());
        assert_eq!(callback.prelude_names(), &["foo".to_string(), "bar".to_string()]);

        let reply = callback
            .invoke(&Args::new(vec![Arg::Str("John".to_string())]))
            .unwrap();
        assert_eq!(reply.kind(), ReturnKind::String);
        assert_eq!(reply.into_response().body().to_string(), "Hello, John!");
    }

    #[test]
    fn test_method_callback() {
        let callback = Callback::new(
            Invocable::method("greet", Greeter::greet),
            Signature::text(),
            Some(vec![json!("alpha"), json!("bravo")]),
            vec!["baz".to_string()],
        )
        .unwrap();

        assert!(callback.invocable().is_method());
        assert_eq!(callback.constructor_args().map(<[Value]>::len), Some(2));
        assert!(format!("{:?}", callback.invocable()).ends_with("Greeter::greet)"));

        let reply = callback.invoke(&Args::default()).unwrap();
        assert_eq!(reply.into_response().body().to_string(), "alpha, bravo!");
    }

    #[test]
    fn test_method_callback_requires_constructor_args() {
        let result = Callback::new(
            Invocable::method("greet", Greeter::greet),
            Signature::text(),
            None,
            Vec::new(),
        );
        assert!(matches!(
            result,
            Err(RoutingError::MissingConstructorArgs { method, .. }) if method == "greet"
        ));
    }

    #[test]
    fn test_construction_failure_is_a_handler_error() {
        let callback = Callback::new(
            Invocable::method("greet", Greeter::greet),
            Signature::text(),
            Some(vec![json!(1)]),
            Vec::new(),
        )
        .unwrap();

        assert!(matches!(
            callback.invoke(&Args::default()),
            Err(HandlerError::Other(_))
        ));
    }

    struct Locked;

    impl RouteTarget for Locked {
        fn construct(_args: &[Value]) -> anyhow::Result<Self> {
            let mut response = crate::message::Response::new();
            response.set_status(403, "Forbidden")?;
            Err(crate::routing::HttpException::new(response).into())
        }
    }

    impl Locked {
        fn open(&self, _args: &Args) -> HandlerResult {
            Ok("open".into())
        }
    }

    #[test]
    fn test_construction_can_abort_with_http_exception() {
        let callback = Callback::new(Invocable::method("open", Locked::open), Signature::text(), Some(Vec::new()), Vec::new())
            .unwrap();

        match callback.invoke(&Args::default()) {
            Err(HandlerError::Http(exception)) => assert_eq!(exception.status_code(), 403),
            other => panic!("expected an HTTP exception, got {:?}", other.map(|r| r.kind())),
        }
    }

    #[test]
    fn test_prelude_names_must_not_be_blank() {
        let result = Callback::new(
            Invocable::function(|_| Ok("x".into())),
            Signature::text(),
            None,
            vec!["prelude_1".to_string(), "  ".to_string()],
        );
        assert!(matches!(result, Err(RoutingError::InvalidPreludeName(_))));
    }

    #[test]
    fn test_args_accessors() {
        let request = Arc::new(Request::new());
        let args = Args::new(vec![
            Arg::Str("a".to_string()),
            Arg::Request(request),
            Arg::ServerInfo(Arc::new(ServerInfo::default())),
            Arg::Strs(vec!["b".to_string(), "c".to_string()]),
        ]);

        assert_eq!(args.len(), 4);
        assert_eq!(args.string(0), Some("a"));
        assert!(args.string(1).is_none());
        assert!(args.request(1).is_some());
        assert!(args.server_info(2).is_some());
        assert_eq!(args.strings(3).map(<[String]>::len), Some(2));
        assert!(args.get(4).is_none());
    }

    #[test]
    fn test_reply_conversion() {
        let reply = Reply::display(42);
        assert_eq!(reply.kind(), ReturnKind::Stringable);
        let response = reply.into_response();
        assert_eq!(response.header_line("content-type"), Some("text/html"));
        assert_eq!(response.body().to_string(), "42");

        let mut custom = Response::new();
        custom.set_body("as is");
        let response = Reply::from(custom).into_response();
        assert!(response.header_line("content-type").is_none());
        assert_eq!(response.body().to_string(), "as is");
    }
}
