//! 一次解析得到的路由
//!
//! [`Route`] 只在一次请求中有效：先依次执行前置处理器，没有被中断再执行回调，
//! 最后把结果转换成响应。[`HttpException`](super::HttpException) 在这里被恢复成它携带的响应。

use std::fmt;

use tracing::{error, info, warn};

use super::callback::{Args, Callback, HandlerResult, Reply};
use super::error::{HandlerError, RouteError, RouteResult};
use super::prelude::Prelude;
use crate::message::Response;

pub struct Route {
    callback: Callback,
    args: Args,
    preludes: Vec<Box<dyn Prelude>>,
}

impl Route {
    pub fn new(callback: Callback, args: Args, preludes: Vec<Box<dyn Prelude>>) -> Self {
        Self {
            callback,
            args,
            preludes,
        }
    }

    pub fn callback(&self) -> &Callback {
        &self.callback
    }

    pub fn args(&self) -> &Args {
        &self.args
    }

    /// 执行路由并生成响应
    pub fn run(mut self) -> RouteResult<Response> {
        match self.run_preludes() {
            Ok(Some(reply)) => return Ok(reply.into_response()),
            Ok(None) => {}
            Err(error) => return self.recover(error),
        }

        match self.callback.invoke(&self.args) {
            Ok(reply) => self.create_response(reply),
            Err(error) => self.recover(error),
        }
    }

    fn run_preludes(&mut self) -> HandlerResult<Option<Reply>> {
        for (index, prelude) in self.preludes.iter_mut().enumerate() {
            if let Some(reply) = prelude.run()? {
                let name = self.callback.prelude_names().get(index).map(String::as_str);
                info!(
                    callback = ?self.callback.invocable(),
                    prelude = name.unwrap_or("<unnamed>"),
                    "Route interrupted by prelude"
                );
                return Ok(Some(reply));
            }
        }
        Ok(None)
    }

    /// 检查回调结果是否在声明的返回类型中
    fn create_response(&self, reply: Reply) -> RouteResult<Response> {
        let kind = reply.kind();
        let signature = self.callback.signature();
        if !signature.allows(kind) {
            let allowed = signature
                .return_kinds()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("|");
            error!(
                callback = ?self.callback.invocable(),
                kind = %kind,
                allowed = %allowed,
                "Route callback returned an unexpected result"
            );
            return Err(RouteError::UnexpectedResult { kind, allowed });
        }

        Ok(reply.into_response())
    }

    fn recover(&self, error: HandlerError) -> RouteResult<Response> {
        match error {
            HandlerError::Http(exception) => {
                warn!(
                    callback = ?self.callback.invocable(),
                    status = exception.status_code(),
                    "Recovered HTTP exception"
                );
                Ok(exception.into_response())
            }
            HandlerError::Other(source) => {
                error!(
                    callback = ?self.callback.invocable(),
                    error = %source,
                    "Route handler failed"
                );
                Err(RouteError::Handler(source))
            }
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("callback", &self.callback)
            .field("args", &self.args)
            .field("preludes", &self.preludes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::routing::callback::{Arg, Invocable, RouteTarget};
    use crate::routing::error::HttpException;
    use crate::routing::signature::{ReturnKind, Signature};
    use anyhow::Context;
    use serde_json::{json, Value};

    /// f(x) = ax + b
    struct Linear {
        a: i64,
        b: i64,
    }

    impl RouteTarget for Linear {
        fn construct(args: &[Value]) -> anyhow::Result<Self> {
            let int = |i: usize| args.get(i).and_then(Value::as_i64).context("expected an integer");
            Ok(Self { a: int(0)?, b: int(1)? })
        }
    }

    impl Linear {
        fn x(args: &Args) -> anyhow::Result<i64> {
            Ok(args.string(0).context("missing x")?.parse()?)
        }

        fn f(&self, args: &Args) -> HandlerResult {
            let x = Self::x(args)?;
            Ok((self.a * x + self.b).to_string().into())
        }

        /// (ax + b) / x
        fn g(&self, args: &Args) -> HandlerResult {
            let x = Self::x(args)?;
            if x == 0 {
                let mut response = Response::new();
                response
                    .set_status(422, "Unprocessable Entity")
                    .context("invalid status")?
                    .set_body("Cannot divide by zero!");
                return Err(HttpException::new(response).into());
            }
            Ok(((self.a * x + self.b) / x).to_string().into())
        }
    }

    fn hello() -> Callback {
        Callback::new(
            Invocable::function(|args| Ok(format!("Hello, {}!", args.string(0).unwrap_or_default()).into())),
            Signature::text().string(),
            None,
            Vec::new(),
        )
        .unwrap()
    }

    fn linear(method: &str, a: i64, b: i64) -> Callback {
        let invocable = match method {
            "f" => Invocable::method("f", Linear::f),
            _ => Invocable::method("g", Linear::g),
        };
        Callback::new(invocable, Signature::text().string(), Some(vec![json!(a), json!(b)]), Vec::new()).unwrap()
    }

    fn text(value: &str) -> Args {
        Args::new(vec![Arg::Str(value.to_string())])
    }

    fn plain_response(body: &str) -> Response {
        let mut response = Response::new();
        response.set_body(body.to_string());
        response
    }

    fn assert_html(response: &Response, expected: &str) {
        assert_eq!(response.body().to_string(), expected);
        assert_eq!(response.header_line("Content-Length"), Some(expected.len().to_string().as_str()));
        assert_eq!(response.header_line("Content-Type"), Some("text/html"));
    }

    #[test]
    fn test_runs_callbacks() {
        let response = Route::new(hello(), text("John"), Vec::new()).run().unwrap();
        assert_html(&response, "Hello, John!");

        let response = Route::new(linear("f", 2, 1), text("5"), Vec::new()).run().unwrap();
        assert_html(&response, "11");
        let response = Route::new(linear("f", 2, 1), text("3"), Vec::new()).run().unwrap();
        assert_html(&response, "7");
        let response = Route::new(linear("f", 3, 5), text("5"), Vec::new()).run().unwrap();
        assert_html(&response, "20");
        let response = Route::new(linear("g", 1, 2), text("1"), Vec::new()).run().unwrap();
        assert_html(&response, "3");
    }

    #[test]
    fn test_response_results_pass_through() {
        let callback = Callback::new(
            Invocable::function(|args| {
                let sum: i64 = args
                    .strings(0)
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|v| v.parse::<i64>().ok())
                    .sum();
                Ok(plain_response(&format!("x + y = {}", sum)).into())
            }),
            Signature::new().strings().returns(ReturnKind::Response),
            None,
            Vec::new(),
        )
        .unwrap();

        let args = Args::new(vec![Arg::Strs(vec!["5".to_string(), "8".to_string()])]);
        let response = Route::new(callback, args, Vec::new()).run().unwrap();
        assert_eq!(response.body().to_string(), "x + y = 13");
        assert!(response.header_line("Content-Type").is_none());
    }

    #[test]
    fn test_preludes_can_interrupt() {
        let pass: Box<dyn Prelude> = Box::new(|| -> HandlerResult<Option<Reply>> { Ok(None) });
        let response = Route::new(hello(), text("Mary"), vec![pass]).run().unwrap();
        assert_html(&response, "Hello, Mary!");

        let interrupt: Box<dyn Prelude> =
            Box::new(|| -> HandlerResult<Option<Reply>> { Ok(Some("Interrupted!".into())) });
        let response = Route::new(hello(), text("Mary"), vec![interrupt]).run().unwrap();
        assert_html(&response, "Interrupted!");

        let interrupt_again: Box<dyn Prelude> = Box::new(|| -> HandlerResult<Option<Reply>> {
            Ok(Some(plain_response("Interrupted again!").into()))
        });
        let response = Route::new(hello(), text("Mary"), vec![interrupt_again]).run().unwrap();
        assert_eq!(response.body().to_string(), "Interrupted again!");
        assert!(response.header_line("Content-Length").is_none());
    }

    #[test]
    fn test_named_prelude_interrupts() {
        let callback = Callback::new(
            Invocable::function(|_| Ok("callback".into())),
            Signature::text(),
            None,
            vec!["auth".to_string()],
        )
        .unwrap();
        assert_eq!(callback.prelude_names(), &["auth".to_string()]);

        let preludes: Vec<Box<dyn Prelude>> = vec![
            Box::new(|| -> HandlerResult<Option<Reply>> { Ok(None) }),
            Box::new(|| -> HandlerResult<Option<Reply>> { Ok(Some("denied".into())) }),
        ];
        let response = Route::new(callback, Args::default(), preludes).run().unwrap();
        assert_html(&response, "denied");
    }

    #[test]
    fn test_interrupt_skips_remaining_steps() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let callback = Callback::new(
            Invocable::function(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok("callback".into())
            }),
            Signature::text(),
            None,
            Vec::new(),
        )
        .unwrap();

        let later = calls.clone();
        let preludes: Vec<Box<dyn Prelude>> = vec![
            Box::new(|| -> HandlerResult<Option<Reply>> { Ok(Some("stop".into())) }),
            Box::new(move || -> HandlerResult<Option<Reply>> {
                later.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }),
        ];

        let response = Route::new(callback, Args::default(), preludes).run().unwrap();
        assert_eq!(response.body().to_string(), "stop");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_http_exceptions_are_recovered() {
        let response = Route::new(linear("g", 1, 2), text("0"), Vec::new()).run().unwrap();
        assert_eq!(response.status_code(), 422);
        assert_eq!(response.status_text(), "Unprocessable Entity");
        assert_eq!(response.body().to_string(), "Cannot divide by zero!");
        assert!(response.header_line("Content-Type").is_none());

        let failing: Box<dyn Prelude> = Box::new(|| -> HandlerResult<Option<Reply>> {
            let mut response = Response::new();
            response.set_status(400, "Bad Request").context("invalid status")?;
            response.set_body("Exception!");
            Err(HttpException::new(response).into())
        });
        let response = Route::new(linear("g", 1, 2), text("0"), vec![failing]).run().unwrap();
        assert_eq!(response.status_code(), 400);
        assert_eq!(response.body().to_string(), "Exception!");
    }

    fn require_name(name: &str) -> anyhow::Result<&str> {
        if name.is_empty() {
            let mut response = Response::new();
            response.set_status(422, "Unprocessable Entity")?.set_body("Name is required");
            return Err(HttpException::new(response).into());
        }
        Ok(name)
    }

    #[test]
    fn test_http_exceptions_survive_anyhow_helpers() {
        let callback = Callback::new(
            Invocable::function(|args| {
                let name = require_name(args.string(0).unwrap_or_default())?;
                Ok(format!("Hi {}", name).into())
            }),
            Signature::text().string(),
            None,
            Vec::new(),
        )
        .unwrap();

        let response = Route::new(callback.clone(), text(""), Vec::new()).run().unwrap();
        assert_eq!(response.status_code(), 422);
        assert_eq!(response.body().to_string(), "Name is required");

        let response = Route::new(callback, text("Ana"), Vec::new()).run().unwrap();
        assert_html(&response, "Hi Ana");
    }

    #[test]
    fn test_other_errors_propagate() {
        let result = Route::new(linear("f", 2, 1), text("not a number"), Vec::new()).run();
        assert!(matches!(result, Err(RouteError::Handler(_))));
    }

    #[test]
    fn test_callback_must_return_declared_kind() {
        let callback = Callback::new(
            Invocable::function(|_| Ok(Response::new().into())),
            Signature::text(),
            None,
            Vec::new(),
        )
        .unwrap();

        let result = Route::new(callback, Args::default(), Vec::new()).run();
        assert!(matches!(
            result,
            Err(RouteError::UnexpectedResult { kind: ReturnKind::Response, ref allowed }) if allowed == "string"
        ));
    }
}
