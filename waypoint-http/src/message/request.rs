use std::collections::HashMap;

use http::{HeaderMap, Method, Uri};
use indexmap::IndexMap;

use super::{add_header, set_header, Body, Message, ProtocolVersion};
use crate::cookie::RequestCookie;
use crate::error::{MessageError, MessageResult};

/// HTTP 请求
///
/// 既可以通过 [`RequestBuilder`] 描述一个收到的请求，
/// 也可以通过 `set_*` 方法逐步构造一个要发出的请求
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
    protocol_version: Option<ProtocolVersion>,
    cookies: IndexMap<String, RequestCookie>,
    parameters: HashMap<String, String>,
    post_variables: HashMap<String, String>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            method: Method::GET,
            uri: Uri::default(),
            headers: HeaderMap::new(),
            body: Body::empty(),
            protocol_version: None,
            cookies: IndexMap::new(),
            parameters: HashMap::new(),
            post_variables: HashMap::new(),
        }
    }
}

fn parse_method(method: &str) -> MessageResult<Method> {
    Method::from_bytes(method.trim().to_uppercase().as_bytes())
        .map_err(|_| MessageError::InvalidMethod(method.to_string()))
}

fn parse_uri(uri: &str) -> MessageResult<Uri> {
    uri.parse().map_err(|source| MessageError::InvalidUri {
        uri: uri.to_string(),
        source,
    })
}

impl Request {
    /// 空的 GET 请求，URI 为 `/`
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// 请求方法，总是大写
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// 去掉首尾斜杠后的请求路径，根路径为空字符串
    pub fn path(&self) -> &str {
        self.uri.path().trim_matches('/')
    }

    pub fn cookie(&self, name: &str) -> Option<&RequestCookie> {
        self.cookies.get(name)
    }

    pub fn cookie_names(&self) -> Vec<&str> {
        self.cookies.keys().map(String::as_str).collect()
    }

    /// URI 查询参数
    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    pub fn parameters_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.parameters
    }

    /// POST 表单变量
    pub fn post_variables(&self) -> &HashMap<String, String> {
        &self.post_variables
    }

    pub fn post_variable(&self, name: &str) -> Option<&str> {
        self.post_variables.get(name).map(String::as_str)
    }

    pub fn post_variables_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.post_variables
    }

    pub fn set_method(&mut self, method: &str) -> MessageResult<&mut Self> {
        self.method = parse_method(method)?;
        Ok(self)
    }

    pub fn set_uri(&mut self, uri: Uri) -> &mut Self {
        self.uri = uri;
        self
    }

    pub fn set_header(&mut self, name: &str, value: &str, replace: bool) -> MessageResult<&mut Self> {
        set_header(&mut self.headers, name, value, replace)?;
        Ok(self)
    }

    pub fn add_header(&mut self, name: &str, value: &str) -> MessageResult<&mut Self> {
        add_header(&mut self.headers, name, value)?;
        Ok(self)
    }

    pub fn set_body(&mut self, body: impl Into<Body>) -> &mut Self {
        self.body = body.into();
        self
    }

    pub fn set_protocol_version(&mut self, version: &str) -> MessageResult<&mut Self> {
        self.protocol_version = Some(version.parse()?);
        Ok(self)
    }

    pub fn set_cookie(&mut self, cookie: RequestCookie) -> &mut Self {
        self.cookies.insert(cookie.name.clone(), cookie);
        self
    }
}

impl Message for Request {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn protocol_version(&self) -> Option<ProtocolVersion> {
        self.protocol_version
    }
}

/// 收到的请求的构造器
///
/// 所有校验都推迟到 [`RequestBuilder::build`]
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: Option<String>,
    uri: Option<String>,
    headers: Vec<(String, String)>,
    body: Body,
    protocol_version: Option<String>,
    cookies: Vec<RequestCookie>,
    parameters: HashMap<String, String>,
    post_variables: HashMap<String, String>,
}

impl RequestBuilder {
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// 追加一行头部，同名的多次调用保留为多行
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    pub fn protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = Some(version.into());
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push(RequestCookie::new(name, value));
        self
    }

    /// 从 `Cookie:` 头部行读取 Cookie
    pub fn cookie_header(mut self, line: &str) -> Self {
        self.cookies.extend(RequestCookie::parse_header(line));
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn post_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.post_variables.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> MessageResult<Request> {
        let mut request = Request {
            body: self.body,
            parameters: self.parameters,
            post_variables: self.post_variables,
            ..Request::default()
        };

        if let Some(method) = &self.method {
            request.method = parse_method(method)?;
        }
        if let Some(uri) = &self.uri {
            request.uri = parse_uri(uri)?;
        }
        for (name, value) in &self.headers {
            set_header(&mut request.headers, name, value, false)?;
        }
        if let Some(version) = &self.protocol_version {
            request.protocol_version = Some(version.parse()?);
        }
        for cookie in self.cookies {
            request.cookies.insert(cookie.name.clone(), cookie);
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_incoming_request() {
        let request = Request::builder()
            .method("post")
            .uri("https://foobar.com/path/to/?page=2")
            .header("Accept", "text/html, application/json")
            .header("accept", "*/*")
            .header("X-Custom", "  padded  ")
            .body("name=John")
            .protocol_version("1.1")
            .cookie_header("theme=dark; session=abc")
            .parameter("page", "2")
            .post_variable("name", "John")
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.path(), "path/to");
        assert_eq!(request.uri().host(), Some("foobar.com"));
        assert_eq!(request.header_line("ACCEPT"), Some("text/html, application/json"));
        assert_eq!(request.header_lines("accept").len(), 2);
        assert_eq!(request.header_as_list("accept"), vec!["text/html", "application/json"]);
        assert_eq!(request.header_line("x-custom"), Some("padded"));
        assert_eq!(request.body().to_string(), "name=John");
        assert_eq!(request.protocol_version(), Some(ProtocolVersion::Http11));
        assert_eq!(request.cookie("session").map(|c| c.value.as_str()), Some("abc"));
        assert_eq!(request.cookie_names(), vec!["theme", "session"]);
        assert_eq!(request.parameter("page"), Some("2"));
        assert_eq!(request.post_variable("name"), Some("John"));
        assert!(request.cookie("missing").is_none());
    }

    #[test]
    fn test_build_rejects_invalid_input() {
        assert!(matches!(
            Request::builder().protocol_version("4").build(),
            Err(MessageError::UnknownProtocolVersion { .. })
        ));
        assert!(matches!(
            Request::builder().uri("http://[::1").build(),
            Err(MessageError::InvalidUri { .. })
        ));
        assert!(matches!(
            Request::builder().method("GE T").build(),
            Err(MessageError::InvalidMethod(_))
        ));
    }

    #[test]
    fn test_outgoing_request_setters() {
        let mut request = Request::new();
        request
            .set_method("delete")
            .unwrap()
            .set_uri(Uri::from_static("/items/7"))
            .set_body("payload")
            .set_cookie(RequestCookie::new("a", "b"));
        request.set_header("Content-Type", "text/plain", true).unwrap();
        request.add_header("content-type", "charset=utf-8").unwrap();
        request.set_protocol_version("2").unwrap();

        assert_eq!(request.method(), Method::DELETE);
        assert_eq!(request.path(), "items/7");
        assert_eq!(request.header_line("content-type"), Some("text/plain, charset=utf-8"));
        assert_eq!(request.header_names(), vec!["Content-Type".to_string()]);
        assert_eq!(request.protocol_version(), Some(ProtocolVersion::Http2));
        assert!(request.set_protocol_version("0.9").is_err());
        assert_eq!(request.body().len(), 7);
    }

    #[test]
    fn test_root_path_is_empty() {
        let request = Request::builder().uri("https://foobar.com/").build().unwrap();
        assert_eq!(request.path(), "");
        assert_eq!(Request::new().path(), "");
    }
}
