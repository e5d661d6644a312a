use indexmap::IndexMap;

use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, StatusCode};

use super::{add_header, set_header, Body, Message, ProtocolVersion};
use crate::constants::HTML_CONTENT_TYPE;
use crate::cookie::ResponseCookie;
use crate::error::{MessageError, MessageResult};

/// HTTP 响应
///
/// 状态文本独立于状态码保存，允许使用自定义的原因短语
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    status_text: String,
    headers: HeaderMap,
    body: Body,
    protocol_version: Option<ProtocolVersion>,
    cookies: IndexMap<String, ResponseCookie>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            status_text: "OK".to_string(),
            headers: HeaderMap::new(),
            body: Body::empty(),
            protocol_version: None,
            cookies: IndexMap::new(),
        }
    }
}

impl Response {
    /// 空的 `200 OK` 响应
    pub fn new() -> Self {
        Self::default()
    }

    /// HTML 文本响应
    ///
    /// 设置 `Content-Length`（字节长度）和 `Content-Type: text/html`
    pub fn html(content: impl Into<String>) -> Self {
        let body = Body::from(content.into());
        let mut response = Self::default();
        response
            .headers
            .insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE));
        response.body = body;
        response
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// 设置状态码和状态文本
    ///
    /// 状态文本为空时使用标准原因短语
    pub fn set_status(&mut self, code: u16, text: impl Into<String>) -> MessageResult<&mut Self> {
        let status = StatusCode::from_u16(code).map_err(|_| MessageError::InvalidStatus(code))?;
        let text = text.into();
        self.status_text = if text.is_empty() {
            status.canonical_reason().unwrap_or_default().to_string()
        } else {
            text
        };
        self.status = status;
        Ok(self)
    }

    pub fn cookie(&self, name: &str) -> Option<&ResponseCookie> {
        self.cookies.get(name)
    }

    pub fn cookie_names(&self) -> Vec<&str> {
        self.cookies.keys().map(String::as_str).collect()
    }

    /// 设置 Cookie，同名的 Cookie 会被替换
    pub fn set_cookie(&mut self, cookie: ResponseCookie) -> &mut Self {
        self.cookies.insert(cookie.name.clone(), cookie);
        self
    }

    /// 每个 Cookie 对应的 `Set-Cookie` 头部值
    pub fn set_cookie_lines(&self) -> Vec<String> {
        self.cookies.values().map(ToString::to_string).collect()
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
}

impl Message for Response {
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
