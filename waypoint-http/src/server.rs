//! 服务器与执行环境信息
//!
//! 对 CGI 风格的服务器变量（`HTTPS`、`HTTP_HOST`、`REQUEST_URI`、
//! `SERVER_PROTOCOL` 等）做只读封装

use std::collections::HashMap;

use http::Uri;
use serde_json::Value;

use crate::constants::{SERVER_HTTPS, SERVER_HTTP_HOST, SERVER_PROTOCOL, SERVER_REQUEST_URI};
use crate::error::{MessageError, MessageResult};

/// 服务器信息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerInfo {
    info: HashMap<String, Value>,
}

/// 类似 PHP `empty()` 的判定：null、false、0、空字符串和 "0" 视为空
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

impl ServerInfo {
    pub fn new<I, K, V>(info: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            info: info
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// 读取一个条目
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.info.get(key)
    }

    /// 读取一个条目，不存在时返回默认值
    pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.info.get(key).unwrap_or(default)
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn protocol(&self) -> Option<(&str, &str)> {
        self.get_str(SERVER_PROTOCOL)?.split_once('/')
    }

    /// 协议名称，例如 `HTTP/1.1` 中的 `HTTP`
    pub fn protocol_name(&self) -> Option<&str> {
        self.protocol().map(|(name, _)| name)
    }

    /// 协议版本，例如 `HTTP/1.1` 中的 `1.1`
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol().map(|(_, version)| version)
    }

    /// 根据服务器变量还原请求 URI
    ///
    /// `HTTPS` 非空时 scheme 为 `https`，否则使用小写的协议名称。
    /// 没有主机信息时只返回路径部分；什么都没有时返回 `/`。
    /// 有主机但没有 scheme 时返回 [`MessageError::MissingScheme`]。
    pub fn request_uri(&self) -> MessageResult<Uri> {
        let scheme = match self.get(SERVER_HTTPS) {
            Some(value) if !is_empty_value(value) => "https".to_string(),
            _ => self.protocol_name().unwrap_or_default().to_lowercase(),
        };
        let host = self.get_str(SERVER_HTTP_HOST).unwrap_or_default();
        let path = self.get_str(SERVER_REQUEST_URI).unwrap_or_default();

        let text = match (scheme.is_empty(), host.is_empty()) {
            (_, true) if path.is_empty() => return Ok(Uri::default()),
            (_, true) => path.to_string(),
            (true, false) => {
                return Err(MessageError::MissingScheme {
                    host: host.to_string(),
                })
            }
            (false, false) => format!("{}://{}{}", scheme, host, path),
        };

        text.parse().map_err(|source| MessageError::InvalidUri { uri: text, source })
    }
}
