//! Cookie 模型
//!
//! 请求 Cookie 只有名称和值；响应 Cookie 额外携带 `Set-Cookie` 的各项属性。
//! 名称和值按 RFC 3986 做百分号编码（保留 `-` `_` `.` `~`）。

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::error::CookieError;

/// 百分号编码集合：除字母数字和 `-_.~` 外全部编码
const COOKIE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// HTTP-date 格式，例如 `Sat, 09 Mar 2024 23:24:25 GMT`
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

fn encode(text: &str) -> String {
    utf8_percent_encode(text, COOKIE_ENCODE_SET).to_string()
}

/// 表单风格解码：`+` 视为空格
fn decode(text: &str) -> String {
    let spaced = text.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// 请求中携带的 Cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCookie {
    pub name: String,
    pub value: String,
}

impl RequestCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// 解析 `Cookie:` 头部行，例如 `a=1; b=hello%20world`
    ///
    /// 没有 `=` 的片段会被忽略
    pub fn parse_header(line: &str) -> Vec<RequestCookie> {
        line.split(';')
            .filter_map(|pair| {
                let (name, value) = pair.split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some(RequestCookie::new(decode(name), decode(value.trim())))
            })
            .collect()
    }
}

impl fmt::Display for RequestCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", encode(&self.name), encode(&self.value))
    }
}

/// 跨站请求时的 Cookie 发送策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

impl FromStr for SameSite {
    type Err = CookieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Strict" => Ok(SameSite::Strict),
            "Lax" => Ok(SameSite::Lax),
            "None" => Ok(SameSite::None),
            other => Err(CookieError::InvalidSameSite(other.to_string())),
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 响应 Cookie，对应一行 `Set-Cookie` 头部
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponseCookie {
    pub name: String,
    pub value: String,

    /// 接收 Cookie 的主机
    pub domain: Option<String>,

    /// 过期时间（HTTP-date），设置了 `max_age` 时被忽略
    pub expires: Option<String>,

    /// 禁止脚本访问
    pub http_only: bool,

    /// 距离过期的秒数，优先级高于 `expires`
    pub max_age: Option<i64>,

    /// 使用分区存储
    pub partitioned: bool,

    /// 浏览器发送 Cookie 的路径（包含子路径）
    pub path: Option<String>,

    pub same_site: Option<SameSite>,

    /// 仅通过 HTTPS 发送
    pub secure: bool,
}

impl ResponseCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_expires(mut self, expires: impl Into<String>) -> Self {
        self.expires = Some(expires.into());
        self
    }

    /// 以时间点设置过期时间，格式化为 HTTP-date
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires = Some(at.format(HTTP_DATE_FORMAT).to_string());
        self
    }

    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    pub fn http_only(mut self, enabled: bool) -> Self {
        self.http_only = enabled;
        self
    }

    pub fn partitioned(mut self, enabled: bool) -> Self {
        self.partitioned = enabled;
        self
    }

    pub fn secure(mut self, enabled: bool) -> Self {
        self.secure = enabled;
        self
    }

    /// 解析一行 `Set-Cookie` 头部
    ///
    /// 属性名不区分大小写，值按表单风格解码
    pub fn parse(line: &str) -> Result<Self, CookieError> {
        let mut parts = line.split(';').map(str::trim);

        let first = parts.next().unwrap_or_default();
        let (name, value) = first.split_once('=').unwrap_or((first, ""));
        let name = name.trim();
        if name.is_empty() {
            return Err(CookieError::MissingName);
        }

        let mut cookie = ResponseCookie::new(name, decode(value.trim()));
        for part in parts.filter(|p| !p.is_empty()) {
            let (key, value) = match part.split_once('=') {
                Some((k, v)) => (k.trim(), Some(v.trim())),
                None => (part, None),
            };
            match (key.to_ascii_lowercase().as_str(), value) {
                ("domain", Some(v)) => cookie.domain = Some(v.to_string()),
                ("expires", Some(v)) => cookie.expires = Some(v.to_string()),
                ("max-age", Some(v)) => {
                    let seconds = v
                        .parse()
                        .map_err(|_| CookieError::InvalidMaxAge(v.to_string()))?;
                    cookie.max_age = Some(seconds);
                }
                ("path", Some(v)) => cookie.path = Some(v.to_string()),
                ("samesite", Some(v)) => cookie.same_site = Some(v.parse()?),
                ("httponly", _) => cookie.http_only = true,
                ("partitioned", _) => cookie.partitioned = true,
                ("secure", _) => cookie.secure = true,
                (other, _) => {
                    tracing::debug!(attribute = other, cookie = name, "Ignoring unknown cookie attribute");
                }
            }
        }

        Ok(cookie)
    }
}

impl fmt::Display for ResponseCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", encode(&self.name), encode(&self.value))?;

        if let Some(domain) = &self.domain {
            write!(f, "; Domain={}", domain)?;
        }
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={}", max_age)?;
        } else if let Some(expires) = &self.expires {
            write!(f, "; Expires={}", expires)?;
        }
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        if self.partitioned {
            f.write_str("; Partitioned")?;
        }
        if let Some(path) = &self.path {
            write!(f, "; Path={}", path)?;
        }
        if let Some(same_site) = self.same_site {
            write!(f, "; SameSite={}", same_site)?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }

        Ok(())
    }
}
