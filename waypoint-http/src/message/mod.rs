//! HTTP 消息模型
//!
//! [`Request`] 和 [`Response`] 各自独占自己的头部、消息体和 Cookie。
//! 头部按小写名称保存，同名的多行头部按插入顺序保留，
//! 与单行内逗号分隔的值列表是两种不同的东西。

mod body;
mod request;
mod response;
mod version;

pub use body::Body;
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use version::ProtocolVersion;

use http::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{MessageError, MessageResult};

/// 请求和响应共有的只读访问接口
pub trait Message {
    /// 全部头部
    fn headers(&self) -> &HeaderMap;

    /// 消息体
    fn body(&self) -> &Body;

    /// HTTP 协议版本，未设置时为 `None`
    fn protocol_version(&self) -> Option<ProtocolVersion>;

    /// 指定名称的第一行头部
    fn header_line(&self, name: &str) -> Option<&str> {
        self.headers().get(name).and_then(|v| v.to_str().ok())
    }

    /// 指定名称的所有头部行
    fn header_lines(&self, name: &str) -> Vec<&str> {
        self.headers()
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// 第一行头部按逗号拆分后的值列表
    fn header_as_list(&self, name: &str) -> Vec<String> {
        self.header_line(name).map(split_list).unwrap_or_default()
    }

    /// 所有头部名称，例如 `content-type` 显示为 `Content-Type`
    fn header_names(&self) -> Vec<String> {
        self.headers().keys().map(|k| beautify(k.as_str())).collect()
    }
}

fn split_list(line: &str) -> Vec<String> {
    line.split(',').map(|v| v.trim().to_string()).collect()
}

fn beautify(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

fn header_name(name: &str) -> MessageResult<HeaderName> {
    HeaderName::from_bytes(name.trim().to_lowercase().as_bytes()).map_err(|e| {
        MessageError::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        }
    })
}

fn header_value(name: &str, value: &str) -> MessageResult<HeaderValue> {
    HeaderValue::from_str(value.trim()).map_err(|e| MessageError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

/// 设置头部
///
/// `replace` 为 true 时替换所有已有行，否则追加新的一行
pub(crate) fn set_header(
    headers: &mut HeaderMap,
    name: &str,
    value: &str,
    replace: bool,
) -> MessageResult<()> {
    let key = header_name(name)?;
    let value = header_value(name, value)?;
    if replace {
        headers.insert(key, value);
    } else {
        headers.append(key, value);
    }
    Ok(())
}

/// 把值追加到第一行的逗号列表中，不存在时创建
pub(crate) fn add_header(headers: &mut HeaderMap, name: &str, value: &str) -> MessageResult<()> {
    let key = header_name(name)?;
    let mut lines: Vec<HeaderValue> = headers.get_all(&key).iter().cloned().collect();

    let Some(first) = lines.first() else {
        headers.insert(key, header_value(name, value)?);
        return Ok(());
    };

    let mut list = first
        .to_str()
        .map(split_list)
        .map_err(|e| MessageError::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
    list.push(value.trim().to_string());
    lines[0] = header_value(name, &list.join(", "))?;

    headers.remove(&key);
    for line in lines {
        headers.append(key.clone(), line);
    }
    Ok(())
}
