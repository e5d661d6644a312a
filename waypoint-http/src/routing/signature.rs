//! 回调签名描述
//!
//! 路由回调不做运行时反射，由注册方显式声明参数和返回值的形状。
//! 参数按位置解析：
//!
//! - `string`：依次取下一个捕获的路径段
//! - `string...`：取剩余的所有捕获段，必须是最后一个参数
//! - `Request`：当前请求
//! - `ServerInfo`：服务器信息
//!
//! 返回值是 `string`、`Stringable`、`Response` 的并集。

use std::fmt;
use std::str::FromStr;

use super::error::{RoutingError, RoutingResult};

/// 参数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    String,
    StringVariadic,
    Request,
    ServerInfo,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::StringVariadic => "string...",
            ParamKind::Request => "Request",
            ParamKind::ServerInfo => "ServerInfo",
        }
    }
}

impl FromStr for ParamKind {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "string" => Ok(ParamKind::String),
            "string..." => Ok(ParamKind::StringVariadic),
            "Request" => Ok(ParamKind::Request),
            "ServerInfo" => Ok(ParamKind::ServerInfo),
            other => Err(RoutingError::InvalidParameterType(other.to_string())),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 返回值类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnKind {
    /// 字符串
    String,
    /// 任何可以格式化成字符串的值
    Stringable,
    /// 完整的响应对象
    Response,
}

impl ReturnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnKind::String => "string",
            ReturnKind::Stringable => "Stringable",
            ReturnKind::Response => "Response",
        }
    }
}

impl FromStr for ReturnKind {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "string" => Ok(ReturnKind::String),
            "Stringable" => Ok(ReturnKind::Stringable),
            "Response" => Ok(ReturnKind::Response),
            other => Err(RoutingError::InvalidReturnType(other.to_string())),
        }
    }
}

impl fmt::Display for ReturnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 回调签名
///
/// ```ignore
/// let signature = Signature::new().string().request().strings().returns(ReturnKind::String);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<ParamKind>,
    returns: Vec<ReturnKind>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// 只返回字符串、没有参数的签名
    pub fn text() -> Self {
        Self::new().returns(ReturnKind::String)
    }

    /// 从类型名称解析，例如 `(["string", "Request"], "string|Response")`
    pub fn parse(params: &[&str], returns: &str) -> RoutingResult<Self> {
        let params = params
            .iter()
            .map(|p| p.parse())
            .collect::<RoutingResult<Vec<ParamKind>>>()?;

        let mut signature = Self {
            params,
            returns: Vec::new(),
        };
        for kind in returns.split('|').filter(|t| !t.trim().is_empty()) {
            signature = signature.returns(kind.parse()?);
        }

        signature.validate()?;
        Ok(signature)
    }

    pub fn param(mut self, kind: ParamKind) -> Self {
        self.params.push(kind);
        self
    }

    pub fn string(self) -> Self {
        self.param(ParamKind::String)
    }

    pub fn strings(self) -> Self {
        self.param(ParamKind::StringVariadic)
    }

    pub fn request(self) -> Self {
        self.param(ParamKind::Request)
    }

    pub fn server_info(self) -> Self {
        self.param(ParamKind::ServerInfo)
    }

    /// 把一个类型加入返回值并集
    pub fn returns(mut self, kind: ReturnKind) -> Self {
        if !self.returns.contains(&kind) {
            self.returns.push(kind);
        }
        self
    }

    pub fn params(&self) -> &[ParamKind] {
        &self.params
    }

    pub fn return_kinds(&self) -> &[ReturnKind] {
        &self.returns
    }

    /// 返回值并集是否包含该类型
    pub fn allows(&self, kind: ReturnKind) -> bool {
        self.returns.contains(&kind)
    }

    /// 必须由路径捕获提供的字符串参数个数（不含可变参数）
    pub fn required_captures(&self) -> usize {
        self.params
            .iter()
            .filter(|p| **p == ParamKind::String)
            .count()
    }

    pub fn validate(&self) -> RoutingResult<()> {
        if self.returns.is_empty() {
            return Err(RoutingError::MissingReturnType);
        }

        let variadics = self
            .params
            .iter()
            .filter(|p| **p == ParamKind::StringVariadic)
            .count();
        if variadics > 1 {
            return Err(RoutingError::InvalidSignature(
                "only one variadic string parameter is allowed".to_string(),
            ));
        }
        if variadics == 1 && self.params.last() != Some(&ParamKind::StringVariadic) {
            return Err(RoutingError::InvalidSignature(
                "the variadic string parameter must be the last one".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<&str> = self.params.iter().map(ParamKind::as_str).collect();
        let returns: Vec<&str> = self.returns.iter().map(ReturnKind::as_str).collect();
        write!(f, "fn({}) -> {}", params.join(", "), returns.join("|"))
    }
}
