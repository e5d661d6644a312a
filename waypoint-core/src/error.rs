//! 核心错误类型
//!
//! 配置加载和日志初始化失败都收敛到 [`CoreError`]。
//! 用户代码（处理器、工厂函数）的通用错误仍然使用 `anyhow::Result`，
//! 通过 `.context()` 添加上下文信息。

use std::path::PathBuf;
use thiserror::Error;

pub use anyhow::Result;

/// 核心基础设施错误
#[derive(Debug, Error)]
pub enum CoreError {
    /// 配置文件无法读取
    #[error("Failed to read config file {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 配置内容无法解析
    #[error("Failed to parse TOML config '{name}': {source}")]
    ConfigParse {
        name: String,
        #[source]
        source: toml::de::Error,
    },

    /// 配置值类型不符合预期
    #[error("Invalid config value for '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },

    /// 日志系统初始化失败（通常是重复初始化）
    #[error("Failed to initialize logging: {0}")]
    LoggingInitFailed(String),
}

/// 核心基础设施结果类型
pub type CoreResult<T> = std::result::Result<T, CoreError>;
