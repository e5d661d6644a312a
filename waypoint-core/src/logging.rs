//! 日志初始化
//!
//! 基于 `tracing-subscriber` 构建订阅者。配置依次来自默认值、[`Environment`]
//! 中的 `waypoint.logging.*` 键，以及 `RUST_LOG` / `LOG_LEVEL` / `LOG_FORMAT` 环境变量。

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::config::Environment;
use crate::constants::{LOGGING_FILTER, LOGGING_FORMAT, LOGGING_LEVEL, LOGGING_SHOW_TARGET};
use crate::error::{CoreError, CoreResult};

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(CoreError::InvalidConfigValue {
                key: LOGGING_LEVEL.to_string(),
                message: format!("unknown log level '{}'", s),
            }),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// 紧凑格式（默认）
    Compact,
    /// 完整格式
    Full,
    Json,
    /// 多行美化格式，适合开发时查看路由解析过程
    Pretty,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Full => "full",
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        }
    }
}

impl FromStr for LogFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "full" => Ok(LogFormat::Full),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(CoreError::InvalidConfigValue {
                key: LOGGING_FORMAT.to_string(),
                message: format!("unknown log format '{}'", s),
            }),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,

    /// 显示事件的目标（模块路径）
    pub show_target: bool,

    pub show_thread_ids: bool,

    /// 过滤指令，例如 `waypoint_http::routing=trace,info`，优先于 `level`
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            show_target: false,
            show_thread_ids: false,
            filter: None,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn show_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    pub fn show_thread_ids(mut self, show: bool) -> Self {
        self.show_thread_ids = show;
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// 只读取进程环境变量
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 读取 [`Environment`] 中的 `waypoint.logging.*`
    ///
    /// 无法解析的级别或格式返回 [`CoreError::InvalidConfigValue`]
    pub fn from_environment(env: &Environment) -> CoreResult<Self> {
        let mut config = Self::default();

        if let Some(level) = env.get_string(LOGGING_LEVEL) {
            config.level = level.parse()?;
        }
        if let Some(format) = env.get_string(LOGGING_FORMAT) {
            config.format = format.parse()?;
        }
        config.filter = env.get_string(LOGGING_FILTER);
        config.show_target = env.get_bool_or(LOGGING_SHOW_TARGET, false);

        Ok(config)
    }

    /// 用 `RUST_LOG`、`LOG_LEVEL`、`LOG_FORMAT` 覆盖当前值，无效的值被忽略
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(filter) = std::env::var("RUST_LOG") {
            self.filter = Some(filter);
        }
        if let Some(level) = std::env::var("LOG_LEVEL").ok().and_then(|s| s.parse().ok()) {
            self.level = level;
        }
        if let Some(format) = std::env::var("LOG_FORMAT").ok().and_then(|s| s.parse().ok()) {
            self.format = format;
        }
        self
    }

    fn env_filter(&self) -> EnvFilter {
        self.filter
            .as_deref()
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(self.level.as_str()))
    }

    /// 安装全局订阅者，只能成功一次
    pub fn init(self) -> CoreResult<()> {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.env_filter())
            .with_target(self.show_target)
            .with_thread_ids(self.show_thread_ids);

        let installed = match self.format {
            LogFormat::Compact => builder.compact().try_init(),
            LogFormat::Full => builder.try_init(),
            LogFormat::Json => builder.json().try_init(),
            LogFormat::Pretty => builder.pretty().try_init(),
        };

        installed.map_err(|e| CoreError::LoggingInitFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigValue, MapPropertySource};

    #[test]
    fn test_parse_levels_and_formats() {
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!(" WARNING ".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!(LogLevel::Trace.to_string(), "trace");
        assert_eq!(LogFormat::Json.to_string(), "json");

        assert!(matches!(
            "verbose".parse::<LogLevel>(),
            Err(CoreError::InvalidConfigValue { ref key, .. }) if key == LOGGING_LEVEL
        ));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_builder() {
        let config = LoggingConfig::new()
            .level(LogLevel::Debug)
            .format(LogFormat::Json)
            .show_target(true)
            .show_thread_ids(true)
            .filter("waypoint_http=trace");

        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.show_target);
        assert!(config.show_thread_ids);
        assert_eq!(config.filter.as_deref(), Some("waypoint_http=trace"));
    }

    #[test]
    fn test_from_environment() {
        let env = Environment::new().with_property_source(
            MapPropertySource::new("test")
                .with_property(LOGGING_LEVEL, ConfigValue::String("trace".into()))
                .with_property(LOGGING_FILTER, ConfigValue::String("waypoint_http=debug".into()))
                .with_property(LOGGING_SHOW_TARGET, ConfigValue::Bool(true)),
        );

        let config = LoggingConfig::from_environment(&env).unwrap();
        assert_eq!(config.level, LogLevel::Trace);
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.filter.as_deref(), Some("waypoint_http=debug"));
        assert!(config.show_target);

        assert_eq!(
            LoggingConfig::from_environment(&Environment::new()).unwrap(),
            LoggingConfig::default()
        );
    }

    #[test]
    fn test_from_environment_rejects_bad_values() {
        let env = Environment::new().with_property_source(
            MapPropertySource::new("test")
                .with_property(LOGGING_FORMAT, ConfigValue::String("bogus".into())),
        );
        assert!(LoggingConfig::from_environment(&env).is_err());
    }

    #[test]
    fn test_log_settings_deserialize() {
        #[derive(Deserialize)]
        struct Settings {
            level: LogLevel,
            format: LogFormat,
        }

        let settings: Settings = toml::from_str("level = \"debug\"\nformat = \"json\"").unwrap();
        assert_eq!(settings.level, LogLevel::Debug);
        assert_eq!(settings.format, LogFormat::Json);
    }
}
