// waypoint-core: 路由库的基础设施
//
// 提供与路由无关的公共能力：分层配置、基于 tracing 的日志初始化、核心错误类型

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;

pub use config::{
    ConfigValue, Environment, EnvironmentPropertySource, MapPropertySource, PropertySource,
    TomlPropertySource,
};
pub use constants::*;
pub use error::{CoreError, CoreResult, Result};
pub use logging::{LogFormat, LogLevel, LoggingConfig};

/// 应用启动时常用的导入
pub mod prelude {
    pub use crate::config::{ConfigValue, Environment, MapPropertySource, TomlPropertySource};
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::logging::LoggingConfig;
    pub use anyhow::{anyhow, Context};
}
