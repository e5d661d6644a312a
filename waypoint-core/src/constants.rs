//! 配置键常量定义
//!
//! 所有组件读取的配置键都在这里集中定义，避免在代码中硬编码字符串

// ==================== Logging 配置 ====================

/// 日志级别（trace/debug/info/warn/error）
pub const LOGGING_LEVEL: &str = "waypoint.logging.level";

/// 日志格式（compact/full/json/pretty）
pub const LOGGING_FORMAT: &str = "waypoint.logging.format";

/// 自定义过滤器，例如 "waypoint_http=debug"
pub const LOGGING_FILTER: &str = "waypoint.logging.filter";

/// 是否显示目标（模块路径）
pub const LOGGING_SHOW_TARGET: &str = "waypoint.logging.show-target";

// ==================== Router 配置 ====================

/// 路由捕获模式列表
///
/// 有序数组，每一项是 `{ name = "...", regex = "..." }` 表，
/// 数组顺序即模式的注册顺序（也就是匹配顺序）
pub const ROUTER_PATTERNS: &str = "waypoint.router.patterns";

