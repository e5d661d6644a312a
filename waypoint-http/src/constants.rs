//! 常量定义

// ==================== 响应默认值 ====================

/// 文本结果转换成响应时使用的内容类型
pub const HTML_CONTENT_TYPE: &str = "text/html";

// ==================== 路由 ====================

/// 路径中模式占位符的前缀，例如 `:int`
pub const PATTERN_TOKEN_PREFIX: char = ':';

/// 路径分隔符
pub const PATH_SEPARATOR: char = '/';

// ==================== 服务器环境键 ====================

/// 非空时表示请求通过 HTTPS 到达
pub const SERVER_HTTPS: &str = "HTTPS";

/// 请求的 Host 头部
pub const SERVER_HTTP_HOST: &str = "HTTP_HOST";

/// 请求目标（路径和查询字符串）
pub const SERVER_REQUEST_URI: &str = "REQUEST_URI";

/// 协议名称和版本，例如 `HTTP/1.1`
pub const SERVER_PROTOCOL: &str = "SERVER_PROTOCOL";
