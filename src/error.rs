use std::fmt;

use serde::{Deserialize, Serialize};

// =========================================================
// 错误状态枚举
// =========================================================

/// 错误状态枚举
/// 对应规格化后的失败分类（见网关的消息提取规则）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketErrorStatus {
    /// 网络层失败，未收到任何响应
    Transport,
    /// 非 2xx 的服务端拒绝
    Server,
    /// 2xx 但信封 success=false 的业务拒绝
    Business,
    /// 客户端前置条件校验失败（请求未发出）
    InvalidInput,
    /// 401 类认证拒绝
    Unauthorized,
    /// JSON 解析或序列化错误
    Serialization,
    /// 本地持久化存储读写失败
    Storage,
}

impl MarketErrorStatus {
    pub fn error_code(&self) -> &'static str {
        match self {
            MarketErrorStatus::Transport => "TRANSPORT_ERROR",
            MarketErrorStatus::Server => "SERVER_REJECTED",
            MarketErrorStatus::Business => "BUSINESS_REJECTED",
            MarketErrorStatus::InvalidInput => "INVALID_INPUT",
            MarketErrorStatus::Unauthorized => "UNAUTHORIZED",
            MarketErrorStatus::Serialization => "JSON_PARSE_ERROR",
            MarketErrorStatus::Storage => "STORAGE_ERROR",
        }
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 结构化的错误追踪片段
/// 记录错误发生时的操作和相关细节
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorSpan {
    /// 操作名称，如 "gateway.send", "session.persist"
    pub operation: String,
    /// 额外的细节信息，如路径、存储键等
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorSpan {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: None,
        }
    }

    pub fn with_detail(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: Some(detail.into()),
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// Client Domain Errors
///
/// 高内聚的错误定义，包含：
/// - status: 错误类型/语义
/// - message: 规格化后的人类可读消息
/// - http_status: 触发错误的 HTTP 状态码（仅服务端拒绝时存在）
/// - source: 原始错误（可选，用于错误链）
/// - spans: 结构化的调用追踪栈
#[derive(Debug)]
pub struct MarketError {
    pub status: MarketErrorStatus,
    pub message: String,
    http_status: Option<u16>,
    /// 原始错误源（供调试用，不参与序列化）
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// 结构化的操作追踪
    spans: Vec<ErrorSpan>,
}

impl MarketError {
    pub fn new(status: MarketErrorStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            http_status: None,
            source: None,
            spans: Vec::new(),
        }
    }

    // --- Convenience constructors ---

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(MarketErrorStatus::Transport, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(MarketErrorStatus::Server, message)
    }

    pub fn business(message: impl Into<String>) -> Self {
        Self::new(MarketErrorStatus::Business, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(MarketErrorStatus::InvalidInput, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(MarketErrorStatus::Unauthorized, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(MarketErrorStatus::Serialization, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(MarketErrorStatus::Storage, message)
    }

    // --- Context builders ---

    /// 添加操作追踪（无额外细节）
    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::new(operation));
        self
    }

    /// 添加操作追踪（带额外细节）
    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::with_detail(operation, detail));
        self
    }

    /// 记录触发错误的 HTTP 状态码
    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    /// 设置原始错误源
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // --- Accessors ---

    /// 获取机器可读的错误代码
    pub fn error_code(&self) -> &'static str {
        self.status.error_code()
    }

    /// 获取错误消息
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 触发错误的 HTTP 状态码
    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    /// 是否为 401 类认证拒绝
    pub fn is_unauthorized(&self) -> bool {
        self.status == MarketErrorStatus::Unauthorized
    }

    /// 获取操作追踪栈
    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }
}

// =========================================================
// Display & Error trait 实现
// =========================================================

impl fmt::Display for MarketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message)?;

        if !self.spans.is_empty() {
            write!(f, " | trace: ")?;
            for (i, span) in self.spans.iter().enumerate() {
                if i > 0 {
                    write!(f, " -> ")?;
                }
                write!(f, "{}", span.operation)?;
                if let Some(detail) = &span.detail {
                    write!(f, "({})", detail)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for MarketError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub type MarketResult<T> = std::result::Result<T, MarketError>;

impl From<serde_json::Error> for MarketError {
    fn from(e: serde_json::Error) -> Self {
        MarketError::serialization(e.to_string())
    }
}

// =========================================================
// 失败消息提取
// =========================================================

/// 按固定优先级从失败响应中提取展示消息：
/// 1. 响应体中的 `message` 字段
/// 2. `errors` 字段拼接
/// 3. 响应体本身是纯字符串时取原文
/// 4. HTTP 状态短语
/// 5. 通用兜底文案
///
/// 所有 Store 的错误路径共用这一条规则。
pub fn normalize_failure_message(body: &str, status: u16) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match &value {
            serde_json::Value::Object(map) => {
                if let Some(msg) = map.get("message").and_then(|v| v.as_str()) {
                    if !msg.is_empty() {
                        return msg.to_string();
                    }
                }
                if let Some(errors) = map.get("errors") {
                    if let Some(joined) = join_errors(errors) {
                        return joined;
                    }
                }
            }
            serde_json::Value::String(s) if !s.is_empty() => {
                return s.clone();
            }
            _ => {}
        }
    } else if !body.trim().is_empty() {
        // 非 JSON 的纯文本响应体
        return body.trim().to_string();
    }

    match status_text(status) {
        Some(text) => text.to_string(),
        None => "An unknown error occurred".to_string(),
    }
}

/// 把自由格式的 `errors` 载荷拼成一行
fn join_errors(errors: &serde_json::Value) -> Option<String> {
    let parts: Vec<String> = match errors {
        serde_json::Value::Array(items) => items.iter().map(stringify_error).collect(),
        serde_json::Value::Object(map) => map
            .values()
            .flat_map(|v| match v {
                serde_json::Value::Array(items) => {
                    items.iter().map(stringify_error).collect::<Vec<_>>()
                }
                other => vec![stringify_error(other)],
            })
            .collect(),
        serde_json::Value::String(s) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    };

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

fn stringify_error(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// HTTP 状态短语（仅覆盖后端实际会返回的状态）
fn status_text(status: u16) -> Option<&'static str> {
    match status {
        400 => Some("Bad Request"),
        401 => Some("Unauthorized"),
        403 => Some("Forbidden"),
        404 => Some("Not Found"),
        405 => Some("Method Not Allowed"),
        409 => Some("Conflict"),
        422 => Some("Unprocessable Entity"),
        429 => Some("Too Many Requests"),
        500 => Some("Internal Server Error"),
        502 => Some("Bad Gateway"),
        503 => Some("Service Unavailable"),
        504 => Some("Gateway Timeout"),
        _ => None,
    }
}

// =========================================================
// 单元测试
// =========================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_field_takes_precedence_over_errors() {
        let body = json!({
            "success": false,
            "message": "Invalid credentials",
            "errors": ["username missing", "password missing"]
        })
        .to_string();
        assert_eq!(normalize_failure_message(&body, 400), "Invalid credentials");
    }

    #[test]
    fn errors_list_is_joined_when_message_absent() {
        let body = json!({
            "success": false,
            "errors": ["username missing", "password missing"]
        })
        .to_string();
        assert_eq!(
            normalize_failure_message(&body, 400),
            "username missing; password missing"
        );
    }

    #[test]
    fn errors_map_values_are_flattened() {
        let body = json!({
            "errors": { "username": ["required"], "password": ["too short"] }
        })
        .to_string();
        let msg = normalize_failure_message(&body, 400);
        assert!(msg.contains("required"));
        assert!(msg.contains("too short"));
    }

    #[test]
    fn plain_string_body_is_used_verbatim() {
        assert_eq!(
            normalize_failure_message("upstream exploded", 502),
            "upstream exploded"
        );
        // 响应体是 JSON 字符串时同样取原文
        assert_eq!(
            normalize_failure_message("\"quota exceeded\"", 429),
            "quota exceeded"
        );
    }

    #[test]
    fn falls_back_to_status_text_then_generic() {
        let body = json!({ "success": false }).to_string();
        assert_eq!(normalize_failure_message(&body, 404), "Not Found");
        assert_eq!(
            normalize_failure_message(&body, 599),
            "An unknown error occurred"
        );
    }

    #[test]
    fn display_includes_code_and_trace() {
        let err = MarketError::server("Not Found")
            .with_http_status(404)
            .in_op_with("gateway.send", "/items/7");
        let rendered = err.to_string();
        assert!(rendered.starts_with("[SERVER_REJECTED] Not Found"));
        assert!(rendered.contains("gateway.send(/items/7)"));
        assert_eq!(err.http_status(), Some(404));
    }
}
