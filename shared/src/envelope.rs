//! 统一响应信封
//!
//! 后端所有接口都以 `{success, message, data, errors}` 包装响应；
//! 分页接口在 `data` 内再嵌一层分页结构。

use serde::{Deserialize, Serialize};

/// 标准响应信封
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
    /// 校验失败等场景的自由格式错误载荷
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

impl<T> Envelope<T> {
    /// 业务层面的成功位
    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// 分页数据体（信封 `data` 字段内的结构）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    pub data: Vec<T>,
    pub total_count: u64,
    pub page_number: u32,
    pub page_size: u32,
    pub total_pages: u32,
    #[serde(default)]
    pub has_next_page: Option<bool>,
    #[serde(default)]
    pub has_previous_page: Option<bool>,
}

/// 仅确认成败、内容被忽略的响应数据体
///
/// 部分写接口的 `data` 可能是 null、对象或其他任意形状，
/// 调用方只关心信封的 `success` 位。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ack(#[serde(default)] pub serde_json::Value);
