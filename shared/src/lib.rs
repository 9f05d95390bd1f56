//! 市场客户端共享模型
//!
//! 定义客户端与后端共享的领域模型与线上数据结构：
//! - 会话身份（认证响应、规范化后的 Identity）
//! - 商品、购物车、订单、用户、日志、GDPR 请求
//! - `envelope`: 统一响应信封
//! - `protocol`: 强类型 API 请求定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod envelope;
pub mod protocol;

pub use envelope::{Envelope, Paged};

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 持久化存储键：访问令牌
pub const JWT_TOKEN_KEY: &str = "jwtToken";
/// 持久化存储键：刷新令牌
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
/// 持久化存储键：序列化后的用户身份
pub const CURRENT_USER_KEY: &str = "currentUser";

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

// =========================================================
// 会话身份 (Session Identity)
// =========================================================

/// 规范化后的用户身份
///
/// `is_admin` 是唯一权威字段：认证响应中顶层与嵌套两处的
/// 管理员标记在解析边界做一次 OR 合并，之后不再分散判断。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
}

/// 嵌套在认证响应中的用户对象（历史上可能携带管理员标记）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddedUser {
    pub is_admin: bool,
}

/// 登录接口返回的数据体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthData {
    pub token: String,
    pub refresh_token: String,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub user_id: String,
    /// 后端历史上会把管理员标记放在这里而不是顶层
    pub user: Option<EmbeddedUser>,
}

impl AuthData {
    /// 合并两处管理员标记，得到唯一权威值
    pub fn resolve_admin(&self) -> bool {
        self.user.as_ref().map(|u| u.is_admin).unwrap_or(false) || self.is_admin
    }

    /// 折叠为规范化身份
    pub fn into_identity(self) -> Identity {
        let is_admin = self.resolve_admin();
        Identity {
            user_id: self.user_id,
            username: self.username,
            email: self.email,
            is_admin,
        }
    }
}

// =========================================================
// 商品 (Items)
// =========================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemImage {
    pub image_data: String,
    pub file_name: String,
    pub content_type: String,
    pub image_order: u32,
}

/// 商品模型
///
/// 所有字段带默认值：购物车响应中嵌套的 item 可能只有部分字段。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Item {
    pub id_item: i64,
    pub item_category_id: i64,
    pub seller_user_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub stock_quantity: u32,
    pub price: f64,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_approved: bool,
    pub item_status: String,
    pub rejection_reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub images: Vec<ItemImage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub id_item_category: i64,
    pub category_name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
}

// =========================================================
// 购物车 (Cart)
// =========================================================

/// 购物车行的线上结构
///
/// 展示字段（标题、价格）同时出现在行级与嵌套 item 中，
/// 且嵌套 item 可能只有部分字段，规范化时行级优先。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartLineWire {
    pub id_cart_item: i64,
    pub item_id: Option<i64>,
    pub quantity: u32,
    pub item_title: Option<String>,
    pub item_price: Option<f64>,
    pub user_id: Option<i64>,
    pub item: Option<Item>,
}

/// GET /cart 的数据体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartPayload {
    pub items: Vec<CartLineWire>,
}

/// 规范化后的购物车行（本地缓存的投影）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: i64,
    pub item_id: i64,
    pub quantity: u32,
    /// 缓存时刻的单价
    pub price: f64,
    pub title: String,
    /// 嵌套 item 携带的库存，用于客户端数量校验
    pub stock_quantity: u32,
    pub user_id: Option<i64>,
}

impl CartLine {
    /// 从线上结构规范化：行级字段优先，缺失时回退到嵌套 item。
    pub fn from_wire(wire: CartLineWire) -> Self {
        let nested = wire.item.unwrap_or_default();
        let title = wire
            .item_title
            .filter(|t| !t.is_empty())
            .unwrap_or(nested.title);
        Self {
            id: wire.id_cart_item,
            item_id: wire.item_id.filter(|id| *id != 0).unwrap_or(nested.id_item),
            quantity: wire.quantity,
            price: wire
                .item_price
                .filter(|p| *p != 0.0)
                .unwrap_or(nested.price),
            title: if title.is_empty() {
                "Unknown Title".to_string()
            } else {
                title
            },
            stock_quantity: nested.stock_quantity,
            user_id: wire.user_id,
        }
    }

    /// 该行的小计
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

// =========================================================
// 订单 (Orders)
// =========================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderLine {
    pub id_order_item: i64,
    pub order_id: i64,
    pub item_id: i64,
    pub quantity: u32,
    pub price_at_order: f64,
    pub item_title: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    pub id_order: i64,
    pub order_number: String,
    pub user_id: i64,
    pub status_id: i64,
    pub order_date: Option<DateTime<Utc>>,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub order_notes: Option<String>,
    pub total_amount: f64,
    pub order_items: Vec<OrderLine>,
    pub created_at: Option<DateTime<Utc>>,
}

/// 下单时提交的购物车行
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCartLine {
    pub item_id: i64,
    pub quantity: u32,
}

// =========================================================
// 用户 (Users)
// =========================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub id_user: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub is_admin: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// 管理端用户列表行
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSummary {
    pub id_user: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub requested_anonymization: bool,
    pub anonymization_request_date: Option<DateTime<Utc>>,
    pub anonymization_reason: Option<String>,
    pub days_until_anonymization_deadline: Option<i64>,
    pub is_anonymization_urgent: bool,
}

// =========================================================
// 日志与 GDPR (Logs & GDPR)
// =========================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogEntry {
    pub id_log: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub details: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub level: String,
    pub message: String,
    pub exception: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GdprRequestKind {
    DataExport,
    Anonymization,
    Deletion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GdprRequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GdprRequest {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: GdprRequestKind,
    pub status: GdprRequestStatus,
    pub requested_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
}
