use crate::envelope::{Ack, Paged};
use crate::{
    AuthData, CartLineWire, CartPayload, Category, GdprRequest, Item, ItemImage, LogEntry, Order,
    OrderCartLine, UserProfile, UserSummary,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// `PATH` is the static route; endpoints with identifiers or query parameters
/// override `path()` to render the concrete URL suffix.
pub trait ApiRequest: Serialize + DeserializeOwned {
    /// The response type carried in the envelope's `data` field.
    type Response: Serialize + DeserializeOwned;
    /// The URL path (or suffix).
    const PATH: &'static str;
    /// The HTTP method.
    const METHOD: HttpMethod;

    /// Concrete path for this request instance.
    fn path(&self) -> String {
        Self::PATH.to_string()
    }
}

/// Render query parameters as `?k=v&...`; empty when no pairs are set.
fn query(pairs: &[(&str, Option<String>)]) -> String {
    let joined: Vec<String> = pairs
        .iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| format!("{}={}", k, v)))
        .collect();
    if joined.is_empty() {
        String::new()
    } else {
        format!("?{}", joined.join("&"))
    }
}

// =========================================================
// Auth
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl ApiRequest for LoginRequest {
    type Response = AuthData;
    const PATH: &'static str = "/auth/login";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl ApiRequest for RegisterRequest {
    // Registration does not establish a session; the payload is ignored.
    type Response = Ack;
    const PATH: &'static str = "/auth/register";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

impl ApiRequest for ChangePasswordRequest {
    type Response = Ack;
    const PATH: &'static str = "/auth/change-password";
    const METHOD: HttpMethod = HttpMethod::Post;
}

// =========================================================
// Profile
// =========================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct GetProfileRequest;

impl ApiRequest for GetProfileRequest {
    type Response = UserProfile;
    const PATH: &'static str = "/users/profile";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdateProfileRequest(pub UserProfile);

impl ApiRequest for UpdateProfileRequest {
    type Response = UserProfile;
    const PATH: &'static str = "/users/profile";
    const METHOD: HttpMethod = HttpMethod::Put;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestAnonymizationRequest {
    pub reason: String,
    pub notes: String,
    pub confirm_request: bool,
}

impl ApiRequest for RequestAnonymizationRequest {
    type Response = Ack;
    const PATH: &'static str = "/users/profile/request-anonymization";
    const METHOD: HttpMethod = HttpMethod::Post;
}

// =========================================================
// Users (admin)
// =========================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersRequest {
    pub page_number: u32,
    pub page_size: u32,
}

impl ApiRequest for ListUsersRequest {
    type Response = Paged<UserSummary>;
    const PATH: &'static str = "/users";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!(
            "{}{}",
            Self::PATH,
            query(&[
                ("pageNumber", Some(self.page_number.to_string())),
                ("pageSize", Some(self.page_size.to_string())),
            ])
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetUserRequest {
    #[serde(skip)]
    pub user_id: i64,
}

impl ApiRequest for GetUserRequest {
    type Response = UserProfile;
    const PATH: &'static str = "/users";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("{}/{}", Self::PATH, self.user_id)
    }
}

/// Update payload shared by profile edits and admin promotion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUserPayload {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub is_admin: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(skip)]
    pub user_id: i64,
    #[serde(flatten)]
    pub payload: UpdateUserPayload,
}

impl ApiRequest for UpdateUserRequest {
    type Response = UserProfile;
    const PATH: &'static str = "/users";
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("{}/{}", Self::PATH, self.user_id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteUserRequest {
    #[serde(skip)]
    pub user_id: i64,
}

impl ApiRequest for DeleteUserRequest {
    type Response = Ack;
    const PATH: &'static str = "/users";
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("{}/{}", Self::PATH, self.user_id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApproveAnonymizationRequest {
    #[serde(skip)]
    pub user_id: i64,
}

impl ApiRequest for ApproveAnonymizationRequest {
    type Response = Ack;
    const PATH: &'static str = "/users";
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!("{}/{}/anonymize", Self::PATH, self.user_id)
    }
}

// =========================================================
// Categories
// =========================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ListCategoriesRequest;

impl ApiRequest for ListCategoriesRequest {
    type Response = Vec<Category>;
    const PATH: &'static str = "/categories";
    const METHOD: HttpMethod = HttpMethod::Get;
}

// =========================================================
// Items
// =========================================================

/// Paginated catalog search; parameters map onto query strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchItemsRequest {
    pub search_query: Option<String>,
    pub category_id: Option<i64>,
    pub sort_by: Option<String>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
}

impl ApiRequest for SearchItemsRequest {
    type Response = Paged<Item>;
    const PATH: &'static str = "/items";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!(
            "{}{}",
            Self::PATH,
            query(&[
                ("title", self.search_query.clone()),
                ("categoryId", self.category_id.map(|v| v.to_string())),
                ("sortBy", self.sort_by.clone()),
                ("pageNumber", self.page_number.map(|v| v.to_string())),
                ("pageSize", self.page_size.map(|v| v.to_string())),
            ])
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetItemRequest {
    #[serde(skip)]
    pub item_id: i64,
}

impl ApiRequest for GetItemRequest {
    type Response = Item;
    const PATH: &'static str = "/items";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("{}/{}", Self::PATH, self.item_id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeaturedItemsRequest;

impl ApiRequest for FeaturedItemsRequest {
    type Response = Vec<Item>;
    const PATH: &'static str = "/items/featured";
    const METHOD: HttpMethod = HttpMethod::Get;
}

/// Seller listing submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateItemRequest {
    pub title: String,
    pub description: String,
    // Historical field casing on the wire.
    #[serde(rename = "itemCategoryID")]
    pub item_category_id: i64,
    pub price: f64,
    pub stock_quantity: u32,
    pub is_active: bool,
    pub is_approved: bool,
    pub item_status: String,
    pub is_user_generated: bool,
    pub needs_approval: bool,
    pub agree_to_terms: bool,
    pub desired_commission_rate: f64,
    pub images: Vec<ItemImage>,
}

impl ApiRequest for CreateItemRequest {
    type Response = Item;
    const PATH: &'static str = "/items/seller";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateItemRequest {
    #[serde(skip)]
    pub item_id: i64,
    #[serde(flatten)]
    pub item: Item,
}

impl ApiRequest for UpdateItemRequest {
    type Response = Item;
    const PATH: &'static str = "/items/seller";
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("{}/{}", Self::PATH, self.item_id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteItemRequest {
    #[serde(skip)]
    pub item_id: i64,
}

impl ApiRequest for DeleteItemRequest {
    type Response = Ack;
    const PATH: &'static str = "/items/seller";
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("{}/{}", Self::PATH, self.item_id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MyItemsRequest;

impl ApiRequest for MyItemsRequest {
    type Response = Vec<Item>;
    const PATH: &'static str = "/items/seller/my-items";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingApprovalsRequest {
    pub page_number: u32,
    pub page_size: u32,
}

impl ApiRequest for PendingApprovalsRequest {
    type Response = Paged<Item>;
    const PATH: &'static str = "/items/pending-approval";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!(
            "{}{}",
            Self::PATH,
            query(&[
                ("pageNumber", Some(self.page_number.to_string())),
                ("pageSize", Some(self.page_size.to_string())),
            ])
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApproveItemRequest {
    #[serde(skip)]
    pub item_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ApiRequest for ApproveItemRequest {
    type Response = Ack;
    const PATH: &'static str = "/items";
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!("{}/{}/approve", Self::PATH, self.item_id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectItemRequest {
    #[serde(skip)]
    pub item_id: i64,
    pub rejection_reason: String,
    pub allow_resubmission: bool,
}

impl ApiRequest for RejectItemRequest {
    type Response = Ack;
    const PATH: &'static str = "/items";
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!("{}/{}/reject", Self::PATH, self.item_id)
    }
}

// =========================================================
// Cart
// =========================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct FetchCartRequest;

impl ApiRequest for FetchCartRequest {
    type Response = CartPayload;
    const PATH: &'static str = "/cart";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub item_id: i64,
    pub quantity: u32,
}

impl ApiRequest for AddToCartRequest {
    type Response = Ack;
    const PATH: &'static str = "/cart/items";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateCartLineRequest {
    #[serde(skip)]
    pub line_id: i64,
    pub quantity: u32,
}

impl ApiRequest for UpdateCartLineRequest {
    type Response = CartLineWire;
    const PATH: &'static str = "/cart";
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("{}/{}", Self::PATH, self.line_id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveCartLineRequest {
    #[serde(skip)]
    pub line_id: i64,
}

impl ApiRequest for RemoveCartLineRequest {
    type Response = Ack;
    const PATH: &'static str = "/cart";
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("{}/{}", Self::PATH, self.line_id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearCartRequest;

impl ApiRequest for ClearCartRequest {
    type Response = Ack;
    const PATH: &'static str = "/cart";
    const METHOD: HttpMethod = HttpMethod::Delete;
}

// =========================================================
// Orders
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub shipping_address: String,
    pub billing_address: String,
    pub cart_items: Vec<OrderCartLine>,
}

impl ApiRequest for CreateOrderRequest {
    type Response = Order;
    const PATH: &'static str = "/orders";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetOrderRequest {
    #[serde(skip)]
    pub order_id: i64,
}

impl ApiRequest for GetOrderRequest {
    type Response = Order;
    const PATH: &'static str = "/orders";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("{}/{}", Self::PATH, self.order_id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MyOrdersRequest;

impl ApiRequest for MyOrdersRequest {
    type Response = Paged<Order>;
    const PATH: &'static str = "/orders/my";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SellerOrdersRequest;

impl ApiRequest for SellerOrdersRequest {
    type Response = Vec<Order>;
    const PATH: &'static str = "/orders/seller/my";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AllOrdersRequest;

impl ApiRequest for AllOrdersRequest {
    type Response = Vec<Order>;
    const PATH: &'static str = "/orders/admin/all";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    #[serde(skip)]
    pub order_id: i64,
    pub status: String,
}

impl ApiRequest for UpdateOrderStatusRequest {
    type Response = Order;
    const PATH: &'static str = "/orders";
    const METHOD: HttpMethod = HttpMethod::Patch;

    fn path(&self) -> String {
        format!("{}/{}/status", Self::PATH, self.order_id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CancelOrderRequest {
    #[serde(skip)]
    pub order_id: i64,
}

impl ApiRequest for CancelOrderRequest {
    type Response = Order;
    const PATH: &'static str = "/orders";
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!("{}/{}/cancel", Self::PATH, self.order_id)
    }
}

// =========================================================
// Admin logs
// =========================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RecentLogsRequest {
    pub count: u32,
    pub level: Option<String>,
}

impl ApiRequest for RecentLogsRequest {
    type Response = Vec<LogEntry>;
    const PATH: &'static str = "/admin/logs";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!(
            "{}{}",
            Self::PATH,
            query(&[
                ("count", Some(self.count.to_string())),
                ("level", self.level.clone()),
            ])
        )
    }
}

// =========================================================
// GDPR
// =========================================================

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GdprExportRequest {}

impl ApiRequest for GdprExportRequest {
    type Response = GdprRequest;
    const PATH: &'static str = "/users/gdpr/export";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GdprAnonymizeRequest {}

impl ApiRequest for GdprAnonymizeRequest {
    type Response = GdprRequest;
    const PATH: &'static str = "/users/gdpr/anonymize";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GdprDeleteRequest {}

impl ApiRequest for GdprDeleteRequest {
    type Response = GdprRequest;
    const PATH: &'static str = "/users/gdpr/delete";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MyGdprRequestsRequest;

impl ApiRequest for MyGdprRequestsRequest {
    type Response = Vec<GdprRequest>;
    const PATH: &'static str = "/users/gdpr/my-requests";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PendingGdprRequestsRequest;

impl ApiRequest for PendingGdprRequestsRequest {
    type Response = Vec<GdprRequest>;
    const PATH: &'static str = "/users/gdpr/admin/pending";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApproveGdprRequest {
    #[serde(skip)]
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ApiRequest for ApproveGdprRequest {
    type Response = GdprRequest;
    const PATH: &'static str = "/users/gdpr/admin/approve";
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!("{}/{}", Self::PATH, self.request_id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RejectGdprRequest {
    #[serde(skip)]
    pub request_id: String,
    pub notes: String,
}

impl ApiRequest for RejectGdprRequest {
    type Response = GdprRequest;
    const PATH: &'static str = "/users/gdpr/admin/reject";
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!("{}/{}", Self::PATH, self.request_id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GdprDataExportRequest {
    #[serde(skip)]
    pub request_id: String,
}

impl ApiRequest for GdprDataExportRequest {
    // Free-form export blob; consumers persist it as-is.
    type Response = serde_json::Value;
    const PATH: &'static str = "/users/gdpr/admin/export";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("{}/{}", Self::PATH, self.request_id)
    }
}
