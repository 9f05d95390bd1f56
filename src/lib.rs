//! 市场后端的原生客户端 SDK
//!
//! 采用显式装配的高内聚低耦合架构：
//! - `session`: 会话仓库（认证状态的唯一权威）
//! - `cart`: 购物车仓库（服务端确认状态的本地投影）
//! - `route`: 路由定义与访问判定（纯领域模型）
//! - `gateway` / `http`: 强类型请求派发与可替换传输层
//! - `services`: 其余 REST 资源的薄客户端
//!
//! 所有组件通过 [`MarketplaceClient`] 一次装配：没有全局单例，
//! 令牌槽、网关、各仓库之间的依赖都是显式注入的。

use std::sync::Arc;

use tracing::warn;

pub mod cart;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod route;
pub mod services;
pub mod session;
pub mod storage;

pub use cart::{CartStore, FLAT_SHIPPING_RATE};
pub use config::{ClientConfig, EnvAdapter, OsEnv};
pub use error::{MarketError, MarketErrorStatus, MarketResult};
pub use gateway::{HttpGateway, TokenCell};
pub use route::{AccessDecision, AppRoute, RouteClass};
pub use services::{
    AdminService, CategoriesService, GdprService, ItemsService, OrdersService, ProfileService,
};
pub use session::{Session, SessionStore};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};

// 共享模型的再导出，调用方不必直接依赖 shared crate
pub use marketplace_shared as shared;

use http::{HttpClient, ReqwestClient};
use marketplace_shared::protocol::CreateOrderRequest;
use marketplace_shared::{Category, Item, Order};

/// 装配完成的客户端
///
/// 一个进程（或多租户 BFF 中的一个用户会话）持有一个实例。
pub struct MarketplaceClient<S: SessionStorage> {
    gateway: Arc<HttpGateway>,
    session: Arc<SessionStore<S>>,
    cart: Arc<CartStore>,
    items: ItemsService,
    orders: OrdersService,
    profile: ProfileService,
    admin: AdminService,
    gdpr: GdprService,
    categories: CategoriesService,
}

impl<S: SessionStorage + 'static> MarketplaceClient<S> {
    /// 用生产传输层装配
    pub fn new(config: ClientConfig, storage: S) -> MarketResult<Self> {
        let client = Arc::new(ReqwestClient::new(config.timeout)?);
        Ok(Self::with_http_client(client, config, storage))
    }

    /// 用注入的传输层装配（测试或自定义栈）
    pub fn with_http_client(
        client: Arc<dyn HttpClient>,
        config: ClientConfig,
        storage: S,
    ) -> Self {
        let tokens = Arc::new(TokenCell::new());
        let gateway = Arc::new(HttpGateway::new(client, config, tokens.clone()));
        let session = Arc::new(SessionStore::new(storage, gateway.clone(), tokens));
        // 401 → 被动注销，环路通过弱引用闭合
        SessionStore::install_unauthorized_logout(&session);
        let cart = Arc::new(CartStore::new(gateway.clone()));

        Self {
            session,
            cart,
            items: ItemsService::new(gateway.clone()),
            orders: OrdersService::new(gateway.clone()),
            profile: ProfileService::new(gateway.clone()),
            admin: AdminService::new(gateway.clone()),
            gdpr: GdprService::new(gateway.clone()),
            categories: CategoriesService::new(gateway.clone()),
            gateway,
        }
    }

    // =========================================================
    // 组件访问
    // =========================================================

    pub fn gateway(&self) -> &Arc<HttpGateway> {
        &self.gateway
    }

    pub fn session(&self) -> &Arc<SessionStore<S>> {
        &self.session
    }

    pub fn cart(&self) -> &Arc<CartStore> {
        &self.cart
    }

    pub fn items(&self) -> &ItemsService {
        &self.items
    }

    pub fn orders(&self) -> &OrdersService {
        &self.orders
    }

    pub fn profile(&self) -> &ProfileService {
        &self.profile
    }

    pub fn admin(&self) -> &AdminService {
        &self.admin
    }

    pub fn gdpr(&self) -> &GdprService {
        &self.gdpr
    }

    pub fn categories(&self) -> &CategoriesService {
        &self.categories
    }

    // =========================================================
    // 组合操作
    // =========================================================

    /// 路由访问判定（组合会话状态与判定表）
    pub fn check_route(&self, route: &AppRoute) -> AccessDecision {
        route::evaluate(
            route,
            self.session.is_authenticated(),
            self.session.is_admin(),
        )
    }

    /// 首页数据：精选商品与分类并发拉取
    pub async fn landing(&self) -> MarketResult<(Vec<Item>, Vec<Category>)> {
        futures::future::try_join(self.items.featured(), self.categories.list()).await
    }

    /// 下单并清空购物车
    ///
    /// 订单已确认后清空失败不算下单失败：记录告警，
    /// 购物车留待下一次 `fetch_cart` 对齐。
    pub async fn place_order(&self, request: CreateOrderRequest) -> MarketResult<Order> {
        let order = self.orders.create(request).await?;
        if let Err(e) = self.cart.clear_cart().await {
            warn!(order_id = order.id_order, error = %e, "cart clear after order failed");
        }
        Ok(order)
    }
}

// =========================================================
// 装配级测试
// =========================================================
