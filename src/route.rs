//! 路由定义与访问判定 - 领域模型
//!
//! 纯粹的业务逻辑层，不依赖任何 UI 框架的路由机制。
//! 定义应用的所有可导航路由、各自的访问级别，以及一张
//! 纯函数的判定表：给定 (路由级别, 是否认证, 是否管理员)
//! 返回放行或重定向目标。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 着陆页（仅未认证用户，默认路由）
    #[default]
    Landing,
    /// 登录页（仅未认证用户）
    Login,
    /// 注册页（仅未认证用户）
    Register,
    /// 商品列表（需要认证）
    Items,
    /// 商品详情（需要认证）
    ItemDetails(i64),
    /// 购物车（需要认证）
    Cart,
    /// 结算（需要认证）
    Checkout,
    /// 下单确认（需要认证）
    OrderConfirmation(i64),
    /// 历史订单（需要认证）
    Orders,
    /// 个人资料（需要认证）
    Profile,
    /// 管理端：用户管理（需要管理员）
    AdminUsers,
    /// 管理端：商品管理（需要管理员）
    AdminItems,
    /// 管理端：系统日志（需要管理员）
    AdminLogs,
    /// 管理端：待审批商品（需要管理员）
    AdminPendingApprovals,
    /// 页面未找到
    NotFound,
}

/// 路由的访问级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// 仅未认证用户可见（着陆、登录、注册）
    PublicOnly,
    /// 需要认证
    RequiresAuth,
    /// 需要管理员
    RequiresAdmin,
}

/// 单次导航的判定结果，不跨导航持久化
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Redirect(AppRoute),
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Self::Landing,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["items"] => Self::Items,
            ["items", id] => match id.parse() {
                Ok(id) => Self::ItemDetails(id),
                Err(_) => Self::NotFound,
            },
            ["cart"] => Self::Cart,
            ["checkout"] => Self::Checkout,
            ["order-confirmation", id] => match id.parse() {
                Ok(id) => Self::OrderConfirmation(id),
                Err(_) => Self::NotFound,
            },
            ["orders"] => Self::Orders,
            ["profile"] => Self::Profile,
            ["admin", "users"] => Self::AdminUsers,
            ["admin", "items"] => Self::AdminItems,
            ["admin", "logs"] => Self::AdminLogs,
            ["admin", "pending-approvals"] => Self::AdminPendingApprovals,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Landing => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Items => "/items".to_string(),
            Self::ItemDetails(id) => format!("/items/{}", id),
            Self::Cart => "/cart".to_string(),
            Self::Checkout => "/checkout".to_string(),
            Self::OrderConfirmation(id) => format!("/order-confirmation/{}", id),
            Self::Orders => "/orders".to_string(),
            Self::Profile => "/profile".to_string(),
            Self::AdminUsers => "/admin/users".to_string(),
            Self::AdminItems => "/admin/items".to_string(),
            Self::AdminLogs => "/admin/logs".to_string(),
            Self::AdminPendingApprovals => "/admin/pending-approvals".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// 路由的访问级别
    pub fn access_class(&self) -> RouteClass {
        match self {
            Self::Landing | Self::Login | Self::Register | Self::NotFound => RouteClass::PublicOnly,
            Self::Items
            | Self::ItemDetails(_)
            | Self::Cart
            | Self::Checkout
            | Self::OrderConfirmation(_)
            | Self::Orders
            | Self::Profile => RouteClass::RequiresAuth,
            Self::AdminUsers | Self::AdminItems | Self::AdminLogs | Self::AdminPendingApprovals => {
                RouteClass::RequiresAdmin
            }
        }
    }

    /// 认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 认证用户的默认落点
    pub fn authenticated_landing() -> Self {
        Self::Items
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

/// **核心守卫逻辑：访问判定表**
///
/// 纯函数：无 I/O、无副作用。会话中令牌是否过期在这里不可见，
/// 持有令牌即视为已认证，失效由后续请求的 401 暴露。
///
/// | 级别          | 未认证       | 已认证非管理员 | 管理员  |
/// |---------------|--------------|----------------|---------|
/// | PublicOnly    | 放行         | → 商品列表     | → 商品列表 |
/// | RequiresAuth  | → 登录       | 放行           | 放行    |
/// | RequiresAdmin | → 登录       | → 商品列表     | 放行    |
pub fn decide(class: RouteClass, is_authenticated: bool, is_admin: bool) -> AccessDecision {
    match class {
        RouteClass::PublicOnly => {
            if is_authenticated {
                AccessDecision::Redirect(AppRoute::authenticated_landing())
            } else {
                AccessDecision::Allow
            }
        }
        RouteClass::RequiresAuth => {
            if is_authenticated {
                AccessDecision::Allow
            } else {
                AccessDecision::Redirect(AppRoute::auth_failure_redirect())
            }
        }
        RouteClass::RequiresAdmin => {
            if !is_authenticated {
                AccessDecision::Redirect(AppRoute::auth_failure_redirect())
            } else if is_admin {
                AccessDecision::Allow
            } else {
                AccessDecision::Redirect(AppRoute::authenticated_landing())
            }
        }
    }
}

/// 按路由实例判定（组合 `access_class` 与判定表）
pub fn evaluate(route: &AppRoute, is_authenticated: bool, is_admin: bool) -> AccessDecision {
    decide(route.access_class(), is_authenticated, is_admin)
}

// =========================================================
// 单元测试
// =========================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_table_matches_all_nine_combinations() {
        use AccessDecision::{Allow, Redirect};

        let anonymous = (false, false);
        let member = (true, false);
        let admin = (true, true);

        let cases = [
            (RouteClass::PublicOnly, anonymous, Allow),
            (
                RouteClass::PublicOnly,
                member,
                Redirect(AppRoute::Items),
            ),
            (RouteClass::PublicOnly, admin, Redirect(AppRoute::Items)),
            (
                RouteClass::RequiresAuth,
                anonymous,
                Redirect(AppRoute::Login),
            ),
            (RouteClass::RequiresAuth, member, Allow),
            (RouteClass::RequiresAuth, admin, Allow),
            (
                RouteClass::RequiresAdmin,
                anonymous,
                Redirect(AppRoute::Login),
            ),
            (
                RouteClass::RequiresAdmin,
                member,
                Redirect(AppRoute::Items),
            ),
            (RouteClass::RequiresAdmin, admin, Allow),
        ];

        for (class, (is_auth, is_admin), expected) in cases {
            assert_eq!(
                decide(class, is_auth, is_admin),
                expected,
                "class {:?} auth {} admin {}",
                class,
                is_auth,
                is_admin
            );
        }
    }

    #[test]
    fn paths_round_trip() {
        let routes = [
            AppRoute::Landing,
            AppRoute::Login,
            AppRoute::Register,
            AppRoute::Items,
            AppRoute::ItemDetails(7),
            AppRoute::Cart,
            AppRoute::Checkout,
            AppRoute::OrderConfirmation(12),
            AppRoute::Orders,
            AppRoute::Profile,
            AppRoute::AdminUsers,
            AppRoute::AdminItems,
            AppRoute::AdminLogs,
            AppRoute::AdminPendingApprovals,
        ];
        for route in routes {
            assert_eq!(AppRoute::from_path(&route.to_path()), route);
        }
    }

    #[test]
    fn unknown_paths_fall_back_to_not_found() {
        assert_eq!(AppRoute::from_path("/nope"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/admin/unknown"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/items/abc"), AppRoute::NotFound);
    }

    #[test]
    fn trailing_slashes_are_tolerated() {
        assert_eq!(AppRoute::from_path("/items/"), AppRoute::Items);
        assert_eq!(AppRoute::from_path("/"), AppRoute::Landing);
    }

    #[test]
    fn route_classes_cover_the_navigation_map() {
        assert_eq!(AppRoute::Landing.access_class(), RouteClass::PublicOnly);
        assert_eq!(AppRoute::Login.access_class(), RouteClass::PublicOnly);
        assert_eq!(AppRoute::Cart.access_class(), RouteClass::RequiresAuth);
        assert_eq!(
            AppRoute::ItemDetails(3).access_class(),
            RouteClass::RequiresAuth
        );
        assert_eq!(
            AppRoute::AdminLogs.access_class(),
            RouteClass::RequiresAdmin
        );
    }

    #[test]
    fn evaluate_combines_class_and_table() {
        assert_eq!(
            evaluate(&AppRoute::AdminUsers, true, false),
            AccessDecision::Redirect(AppRoute::Items)
        );
        assert_eq!(evaluate(&AppRoute::Login, false, false), AccessDecision::Allow);
        assert_eq!(
            evaluate(&AppRoute::Login, true, false),
            AccessDecision::Redirect(AppRoute::Items)
        );
    }
}
