//! 会话仓库
//!
//! 认证状态的唯一权威：登录、注销、持久化恢复、订阅通知。
//! 与路由判定解耦——路由层只消费 `is_authenticated`/`is_admin`
//! 两个只读视图。
//!
//! 持久化不变式：访问令牌、刷新令牌、身份三个键要么同时写入
//! 要么一个不留；任何一个写失败都会回滚到调用前的状态，内存
//! 状态不动，调用方拿到存储错误。

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{MarketError, MarketResult};
use crate::gateway::{HttpGateway, TokenCell};
use crate::storage::SessionStorage;
use marketplace_shared::protocol::{LoginRequest, RegisterRequest};
use marketplace_shared::{CURRENT_USER_KEY, Identity, JWT_TOKEN_KEY, REFRESH_TOKEN_KEY};

/// 一份完整的会话凭据
///
/// `identity` 与 `access_token` 同生共死：两者只会一起出现。
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub identity: Identity,
}

pub type SessionSubscriber = Box<dyn Fn(Option<&Identity>) + Send + Sync>;

pub struct SessionStore<S: SessionStorage> {
    storage: S,
    gateway: Arc<HttpGateway>,
    /// 与网关共享的令牌槽；本仓库是唯一写入方
    tokens: Arc<TokenCell>,
    current: Mutex<Option<Session>>,
    subscribers: Mutex<Vec<(u64, SessionSubscriber)>>,
    next_subscriber_id: Mutex<u64>,
}

impl<S: SessionStorage> SessionStore<S> {
    /// 创建仓库并从持久化存储恢复上次的会话
    pub fn new(storage: S, gateway: Arc<HttpGateway>, tokens: Arc<TokenCell>) -> Self {
        let store = Self {
            storage,
            gateway,
            tokens,
            current: Mutex::new(None),
            subscribers: Mutex::new(Vec::new()),
            next_subscriber_id: Mutex::new(0),
        };
        store.restore();
        store
    }

    /// 从存储恢复会话
    ///
    /// 三个键必须成套：令牌或身份缺失、身份无法解析时一律视为
    /// 未认证，不去修复存储（留给下一次登录覆盖）。
    fn restore(&self) {
        let token = self.storage.get(JWT_TOKEN_KEY).ok().flatten();
        let refresh = self
            .storage
            .get(REFRESH_TOKEN_KEY)
            .ok()
            .flatten()
            .unwrap_or_default();
        let identity = self
            .storage
            .get(CURRENT_USER_KEY)
            .ok()
            .flatten()
            .and_then(|raw| serde_json::from_str::<Identity>(&raw).ok());

        if let (Some(token), Some(identity)) = (token, identity) {
            if !token.is_empty() {
                debug!(username = %identity.username, "session restored from storage");
                self.tokens.set(Some(token.clone()));
                *self.current.lock() = Some(Session {
                    access_token: token,
                    refresh_token: refresh,
                    identity,
                });
            }
        }
    }

    // =========================================================
    // 操作
    // =========================================================

    /// 登录并建立会话
    ///
    /// 成功时三个键原子落盘、内存状态更新、订阅方同步收到通知；
    /// 失败时不碰任何已持久化状态，错误携带服务端消息上抛。
    pub async fn login(&self, username: &str, password: &str) -> MarketResult<bool> {
        debug!(username, "login attempt");
        let data = self
            .gateway
            .send(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await
            .map_err(|e| e.in_op("session.login"))?;

        if data.token.is_empty() {
            return Err(MarketError::business("Login failed").in_op("session.login"));
        }

        let access_token = data.token.clone();
        let refresh_token = data.refresh_token.clone();
        let identity = data.into_identity();
        let identity_json = serde_json::to_string(&identity)
            .map_err(|e| MarketError::from(e).in_op("session.login"))?;

        self.persist_session(&access_token, &refresh_token, &identity_json)?;

        *self.current.lock() = Some(Session {
            access_token: access_token.clone(),
            refresh_token,
            identity,
        });
        self.tokens.set(Some(access_token));
        self.notify();
        Ok(true)
    }

    /// 注册新账户
    ///
    /// 与登录共用错误传播契约；注册本身不建立会话。
    pub async fn register(&self, request: RegisterRequest) -> MarketResult<bool> {
        debug!(username = %request.username, "register attempt");
        self.gateway
            .send(&request)
            .await
            .map_err(|e| e.in_op("session.register"))?;
        Ok(true)
    }

    /// 注销
    ///
    /// 无条件清除三个键；存储为空时也不报错，重复调用等效一次。
    /// 不调用后端（接口未提供令牌吊销端点）。
    pub fn logout(&self) {
        let _ = self.storage.remove(JWT_TOKEN_KEY);
        let _ = self.storage.remove(REFRESH_TOKEN_KEY);
        let _ = self.storage.remove(CURRENT_USER_KEY);
        *self.current.lock() = None;
        self.tokens.set(None);
        self.notify();
        debug!("session cleared");
    }

    // =========================================================
    // 只读视图
    // =========================================================

    /// 最近一次已知的身份（纯内存读取，无 I/O）
    pub fn current_identity(&self) -> Option<Identity> {
        self.current.lock().as_ref().map(|s| s.identity.clone())
    }

    /// 是否持有访问令牌
    pub fn is_authenticated(&self) -> bool {
        self.current.lock().is_some()
    }

    /// 当前身份是否为管理员
    pub fn is_admin(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .map(|s| s.identity.is_admin)
            .unwrap_or(false)
    }

    // =========================================================
    // 订阅
    // =========================================================

    /// 订阅会话状态变更
    ///
    /// 每次状态迁移（登录成功、注销）都会在同一调用栈内同步
    /// 通知，保证路由守卫在下一次导航检查前看到新状态。
    /// 回调内不得再注册/注销订阅。
    pub fn subscribe(&self, f: impl Fn(Option<&Identity>) + Send + Sync + 'static) -> u64 {
        let id = {
            let mut next = self.next_subscriber_id.lock();
            *next += 1;
            *next
        };
        self.subscribers.lock().push((id, Box::new(f)));
        id
    }

    pub fn unsubscribe(&self, id: u64) {
        self.subscribers.lock().retain(|(i, _)| *i != id);
    }

    fn notify(&self) {
        let identity = self.current.lock().as_ref().map(|s| s.identity.clone());
        for (_, f) in self.subscribers.lock().iter() {
            f(identity.as_ref());
        }
    }

    // =========================================================
    // 持久化
    // =========================================================

    /// 三键原子写入
    ///
    /// 任何一个写入失败都把已写的键恢复为调用前的值再上抛。
    fn persist_session(
        &self,
        token: &str,
        refresh: &str,
        identity_json: &str,
    ) -> MarketResult<()> {
        let previous = [
            (JWT_TOKEN_KEY, self.storage.get(JWT_TOKEN_KEY)?),
            (REFRESH_TOKEN_KEY, self.storage.get(REFRESH_TOKEN_KEY)?),
            (CURRENT_USER_KEY, self.storage.get(CURRENT_USER_KEY)?),
        ];

        let attempt = self
            .storage
            .set(JWT_TOKEN_KEY, token)
            .and_then(|_| self.storage.set(REFRESH_TOKEN_KEY, refresh))
            .and_then(|_| self.storage.set(CURRENT_USER_KEY, identity_json));

        if let Err(e) = attempt {
            warn!("session persistence failed, rolling back");
            for (key, old) in previous {
                let result = match old {
                    Some(value) => self.storage.set(key, &value),
                    None => self.storage.remove(key),
                };
                if result.is_err() {
                    warn!(key, "rollback write failed");
                }
            }
            return Err(e.in_op("session.persist"));
        }
        Ok(())
    }
}

impl<S: SessionStorage + 'static> SessionStore<S> {
    /// 把 401 回调接到注销上
    ///
    /// 网关只触发回调、不持有仓库；这里通过弱引用闭合环路，
    /// 令牌失效时会话被动清除，错误仍由原调用方处理。
    pub fn install_unauthorized_logout(this: &Arc<Self>) {
        let weak = Arc::downgrade(this);
        this.gateway.on_unauthorized(Box::new(move || {
            if let Some(store) = weak.upgrade() {
                store.logout();
            }
        }));
    }
}
