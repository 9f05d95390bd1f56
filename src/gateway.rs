//! 请求网关
//!
//! 统一的强类型派发层：拼接 URL、附加 Bearer 凭据、解析响应
//! 信封、按固定优先级规格化失败消息。
//!
//! 网关自身从不改写会话状态：收到 401 时仅触发注册的回调并把
//! 错误原样上抛，由上层决定登出与跳转，避免拦截层反向依赖会话。

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{MarketError, MarketResult, normalize_failure_message};
use crate::http::{HttpClient, HttpRequest};
use marketplace_shared::protocol::{ApiRequest, HttpMethod};
use marketplace_shared::{Envelope, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE};

/// 请求相关头
const HEADER_REQUEST_ID: &str = "X-Request-Id";

// =========================================================
// 共享凭据槽
// =========================================================

/// 访问令牌的共享槽
///
/// 会话仓库是唯一写入方；网关只读。两者通过 `Arc` 共享同一个
/// 槽位，避免网关反向持有会话仓库。
#[derive(Default)]
pub struct TokenCell(Mutex<Option<String>>);

impl TokenCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: Option<String>) {
        *self.0.lock() = token;
    }

    pub fn get(&self) -> Option<String> {
        self.0.lock().clone()
    }
}

// =========================================================
// 网关
// =========================================================

pub type UnauthorizedHook = Box<dyn Fn() + Send + Sync>;

pub struct HttpGateway {
    client: Arc<dyn HttpClient>,
    config: ClientConfig,
    tokens: Arc<TokenCell>,
    unauthorized_hooks: Mutex<Vec<UnauthorizedHook>>,
}

impl HttpGateway {
    pub fn new(client: Arc<dyn HttpClient>, config: ClientConfig, tokens: Arc<TokenCell>) -> Self {
        Self {
            client,
            config,
            tokens,
            unauthorized_hooks: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// 注册 401 回调
    ///
    /// 回调在错误上抛之前同步触发；网关不解释回调做了什么。
    pub fn on_unauthorized(&self, hook: UnauthorizedHook) {
        self.unauthorized_hooks.lock().push(hook);
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.config.base_url, path)
        } else {
            format!("{}/{}", self.config.base_url, path)
        }
    }

    /// 发送强类型请求并解包响应信封
    pub async fn send<T: ApiRequest>(&self, req: &T) -> MarketResult<T::Response> {
        let path = req.path();
        let url = self.url(&path);
        let request_id = Uuid::new_v4();

        // 1. 构造请求
        let mut request = HttpRequest::new(&url, T::METHOD)
            .with_header(HEADER_CONTENT_TYPE, "application/json")
            .with_header(HEADER_REQUEST_ID, &request_id.to_string());

        if let Some(token) = self.tokens.get() {
            request = request.with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));
        }

        // 2. GET 不携带请求体
        if T::METHOD != HttpMethod::Get {
            let body = serde_json::to_string(req).map_err(|e| {
                MarketError::serialization(e.to_string()).in_op_with("gateway.serialize", &path)
            })?;
            request = request.with_body(body);
        }

        debug!(%request_id, %url, method = ?T::METHOD, "dispatching request");

        // 3. 发送
        let response = self
            .client
            .send(request)
            .await
            .map_err(|e| e.in_op_with("gateway.send", &path))?;

        // 4. 传输层状态检查
        if response.status == 401 {
            warn!(%request_id, %url, "authentication rejected");
            // 触发回调，但错误仍然原样上抛
            for hook in self.unauthorized_hooks.lock().iter() {
                hook();
            }
            let message = normalize_failure_message(&response.body, response.status);
            return Err(MarketError::unauthorized(message)
                .with_http_status(response.status)
                .in_op_with("gateway.send", &path));
        }

        if !response.ok() {
            let message = normalize_failure_message(&response.body, response.status);
            return Err(MarketError::server(message)
                .with_http_status(response.status)
                .in_op_with("gateway.send", &path));
        }

        // 5. 解析信封
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_str(&response.body).map_err(|e| {
                MarketError::serialization(e.to_string())
                    .with_source(e)
                    .in_op_with("gateway.envelope", &path)
            })?;

        // 6. 业务层成功位检查
        if !envelope.is_success() {
            let message = normalize_failure_message(&response.body, response.status);
            return Err(MarketError::business(message).in_op_with("gateway.send", &path));
        }

        let data = envelope.data.unwrap_or(serde_json::Value::Null);
        serde_json::from_value(data).map_err(|e| {
            MarketError::serialization(e.to_string())
                .with_source(e)
                .in_op_with("gateway.deserialize", &path)
        })
    }
}

// =========================================================
// 单元测试
// =========================================================
