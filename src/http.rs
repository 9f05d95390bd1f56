//! HTTP 传输层
//!
//! 在 `reqwest` 之上提供一层可替换的抽象：网关只依赖
//! `HttpClient` trait，测试用 Mock 实现回放固定响应。

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::{MarketError, MarketResult};
use marketplace_shared::protocol::HttpMethod;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// 检查响应是否成功 (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> MarketResult<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| MarketError::serialization(e.to_string()).in_op("http.parse"))
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, req: HttpRequest) -> MarketResult<HttpResponse>;
}

// =========================================================
// 实现层: Reqwest 客户端
// =========================================================

/// 生产环境传输实现
///
/// 携带 Cookie（依赖 Cookie 凭据的接口需要），并配置显式的
/// 请求超时，请求要么在限期内完成要么以传输错误收场。
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(timeout: Duration) -> MarketResult<Self> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| {
                MarketError::transport(format!("failed to build http client: {}", e))
                    .in_op("http.build")
            })?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, req: HttpRequest) -> MarketResult<HttpResponse> {
        let method = match req.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        };

        let mut builder = self.inner.request(method, &req.url);
        for (k, v) in &req.headers {
            builder = builder.header(k, v);
        }
        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("request timed out: {}", req.url)
            } else {
                format!("Client-side Error: {}", e)
            };
            MarketError::transport(message)
                .with_source(e)
                .in_op_with("http.send", req.url.clone())
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            MarketError::transport(format!("failed to read response body: {}", e))
                .with_source(e)
                .in_op_with("http.body", req.url.clone())
        })?;

        Ok(HttpResponse { status, body })
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================
