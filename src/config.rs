//! 客户端配置
//!
//! 基础 URL 与请求超时。环境变量读取走 `EnvAdapter` 抽象，
//! 测试无需污染进程环境。

use std::time::Duration;

use crate::error::{MarketError, MarketResult};

/// 默认请求超时
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ENV_API_URL: &str = "MARKETPLACE_API_URL";
const ENV_TIMEOUT_SECS: &str = "MARKETPLACE_TIMEOUT_SECS";

// =========================================================
// 抽象环境变量接口
// =========================================================

pub trait EnvAdapter {
    fn var(&self, name: &str) -> Option<String>;
}

/// 生产实现：进程环境变量
pub struct OsEnv;

impl EnvAdapter for OsEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

// =========================================================
// 配置
// =========================================================

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// 后端基础 URL（尾部斜杠会被去除）
    pub base_url: String,
    /// 单次请求的硬超时
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 从环境变量装配配置
    ///
    /// `MARKETPLACE_API_URL` 必填；`MARKETPLACE_TIMEOUT_SECS` 选填。
    pub fn from_env<E: EnvAdapter>(env: &E) -> MarketResult<Self> {
        let base_url = env.var(ENV_API_URL).ok_or_else(|| {
            MarketError::invalid_input(format!("{} is not set", ENV_API_URL))
                .in_op("config.from_env")
        })?;

        let mut config = Self::new(base_url);
        if let Some(raw) = env.var(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.parse().map_err(|_| {
                MarketError::invalid_input(format!("{} is not a number: {}", ENV_TIMEOUT_SECS, raw))
                    .in_op("config.from_env")
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

// =========================================================
// 单元测试
// =========================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MockEnv {
        vars: HashMap<String, String>,
    }

    impl MockEnv {
        fn new() -> Self {
            Self {
                vars: HashMap::new(),
            }
        }

        fn with(mut self, k: &str, v: &str) -> Self {
            self.vars.insert(k.to_string(), v.to_string());
            self
        }
    }

    impl EnvAdapter for MockEnv {
        fn var(&self, name: &str) -> Option<String> {
            self.vars.get(name).cloned()
        }
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ClientConfig::new("https://api.example.com/");
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn from_env_reads_url_and_timeout() {
        let env = MockEnv::new()
            .with(ENV_API_URL, "https://api.example.com/")
            .with(ENV_TIMEOUT_SECS, "5");
        let config = ClientConfig::from_env(&env).unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn from_env_requires_url() {
        let env = MockEnv::new();
        let err = ClientConfig::from_env(&env).unwrap_err();
        assert!(err.message().contains(ENV_API_URL));
    }
}
