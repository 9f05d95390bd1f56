//! 本地持久化存储
//!
//! 浏览器 LocalStorage 的原生替代：字符串键值对，进程重启后
//! 仍然可读。会话仓库是唯一写入方。

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use parking_lot::Mutex;

use crate::error::{MarketError, MarketResult};

// =========================================================
// 抽象存储接口
// =========================================================

/// 会话存储适配器：负责字符串键值对的持久化
pub trait SessionStorage: Send + Sync {
    /// 获取存储的字符串值
    fn get(&self, key: &str) -> MarketResult<Option<String>>;
    /// 设置存储值
    fn set(&self, key: &str, value: &str) -> MarketResult<()>;
    /// 删除键值对，键不存在时不报错
    fn remove(&self, key: &str) -> MarketResult<()>;
}

impl<T: SessionStorage + ?Sized> SessionStorage for std::sync::Arc<T> {
    fn get(&self, key: &str) -> MarketResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> MarketResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> MarketResult<()> {
        (**self).remove(key)
    }
}

// =========================================================
// 内存实现
// =========================================================

/// 进程内存储，不跨重启；测试与一次性工具场景使用
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> MarketResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> MarketResult<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> MarketResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

// =========================================================
// 文件实现
// =========================================================

/// 单文件 JSON 存储
///
/// 整个键值表序列化为一个 JSON 对象；每次写入整体重写文件。
/// 条目只有三个会话键，体量可以忽略。
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_map(&self) -> MarketResult<HashMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                MarketError::storage(format!("corrupt session file: {}", e))
                    .with_source(e)
                    .in_op_with("storage.read", self.path.display().to_string())
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(MarketError::storage(e.to_string())
                .with_source(e)
                .in_op_with("storage.read", self.path.display().to_string())),
        }
    }

    fn write_map(&self, map: &HashMap<String, String>) -> MarketResult<()> {
        let raw = serde_json::to_string(map)?;
        fs::write(&self.path, raw).map_err(|e| {
            MarketError::storage(e.to_string())
                .with_source(e)
                .in_op_with("storage.write", self.path.display().to_string())
        })
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> MarketResult<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.read_map()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> MarketResult<()> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> MarketResult<()> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}
