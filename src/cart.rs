//! 购物车仓库
//!
//! 当前用户购物车的本地权威缓存：缓存永远是最近一次服务端
//! 确认状态的投影，变更操作先走后端、确认后再并入缓存。
//! 并发在途的两次变更不排队，同一行以后完成者为准。

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{MarketError, MarketResult};
use crate::gateway::HttpGateway;
use marketplace_shared::CartLine;
use marketplace_shared::protocol::{
    AddToCartRequest, ClearCartRequest, FetchCartRequest, RemoveCartLineRequest,
    UpdateCartLineRequest,
};

/// 结算时的固定运费
pub const FLAT_SHIPPING_RATE: f64 = 5.99;

pub type CartSubscriber = Box<dyn Fn(&[CartLine]) + Send + Sync>;

pub struct CartStore {
    gateway: Arc<HttpGateway>,
    /// 唯一的缓存槽；本仓库是唯一写入方
    lines: Mutex<Vec<CartLine>>,
    subscribers: Mutex<Vec<(u64, CartSubscriber)>>,
    next_subscriber_id: Mutex<u64>,
}

impl CartStore {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self {
            gateway,
            lines: Mutex::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
            next_subscriber_id: Mutex::new(0),
        }
    }

    // =========================================================
    // 操作
    // =========================================================

    /// 拉取购物车并整体替换缓存
    ///
    /// 每行按「行级字段优先、嵌套 item 兜底」规范化。
    /// 失败时缓存保持原样，不做部分更新。
    pub async fn fetch_cart(&self) -> MarketResult<Vec<CartLine>> {
        let payload = self
            .gateway
            .send(&FetchCartRequest)
            .await
            .map_err(|e| e.in_op("cart.fetch"))?;

        let normalized: Vec<CartLine> = payload
            .items
            .into_iter()
            .map(CartLine::from_wire)
            .collect();
        debug!(lines = normalized.len(), "cart cache replaced");

        *self.lines.lock() = normalized.clone();
        self.notify();
        Ok(normalized)
    }

    /// 加入购物车
    ///
    /// 只确认服务端写入，不直接改缓存；需要立即看到新行的调用方
    /// 随后自行 `fetch_cart`。
    pub async fn add_item(&self, item_id: i64, quantity: u32) -> MarketResult<bool> {
        self.gateway
            .send(&AddToCartRequest { item_id, quantity })
            .await
            .map_err(|e| e.in_op("cart.add"))?;
        debug!(item_id, quantity, "item added to cart");
        Ok(true)
    }

    /// 修改某行数量
    ///
    /// 前置条件：`1 ≤ quantity ≤ 该行已知库存`。不满足时请求根本
    /// 不会发出、缓存不动，直接返回校验错误。成功后该行原地替换，
    /// 其余行不受影响。
    pub async fn update_quantity(&self, line_id: i64, quantity: u32) -> MarketResult<CartLine> {
        let cached = self
            .lines
            .lock()
            .iter()
            .find(|line| line.id == line_id)
            .cloned()
            .ok_or_else(|| {
                MarketError::invalid_input(format!("cart line {} is not cached", line_id))
                    .in_op("cart.update_quantity")
            })?;

        if quantity < 1 {
            return Err(MarketError::invalid_input("quantity must be at least 1")
                .in_op("cart.update_quantity"));
        }
        if quantity > cached.stock_quantity {
            return Err(MarketError::invalid_input(format!(
                "quantity {} exceeds available stock {}",
                quantity, cached.stock_quantity
            ))
            .in_op("cart.update_quantity"));
        }

        let wire = self
            .gateway
            .send(&UpdateCartLineRequest { line_id, quantity })
            .await
            .map_err(|e| e.in_op("cart.update_quantity"))?;

        let mut updated = CartLine::from_wire(wire);
        // 服务端响应可能不带嵌套 item，库存沿用缓存值
        if updated.stock_quantity == 0 {
            updated.stock_quantity = cached.stock_quantity;
        }

        {
            let mut lines = self.lines.lock();
            if let Some(slot) = lines.iter_mut().find(|line| line.id == line_id) {
                *slot = updated.clone();
            }
        }
        self.notify();
        Ok(updated)
    }

    /// 删除某行
    pub async fn remove_item(&self, line_id: i64) -> MarketResult<()> {
        self.gateway
            .send(&RemoveCartLineRequest { line_id })
            .await
            .map_err(|e| e.in_op("cart.remove"))?;

        self.lines.lock().retain(|line| line.id != line_id);
        self.notify();
        Ok(())
    }

    /// 清空购物车（下单后调用）
    pub async fn clear_cart(&self) -> MarketResult<()> {
        self.gateway
            .send(&ClearCartRequest)
            .await
            .map_err(|e| e.in_op("cart.clear"))?;

        self.lines.lock().clear();
        self.notify();
        Ok(())
    }

    // =========================================================
    // 只读视图
    // =========================================================

    /// 当前缓存快照
    pub fn lines(&self) -> Vec<CartLine> {
        self.lines.lock().clone()
    }

    /// 小计
    ///
    /// 每次从缓存整体重算，不做增量维护，缓存怎么变都不会漂移。
    pub fn subtotal(&self) -> f64 {
        self.lines.lock().iter().map(CartLine::line_total).sum()
    }

    /// 小计加固定运费
    pub fn total(&self, shipping_flat_rate: f64) -> f64 {
        self.subtotal() + shipping_flat_rate
    }

    // =========================================================
    // 订阅
    // =========================================================

    /// 订阅缓存变更；回调内不得再注册/注销订阅
    pub fn subscribe(&self, f: impl Fn(&[CartLine]) + Send + Sync + 'static) -> u64 {
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
        let snapshot = self.lines.lock().clone();
        for (_, f) in self.subscribers.lock().iter() {
            f(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests;
