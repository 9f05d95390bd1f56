use std::sync::Arc;

use crate::error::MarketResult;
use crate::gateway::HttpGateway;
use marketplace_shared::protocol::{
    ApproveItemRequest, CreateItemRequest, DeleteItemRequest, FeaturedItemsRequest, GetItemRequest,
    MyItemsRequest, PendingApprovalsRequest, RejectItemRequest, SearchItemsRequest,
    UpdateItemRequest,
};
use marketplace_shared::{Item, Paged};

/// 商品目录客户端
///
/// 公开检索、卖家自助、管理员审批三组接口。
#[derive(Clone)]
pub struct ItemsService {
    gateway: Arc<HttpGateway>,
}

impl ItemsService {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }

    // --- 公开接口 ---

    /// 分页检索商品
    pub async fn search(&self, request: SearchItemsRequest) -> MarketResult<Paged<Item>> {
        self.gateway.send(&request).await
    }

    /// 按 ID 获取商品
    pub async fn by_id(&self, item_id: i64) -> MarketResult<Item> {
        self.gateway.send(&GetItemRequest { item_id }).await
    }

    /// 获取精选商品
    pub async fn featured(&self) -> MarketResult<Vec<Item>> {
        self.gateway.send(&FeaturedItemsRequest).await
    }

    // --- 卖家接口 ---

    /// 提交新商品
    pub async fn create(&self, request: CreateItemRequest) -> MarketResult<Item> {
        self.gateway.send(&request).await
    }

    /// 更新自己的商品
    pub async fn update(&self, item_id: i64, item: Item) -> MarketResult<Item> {
        self.gateway.send(&UpdateItemRequest { item_id, item }).await
    }

    /// 下架自己的商品
    pub async fn delete(&self, item_id: i64) -> MarketResult<()> {
        self.gateway.send(&DeleteItemRequest { item_id }).await?;
        Ok(())
    }

    /// 自己的商品列表
    pub async fn my_items(&self) -> MarketResult<Vec<Item>> {
        self.gateway.send(&MyItemsRequest).await
    }

    // --- 管理员接口 ---

    /// 待审批商品分页
    pub async fn pending_approvals(
        &self,
        page_number: u32,
        page_size: u32,
    ) -> MarketResult<Paged<Item>> {
        self.gateway
            .send(&PendingApprovalsRequest {
                page_number,
                page_size,
            })
            .await
    }

    /// 审批通过
    pub async fn approve(&self, item_id: i64, notes: Option<String>) -> MarketResult<()> {
        self.gateway
            .send(&ApproveItemRequest { item_id, notes })
            .await?;
        Ok(())
    }

    /// 审批驳回，默认允许重新提交
    pub async fn reject(&self, item_id: i64, rejection_reason: String) -> MarketResult<()> {
        self.gateway
            .send(&RejectItemRequest {
                item_id,
                rejection_reason,
                allow_resubmission: true,
            })
            .await?;
        Ok(())
    }
}

// =========================================================
// 单元测试
// =========================================================
