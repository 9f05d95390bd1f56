use std::sync::Arc;

use crate::error::MarketResult;
use crate::gateway::HttpGateway;
use marketplace_shared::Category;
use marketplace_shared::protocol::ListCategoriesRequest;

#[derive(Clone)]
pub struct CategoriesService {
    gateway: Arc<HttpGateway>,
}

impl CategoriesService {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }

    /// 获取分类列表
    pub async fn list(&self) -> MarketResult<Vec<Category>> {
        self.gateway.send(&ListCategoriesRequest).await
    }
}
