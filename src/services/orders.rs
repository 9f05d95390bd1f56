use std::sync::Arc;

use crate::error::MarketResult;
use crate::gateway::HttpGateway;
use marketplace_shared::protocol::{
    AllOrdersRequest, CancelOrderRequest, CreateOrderRequest, GetOrderRequest, MyOrdersRequest,
    SellerOrdersRequest, UpdateOrderStatusRequest,
};
use marketplace_shared::{Order, Paged};

/// 订单客户端
#[derive(Clone)]
pub struct OrdersService {
    gateway: Arc<HttpGateway>,
}

impl OrdersService {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }

    /// 提交订单
    pub async fn create(&self, request: CreateOrderRequest) -> MarketResult<Order> {
        self.gateway.send(&request).await
    }

    /// 按 ID 获取订单
    pub async fn by_id(&self, order_id: i64) -> MarketResult<Order> {
        self.gateway.send(&GetOrderRequest { order_id }).await
    }

    // --- 买家接口 ---

    /// 自己的历史订单（分页）
    pub async fn my_orders(&self) -> MarketResult<Paged<Order>> {
        self.gateway.send(&MyOrdersRequest).await
    }

    /// 取消订单
    pub async fn cancel(&self, order_id: i64) -> MarketResult<Order> {
        self.gateway.send(&CancelOrderRequest { order_id }).await
    }

    // --- 卖家接口 ---

    /// 卖出的订单
    pub async fn seller_orders(&self) -> MarketResult<Vec<Order>> {
        self.gateway.send(&SellerOrdersRequest).await
    }

    // --- 管理员接口 ---

    /// 全部订单
    pub async fn all_orders(&self) -> MarketResult<Vec<Order>> {
        self.gateway.send(&AllOrdersRequest).await
    }

    /// 更新订单状态
    pub async fn update_status(&self, order_id: i64, status: String) -> MarketResult<Order> {
        self.gateway
            .send(&UpdateOrderStatusRequest { order_id, status })
            .await
    }
}

// =========================================================
// 单元测试
// =========================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::gateway::TokenCell;
    use crate::http::mock::MockHttpClient;
    use marketplace_shared::OrderCartLine;
    use serde_json::json;

    fn setup() -> (Arc<MockHttpClient>, OrdersService) {
        let client = MockHttpClient::shared();
        let gateway = Arc::new(HttpGateway::new(
            client.clone(),
            ClientConfig::new("https://api.test"),
            Arc::new(TokenCell::new()),
        ));
        (client.clone(), OrdersService::new(gateway))
    }

    #[tokio::test]
    async fn create_submits_cart_lines_and_addresses() {
        let (client, orders) = setup();
        client.mock_response(
            "https://api.test/orders",
            200,
            json!({
                "success": true,
                "message": "",
                "data": { "idOrder": 31, "totalAmount": 25.0 },
                "errors": null
            }),
        );

        let order = orders
            .create(CreateOrderRequest {
                shipping_address: "{\"city\":\"Berlin\"}".into(),
                billing_address: "{\"city\":\"Berlin\"}".into(),
                cart_items: vec![OrderCartLine {
                    item_id: 10,
                    quantity: 2,
                }],
            })
            .await
            .unwrap();

        assert_eq!(order.id_order, 31);
        let requests = client.requests.lock();
        let body: serde_json::Value = serde_json::from_str(requests[0].3.as_ref().unwrap()).unwrap();
        assert_eq!(body["cartItems"][0]["itemId"], 10);
        assert_eq!(body["cartItems"][0]["quantity"], 2);
    }

    #[tokio::test]
    async fn status_update_uses_patch_on_the_status_path() {
        let (client, orders) = setup();
        let url = "https://api.test/orders/31/status";
        client.mock_response(
            url,
            200,
            json!({
                "success": true,
                "message": "",
                "data": { "idOrder": 31, "statusId": 2 },
                "errors": null
            }),
        );

        let order = orders.update_status(31, "Shipped".into()).await.unwrap();
        assert_eq!(order.status_id, 2);

        let requests = client.requests.lock();
        let req = requests.iter().find(|r| r.0 == url).unwrap();
        assert_eq!(req.1, "Patch");
        assert_eq!(
            req.3.as_deref(),
            Some(json!({ "status": "Shipped" }).to_string().as_str())
        );
    }

    #[tokio::test]
    async fn my_orders_unwraps_the_paginated_envelope() {
        let (client, orders) = setup();
        client.mock_response(
            "https://api.test/orders/my",
            200,
            json!({
                "success": true,
                "message": "",
                "data": {
                    "data": [{ "idOrder": 1 }, { "idOrder": 2 }],
                    "totalCount": 2,
                    "pageNumber": 1,
                    "pageSize": 10,
                    "totalPages": 1
                },
                "errors": null
            }),
        );

        let page = orders.my_orders().await.unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(page.data[1].id_order, 2);
    }
}
