use super::*;
use crate::config::ClientConfig;
use crate::error::MarketErrorStatus;
use crate::gateway::TokenCell;
use crate::http::mock::MockHttpClient;
use parking_lot::Mutex as PlMutex;
use serde_json::json;

const CART_URL: &str = "https://api.test/cart";
const CART_ITEMS_URL: &str = "https://api.test/cart/items";

fn setup() -> (Arc<MockHttpClient>, CartStore) {
    let client = MockHttpClient::shared();
    let gateway = Arc::new(HttpGateway::new(
        client.clone(),
        ClientConfig::new("https://api.test"),
        Arc::new(TokenCell::new()),
    ));
    (client, CartStore::new(gateway))
}

fn envelope(data: serde_json::Value) -> serde_json::Value {
    json!({ "success": true, "message": "", "data": data, "errors": null })
}

fn wire_line(id: i64, item_id: i64, quantity: u32, price: f64, stock: u32) -> serde_json::Value {
    json!({
        "idCartItem": id,
        "itemId": item_id,
        "quantity": quantity,
        "itemTitle": format!("Item {}", item_id),
        "itemPrice": price,
        "item": {
            "idItem": item_id,
            "title": format!("Item {}", item_id),
            "price": price,
            "stockQuantity": stock
        }
    })
}

fn mock_cart(client: &MockHttpClient, lines: Vec<serde_json::Value>) {
    client.mock_response(CART_URL, 200, envelope(json!({ "items": lines })));
}

// =========================================================
// Fetch & normalization
// =========================================================

#[tokio::test]
async fn fetch_replaces_cache_with_normalized_lines() {
    let (client, store) = setup();
    mock_cart(
        &client,
        vec![wire_line(1, 10, 2, 10.0, 5), wire_line(2, 20, 1, 5.0, 3)],
    );

    let lines = store.fetch_cart().await.unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].title, "Item 10");
    assert_eq!(lines[0].stock_quantity, 5);
    assert_eq!(store.lines(), lines);
}

#[tokio::test]
async fn line_level_fields_win_over_nested_item() {
    let (client, store) = setup();
    mock_cart(
        &client,
        vec![json!({
            "idCartItem": 1,
            "itemId": 10,
            "quantity": 1,
            "itemTitle": "Line Title",
            "itemPrice": 12.5,
            "item": { "idItem": 99, "title": "Nested Title", "price": 3.0, "stockQuantity": 4 }
        })],
    );

    let lines = store.fetch_cart().await.unwrap();
    assert_eq!(lines[0].title, "Line Title");
    assert_eq!(lines[0].price, 12.5);
    assert_eq!(lines[0].item_id, 10);
    assert_eq!(lines[0].stock_quantity, 4);
}

#[tokio::test]
async fn nested_item_fills_missing_line_fields() {
    let (client, store) = setup();
    mock_cart(
        &client,
        vec![json!({
            "idCartItem": 1,
            "quantity": 2,
            "item": { "idItem": 7, "title": "Nested Only", "price": 4.0, "stockQuantity": 9 }
        })],
    );

    let lines = store.fetch_cart().await.unwrap();
    assert_eq!(lines[0].title, "Nested Only");
    assert_eq!(lines[0].price, 4.0);
    assert_eq!(lines[0].item_id, 7);
}

#[tokio::test]
async fn empty_nested_item_yields_display_defaults() {
    let (client, store) = setup();
    mock_cart(
        &client,
        vec![json!({ "idCartItem": 1, "itemId": 3, "quantity": 1 })],
    );

    let lines = store.fetch_cart().await.unwrap();
    assert_eq!(lines[0].title, "Unknown Title");
    assert_eq!(lines[0].price, 0.0);
    assert_eq!(lines[0].stock_quantity, 0);
}

#[tokio::test]
async fn fetch_failure_leaves_cache_untouched() {
    let (client, store) = setup();
    mock_cart(&client, vec![wire_line(1, 10, 2, 10.0, 5)]);
    store.fetch_cart().await.unwrap();

    client.mock_raw_response(CART_URL, 500, "");
    assert!(store.fetch_cart().await.is_err());

    // Cache still holds the previous confirmed state
    assert_eq!(store.lines().len(), 1);
    assert_eq!(store.subtotal(), 20.0);
}

// =========================================================
// Totals
// =========================================================

#[tokio::test]
async fn subtotal_and_total_follow_the_cached_lines() {
    let (client, store) = setup();
    mock_cart(
        &client,
        vec![wire_line(1, 10, 2, 10.0, 5), wire_line(2, 20, 1, 5.0, 3)],
    );
    store.fetch_cart().await.unwrap();

    assert_eq!(store.subtotal(), 25.0);
    assert_eq!(store.total(3.0), 28.0);
    assert_eq!(store.total(FLAT_SHIPPING_RATE), 25.0 + FLAT_SHIPPING_RATE);
}

#[tokio::test]
async fn subtotal_is_recomputed_after_each_mutation() {
    let (client, store) = setup();
    mock_cart(
        &client,
        vec![wire_line(1, 10, 2, 10.0, 5), wire_line(2, 20, 1, 5.0, 3)],
    );
    store.fetch_cart().await.unwrap();
    assert_eq!(store.subtotal(), 25.0);

    // Server confirms the removal of line 2
    client.mock_response("https://api.test/cart/2", 200, envelope(json!(null)));
    store.remove_item(2).await.unwrap();
    assert_eq!(store.subtotal(), 20.0);

    // A later fetch is authoritative over the whole cache
    mock_cart(&client, vec![wire_line(1, 10, 3, 10.0, 5)]);
    store.fetch_cart().await.unwrap();
    assert_eq!(store.subtotal(), 30.0);
}

// =========================================================
// Quantity guard
// =========================================================

#[tokio::test]
async fn quantity_below_one_never_reaches_the_network() {
    let (client, store) = setup();
    mock_cart(&client, vec![wire_line(5, 10, 2, 10.0, 3)]);
    store.fetch_cart().await.unwrap();

    let err = store.update_quantity(5, 0).await.unwrap_err();
    assert_eq!(err.status, MarketErrorStatus::InvalidInput);

    assert_eq!(client.requests_to("https://api.test/cart/5"), 0);
    assert_eq!(store.lines()[0].quantity, 2);
}

#[tokio::test]
async fn quantity_above_stock_never_reaches_the_network() {
    let (client, store) = setup();
    mock_cart(&client, vec![wire_line(5, 10, 2, 10.0, 3)]);
    store.fetch_cart().await.unwrap();

    let err = store.update_quantity(5, 5).await.unwrap_err();
    assert_eq!(err.status, MarketErrorStatus::InvalidInput);
    assert!(err.message().contains("stock"));

    assert_eq!(client.requests_to("https://api.test/cart/5"), 0);
    assert_eq!(store.lines()[0].quantity, 2);
}

#[tokio::test]
async fn unknown_line_is_a_validation_error() {
    let (client, store) = setup();
    mock_cart(&client, vec![wire_line(5, 10, 2, 10.0, 3)]);
    store.fetch_cart().await.unwrap();

    let err = store.update_quantity(77, 1).await.unwrap_err();
    assert_eq!(err.status, MarketErrorStatus::InvalidInput);
    assert_eq!(client.requests_to("https://api.test/cart/77"), 0);
}

#[tokio::test]
async fn confirmed_update_replaces_the_line_in_place() {
    let (client, store) = setup();
    mock_cart(
        &client,
        vec![wire_line(5, 10, 2, 10.0, 4), wire_line(6, 20, 1, 5.0, 2)],
    );
    store.fetch_cart().await.unwrap();

    client.mock_response(
        "https://api.test/cart/5",
        200,
        envelope(wire_line(5, 10, 3, 10.0, 4)),
    );
    let updated = store.update_quantity(5, 3).await.unwrap();
    assert_eq!(updated.quantity, 3);

    let lines = store.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].quantity, 3);
    assert_eq!(lines[1].quantity, 1);
    assert_eq!(store.subtotal(), 35.0);
}

#[tokio::test]
async fn update_without_nested_item_keeps_cached_stock() {
    let (client, store) = setup();
    mock_cart(&client, vec![wire_line(5, 10, 2, 10.0, 4)]);
    store.fetch_cart().await.unwrap();

    client.mock_response(
        "https://api.test/cart/5",
        200,
        envelope(json!({
            "idCartItem": 5,
            "itemId": 10,
            "quantity": 3,
            "itemTitle": "Item 10",
            "itemPrice": 10.0
        })),
    );
    let updated = store.update_quantity(5, 3).await.unwrap();
    assert_eq!(updated.stock_quantity, 4);
}

// =========================================================
// Add / remove / clear
// =========================================================

#[tokio::test]
async fn add_item_does_not_touch_the_cache() {
    let (client, store) = setup();
    mock_cart(&client, vec![wire_line(1, 10, 2, 10.0, 5)]);
    store.fetch_cart().await.unwrap();

    client.mock_response(CART_ITEMS_URL, 200, envelope(json!(null)));
    assert!(store.add_item(42, 1).await.unwrap());

    // Cache is stale until the next fetch
    assert_eq!(store.lines().len(), 1);

    let requests = client.requests.lock();
    let add = requests.iter().find(|r| r.0 == CART_ITEMS_URL).unwrap();
    assert_eq!(add.1, "Post");
    assert_eq!(
        add.3.as_deref(),
        Some(json!({ "itemId": 42, "quantity": 1 }).to_string().as_str())
    );
}

#[tokio::test]
async fn remove_failure_keeps_the_line() {
    let (client, store) = setup();
    mock_cart(&client, vec![wire_line(1, 10, 2, 10.0, 5)]);
    store.fetch_cart().await.unwrap();

    client.mock_raw_response("https://api.test/cart/1", 500, "");
    assert!(store.remove_item(1).await.is_err());
    assert_eq!(store.lines().len(), 1);
}

#[tokio::test]
async fn clear_cart_empties_the_cache() {
    let (client, store) = setup();
    mock_cart(&client, vec![wire_line(1, 10, 2, 10.0, 5)]);
    store.fetch_cart().await.unwrap();

    client.mock_response(CART_URL, 200, envelope(json!(null)));
    store.clear_cart().await.unwrap();
    assert!(store.lines().is_empty());
    assert_eq!(store.subtotal(), 0.0);
}

// =========================================================
// Subscriptions
// =========================================================

#[tokio::test]
async fn cache_replacement_notifies_subscribers() {
    let (client, store) = setup();
    mock_cart(&client, vec![wire_line(1, 10, 2, 10.0, 5)]);

    let seen: Arc<PlMutex<Vec<usize>>> = Arc::new(PlMutex::new(Vec::new()));
    let sink = seen.clone();
    store.subscribe(move |lines| {
        sink.lock().push(lines.len());
    });

    store.fetch_cart().await.unwrap();
    client.mock_response(CART_URL, 200, envelope(json!(null)));
    store.clear_cart().await.unwrap();

    assert_eq!(*seen.lock(), vec![1, 0]);
}
