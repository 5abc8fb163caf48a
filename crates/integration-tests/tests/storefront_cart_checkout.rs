//! Storefront cart and checkout flows against the fake backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::http::{Method, StatusCode};
use emporium_integration_tests::{FakeBackend, cart_json, client, start_storefront};
use serde_json::json;

/// Add product 1 to the cart so the session holds the backend's cart token.
async fn add_to_cart(client: &reqwest::Client, base: &str) {
    let response = client
        .post(format!("{base}/cart/items"))
        .form(&[("product_id", "1"), ("quantity", "1")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

fn checkout_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("email", "Ada@Example.com"),
        ("first_name", "Ada"),
        ("last_name", "Lovelace"),
        ("shipping_first_name", "Ada"),
        ("shipping_last_name", "Lovelace"),
        ("shipping_address1", "12 Analytical Row"),
        ("shipping_city", "Portland"),
        ("shipping_state", "OR"),
        ("shipping_postal_code", "97201"),
        ("shipping_country", "US"),
        ("same_as_shipping", "on"),
        ("notes", "Leave at the door"),
    ]
}

#[tokio::test]
async fn test_health_endpoints() {
    let backend = FakeBackend::start().await;
    let base = start_storefront(&backend).await;
    let client = client();

    let response = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{base}/health/ready"))
        .header("x-request-id", "lb-7f3a")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("lb-7f3a")
    );
}

#[tokio::test]
async fn test_add_to_cart_creates_cart_then_reuses_token() {
    let backend = FakeBackend::start().await;
    backend.ok(Method::POST, "/cart/items", cart_json(1));
    let base = start_storefront(&backend).await;
    let client = client();

    add_to_cart(&client, &base).await;
    let first = backend.last(&Method::POST, "/cart/items").unwrap();
    assert_eq!(first.header("x-cart-token"), None);
    assert_eq!(first.json(), json!({"product_id": 1, "quantity": 1}));
    assert_eq!(first.header("authorization"), Some("Bearer test-token"));

    add_to_cart(&client, &base).await;
    let second = backend.last(&Method::POST, "/cart/items").unwrap();
    assert_eq!(second.header("x-cart-token"), Some("ct_1"));
}

#[tokio::test]
async fn test_update_quantity_sends_quantity_body() {
    let backend = FakeBackend::start().await;
    backend.ok(Method::POST, "/cart/items", cart_json(1));
    backend.ok(Method::PUT, "/cart/items/5", cart_json(3));
    let base = start_storefront(&backend).await;
    let client = client();

    add_to_cart(&client, &base).await;
    let response = client
        .put(format!("{base}/cart/items/5"))
        .header("hx-request", "true")
        .form(&[("quantity", "3")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("hx-trigger")
            .and_then(|v| v.to_str().ok()),
        Some("cart-updated")
    );

    let request = backend.last(&Method::PUT, "/cart/items/5").unwrap();
    assert_eq!(request.json(), json!({"quantity": 3}));
    assert_eq!(request.header("x-cart-token"), Some("ct_1"));
}

#[tokio::test]
async fn test_invalid_quantity_is_not_sent() {
    let backend = FakeBackend::start().await;
    backend.ok(Method::POST, "/cart/items", cart_json(1));
    backend.ok(Method::GET, "/cart", cart_json(1));
    let base = start_storefront(&backend).await;
    let client = client();

    add_to_cart(&client, &base).await;
    let response = client
        .put(format!("{base}/cart/items/5"))
        .header("hx-request", "true")
        .form(&[("quantity", "0")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Quantity must be at least 1"));
    assert!(backend.last(&Method::PUT, "/cart/items/5").is_none());
}

#[tokio::test]
async fn test_remove_sends_quantity_removed() {
    let backend = FakeBackend::start().await;
    backend.ok(Method::POST, "/cart/items", cart_json(2));
    backend.ok(Method::GET, "/cart", cart_json(2));
    backend.ok(
        Method::DELETE,
        "/cart/items/5",
        json!({"token": "ct_1", "items": []}),
    );
    let base = start_storefront(&backend).await;
    let client = client();

    add_to_cart(&client, &base).await;

    let response = client
        .delete(format!("{base}/cart/items/5?quantity=1"))
        .header("hx-request", "true")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let request = backend.last(&Method::DELETE, "/cart/items/5").unwrap();
    assert_eq!(request.json(), json!({"quantity": 1}));

    // Without a quantity the whole line goes
    client
        .delete(format!("{base}/cart/items/5"))
        .header("hx-request", "true")
        .send()
        .await
        .unwrap();
    let request = backend.last(&Method::DELETE, "/cart/items/5").unwrap();
    assert_eq!(request.json(), json!({"quantity": 2}));
}

#[tokio::test]
async fn test_checkout_redirects_to_payment_page() {
    let backend = FakeBackend::start().await;
    backend.ok(Method::POST, "/cart/items", cart_json(1));
    backend.ok(Method::GET, "/cart", cart_json(1));
    backend.ok(
        Method::POST,
        "/checkout/sessions",
        json!({"id": "cs_1", "redirect_url": "https://pay.example.com/cs_1"}),
    );
    let base = start_storefront(&backend).await;
    let client = client();

    add_to_cart(&client, &base).await;
    let response = client
        .post(format!("{base}/checkout/details"))
        .form(&checkout_fields())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok()),
        Some("https://pay.example.com/cs_1")
    );

    let request = backend.last(&Method::POST, "/checkout/sessions").unwrap();
    assert_eq!(request.header("x-cart-token"), Some("ct_1"));
    let body = request.json();
    assert_eq!(body["contact"]["email"], "ada@example.com");
    assert_eq!(body["shipping_address"]["city"], "Portland");
    assert_eq!(body["same_as_shipping"], true);
    assert_eq!(body["notes"], "Leave at the door");
    assert_eq!(
        body["success_url"],
        "http://shop.test/checkout/success?session_id={CHECKOUT_SESSION_ID}"
    );
}

#[tokio::test]
async fn test_invalid_checkout_rerenders_without_calling_backend() {
    let backend = FakeBackend::start().await;
    backend.ok(Method::POST, "/cart/items", cart_json(1));
    backend.ok(Method::GET, "/cart", cart_json(1));
    let base = start_storefront(&backend).await;
    let client = client();

    add_to_cart(&client, &base).await;
    let mut fields = checkout_fields();
    fields.retain(|(name, _)| *name != "shipping_city");
    let response = client
        .post(format!("{base}/checkout/details"))
        .form(&fields)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.text().await.unwrap();
    assert!(body.contains("Shipping city is required"));
    assert!(body.contains("12 Analytical Row"));
    assert!(backend.last(&Method::POST, "/checkout/sessions").is_none());
}

#[tokio::test]
async fn test_checkout_with_empty_cart_redirects_to_cart() {
    let backend = FakeBackend::start().await;
    let base = start_storefront(&backend).await;
    let client = client();

    let response = client
        .get(format!("{base}/checkout"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok()),
        Some("/cart")
    );
}

#[tokio::test]
async fn test_remove_rejects_quantity_outside_line() {
    let backend = FakeBackend::start().await;
    backend.ok(Method::POST, "/cart/items", cart_json(2));
    backend.ok(Method::GET, "/cart", cart_json(2));
    let base = start_storefront(&backend).await;
    let client = client();

    add_to_cart(&client, &base).await;

    for quantity in ["0", "3"] {
        let response = client
            .delete(format!("{base}/cart/items/5?quantity={quantity}"))
            .header("hx-request", "true")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("hx-trigger").is_none());
    }
    let body = client
        .delete(format!("{base}/cart/items/5?quantity=3"))
        .header("hx-request", "true")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Only 2 of this item is in your cart"));
    assert!(backend.last(&Method::DELETE, "/cart/items/5").is_none());
}

fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
}

fn checkout_session_json(status: &str) -> serde_json::Value {
    json!({
        "id": "cs_1",
        "status": status,
        "email": "ada@example.com",
        "order_number": "EMP-1042",
        "items": cart_json(1)["items"],
        "subtotal": "6.50",
        "total": "6.50"
    })
}

#[tokio::test]
async fn test_guest_checkout_flow() {
    let backend = FakeBackend::start().await;
    backend.ok(Method::POST, "/cart/items", cart_json(1));
    backend.ok(Method::GET, "/cart", cart_json(1));
    backend.ok(
        Method::POST,
        "/checkout/sessions",
        json!({"id": "cs_1", "redirect_url": "https://pay.example.com/cs_1"}),
    );
    let base = start_storefront(&backend).await;
    let client = client();

    add_to_cart(&client, &base).await;

    // Details need contact information first
    let response = client
        .get(format!("{base}/checkout/details"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/checkout/guest"));

    let response = client
        .get(format!("{base}/checkout/guest"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("name=\"email\""));

    let response = client
        .post(format!("{base}/checkout/guest"))
        .form(&[("email", "not-an-email"), ("first_name", "Ada"), ("last_name", "Lovelace")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = client
        .post(format!("{base}/checkout/guest"))
        .form(&[("email", "Ada@Example.com"), ("first_name", "Ada"), ("last_name", "Lovelace")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/checkout/details"));

    let response = client
        .get(format!("{base}/checkout/details"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = response.text().await.unwrap();
    assert!(page.contains("ada@example.com"));
    assert!(page.contains("name=\"guest\" value=\"true\""));

    let mut fields: Vec<(&str, &str)> = checkout_fields()
        .into_iter()
        .filter(|(name, _)| !matches!(*name, "email" | "first_name" | "last_name"))
        .collect();
    fields.extend([
        ("guest", "true"),
        ("email", "ada@example.com"),
        ("first_name", "Ada"),
        ("last_name", "Lovelace"),
    ]);
    let response = client
        .post(format!("{base}/checkout/details"))
        .form(&fields)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("https://pay.example.com/cs_1"));

    let body = backend
        .last(&Method::POST, "/checkout/sessions")
        .unwrap()
        .json();
    assert_eq!(body["guest"], true);
    assert_eq!(body["contact"]["email"], "ada@example.com");
}

#[tokio::test]
async fn test_completed_checkout_forgets_cart() {
    let backend = FakeBackend::start().await;
    backend.ok(Method::POST, "/cart/items", cart_json(1));
    backend.ok(
        Method::GET,
        "/checkout/sessions/cs_1",
        checkout_session_json("complete"),
    );
    let base = start_storefront(&backend).await;
    let client = client();

    add_to_cart(&client, &base).await;
    let response = client
        .get(format!("{base}/checkout/success?session_id=cs_1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = response.text().await.unwrap();
    assert!(page.contains("EMP-1042"));
    assert!(!page.contains("still confirming your payment"));

    // A fresh cart is started on the next add
    add_to_cart(&client, &base).await;
    let request = backend.last(&Method::POST, "/cart/items").unwrap();
    assert_eq!(request.header("x-cart-token"), None);
}

#[tokio::test]
async fn test_unconfirmed_checkout_keeps_cart() {
    let backend = FakeBackend::start().await;
    backend.ok(Method::POST, "/cart/items", cart_json(1));
    backend.ok(
        Method::GET,
        "/checkout/sessions/cs_1",
        checkout_session_json("open"),
    );
    let base = start_storefront(&backend).await;
    let client = client();

    add_to_cart(&client, &base).await;
    let response = client
        .get(format!("{base}/checkout/success?session_id=cs_1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("still confirming your payment")
    );

    // Unknown session id: nothing to confirm either
    client
        .get(format!("{base}/checkout/success?session_id=cs_missing"))
        .send()
        .await
        .unwrap();

    add_to_cart(&client, &base).await;
    let request = backend.last(&Method::POST, "/cart/items").unwrap();
    assert_eq!(request.header("x-cart-token"), Some("ct_1"));
}

#[tokio::test]
async fn test_expired_checkout_returns_to_cart() {
    let backend = FakeBackend::start().await;
    backend.ok(Method::POST, "/cart/items", cart_json(1));
    backend.ok(Method::GET, "/cart", cart_json(1));
    backend.ok(
        Method::GET,
        "/checkout/sessions/cs_1",
        checkout_session_json("expired"),
    );
    let base = start_storefront(&backend).await;
    let client = client();

    add_to_cart(&client, &base).await;
    // Drop the "Added to your cart" toast
    client.get(format!("{base}/cart")).send().await.unwrap();

    let response = client
        .get(format!("{base}/checkout/success?session_id=cs_1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/cart"));

    let page = client
        .get(format!("{base}/cart"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Your checkout session expired"));
    assert!(page.contains("Sea Salt Soap"));
}

#[tokio::test]
async fn test_cancelled_payment_keeps_cart() {
    let backend = FakeBackend::start().await;
    backend.ok(Method::POST, "/cart/items", cart_json(1));
    let base = start_storefront(&backend).await;
    let client = client();

    add_to_cart(&client, &base).await;
    let response = client
        .get(format!("{base}/checkout/cancel?session_id=cs_1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = response.text().await.unwrap();
    assert!(page.contains("Payment was cancelled"));
    assert!(page.contains("Reference: cs_1"));

    add_to_cart(&client, &base).await;
    let request = backend.last(&Method::POST, "/cart/items").unwrap();
    assert_eq!(request.header("x-cart-token"), Some("ct_1"));
}

#[tokio::test]
async fn test_checkout_session_summary() {
    let backend = FakeBackend::start().await;
    backend.ok(
        Method::GET,
        "/checkout/sessions/cs_1",
        checkout_session_json("complete"),
    );
    let base = start_storefront(&backend).await;
    let client = client();

    let response = client
        .get(format!("{base}/checkout/sessions/cs_1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = response.text().await.unwrap();
    assert!(page.contains("Paid"));
    assert!(page.contains("Order EMP-1042"));
    assert!(page.contains("Sea Salt Soap"));

    let response = client
        .get(format!("{base}/checkout/sessions/cs_missing"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_pages_render_markdown() {
    let backend = FakeBackend::start().await;
    let base = start_storefront(&backend).await;
    let client = client();

    let response = client
        .get(format!("{base}/about"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = response.text().await.unwrap();
    assert!(page.contains("About Emporium"));
    assert!(page.contains("small independent shop"));
}
