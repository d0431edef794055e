//! Integration tests for the session cart and checkout entry point.
//!
//! These tests require a seeded menu, a running storefront and, for the
//! signed-in flows, `TEST_USER_EMAIL` / `TEST_USER_PASSWORD`.

use reqwest::StatusCode;
use sinocoffee_integration_tests::{TestContext, any_menu_item, pool};

#[tokio::test]
#[ignore = "Requires running storefront, seeded menu and a test account"]
async fn test_add_update_and_clear_cart() {
    let ctx = TestContext::signed_in().await;
    let pool = pool().await;
    let (item_id, name) = any_menu_item(&pool).await;
    let item_id = item_id.to_string();

    // Add twice: same line, quantity 2
    for _ in 0..2 {
        let resp = ctx.hx_post("/cart/add", &[("item_id", &item_id)]).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("hx-trigger").and_then(|v| v.to_str().ok()),
            Some("cart-updated")
        );
        assert!(resp.text().await.expect("body").contains("Added to cart!"));
    }

    let count = ctx.hx_get("/cart/count").await.text().await.expect("body");
    assert!(count.contains(">2<"), "badge was {count}");

    let drawer = ctx.hx_get("/cart").await.text().await.expect("body");
    assert!(drawer.contains(&name));
    assert!(drawer.contains("Your Cart (2)"));

    // Quantity zero removes the line
    let drawer = ctx
        .hx_post("/cart/update", &[("item_id", &item_id), ("quantity", "0")])
        .await
        .text()
        .await
        .expect("body");
    assert!(drawer.contains("Your cart is empty"));

    let count = ctx.hx_get("/cart/count").await.text().await.expect("body");
    assert!(!count.contains("cart-badge"));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded menu"]
async fn test_guest_add_to_cart_asks_to_sign_in() {
    let ctx = TestContext::new();
    let pool = pool().await;
    let (item_id, _) = any_menu_item(&pool).await;

    let resp = ctx
        .hx_post("/cart/add", &[("item_id", &item_id.to_string())])
        .await;
    assert_eq!(
        resp.headers().get("hx-redirect").and_then(|v| v.to_str().ok()),
        Some("/auth/login")
    );
}

#[tokio::test]
#[ignore = "Requires running storefront and a test account"]
async fn test_unknown_item_is_rejected() {
    let ctx = TestContext::signed_in().await;
    let resp = ctx
        .hx_post("/cart/add", &[("item_id", "00000000-0000-4000-8000-000000000000")])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get("hx-trigger").is_none());
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_checkout_with_empty_cart() {
    let ctx = TestContext::new();
    let resp = ctx.hx_post("/checkout", &[]).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get("hx-redirect").is_none());
    assert!(resp.text().await.expect("body").contains("Cart is empty"));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded menu"]
async fn test_guest_favorite_toggle_asks_to_sign_in() {
    let ctx = TestContext::new();
    let pool = pool().await;
    let (item_id, _) = any_menu_item(&pool).await;

    let body = ctx
        .hx_post(&format!("/menu/{item_id}/favorite"), &[])
        .await
        .text()
        .await
        .expect("body");
    assert!(body.contains("Authentication Required"));
}
