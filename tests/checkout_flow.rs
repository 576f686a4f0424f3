//! End-to-end checkout against a live listener.

use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::StatusCode;
use storefront::lifecycle::startup::{self, Service};
use storefront::repository::{order, product};
use tempfile::TempDir;

mod common;

const FORM: &str = "application/x-www-form-urlencoded";

async fn start_service() -> (TempDir, Service) {
    let dir = tempfile::tempdir().unwrap();
    let service = startup::start(common::service_config(&dir)).await.unwrap();
    product::insert_product(service.database(), &common::widget())
        .await
        .unwrap();
    (dir, service)
}

async fn stop(service: Service) {
    service.shutdown_handle().trigger();
    service.wait().await.unwrap();
}

#[tokio::test]
async fn test_checkout_redirects_to_confirmation() {
    let (_dir, service) = start_service().await;
    let addr = service.local_addr();
    let client = common::client();

    let response = client
        .post(common::url(addr, "/checkout"))
        .header(CONTENT_TYPE, FORM)
        .body("product_id=7&quantity=3")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(response.headers().contains_key("x-request-id"));

    let location = response.headers()[LOCATION].to_str().unwrap().to_string();
    let order_id: i64 = location
        .strip_prefix("/success?order_id=")
        .unwrap()
        .parse()
        .unwrap();

    let stored = order::get_order(service.database(), order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.product_id, 7);
    assert_eq!(stored.quantity, 3);
    assert_eq!(stored.total_cents, 3000);

    let page = client
        .get(common::url(addr, &location))
        .send()
        .await
        .unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    let body = page.text().await.unwrap();
    assert!(body.contains("Widget"));
    assert!(body.contains("30.00"));

    stop(service).await;
}

#[tokio::test]
async fn test_unknown_product_creates_no_order() {
    let (_dir, service) = start_service().await;
    let client = common::client();

    let response = client
        .post(common::url(service.local_addr(), "/checkout"))
        .header(CONTENT_TYPE, FORM)
        .body("product_id=424242&quantity=1")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json: serde_json::Value = serde_json::from_str(&response.text().await.unwrap()).unwrap();
    assert_eq!(json["error"], "Product not found");

    assert_eq!(order::count_orders(service.database()).await.unwrap(), 0);
    stop(service).await;
}

#[tokio::test]
async fn test_rejects_non_positive_quantity() {
    let (_dir, service) = start_service().await;
    let client = common::client();

    let response = client
        .post(common::url(service.local_addr(), "/checkout"))
        .header(CONTENT_TYPE, FORM)
        .body("product_id=7&quantity=0")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(order::count_orders(service.database()).await.unwrap(), 0);

    stop(service).await;
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let (_dir, service) = start_service().await;

    let response = common::client()
        .get(common::url(service.local_addr(), "/success?order_id=999"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    stop(service).await;
}

#[tokio::test]
async fn test_listing_shows_seeded_catalogue() {
    let (_dir, service) = start_service().await;

    let body = common::client()
        .get(common::url(service.local_addr(), "/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Mechanical Keyboard"));
    assert!(body.contains("Widget"));
    assert!(body.contains("action=\"/checkout\""));

    stop(service).await;
}
