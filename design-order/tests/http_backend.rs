//! HTTP collaborator tests against a mock backend.

use design_core::{CanvasSize, EditorState, TextInput};
use design_order::{
    CustomerInfo, HttpBackend, OrderDetails, OrderError, OrderSink, ProductCatalog,
    SizeQuantities, SubmissionAssembler,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn order() -> design_order::OrderRequest {
    let mut state = EditorState::new(CanvasSize::new(500.0, 600.0));
    state.add_text(&TextInput::new("Crew")).expect("text");
    let custom = SubmissionAssembler::assemble(
        &state,
        "data:image/png;base64,AAAA".to_string(),
        &SizeQuantities::new().with("M", 2).with("L", 1),
    )
    .expect("assemble");
    SubmissionAssembler::build_order(
        12,
        Some(99.0),
        custom,
        OrderDetails {
            customer: CustomerInfo {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone: "555 0100".to_string(),
                address: "Main St".to_string(),
            },
            invoice: None,
            notes: Some("Rush".to_string()),
        },
    )
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_product_lookup_parses_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"id": 12, "name": "Hoodie", "imageUrl": "/img/hoodie.png", "price": 99.0}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&format!("{}/api", server.uri())).expect("client");
    let product = backend.product(12).await.expect("product");

    assert_eq!(product.name, "Hoodie");
    assert_eq!(product.image_url.as_deref(), Some("/img/hoodie.png"));
    assert_eq!(product.price, Some(99.0));
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_product_lookup_accepts_decimal_string_price() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"id": 3, "name": "Tee", "image": "/img/tee.png", "price": "120.50"}
        })))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&format!("{}/api", server.uri())).expect("client");
    let product = backend.product(3).await.expect("product");

    assert_eq!(product.price, Some(120.5));
    assert_eq!(product.image_url.as_deref(), Some("/img/tee.png"));
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_product_lookup_surfaces_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/5"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "message": "Product not found"
        })))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&server.uri()).expect("client");
    let err = backend.product(5).await.unwrap_err();

    assert!(matches!(err, OrderError::Rejected { .. }));
    assert_eq!(err.user_message(), "Product not found");
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_image_bytes_resolves_relative_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img/hoodie.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&format!("{}/api/", server.uri())).expect("client");
    let bytes = backend.image_bytes("/img/hoodie.png").await.expect("bytes");
    assert_eq!(bytes, vec![1, 2, 3]);
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_submit_posts_order_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/custom-production-requests"))
        .and(body_partial_json(json!({
            "productId": 12,
            "quantity": 3,
            "productPrice": 99.0,
            "customerName": "Ada",
            "notes": "Rush",
            "customizations": {
                "canvasSize": {"width": 500.0, "height": 600.0},
                "renderedImageDataUrl": "data:image/png;base64,AAAA",
                "sizeQuantities": {"L": 1, "M": 2}
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "data": {"id": 881},
            "message": "Request received"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&server.uri()).expect("client");
    let ack = backend.submit(&order()).await.expect("submit");

    assert_eq!(ack.id, Some(881));
    assert_eq!(ack.message.as_deref(), Some("Request received"));
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_submit_rejection_keeps_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/custom-production-requests"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "success": false,
            "message": "Minimum order is 10 pieces"
        })))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&server.uri()).expect("client");
    let err = backend.submit(&order()).await.unwrap_err();
    assert_eq!(err.to_string(), "Minimum order is 10 pieces");
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_submit_server_error_without_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/custom-production-requests"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&server.uri()).expect("client");
    let err = backend.submit(&order()).await.unwrap_err();
    assert!(err.to_string().contains("502"), "got {err}");
}
