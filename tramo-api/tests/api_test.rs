use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use tramo_api::{app, AppState};
use tramo_catalog::{CatalogSettings, InventoryService};
use tramo_core::params::LegParams;
use tramo_core::token::{CredentialBook, TokenPool, TokenPoolConfig, TokenSource};
use tramo_core::trip::{Leg, Trip};
use tramo_core::vendor::{Credentials, MockVendorApi};
use tramo_order::{BookingCoordinator, BookingPolicy};
use tramo_store::InMemoryStateStore;

fn leg(origin: &str, destination: &str, route_code: &str, departure: &str) -> Leg {
    Leg {
        origin: origin.to_string(),
        destination: destination.to_string(),
        company: "TUR".to_string(),
        route_code: route_code.to_string(),
        hour_code: "0730".to_string(),
        additional_fare: false,
        departure: departure.to_string(),
        arrival: departure.to_string(),
        fare: 10_000,
        available_seats: 6,
        occupied_seats: 2,
    }
}

fn params() -> LegParams {
    LegParams::from_legs(&[leg("STG", "TAL", "R1", "24/12/2025 07:30")])
}

fn router(vendor: MockVendorApi) -> Router {
    let vendor = Arc::new(vendor);
    let tokens = Arc::new(TokenSource::new(
        vendor.clone(),
        TokenPool::new("inventory", TokenPoolConfig::default()),
        CredentialBook::new(Credentials::new("tramo", "pw")),
    ));
    let inventory = InventoryService::new(
        vendor.clone(),
        tokens.clone(),
        CatalogSettings {
            company: "TUR".to_string(),
            support_connections: true,
            skip_template_layout: false,
        },
    );
    let bookings = BookingCoordinator::new(
        vendor,
        tokens,
        Arc::new(InMemoryStateStore::new()),
        BookingPolicy::default(),
    );
    app(AppState {
        inventory: Arc::new(inventory),
        bookings: Arc::new(bookings),
    })
}

async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn transaction_id() -> String {
    format!("mkt-{}", uuid::Uuid::new_v4().simple())
}

fn block_body(seats: &[u32]) -> Value {
    let params = params();
    json!({
        "clParam1": params.cl_param1,
        "clParam2": params.cl_param2,
        "clParam3": params.cl_param3,
        "seats": seats,
        "passengers": seats.iter().map(|seat| json!({
            "first_name": "Maria Fernanda",
            "last_name": "Rodriguez Lopez",
            "document_type": "RUT",
            "document_number": format!("{}-9", seat),
            "seat": seat
        })).collect::<Vec<_>>()
    })
}

fn legs_body() -> Value {
    serde_json::to_value(params()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = call(&router(MockVendorApi::new()), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_trip_listing() {
    let vendor = MockVendorApi::new().with_trips(vec![
        Trip::new(vec![leg("STG", "TAL", "R1", "24/12/2025 07:30")]),
        Trip::new(vec![leg("STG", "CON", "R9", "24/12/2025 09:00")]),
    ]);

    let (status, body) = call(
        &router(vendor),
        "GET",
        "/v1/trips?origin=STG&destination=TAL&date=2025-12-24",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let listings = body.as_array().unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0]["route_id"], "TUR-R1");
    assert_eq!(listings[0]["journey_id"], "R1-0730-241220250730");
    assert_eq!(listings[0]["clParam1"], "STG|TAL");
    assert_eq!(listings[0]["available_seats"], 6);
}

#[tokio::test]
async fn test_vendor_failure_is_bad_gateway() {
    let vendor = MockVendorApi::new().with_trips_error("servicio no disponible");
    let (status, body) = call(
        &router(vendor),
        "GET",
        "/v1/trips?origin=STG&destination=TAL&date=2025-12-24",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("servicio no disponible"));
}

#[tokio::test]
async fn test_malformed_params_are_rejected() {
    let body = json!({"clParam1": "STG|TAL", "clParam2": "TUR|R1|0730", "clParam3": "x|1"});
    let (status, _) = call(&router(MockVendorApi::new()), "POST", "/v1/layouts", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_booking_lifecycle_over_http() {
    let router = router(MockVendorApi::new());
    let txn = transaction_id();

    let (status, receipt) = call(&router, "POST", &format!("/v1/bookings/{}/block", txn), Some(block_body(&[3, 4]))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(receipt["seats"], json!([3, 4]));

    let (status, extended) = call(&router, "POST", &format!("/v1/bookings/{}/extend", txn), Some(legs_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(extended["reference_ids"].as_array().unwrap().len(), 1);

    let (status, confirmation) = call(&router, "POST", &format!("/v1/bookings/{}/confirm", txn), Some(legs_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmation["seats"]["3"], "TK-R1-3");
    assert_eq!(confirmation["seats"]["4"], "TK-R1-4");
}

#[tokio::test]
async fn test_confirm_unknown_transaction_is_not_found() {
    let (status, body) = call(
        &router(MockVendorApi::new()),
        "POST",
        &format!("/v1/bookings/{}/confirm", transaction_id()),
        Some(legs_body()),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("tentative data not found"));
}

#[tokio::test]
async fn test_partial_unblock_is_a_conflict() {
    let router = router(MockVendorApi::new().fail_unmark("R1", 4, "asiento en venta"));
    let txn = transaction_id();
    call(&router, "POST", &format!("/v1/bookings/{}/block", txn), Some(block_body(&[3, 4]))).await;

    let (status, body) = call(&router, "POST", &format!("/v1/bookings/{}/unblock", txn), Some(legs_body())).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["released"], json!([3]));
    assert_eq!(body["details"]["blocked"]["4"], "asiento en venta");
}

#[tokio::test]
async fn test_cancel_is_not_implemented() {
    let (status, _) = call(
        &router(MockVendorApi::new()),
        "DELETE",
        &format!("/v1/bookings/{}", transaction_id()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
}
