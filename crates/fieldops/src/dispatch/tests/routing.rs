use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::dispatch::router::dispatch_router;
use crate::dispatch::status::JobStatus;

fn router() -> axum::Router {
    dispatch_router(Arc::new(build_service()))
}

async fn send(router: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&value).expect("serialize body")))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router dispatch");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    let payload = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json payload")
    };
    (status, payload)
}

#[tokio::test]
async fn create_customer_returns_created_row() {
    let router = router();
    let (status, payload) = send(
        &router,
        "POST",
        "/api/v1/customers",
        Some(json!({ "name": "Ann", "phone": "515-555-0100" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(payload.get("id").is_some());
    assert_eq!(payload.get("name"), Some(&json!("Ann")));
    assert_eq!(payload.get("email"), Some(&Value::Null));
}

#[tokio::test]
async fn missing_name_is_a_bad_request() {
    let router = router();
    let (status, payload) = send(
        &router,
        "POST",
        "/api/v1/technicians",
        Some(json!({ "name": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("required"));
}

#[tokio::test]
async fn job_for_unknown_customer_is_not_found() {
    let router = router();
    let (status, _) = send(
        &router,
        "POST",
        "/api/v1/jobs",
        Some(json!({ "customer_id": 42, "title": "Leak Fix" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn double_booking_surfaces_as_conflict() {
    let service = Arc::new(build_service());
    let ann = customer(&service, "Ann");
    let taylor = technician(&service, "Taylor");
    let first = job(&service, &ann, "Leak Fix");
    schedule(&service, &first, &taylor, (10, 0), (11, 0)).expect("first booking");
    let second = job(&service, &ann, "Water Heater");

    let router = dispatch_router(service);
    let (status, payload) = send(
        &router,
        "POST",
        &format!("/api/v1/jobs/{}/appointments", second.id),
        Some(json!({
            "technician_id": taylor.id,
            "start": at(10, 30),
            "end": at(11, 30),
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    let message = payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default();
    assert!(message.contains("Taylor"));
    assert!(message.contains("already booked"));
}

#[tokio::test]
async fn skipped_status_update_is_rejected() {
    let service = Arc::new(build_service());
    let ann = customer(&service, "Ann");
    let target = job(&service, &ann, "Leak Fix");

    let router = dispatch_router(service);
    let (status, payload) = send(
        &router,
        "PATCH",
        &format!("/api/v1/jobs/{}/status", target.id),
        Some(json!({ "status": "Done" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("one step"));
}

#[tokio::test]
async fn overpayment_surfaces_as_conflict() {
    let service = Arc::new(build_service());
    let ann = customer(&service, "Ann");
    let taylor = technician(&service, "Taylor");
    let done = done_job(&service, &ann, &taylor, "Leak Fix", (10, 0), (11, 0));
    let invoice = service
        .create_invoice(done.id, &[line("Labor", 2.0, 50.0)])
        .expect("invoiced");

    let router = dispatch_router(service);
    let (status, _) = send(
        &router,
        "POST",
        &format!("/api/v1/invoices/{}/payments", invoice.id),
        Some(json!({ "amount": 250.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn job_listing_filters_by_status() {
    let service = Arc::new(build_service());
    let ann = customer(&service, "Ann");
    let taylor = technician(&service, "Taylor");
    job(&service, &ann, "Water Heater");
    done_job(&service, &ann, &taylor, "Leak Fix", (10, 0), (11, 0));

    let router = dispatch_router(service);
    let (status, payload) = send(&router, "GET", "/api/v1/jobs?status=Done", None).await;

    assert_eq!(status, StatusCode::OK);
    let jobs = payload.as_array().expect("array payload");
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].get("title"), Some(&json!("Leak Fix")));
    assert_eq!(
        jobs[0].get("status"),
        Some(&json!(JobStatus::Done.label()))
    );
}

#[tokio::test]
async fn job_detail_keeps_absent_relations_explicit() {
    let service = Arc::new(build_service());
    let ann = customer(&service, "Ann");
    let fresh = job(&service, &ann, "Leak Fix");

    let router = dispatch_router(service);
    let (status, payload) = send(&router, "GET", &format!("/api/v1/jobs/{}", fresh.id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload.get("appointment"), Some(&Value::Null));
    assert_eq!(payload.get("invoice"), Some(&Value::Null));
    assert_eq!(
        payload.pointer("/customer/name"),
        Some(&json!("Ann"))
    );
}
