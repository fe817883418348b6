use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    CustomerId, InvoiceId, JobId, LineItemInput, NewCustomer, NewJob, NewTechnician,
    ScheduleRequest, TechnicianId,
};
use super::money::Money;
use super::repository::DispatchStore;
use super::service::{DispatchError, DispatchService};
use super::status::JobStatus;

/// Router exposing the dispatch operation surface under `/api/v1`.
pub fn dispatch_router<S>(service: Arc<DispatchService<S>>) -> Router
where
    S: DispatchStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/customers",
            post(create_customer::<S>).get(list_customers::<S>),
        )
        .route("/api/v1/customers/:id", get(get_customer::<S>))
        .route(
            "/api/v1/technicians",
            post(create_technician::<S>).get(list_technicians::<S>),
        )
        .route("/api/v1/technicians/:id", get(get_technician::<S>))
        .route("/api/v1/jobs", post(create_job::<S>).get(list_jobs::<S>))
        .route("/api/v1/jobs/:id", get(get_job::<S>))
        .route("/api/v1/jobs/:id/appointments", post(schedule_job::<S>))
        .route("/api/v1/jobs/:id/status", patch(update_job_status::<S>))
        .route("/api/v1/jobs/:id/invoice", post(create_invoice::<S>))
        .route(
            "/api/v1/invoices/:id/payments",
            post(record_payment::<S>),
        )
        .with_state(service)
}

fn error_response(err: DispatchError) -> Response {
    let status = err.status_code();
    let body = Json(json!({ "error": err.to_string() }));
    (status, body).into_response()
}

fn created<T: serde::Serialize>(value: T) -> Response {
    (StatusCode::CREATED, Json(value)).into_response()
}

fn ok<T: serde::Serialize>(value: T) -> Response {
    (StatusCode::OK, Json(value)).into_response()
}

async fn create_customer<S: DispatchStore + 'static>(
    State(service): State<Arc<DispatchService<S>>>,
    Json(new): Json<NewCustomer>,
) -> Response {
    match service.create_customer(new) {
        Ok(customer) => created(customer),
        Err(err) => error_response(err),
    }
}

async fn list_customers<S: DispatchStore + 'static>(
    State(service): State<Arc<DispatchService<S>>>,
) -> Response {
    match service.customers() {
        Ok(customers) => ok(customers),
        Err(err) => error_response(err),
    }
}

async fn get_customer<S: DispatchStore + 'static>(
    State(service): State<Arc<DispatchService<S>>>,
    Path(id): Path<i64>,
) -> Response {
    match service.customer(CustomerId(id)) {
        Ok(customer) => ok(customer),
        Err(err) => error_response(err),
    }
}

async fn create_technician<S: DispatchStore + 'static>(
    State(service): State<Arc<DispatchService<S>>>,
    Json(new): Json<NewTechnician>,
) -> Response {
    match service.create_technician(new) {
        Ok(technician) => created(technician),
        Err(err) => error_response(err),
    }
}

async fn list_technicians<S: DispatchStore + 'static>(
    State(service): State<Arc<DispatchService<S>>>,
) -> Response {
    match service.technicians() {
        Ok(technicians) => ok(technicians),
        Err(err) => error_response(err),
    }
}

async fn get_technician<S: DispatchStore + 'static>(
    State(service): State<Arc<DispatchService<S>>>,
    Path(id): Path<i64>,
) -> Response {
    match service.technician(TechnicianId(id)) {
        Ok(technician) => ok(technician),
        Err(err) => error_response(err),
    }
}

async fn create_job<S: DispatchStore + 'static>(
    State(service): State<Arc<DispatchService<S>>>,
    Json(new): Json<NewJob>,
) -> Response {
    match service.create_job(new) {
        Ok(job) => created(job),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct JobsQuery {
    status: Option<JobStatus>,
}

async fn list_jobs<S: DispatchStore + 'static>(
    State(service): State<Arc<DispatchService<S>>>,
    Query(query): Query<JobsQuery>,
) -> Response {
    match service.jobs(query.status) {
        Ok(jobs) => ok(jobs),
        Err(err) => error_response(err),
    }
}

async fn get_job<S: DispatchStore + 'static>(
    State(service): State<Arc<DispatchService<S>>>,
    Path(id): Path<i64>,
) -> Response {
    match service.job_detail(JobId(id)) {
        Ok(detail) => ok(detail),
        Err(err) => error_response(err),
    }
}

async fn schedule_job<S: DispatchStore + 'static>(
    State(service): State<Arc<DispatchService<S>>>,
    Path(id): Path<i64>,
    Json(request): Json<ScheduleRequest>,
) -> Response {
    match service.schedule_job(JobId(id), request) {
        Ok(appointment) => created(appointment),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    status: JobStatus,
}

async fn update_job_status<S: DispatchStore + 'static>(
    State(service): State<Arc<DispatchService<S>>>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateStatusRequest>,
) -> Response {
    match service.update_status(JobId(id), request.status) {
        Ok(job) => ok(job),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct CreateInvoiceRequest {
    line_items: Vec<LineItemInput>,
}

async fn create_invoice<S: DispatchStore + 'static>(
    State(service): State<Arc<DispatchService<S>>>,
    Path(id): Path<i64>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Response {
    match service.create_invoice(JobId(id), &request.line_items) {
        Ok(invoice) => created(invoice),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct RecordPaymentRequest {
    amount: Money,
}

async fn record_payment<S: DispatchStore + 'static>(
    State(service): State<Arc<DispatchService<S>>>,
    Path(id): Path<i64>,
    Json(request): Json<RecordPaymentRequest>,
) -> Response {
    match service.record_payment(InvoiceId(id), request.amount) {
        Ok(receipt) => created(receipt),
        Err(err) => error_response(err),
    }
}
