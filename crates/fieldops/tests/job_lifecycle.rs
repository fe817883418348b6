//! End-to-end exercises of the dispatch workflow through the public
//! service facade and the HTTP router: scheduling, lifecycle advances,
//! invoicing, and payment settlement.

mod common {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};

    use fieldops::dispatch::{
        Customer, DispatchService, Job, LineItemInput, MemoryStore, Money, NewCustomer, NewJob,
        NewTechnician, ScheduleRequest, Technician,
    };

    pub(super) fn build_service() -> Arc<DispatchService<MemoryStore>> {
        Arc::new(DispatchService::new(Arc::new(MemoryStore::default())))
    }

    pub(super) fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0)
            .single()
            .expect("valid timestamp")
    }

    pub(super) fn ann(service: &DispatchService<MemoryStore>) -> Customer {
        service
            .create_customer(NewCustomer {
                name: "Ann".to_string(),
                phone: Some("515-555-0100".to_string()),
                email: Some("ann@example.com".to_string()),
                address: None,
            })
            .expect("customer created")
    }

    pub(super) fn taylor(service: &DispatchService<MemoryStore>) -> Technician {
        service
            .create_technician(NewTechnician {
                name: "Taylor".to_string(),
                phone: None,
                email: None,
            })
            .expect("technician created")
    }

    pub(super) fn leak_fix(service: &DispatchService<MemoryStore>, customer: &Customer) -> Job {
        service
            .create_job(NewJob {
                customer_id: customer.id,
                title: "Leak Fix".to_string(),
                description: Some("Kitchen sink drips overnight".to_string()),
            })
            .expect("job created")
    }

    pub(super) fn booking(
        technician: &Technician,
        from: (u32, u32),
        to: (u32, u32),
    ) -> ScheduleRequest {
        ScheduleRequest {
            technician_id: technician.id,
            start: at(from.0, from.1),
            end: at(to.0, to.1),
        }
    }

    pub(super) fn line(description: &str, quantity: f64, rate_major: f64) -> LineItemInput {
        LineItemInput {
            description: description.to_string(),
            quantity,
            rate: Money::from_major(rate_major),
        }
    }
}

mod lifecycle {
    use super::common::*;
    use fieldops::dispatch::{
        ConflictError, DispatchError, JobStatus, LedgerError, Money,
    };

    #[test]
    fn full_dispatch_scenario_runs_start_to_finish() {
        let service = build_service();
        let ann = ann(&service);
        let taylor = taylor(&service);
        let job = leak_fix(&service, &ann);
        assert_eq!(job.status, JobStatus::New);

        // booking Taylor advances the job in the same operation
        service
            .schedule_job(job.id, booking(&taylor, (10, 0), (11, 0)))
            .expect("first booking");
        let detail = service.job_detail(job.id).expect("detail");
        assert_eq!(detail.job.status, JobStatus::Scheduled);

        // a second overlapping booking for Taylor is refused
        let second = leak_fix(&service, &ann);
        match service.schedule_job(second.id, booking(&taylor, (10, 30), (11, 30))) {
            Err(DispatchError::Conflict(ConflictError::Schedule(conflict))) => {
                assert_eq!(conflict.technician, "Taylor");
            }
            other => panic!("expected schedule conflict, got {other:?}"),
        }

        // the appointment exists, so Done is a legal one-step move
        let done = service
            .update_status(job.id, JobStatus::Done)
            .expect("marked done");
        assert_eq!(done.status, JobStatus::Done);

        // invoicing computes amounts server-side and advances to Invoiced
        let invoice = service
            .create_invoice(job.id, &[line("Labor", 2.0, 50.0)])
            .expect("invoiced");
        assert_eq!(invoice.subtotal, Money::from_cents(10000));
        assert_eq!(invoice.balance, Money::from_cents(10000));
        assert_eq!(
            service.job_detail(job.id).expect("detail").job.status,
            JobStatus::Invoiced
        );

        // settling the balance flips the job to Paid in the same operation
        let receipt = service
            .record_payment(invoice.id, Money::from_major(100.0))
            .expect("payment");
        assert!(receipt.balance.is_zero());
        assert_eq!(
            service.job_detail(job.id).expect("detail").job.status,
            JobStatus::Paid
        );

        // the settled invoice accepts nothing further
        match service.record_payment(invoice.id, Money::from_major(1.0)) {
            Err(DispatchError::Ledger(LedgerError::ExceedsBalance { balance, .. })) => {
                assert!(balance.is_zero());
            }
            other => panic!("expected rejection on settled invoice, got {other:?}"),
        }
    }

    #[test]
    fn two_partial_payments_settle_exactly() {
        let service = build_service();
        let ann = ann(&service);
        let taylor = taylor(&service);
        let job = leak_fix(&service, &ann);
        service
            .schedule_job(job.id, booking(&taylor, (9, 0), (10, 0)))
            .expect("booked");
        service
            .update_status(job.id, JobStatus::Done)
            .expect("done");
        let invoice = service
            .create_invoice(job.id, &[line("Labor", 5.0, 100.0)])
            .expect("invoiced");
        assert_eq!(invoice.total, Money::from_major(500.0));

        let first = service
            .record_payment(invoice.id, Money::from_major(150.0))
            .expect("first payment");
        assert_eq!(first.balance, Money::from_major(350.0));

        let second = service
            .record_payment(invoice.id, Money::from_major(350.0))
            .expect("second payment");
        assert!(second.balance.is_zero());

        let detail = service.job_detail(job.id).expect("detail");
        assert_eq!(detail.job.status, JobStatus::Paid);
        let stored = detail.invoice.expect("invoice attached");
        assert_eq!(stored.payments.len(), 2);
        assert!(stored.invoice.balance.is_zero());
    }
}

mod over_http {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use fieldops::dispatch::dispatch_router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn call(
        router: &axum::Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(value) => builder
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&value).expect("serialize body"),
                ))
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
    async fn lifecycle_over_the_wire() {
        let router = dispatch_router(build_service());

        let (status, customer) = call(
            &router,
            "POST",
            "/api/v1/customers",
            Some(json!({ "name": "Ann" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let customer_id = customer["id"].as_i64().expect("customer id");

        let (status, technician) = call(
            &router,
            "POST",
            "/api/v1/technicians",
            Some(json!({ "name": "Taylor" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let technician_id = technician["id"].as_i64().expect("technician id");

        let (status, job) = call(
            &router,
            "POST",
            "/api/v1/jobs",
            Some(json!({ "customer_id": customer_id, "title": "Leak Fix" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(job["status"], json!("New"));
        let job_id = job["id"].as_i64().expect("job id");

        let (status, _) = call(
            &router,
            "POST",
            &format!("/api/v1/jobs/{job_id}/appointments"),
            Some(json!({
                "technician_id": technician_id,
                "start": at(10, 0),
                "end": at(11, 0),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, updated) = call(
            &router,
            "PATCH",
            &format!("/api/v1/jobs/{job_id}/status"),
            Some(json!({ "status": "Done" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], json!("Done"));

        let (status, invoice) = call(
            &router,
            "POST",
            &format!("/api/v1/jobs/{job_id}/invoice"),
            Some(json!({
                "line_items": [
                    { "description": "Labor", "quantity": 2.0, "rate": 50.0 }
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(invoice["subtotal"], json!(100.0));
        assert_eq!(invoice["balance"], json!(100.0));
        let invoice_id = invoice["id"].as_i64().expect("invoice id");

        let (status, receipt) = call(
            &router,
            "POST",
            &format!("/api/v1/invoices/{invoice_id}/payments"),
            Some(json!({ "amount": 100.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(receipt["balance"], json!(0.0));

        let (status, detail) = call(&router, "GET", &format!("/api/v1/jobs/{job_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["status"], json!("Paid"));
        assert_eq!(detail.pointer("/invoice/balance"), Some(&json!(0.0)));
        assert_eq!(
            detail
                .pointer("/invoice/payments")
                .and_then(Value::as_array)
                .map(Vec::len),
            Some(1)
        );
        assert_eq!(
            detail.pointer("/appointment/technician/name"),
            Some(&json!("Taylor"))
        );
    }
}
