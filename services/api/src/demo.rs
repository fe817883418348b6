use chrono::{Duration, Utc};
use clap::Args;
use fieldops::dispatch::{
    LineItemInput, Money, NewCustomer, NewJob, NewTechnician, ScheduleRequest,
};
use fieldops::error::AppError;

use crate::infra::build_dispatch_service;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Days from now to place the demo appointment (defaults to tomorrow)
    #[arg(long, default_value_t = 1)]
    pub(crate) start_in_days: i64,
}

/// Walk the full lifecycle once: intake, booking (including a refused
/// double-booking), completion, invoicing, and settlement.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let service = build_dispatch_service();

    let ann = service.create_customer(NewCustomer {
        name: "Ann".to_string(),
        phone: Some("515-555-0100".to_string()),
        email: None,
        address: Some("12 Orchard Lane".to_string()),
    })?;
    println!("customer #{}: {}", ann.id, ann.name);

    let taylor = service.create_technician(NewTechnician {
        name: "Taylor".to_string(),
        phone: None,
        email: None,
    })?;
    println!("technician #{}: {}", taylor.id, taylor.name);

    let job = service.create_job(NewJob {
        customer_id: ann.id,
        title: "Leak Fix".to_string(),
        description: Some("Kitchen sink drips overnight".to_string()),
    })?;
    println!("job #{} \"{}\" is {}", job.id, job.title, job.status);

    let start = Utc::now() + Duration::days(args.start_in_days);
    let appointment = service.schedule_job(
        job.id,
        ScheduleRequest {
            technician_id: taylor.id,
            start,
            end: start + Duration::hours(1),
        },
    )?;
    println!(
        "booked {} from {} to {}",
        taylor.name,
        appointment.window.start.format("%Y-%m-%d %H:%M"),
        appointment.window.end.format("%Y-%m-%d %H:%M"),
    );

    let rival = service.create_job(NewJob {
        customer_id: ann.id,
        title: "Water Heater".to_string(),
        description: None,
    })?;
    match service.schedule_job(
        rival.id,
        ScheduleRequest {
            technician_id: taylor.id,
            start: start + Duration::minutes(30),
            end: start + Duration::minutes(90),
        },
    ) {
        Err(err) => println!("second booking refused: {err}"),
        Ok(_) => println!("unexpected: overlapping booking was accepted"),
    }

    let done = service.update_status(job.id, fieldops::dispatch::JobStatus::Done)?;
    println!("job #{} is {}", done.id, done.status);

    let invoice = service.create_invoice(
        job.id,
        &[LineItemInput {
            description: "Labor".to_string(),
            quantity: 2.0,
            rate: Money::from_major(50.0),
        }],
    )?;
    println!(
        "invoice #{}: subtotal {}, balance {}",
        invoice.id, invoice.subtotal, invoice.balance
    );

    let receipt = service.record_payment(invoice.id, Money::from_major(100.0))?;
    println!(
        "payment #{} received, remaining balance {}",
        receipt.payment.id, receipt.balance
    );

    match service.record_payment(invoice.id, Money::from_major(1.0)) {
        Err(err) => println!("further payment refused: {err}"),
        Ok(_) => println!("unexpected: payment accepted on a settled invoice"),
    }

    let detail = service.job_detail(job.id)?;
    println!("job #{} finished as {}", detail.job.id, detail.job.status);
    Ok(())
}
