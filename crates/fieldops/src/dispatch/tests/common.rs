use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::dispatch::domain::{
    Customer, Job, LineItemInput, NewCustomer, NewJob, NewTechnician, ScheduleRequest, Technician,
};
use crate::dispatch::money::Money;
use crate::dispatch::repository::memory::MemoryStore;
use crate::dispatch::repository::{DispatchStore, StoreError, StoreTxn};
use crate::dispatch::service::{DispatchError, DispatchService};
use crate::dispatch::status::JobStatus;

pub(super) fn build_service() -> DispatchService<MemoryStore> {
    DispatchService::new(Arc::new(MemoryStore::default()))
}

pub(super) fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn customer(service: &DispatchService<MemoryStore>, name: &str) -> Customer {
    service
        .create_customer(NewCustomer {
            name: name.to_string(),
            phone: Some("515-555-0100".to_string()),
            email: None,
            address: None,
        })
        .expect("customer created")
}

pub(super) fn technician(service: &DispatchService<MemoryStore>, name: &str) -> Technician {
    service
        .create_technician(NewTechnician {
            name: name.to_string(),
            phone: None,
            email: None,
        })
        .expect("technician created")
}

pub(super) fn job(
    service: &DispatchService<MemoryStore>,
    customer: &Customer,
    title: &str,
) -> Job {
    service
        .create_job(NewJob {
            customer_id: customer.id,
            title: title.to_string(),
            description: None,
        })
        .expect("job created")
}

pub(super) fn schedule(
    service: &DispatchService<MemoryStore>,
    job: &Job,
    technician: &Technician,
    from: (u32, u32),
    to: (u32, u32),
) -> Result<crate::dispatch::domain::Appointment, DispatchError> {
    service.schedule_job(
        job.id,
        ScheduleRequest {
            technician_id: technician.id,
            start: at(from.0, from.1),
            end: at(to.0, to.1),
        },
    )
}

/// Build a job already advanced to Done with an appointment in place.
pub(super) fn done_job(
    service: &DispatchService<MemoryStore>,
    customer: &Customer,
    technician: &Technician,
    title: &str,
    from: (u32, u32),
    to: (u32, u32),
) -> Job {
    let job = job(service, customer, title);
    schedule(service, &job, technician, from, to).expect("scheduled");
    service
        .update_status(job.id, JobStatus::Done)
        .expect("marked done")
}

pub(super) fn line(description: &str, quantity: f64, rate_major: f64) -> LineItemInput {
    LineItemInput {
        description: description.to_string(),
        quantity,
        rate: Money::from_major(rate_major),
    }
}

/// Store that fails every transaction, for propagation tests.
pub(super) struct UnavailableStore;

impl DispatchStore for UnavailableStore {
    fn transact<T>(
        &self,
        _op: &mut dyn FnMut(&mut dyn StoreTxn) -> Result<T, DispatchError>,
    ) -> Result<T, DispatchError> {
        Err(StoreError::Unavailable("database offline".to_string()).into())
    }
}
