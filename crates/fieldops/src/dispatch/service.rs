use std::sync::Arc;

use axum::http::StatusCode;
use tracing::info;

use super::domain::{
    Appointment, AppointmentDetail, Customer, CustomerId, Invoice, InvoiceDetail, InvoiceId, Job,
    JobDetail, JobId, JobSummary, LineItemInput, NewAppointment, NewCustomer, NewJob, NewPayment,
    NewTechnician, PaymentReceipt, ScheduleRequest, Technician, TechnicianId,
};
use super::ledger::{self, LedgerError};
use super::money::Money;
use super::repository::{DispatchStore, StoreError};
use super::scheduling::{InvalidWindow, ScheduleConflict, TimeWindow};
use super::status::{self, Advance, JobStatus, TransitionContext, TransitionError};

/// Input that fails before any store access happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error(transparent)]
    Window(#[from] InvalidWindow),
}

/// A referenced entity does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NotFound {
    #[error("customer {0} not found")]
    Customer(CustomerId),
    #[error("technician {0} not found")]
    Technician(TechnicianId),
    #[error("job {0} not found")]
    Job(JobId),
    #[error("invoice {0} not found")]
    Invoice(InvoiceId),
}

/// The request collides with existing state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error(transparent)]
    Schedule(#[from] ScheduleConflict),
    #[error("job {0} already has an appointment")]
    AppointmentExists(JobId),
    #[error("job {0} already has an invoice")]
    InvoiceExists(JobId),
}

/// Error surface of the coordinator. Every failure aborts the operation as
/// a whole; no partial mutation survives.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    NotFound(#[from] NotFound),
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

impl DispatchError {
    /// HTTP status the router and the application error surface agree on.
    pub fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::Validation(_) | DispatchError::Transition(_) => {
                StatusCode::BAD_REQUEST
            }
            DispatchError::NotFound(_) => StatusCode::NOT_FOUND,
            DispatchError::Conflict(_)
            | DispatchError::Ledger(LedgerError::ExceedsBalance { .. }) => StatusCode::CONFLICT,
            DispatchError::Ledger(_) => StatusCode::BAD_REQUEST,
            DispatchError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Coordinator for the dispatch domain. Sequences the conflict checker,
/// the status machine, and the ledger over one transactional store unit
/// per operation; the rules themselves live in those modules.
pub struct DispatchService<S> {
    store: Arc<S>,
}

fn required(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

impl<S> DispatchService<S>
where
    S: DispatchStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create_customer(&self, new: NewCustomer) -> Result<Customer, DispatchError> {
        required(&new.name, "name")?;
        let customer = self
            .store
            .transact(&mut |txn| Ok(txn.insert_customer(new.clone())?))?;
        info!(customer = %customer.id, "customer created");
        Ok(customer)
    }

    pub fn customer(&self, id: CustomerId) -> Result<Customer, DispatchError> {
        self.store
            .transact(&mut |txn| Ok(txn.customer(id)?.ok_or(NotFound::Customer(id))?))
    }

    pub fn customers(&self) -> Result<Vec<Customer>, DispatchError> {
        self.store.transact(&mut |txn| Ok(txn.customers()?))
    }

    pub fn create_technician(&self, new: NewTechnician) -> Result<Technician, DispatchError> {
        required(&new.name, "name")?;
        let technician = self
            .store
            .transact(&mut |txn| Ok(txn.insert_technician(new.clone())?))?;
        info!(technician = %technician.id, "technician created");
        Ok(technician)
    }

    pub fn technician(&self, id: TechnicianId) -> Result<Technician, DispatchError> {
        self.store
            .transact(&mut |txn| Ok(txn.technician(id)?.ok_or(NotFound::Technician(id))?))
    }

    pub fn technicians(&self) -> Result<Vec<Technician>, DispatchError> {
        self.store.transact(&mut |txn| Ok(txn.technicians()?))
    }

    /// Create a job for an existing customer; status always starts at New.
    pub fn create_job(&self, new: NewJob) -> Result<Job, DispatchError> {
        required(&new.title, "title")?;
        let job = self.store.transact(&mut |txn| {
            if txn.customer(new.customer_id)?.is_none() {
                return Err(NotFound::Customer(new.customer_id).into());
            }
            Ok(txn.insert_job(new.clone())?)
        })?;
        info!(job = %job.id, customer = %job.customer_id, "job created");
        Ok(job)
    }

    pub fn jobs(&self, status: Option<JobStatus>) -> Result<Vec<JobSummary>, DispatchError> {
        self.store.transact(&mut |txn| {
            let mut summaries = Vec::new();
            for job in txn.jobs()? {
                if status.is_some_and(|wanted| job.status != wanted) {
                    continue;
                }
                let customer = txn
                    .customer(job.customer_id)?
                    .ok_or(NotFound::Customer(job.customer_id))?;
                let invoice_balance = txn.invoice_for_job(job.id)?.map(|invoice| invoice.balance);
                summaries.push(JobSummary {
                    job,
                    customer,
                    invoice_balance,
                });
            }
            Ok(summaries)
        })
    }

    pub fn job_detail(&self, id: JobId) -> Result<JobDetail, DispatchError> {
        self.store.transact(&mut |txn| {
            let job = txn.job(id)?.ok_or(NotFound::Job(id))?;
            let customer = txn
                .customer(job.customer_id)?
                .ok_or(NotFound::Customer(job.customer_id))?;

            let appointment = match txn.appointment_for_job(job.id)? {
                Some(appointment) => {
                    let technician = txn
                        .technician(appointment.technician_id)?
                        .ok_or(NotFound::Technician(appointment.technician_id))?;
                    Some(AppointmentDetail {
                        appointment,
                        technician,
                    })
                }
                None => None,
            };

            let invoice = match txn.invoice_for_job(job.id)? {
                Some(invoice) => {
                    let payments = txn.payments_for_invoice(invoice.id)?;
                    Some(InvoiceDetail { invoice, payments })
                }
                None => None,
            };

            Ok(JobDetail {
                job,
                customer,
                appointment,
                invoice,
            })
        })
    }

    /// Book a technician for a job. The conflict check, the insert, and the
    /// advance to Scheduled happen inside one store transaction, so two
    /// racing requests for the same technician serialize.
    pub fn schedule_job(
        &self,
        job_id: JobId,
        request: ScheduleRequest,
    ) -> Result<Appointment, DispatchError> {
        let window =
            TimeWindow::new(request.start, request.end).map_err(ValidationError::from)?;

        let appointment = self.store.transact(&mut |txn| {
            let job = txn.job(job_id)?.ok_or(NotFound::Job(job_id))?;
            let technician = txn
                .technician(request.technician_id)?
                .ok_or(NotFound::Technician(request.technician_id))?;

            if txn.appointment_for_job(job.id)?.is_some() {
                return Err(ConflictError::AppointmentExists(job.id).into());
            }

            if let Some(existing) = txn.overlapping_appointment(technician.id, &window)? {
                let booked_title = txn
                    .job(existing.job_id)?
                    .map(|blocking| blocking.title)
                    .unwrap_or_else(|| "another job".to_string());
                return Err(ConflictError::Schedule(ScheduleConflict {
                    technician: technician.name.clone(),
                    job_title: booked_title,
                    booked: existing.window,
                })
                .into());
            }

            let appointment = txn.insert_appointment(NewAppointment {
                job_id: job.id,
                technician_id: technician.id,
                window,
            })?;
            txn.update_job_status(job.id, JobStatus::Scheduled)?;
            Ok(appointment)
        })?;

        info!(
            job = %job_id,
            technician = %appointment.technician_id,
            "job scheduled"
        );
        Ok(appointment)
    }

    /// Explicit one-step forward move. Equal target is an accepted no-op
    /// that returns the job unchanged.
    pub fn update_status(&self, job_id: JobId, target: JobStatus) -> Result<Job, DispatchError> {
        let job = self.store.transact(&mut |txn| {
            let job = txn.job(job_id)?.ok_or(NotFound::Job(job_id))?;
            let ctx = TransitionContext {
                has_appointment: txn.appointment_for_job(job.id)?.is_some(),
                invoice_balance: txn.invoice_for_job(job.id)?.map(|invoice| invoice.balance),
            };
            match status::validate(job.status, target, &ctx)? {
                Advance::NoOp => Ok(job),
                Advance::Step => Ok(txn.update_job_status(job.id, target)?),
            }
        })?;
        info!(job = %job.id, status = %job.status, "job status updated");
        Ok(job)
    }

    /// Create the invoice for a Done job and advance it to Invoiced in the
    /// same transaction.
    pub fn create_invoice(
        &self,
        job_id: JobId,
        line_items: &[LineItemInput],
    ) -> Result<Invoice, DispatchError> {
        let draft = ledger::draft_invoice(line_items)?;

        let invoice = self.store.transact(&mut |txn| {
            let job = txn.job(job_id)?.ok_or(NotFound::Job(job_id))?;
            if job.status != JobStatus::Done {
                return Err(TransitionError::InvoiceRequiresDone {
                    current: job.status,
                }
                .into());
            }
            if txn.invoice_for_job(job.id)?.is_some() {
                return Err(ConflictError::InvoiceExists(job.id).into());
            }

            let invoice = txn.insert_invoice(job.id, draft.clone())?;
            txn.update_job_status(job.id, JobStatus::Invoiced)?;
            Ok(invoice)
        })?;

        info!(job = %job_id, invoice = %invoice.id, total = %invoice.total, "invoice created");
        Ok(invoice)
    }

    /// Record a payment. Appending the row, writing the new balance, and
    /// the Paid advance at zero are one transaction; a concurrent payment
    /// sees the updated balance or none of it.
    pub fn record_payment(
        &self,
        invoice_id: InvoiceId,
        amount: Money,
    ) -> Result<PaymentReceipt, DispatchError> {
        let receipt = self.store.transact(&mut |txn| {
            let invoice = txn.invoice(invoice_id)?.ok_or(NotFound::Invoice(invoice_id))?;
            let balance = ledger::apply_payment(invoice.balance, amount)?;

            let payment = txn.insert_payment(NewPayment { invoice_id, amount })?;
            txn.update_invoice_balance(invoice_id, balance)?;
            if balance.is_zero() {
                txn.update_job_status(invoice.job_id, JobStatus::Paid)?;
            }
            Ok(PaymentReceipt { payment, balance })
        })?;

        info!(
            invoice = %invoice_id,
            amount = %amount,
            balance = %receipt.balance,
            "payment recorded"
        );
        Ok(receipt)
    }
}
