//! Field-service dispatch domain: the job lifecycle state machine,
//! appointment conflict detection, and the invoice/payment ledger, plus
//! the coordinator and HTTP surface that tie them together.

pub mod domain;
pub mod ledger;
pub mod money;
pub mod repository;
pub mod router;
pub mod scheduling;
pub mod service;
pub mod status;

#[cfg(test)]
mod tests;

pub use domain::{
    Appointment, AppointmentDetail, AppointmentId, Customer, CustomerId, Invoice, InvoiceDetail,
    InvoiceId, Job, JobDetail, JobId, JobSummary, LineItem, LineItemInput, NewCustomer, NewJob,
    NewTechnician, Payment, PaymentId, PaymentReceipt, ScheduleRequest, Technician, TechnicianId,
};
pub use ledger::{InvoiceDraft, LedgerError};
pub use money::Money;
pub use repository::{memory::MemoryStore, DispatchStore, StoreError, StoreTxn};
pub use router::dispatch_router;
pub use scheduling::{InvalidWindow, ScheduleConflict, TimeWindow};
pub use service::{ConflictError, DispatchError, DispatchService, NotFound, ValidationError};
pub use status::{JobStatus, TransitionError};
