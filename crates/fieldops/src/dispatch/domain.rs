use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;
use super::scheduling::TimeWindow;
use super::status::JobStatus;

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(CustomerId);
id_newtype!(TechnicianId);
id_newtype!(JobId);
id_newtype!(AppointmentId);
id_newtype!(InvoiceId);
id_newtype!(PaymentId);

/// A customer who requests work. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Intake payload for a new customer; only the name is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technician {
    pub id: TechnicianId,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTechnician {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// The central entity: one unit of billable field work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub customer_id: CustomerId,
    pub title: String,
    pub description: Option<String>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJob {
    pub customer_id: CustomerId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A technician's booked window for one job. Created once when the job is
/// scheduled; there is no reschedule or cancel operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub job_id: JobId,
    pub technician_id: TechnicianId,
    #[serde(flatten)]
    pub window: TimeWindow,
    pub created_at: DateTime<Utc>,
}

/// Booking request for a job. The window is validated before any store
/// access happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub technician_id: TechnicianId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Insert payload for an appointment, produced by the coordinator after
/// the conflict check passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewAppointment {
    pub job_id: JobId,
    pub technician_id: TechnicianId,
    pub window: TimeWindow,
}

/// Line item as submitted by the caller; the amount is computed server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemInput {
    pub description: String,
    pub quantity: f64,
    pub rate: Money,
}

/// Line item as persisted, with its derived amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub rate: Money,
    pub amount: Money,
}

/// Billing document for a Done job. Line items and totals are frozen at
/// creation; only `balance` moves as payments land.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub job_id: JobId,
    pub line_items: Vec<LineItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub balance: Money,
    pub created_at: DateTime<Utc>,
}

/// Append-only record of money received against an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub invoice_id: InvoiceId,
    pub amount: Money,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewPayment {
    pub invoice_id: InvoiceId,
    pub amount: Money,
}

/// Result of recording a payment: the stored row plus the balance it left
/// behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaymentReceipt {
    pub payment: Payment,
    pub balance: Money,
}

/// Board listing entry: the job joined with its customer and, when an
/// invoice exists, the outstanding balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSummary {
    #[serde(flatten)]
    pub job: Job,
    pub customer: Customer,
    pub invoice_balance: Option<Money>,
}

/// Appointment joined with its technician for read views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub technician: Technician,
}

/// Invoice joined with its ordered payments for read views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub payments: Vec<Payment>,
}

/// Full job view. Absent relations stay explicit `None` rather than ad hoc
/// nullable joins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    pub customer: Customer,
    pub appointment: Option<AppointmentDetail>,
    pub invoice: Option<InvoiceDetail>,
}
