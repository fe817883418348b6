use super::domain::{
    Appointment, AppointmentId, Customer, CustomerId, Invoice, InvoiceId, Job, JobId,
    NewAppointment, NewCustomer, NewJob, NewPayment, NewTechnician, Payment, PaymentId,
    Technician, TechnicianId,
};
use super::ledger::InvoiceDraft;
use super::money::Money;
use super::scheduling::TimeWindow;
use super::service::DispatchError;
use super::status::JobStatus;

/// Failure inside the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness backstop fired (job already owns the named resource).
    #[error("{0} already exists for this job")]
    Duplicate(&'static str),
    /// A row the transaction already observed has vanished; indicates a
    /// broken store invariant rather than caller error.
    #[error("{0} row missing mid-transaction")]
    Missing(&'static str),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Primitive operations available inside one transactional unit. Ids are
/// store-generated; inserts return the persisted row.
pub trait StoreTxn {
    fn insert_customer(&mut self, new: NewCustomer) -> Result<Customer, StoreError>;
    fn customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError>;
    fn customers(&self) -> Result<Vec<Customer>, StoreError>;

    fn insert_technician(&mut self, new: NewTechnician) -> Result<Technician, StoreError>;
    fn technician(&self, id: TechnicianId) -> Result<Option<Technician>, StoreError>;
    fn technicians(&self) -> Result<Vec<Technician>, StoreError>;

    fn insert_job(&mut self, new: NewJob) -> Result<Job, StoreError>;
    fn job(&self, id: JobId) -> Result<Option<Job>, StoreError>;
    /// All jobs, newest first.
    fn jobs(&self) -> Result<Vec<Job>, StoreError>;
    /// Persist a new status and refresh the job's update timestamp.
    fn update_job_status(&mut self, id: JobId, status: JobStatus) -> Result<Job, StoreError>;

    fn appointment_for_job(&self, job_id: JobId) -> Result<Option<Appointment>, StoreError>;
    /// The interval-overlap query: an existing appointment for the
    /// technician satisfying `window.start < end AND window.end > start`.
    fn overlapping_appointment(
        &self,
        technician_id: TechnicianId,
        window: &TimeWindow,
    ) -> Result<Option<Appointment>, StoreError>;
    fn insert_appointment(&mut self, new: NewAppointment) -> Result<Appointment, StoreError>;

    fn invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, StoreError>;
    fn invoice_for_job(&self, job_id: JobId) -> Result<Option<Invoice>, StoreError>;
    fn insert_invoice(&mut self, job_id: JobId, draft: InvoiceDraft)
        -> Result<Invoice, StoreError>;
    fn update_invoice_balance(&mut self, id: InvoiceId, balance: Money)
        -> Result<(), StoreError>;

    fn insert_payment(&mut self, new: NewPayment) -> Result<Payment, StoreError>;
    /// Payments for an invoice, oldest first.
    fn payments_for_invoice(&self, invoice_id: InvoiceId) -> Result<Vec<Payment>, StoreError>;
}

/// Persistence collaborator. `transact` runs the closure with exclusive
/// access to the underlying state; that exclusivity is what keeps the
/// conflict-check-then-insert and read-balance-then-write sequences
/// indivisible under concurrent requests.
pub trait DispatchStore: Send + Sync {
    fn transact<T>(
        &self,
        op: &mut dyn FnMut(&mut dyn StoreTxn) -> Result<T, DispatchError>,
    ) -> Result<T, DispatchError>;
}

pub mod memory {
    //! Reference in-memory backend. One mutex over the whole state gives
    //! every transaction exclusive access; appointment and invoice
    //! uniqueness per job is enforced as a backstop the way a relational
    //! store's unique index would be.

    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    #[derive(Debug, Default)]
    pub struct MemoryStore {
        state: Mutex<State>,
    }

    #[derive(Debug, Default)]
    struct State {
        customers: BTreeMap<i64, Customer>,
        technicians: BTreeMap<i64, Technician>,
        jobs: BTreeMap<i64, Job>,
        appointments: BTreeMap<i64, Appointment>,
        invoices: BTreeMap<i64, Invoice>,
        payments: BTreeMap<i64, Payment>,
        sequence: i64,
    }

    impl State {
        fn next_id(&mut self) -> i64 {
            self.sequence += 1;
            self.sequence
        }
    }

    impl StoreTxn for State {
        fn insert_customer(&mut self, new: NewCustomer) -> Result<Customer, StoreError> {
            let id = self.next_id();
            let customer = Customer {
                id: CustomerId(id),
                name: new.name,
                phone: new.phone,
                email: new.email,
                address: new.address,
                created_at: Utc::now(),
            };
            self.customers.insert(id, customer.clone());
            Ok(customer)
        }

        fn customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
            Ok(self.customers.get(&id.0).cloned())
        }

        fn customers(&self) -> Result<Vec<Customer>, StoreError> {
            Ok(self.customers.values().cloned().collect())
        }

        fn insert_technician(&mut self, new: NewTechnician) -> Result<Technician, StoreError> {
            let id = self.next_id();
            let technician = Technician {
                id: TechnicianId(id),
                name: new.name,
                phone: new.phone,
                email: new.email,
                created_at: Utc::now(),
            };
            self.technicians.insert(id, technician.clone());
            Ok(technician)
        }

        fn technician(&self, id: TechnicianId) -> Result<Option<Technician>, StoreError> {
            Ok(self.technicians.get(&id.0).cloned())
        }

        fn technicians(&self) -> Result<Vec<Technician>, StoreError> {
            Ok(self.technicians.values().cloned().collect())
        }

        fn insert_job(&mut self, new: NewJob) -> Result<Job, StoreError> {
            let id = self.next_id();
            let now = Utc::now();
            let job = Job {
                id: JobId(id),
                customer_id: new.customer_id,
                title: new.title,
                description: new.description,
                status: JobStatus::New,
                created_at: now,
                updated_at: now,
            };
            self.jobs.insert(id, job.clone());
            Ok(job)
        }

        fn job(&self, id: JobId) -> Result<Option<Job>, StoreError> {
            Ok(self.jobs.get(&id.0).cloned())
        }

        fn jobs(&self) -> Result<Vec<Job>, StoreError> {
            Ok(self.jobs.values().rev().cloned().collect())
        }

        fn update_job_status(&mut self, id: JobId, status: JobStatus) -> Result<Job, StoreError> {
            let job = self.jobs.get_mut(&id.0).ok_or(StoreError::Missing("job"))?;
            job.status = status;
            job.updated_at = Utc::now();
            Ok(job.clone())
        }

        fn appointment_for_job(&self, job_id: JobId) -> Result<Option<Appointment>, StoreError> {
            Ok(self
                .appointments
                .values()
                .find(|appointment| appointment.job_id == job_id)
                .cloned())
        }

        fn overlapping_appointment(
            &self,
            technician_id: TechnicianId,
            window: &TimeWindow,
        ) -> Result<Option<Appointment>, StoreError> {
            Ok(self
                .appointments
                .values()
                .find(|appointment| {
                    appointment.technician_id == technician_id
                        && appointment.window.overlaps(window)
                })
                .cloned())
        }

        fn insert_appointment(&mut self, new: NewAppointment) -> Result<Appointment, StoreError> {
            if self.appointment_for_job(new.job_id)?.is_some() {
                return Err(StoreError::Duplicate("appointment"));
            }
            let id = self.next_id();
            let appointment = Appointment {
                id: AppointmentId(id),
                job_id: new.job_id,
                technician_id: new.technician_id,
                window: new.window,
                created_at: Utc::now(),
            };
            self.appointments.insert(id, appointment.clone());
            Ok(appointment)
        }

        fn invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, StoreError> {
            Ok(self.invoices.get(&id.0).cloned())
        }

        fn invoice_for_job(&self, job_id: JobId) -> Result<Option<Invoice>, StoreError> {
            Ok(self
                .invoices
                .values()
                .find(|invoice| invoice.job_id == job_id)
                .cloned())
        }

        fn insert_invoice(
            &mut self,
            job_id: JobId,
            draft: InvoiceDraft,
        ) -> Result<Invoice, StoreError> {
            if self.invoice_for_job(job_id)?.is_some() {
                return Err(StoreError::Duplicate("invoice"));
            }
            let id = self.next_id();
            let invoice = Invoice {
                id: InvoiceId(id),
                job_id,
                line_items: draft.line_items,
                subtotal: draft.subtotal,
                tax: draft.tax,
                total: draft.total,
                balance: draft.total,
                created_at: Utc::now(),
            };
            self.invoices.insert(id, invoice.clone());
            Ok(invoice)
        }

        fn update_invoice_balance(
            &mut self,
            id: InvoiceId,
            balance: Money,
        ) -> Result<(), StoreError> {
            let invoice = self
                .invoices
                .get_mut(&id.0)
                .ok_or(StoreError::Missing("invoice"))?;
            invoice.balance = balance;
            Ok(())
        }

        fn insert_payment(&mut self, new: NewPayment) -> Result<Payment, StoreError> {
            let id = self.next_id();
            let payment = Payment {
                id: PaymentId(id),
                invoice_id: new.invoice_id,
                amount: new.amount,
                paid_at: Utc::now(),
            };
            self.payments.insert(id, payment);
            Ok(payment)
        }

        fn payments_for_invoice(&self, invoice_id: InvoiceId) -> Result<Vec<Payment>, StoreError> {
            Ok(self
                .payments
                .values()
                .filter(|payment| payment.invoice_id == invoice_id)
                .copied()
                .collect())
        }
    }

    impl DispatchStore for MemoryStore {
        fn transact<T>(
            &self,
            op: &mut dyn FnMut(&mut dyn StoreTxn) -> Result<T, DispatchError>,
        ) -> Result<T, DispatchError> {
            let mut state = self
                .state
                .lock()
                .map_err(|_| StoreError::Unavailable("state mutex poisoned".to_string()))?;
            op(&mut *state)
        }
    }
}
