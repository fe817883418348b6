//! Field-service dispatch tracker.
//!
//! Customers request jobs, jobs move through a fixed lifecycle
//! (New → Scheduled → Done → Invoiced → Paid), technicians are booked into
//! non-overlapping appointment windows, and completed jobs are invoiced and
//! paid down to a zero balance. The [`dispatch`] module holds the domain
//! logic; [`config`], [`telemetry`], and [`error`] carry the service shell.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod telemetry;
