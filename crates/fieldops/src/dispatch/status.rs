use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// Lifecycle of a job, strictly ordered. A job only ever advances one step
/// at a time; it never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    New,
    Scheduled,
    Done,
    Invoiced,
    Paid,
}

impl JobStatus {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::New,
            Self::Scheduled,
            Self::Done,
            Self::Invoiced,
            Self::Paid,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Scheduled => "Scheduled",
            Self::Done => "Done",
            Self::Invoiced => "Invoiced",
            Self::Paid => "Paid",
        }
    }

    pub(crate) const fn rank(self) -> u8 {
        match self {
            Self::New => 0,
            Self::Scheduled => 1,
            Self::Done => 2,
            Self::Invoiced => 3,
            Self::Paid => 4,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the job's surroundings look like when a transition is requested.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionContext {
    pub has_appointment: bool,
    /// Balance of the job's invoice, if one exists.
    pub invoice_balance: Option<Money>,
}

/// Outcome of a validated transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Target equals the current status; accept and mutate nothing.
    NoOp,
    /// Move exactly one step forward and persist.
    Step,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("job cannot move backwards from {from} to {to}")]
    Backward { from: JobStatus, to: JobStatus },
    #[error("job cannot skip from {from} to {to}; statuses advance one step at a time")]
    Skipped { from: JobStatus, to: JobStatus },
    #[error("job cannot be {target} without an appointment")]
    AppointmentRequired { target: JobStatus },
    #[error("job cannot be {target} without an invoice")]
    InvoiceRequired { target: JobStatus },
    #[error("job must be Done before it can be invoiced (currently {current})")]
    InvoiceRequiresDone { current: JobStatus },
    #[error("job cannot be Paid with an outstanding balance of {balance}")]
    OutstandingBalance { balance: Money },
}

/// Validate a requested transition against the lifecycle order and the
/// per-target preconditions. Returns what the caller should persist;
/// rejection leaves the job untouched.
pub fn validate(
    current: JobStatus,
    target: JobStatus,
    ctx: &TransitionContext,
) -> Result<Advance, TransitionError> {
    if target == current {
        return Ok(Advance::NoOp);
    }
    if target.rank() < current.rank() {
        return Err(TransitionError::Backward {
            from: current,
            to: target,
        });
    }
    if target.rank() > current.rank() + 1 {
        return Err(TransitionError::Skipped {
            from: current,
            to: target,
        });
    }

    match target {
        JobStatus::New => unreachable!("New has rank 0 and cannot be a forward target"),
        JobStatus::Scheduled | JobStatus::Done => {
            if !ctx.has_appointment {
                return Err(TransitionError::AppointmentRequired { target });
            }
        }
        JobStatus::Invoiced => {
            if ctx.invoice_balance.is_none() {
                return Err(TransitionError::InvoiceRequired { target });
            }
        }
        JobStatus::Paid => match ctx.invoice_balance {
            None => return Err(TransitionError::InvoiceRequired { target }),
            Some(balance) if balance.is_positive() => {
                return Err(TransitionError::OutstandingBalance { balance });
            }
            Some(_) => {}
        },
    }

    Ok(Advance::Step)
}
