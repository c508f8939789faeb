//! Budget enforcement
//!
//! [`BudgetGuard`] admits or denies requests; the [`Admission`] it hands out
//! is the [`CostLedger`] the orchestrator commits actual costs to.

pub mod guard;
pub mod ledger;

pub use guard::{Admission, BudgetGuard, Usage};
pub use ledger::{CostLedger, NoLedger};
