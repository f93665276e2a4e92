//! Loan amortization: a deterministic monthly simulation of principal,
//! interest, and remaining balance (Restschuld) for property financing.

pub mod domain;
pub mod repository;
pub mod router;
pub mod schedule;

pub use domain::{AmortizationSchedule, Loan, LoanId, MonthRow};
pub use repository::{LoanStore, LoanStoreError};
pub use router::financing_router;
pub use schedule::amortization_schedule;
