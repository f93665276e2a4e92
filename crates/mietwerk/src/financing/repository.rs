use super::domain::{Loan, LoanId};

/// Read-only source of loan records. Absence is `Ok(None)`, never an
/// error; store failures are handed to the caller unmodified.
pub trait LoanStore: Send + Sync {
    fn loan(&self, id: &LoanId) -> Result<Option<Loan>, LoanStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LoanStoreError {
    #[error("loan store unavailable: {0}")]
    Unavailable(String),
}
