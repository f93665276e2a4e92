//! The rent ledger: a time-ordered series of rent periods per rental
//! contract, plus the write path that keeps the contract's denormalized
//! rent fields in step.

pub mod domain;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ContractId, ContractRecord, CurrentRent, DeletePlannedOutcome, NewRentPeriod, RentPeriod,
    RentPeriodId, RentPeriodStatus, RentReason,
};
pub use import::{ImportError, ImportSummary, RentPeriodImporter};
pub use repository::{ContractRentCache, LedgerRepository, RepositoryError};
pub use router::ledger_router;
pub use service::{IndexAdjustmentProposal, IndexPreviewRequest, LedgerError, RentLedger};
