use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::domain::{ContractId, ContractRecord, RentPeriod, RentPeriodId};

/// Denormalized rent fields pushed onto the contract row together with a
/// period insert. Bundling them into one call lets a store apply both
/// writes inside a single transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractRentCache {
    pub cold_rent: Decimal,
    pub utilities: Decimal,
    pub effective_date: NaiveDate,
}

/// Storage abstraction so the ledger can be exercised against an in-memory
/// store in tests.
pub trait LedgerRepository: Send + Sync {
    fn contract(&self, id: &ContractId) -> Result<Option<ContractRecord>, RepositoryError>;
    fn periods(&self, contract_id: &ContractId) -> Result<Vec<RentPeriod>, RepositoryError>;
    fn period(&self, id: &RentPeriodId) -> Result<Option<RentPeriod>, RepositoryError>;
    fn insert_period(
        &self,
        period: RentPeriod,
        cache: Option<ContractRentCache>,
    ) -> Result<RentPeriod, RepositoryError>;
    fn delete_period(&self, id: &RentPeriodId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures. Failures are handed to the
/// caller unmodified; the ledger never retries on its own.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
