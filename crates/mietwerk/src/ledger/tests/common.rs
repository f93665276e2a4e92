use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::indexation::VpiReading;
use crate::ledger::domain::{
    ContractId, ContractRecord, NewRentPeriod, RentPeriod, RentPeriodId, RentPeriodStatus,
    RentReason,
};
use crate::ledger::repository::{ContractRentCache, LedgerRepository, RepositoryError};
use crate::ledger::router::ledger_router;
use crate::ledger::service::RentLedger;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn today() -> NaiveDate {
    date(2026, 3, 10)
}

pub(super) fn vpi(year: i32, month: u32, value: Decimal) -> VpiReading {
    VpiReading::new(date(year, month, 1), value)
}

pub(super) fn contract() -> ContractRecord {
    ContractRecord {
        id: ContractId("ct-1020".to_string()),
        unit_id: "LIN12-03".to_string(),
        start_date: date(2021, 7, 1),
        cold_rent: dec!(780.00),
        utilities: dec!(220.00),
        rent_since: Some(date(2021, 7, 1)),
    }
}

pub(super) fn new_period(
    effective_date: NaiveDate,
    cold_rent: Decimal,
    status: RentPeriodStatus,
    reason: RentReason,
) -> NewRentPeriod {
    NewRentPeriod {
        contract_id: contract().id,
        effective_date,
        cold_rent,
        utilities: dec!(220.00),
        reason,
        status,
        vpi_old: None,
        vpi_new: None,
        notes: None,
        sync_to_contract: false,
    }
}

/// Raw ledger row for cases that need full control over `created_at`.
pub(super) fn raw_period(
    id: &str,
    effective_date: NaiveDate,
    cold_rent: Decimal,
    created_offset_hours: i64,
) -> RentPeriod {
    RentPeriod {
        id: RentPeriodId(id.to_string()),
        contract_id: contract().id,
        effective_date,
        cold_rent,
        utilities: dec!(220.00),
        reason: RentReason::Manual,
        status: RentPeriodStatus::Active,
        vpi_old: None,
        vpi_new: None,
        notes: None,
        created_at: Utc::now() + Duration::hours(created_offset_hours),
    }
}

pub(super) fn build_ledger() -> (RentLedger<MemoryLedgerRepository>, Arc<MemoryLedgerRepository>) {
    let repository = Arc::new(MemoryLedgerRepository::default());
    repository.seed_contract(contract());
    (RentLedger::new(repository.clone()), repository)
}

pub(super) fn ledger_router_with(
    ledger: RentLedger<MemoryLedgerRepository>,
) -> axum::Router {
    ledger_router(Arc::new(ledger))
}

#[derive(Default)]
struct StoreState {
    contracts: HashMap<ContractId, ContractRecord>,
    periods: HashMap<RentPeriodId, RentPeriod>,
}

/// In-memory store applying the period insert and the contract cache
/// update under one lock, mirroring a transactional backend.
#[derive(Default, Clone)]
pub(super) struct MemoryLedgerRepository {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryLedgerRepository {
    pub(super) fn seed_contract(&self, contract: ContractRecord) {
        let mut state = self.state.lock().expect("store mutex poisoned");
        state.contracts.insert(contract.id.clone(), contract);
    }

    pub(super) fn stored_contract(&self, id: &ContractId) -> Option<ContractRecord> {
        let state = self.state.lock().expect("store mutex poisoned");
        state.contracts.get(id).cloned()
    }
}

impl LedgerRepository for MemoryLedgerRepository {
    fn contract(&self, id: &ContractId) -> Result<Option<ContractRecord>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.contracts.get(id).cloned())
    }

    fn periods(&self, contract_id: &ContractId) -> Result<Vec<RentPeriod>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .periods
            .values()
            .filter(|period| &period.contract_id == contract_id)
            .cloned()
            .collect())
    }

    fn period(&self, id: &RentPeriodId) -> Result<Option<RentPeriod>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.periods.get(id).cloned())
    }

    fn insert_period(
        &self,
        period: RentPeriod,
        cache: Option<ContractRentCache>,
    ) -> Result<RentPeriod, RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if state.periods.contains_key(&period.id) {
            return Err(RepositoryError::Conflict);
        }

        if let Some(cache) = cache {
            let contract = state
                .contracts
                .get_mut(&period.contract_id)
                .ok_or(RepositoryError::NotFound)?;
            contract.cold_rent = cache.cold_rent;
            contract.utilities = cache.utilities;
            contract.rent_since = Some(cache.effective_date);
        }

        state.periods.insert(period.id.clone(), period.clone());
        Ok(period)
    }

    fn delete_period(&self, id: &RentPeriodId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        state
            .periods
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

pub(super) struct UnavailableRepository;

impl LedgerRepository for UnavailableRepository {
    fn contract(&self, _id: &ContractId) -> Result<Option<ContractRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn periods(&self, _contract_id: &ContractId) -> Result<Vec<RentPeriod>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn period(&self, _id: &RentPeriodId) -> Result<Option<RentPeriod>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_period(
        &self,
        _period: RentPeriod,
        _cache: Option<ContractRentCache>,
    ) -> Result<RentPeriod, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete_period(&self, _id: &RentPeriodId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
