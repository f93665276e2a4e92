use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use mietwerk::ledger::{
    ContractId, ContractRecord, ContractRentCache, LedgerRepository, RentPeriod, RentPeriodId,
    RepositoryError,
};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn contract() -> ContractRecord {
    ContractRecord {
        id: ContractId("ct-714".to_string()),
        unit_id: "KAS7-01".to_string(),
        start_date: date(2019, 5, 1),
        cold_rent: dec!(650.00),
        utilities: dec!(180.00),
        rent_since: Some(date(2019, 5, 1)),
    }
}

#[derive(Default)]
struct StoreState {
    contracts: HashMap<ContractId, ContractRecord>,
    periods: HashMap<RentPeriodId, RentPeriod>,
}

/// Minimal transactional in-memory store for workflow tests.
#[derive(Default, Clone)]
pub struct MemoryLedgerStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryLedgerStore {
    pub fn with_contract(contract: ContractRecord) -> Arc<Self> {
        let store = Self::default();
        store
            .state
            .lock()
            .expect("store mutex poisoned")
            .contracts
            .insert(contract.id.clone(), contract);
        Arc::new(store)
    }

    pub fn stored_contract(&self, id: &ContractId) -> Option<ContractRecord> {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .contracts
            .get(id)
            .cloned()
    }
}

impl LedgerRepository for MemoryLedgerStore {
    fn contract(&self, id: &ContractId) -> Result<Option<ContractRecord>, RepositoryError> {
        Ok(self
            .state
            .lock()
            .expect("store mutex poisoned")
            .contracts
            .get(id)
            .cloned())
    }

    fn periods(&self, contract_id: &ContractId) -> Result<Vec<RentPeriod>, RepositoryError> {
        Ok(self
            .state
            .lock()
            .expect("store mutex poisoned")
            .periods
            .values()
            .filter(|period| &period.contract_id == contract_id)
            .cloned()
            .collect())
    }

    fn period(&self, id: &RentPeriodId) -> Result<Option<RentPeriod>, RepositoryError> {
        Ok(self
            .state
            .lock()
            .expect("store mutex poisoned")
            .periods
            .get(id)
            .cloned())
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
