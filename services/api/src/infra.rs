use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal_macros::dec;

use mietwerk::financing::{Loan, LoanId, LoanStore, LoanStoreError};
use mietwerk::ledger::{
    ContractId, ContractRecord, ContractRentCache, LedgerRepository, RentPeriod, RentPeriodId,
    RepositoryError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct LedgerState {
    contracts: HashMap<ContractId, ContractRecord>,
    periods: HashMap<RentPeriodId, RentPeriod>,
}

/// In-memory stand-in for the persistence collaborator. The period insert
/// and the contract cache update run under one lock, the same guarantee a
/// transactional backend would give.
#[derive(Default, Clone)]
pub(crate) struct InMemoryLedgerRepository {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryLedgerRepository {
    pub(crate) fn seed_contract(&self, contract: ContractRecord) {
        let mut state = self.state.lock().expect("ledger mutex poisoned");
        state.contracts.insert(contract.id.clone(), contract);
    }
}

impl LedgerRepository for InMemoryLedgerRepository {
    fn contract(&self, id: &ContractId) -> Result<Option<ContractRecord>, RepositoryError> {
        let state = self.state.lock().expect("ledger mutex poisoned");
        Ok(state.contracts.get(id).cloned())
    }

    fn periods(&self, contract_id: &ContractId) -> Result<Vec<RentPeriod>, RepositoryError> {
        let state = self.state.lock().expect("ledger mutex poisoned");
        Ok(state
            .periods
            .values()
            .filter(|period| &period.contract_id == contract_id)
            .cloned()
            .collect())
    }

    fn period(&self, id: &RentPeriodId) -> Result<Option<RentPeriod>, RepositoryError> {
        let state = self.state.lock().expect("ledger mutex poisoned");
        Ok(state.periods.get(id).cloned())
    }

    fn insert_period(
        &self,
        period: RentPeriod,
        cache: Option<ContractRentCache>,
    ) -> Result<RentPeriod, RepositoryError> {
        let mut state = self.state.lock().expect("ledger mutex poisoned");
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
        let mut state = self.state.lock().expect("ledger mutex poisoned");
        state
            .periods
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

/// Read-only in-memory loan source.
#[derive(Default, Clone)]
pub(crate) struct InMemoryLoanStore {
    loans: Arc<Mutex<HashMap<LoanId, Loan>>>,
}

impl InMemoryLoanStore {
    pub(crate) fn seed_loan(&self, id: LoanId, loan: Loan) {
        let mut loans = self.loans.lock().expect("loan mutex poisoned");
        loans.insert(id, loan);
    }
}

impl LoanStore for InMemoryLoanStore {
    fn loan(&self, id: &LoanId) -> Result<Option<Loan>, LoanStoreError> {
        let loans = self.loans.lock().expect("loan mutex poisoned");
        Ok(loans.get(id).cloned())
    }
}

/// Demo fixtures so a freshly started service has something to serve.
pub(crate) fn seed_demo_data(
    repository: &InMemoryLedgerRepository,
    loans: &InMemoryLoanStore,
) {
    repository.seed_contract(ContractRecord {
        id: ContractId("ct-1020".to_string()),
        unit_id: "LIN12-03".to_string(),
        start_date: date(2021, 7, 1),
        cold_rent: dec!(780.00),
        utilities: dec!(220.00),
        rent_since: Some(date(2021, 7, 1)),
    });

    loans.seed_loan(
        LoanId("ln-001".to_string()),
        Loan {
            remaining_balance: dec!(248500.00),
            interest_rate: dec!(3.45),
            monthly_payment: dec!(1180.00),
            start_date: date(2022, 4, 1),
            end_date: Some(date(2052, 3, 31)),
            fixed_interest_end_date: Some(date(2032, 3, 31)),
        },
    );
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid seed date")
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
