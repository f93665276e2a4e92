use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use super::domain::{
    ContractId, CurrentRent, DeletePlannedOutcome, NewRentPeriod, RentPeriod, RentPeriodId,
    RentPeriodStatus,
};
use super::repository::{ContractRentCache, LedgerRepository, RepositoryError};
use crate::indexation::{
    adjust_rent, earliest_effective_date, validate_readings, IndexAdjustment, IndexationError,
    VpiReading,
};

/// Read/write layer over the time-ordered rent periods of a contract.
///
/// The ledger is the single trusted source for "what rent applies on date
/// D"; the denormalized fields on the contract row are a read accelerator
/// it maintains but never consults.
pub struct RentLedger<R> {
    repository: Arc<R>,
}

static PERIOD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_period_id() -> RentPeriodId {
    let id = PERIOD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RentPeriodId(format!("rp-{id:06}"))
}

impl<R> RentLedger<R>
where
    R: LedgerRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// The authoritative rent at `as_of`: the active period with the
    /// greatest effective date not after `as_of`, ties broken by the most
    /// recent `created_at`. Contracts without a usable period fall back to
    /// their legacy rent fields; a missing contract yields `Ok(None)`.
    pub fn current_rent(
        &self,
        contract_id: &ContractId,
        as_of: NaiveDate,
    ) -> Result<Option<CurrentRent>, LedgerError> {
        let Some(contract) = self.repository.contract(contract_id)? else {
            return Ok(None);
        };

        let mut periods = self.repository.periods(contract_id)?;
        periods.retain(|period| {
            period.status == RentPeriodStatus::Active && period.effective_date <= as_of
        });
        sort_by_effective_date(&mut periods);

        Ok(Some(match periods.last() {
            Some(period) => CurrentRent::from_period(period),
            None => CurrentRent::migration_fallback(&contract),
        }))
    }

    /// Full rent history ordered by effective date (oldest first).
    pub fn rent_periods(&self, contract_id: &ContractId) -> Result<Vec<RentPeriod>, LedgerError> {
        let mut periods = self.repository.periods(contract_id)?;
        sort_by_effective_date(&mut periods);
        Ok(periods)
    }

    /// The future-dated subset of the ledger, ordered by effective date.
    pub fn planned_periods(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<RentPeriod>, LedgerError> {
        let mut periods = self.rent_periods(contract_id)?;
        periods.retain(|period| period.status == RentPeriodStatus::Planned);
        Ok(periods)
    }

    /// The most recent `vpi_new` reading on the ledger. The next index
    /// adjustment chains off this reading as its `vpi_old` baseline, so
    /// consecutive adjustments compound instead of re-anchoring on the
    /// original contract baseline.
    pub fn latest_vpi_values(
        &self,
        contract_id: &ContractId,
    ) -> Result<Option<VpiReading>, LedgerError> {
        let mut periods = self.repository.periods(contract_id)?;
        sort_by_effective_date(&mut periods);
        Ok(periods
            .iter()
            .rev()
            .find_map(|period| period.vpi_new))
    }

    /// Insert a new ledger row. An active row effective on or before
    /// `today` with `sync_to_contract` set also refreshes the contract's
    /// denormalized rent fields, in the same repository call; planned rows
    /// never touch them.
    pub fn create_rent_period(
        &self,
        request: NewRentPeriod,
        today: NaiveDate,
    ) -> Result<RentPeriod, LedgerError> {
        if self.repository.contract(&request.contract_id)?.is_none() {
            return Err(LedgerError::ContractNotFound(request.contract_id));
        }

        if request.status == RentPeriodStatus::Planned && request.effective_date <= today {
            return Err(LedgerError::PlannedPeriodNotFuture {
                effective_date: request.effective_date,
                today,
            });
        }

        if let (Some(old), Some(new)) = (&request.vpi_old, &request.vpi_new) {
            validate_readings(old, new)?;
        }

        let cache = (request.status == RentPeriodStatus::Active
            && request.effective_date <= today
            && request.sync_to_contract)
            .then(|| ContractRentCache {
                cold_rent: request.cold_rent,
                utilities: request.utilities,
                effective_date: request.effective_date,
            });

        let period = RentPeriod {
            id: next_period_id(),
            contract_id: request.contract_id,
            effective_date: request.effective_date,
            cold_rent: request.cold_rent,
            utilities: request.utilities,
            reason: request.reason,
            status: request.status,
            vpi_old: request.vpi_old,
            vpi_new: request.vpi_new,
            notes: request.notes,
            created_at: Utc::now(),
        };

        let stored = self.repository.insert_period(period, cache)?;
        Ok(stored)
    }

    /// Delete a planned row. Active and historical rows are part of the
    /// audit trail; a request against them is refused as a no-op and
    /// reported through the outcome.
    pub fn delete_planned_period(
        &self,
        id: &RentPeriodId,
    ) -> Result<DeletePlannedOutcome, LedgerError> {
        let Some(period) = self.repository.period(id)? else {
            return Ok(DeletePlannedOutcome::Missing);
        };

        if period.status != RentPeriodStatus::Planned {
            return Ok(DeletePlannedOutcome::NotPlanned);
        }

        self.repository.delete_period(id)?;
        Ok(DeletePlannedOutcome::Deleted)
    }

    /// Run both calculators against the ledger state: resolve the
    /// authoritative rent, chain the VPI baseline, scale the cold rent and
    /// compute the earliest date the increase may take effect. Nothing is
    /// persisted; the caller turns an accepted proposal into a ledger row
    /// via [`RentLedger::create_rent_period`].
    pub fn preview_index_adjustment(
        &self,
        contract_id: &ContractId,
        request: IndexPreviewRequest,
        today: NaiveDate,
    ) -> Result<IndexAdjustmentProposal, LedgerError> {
        let current = self
            .current_rent(contract_id, today)?
            .ok_or_else(|| LedgerError::ContractNotFound(contract_id.clone()))?;

        let baseline = match request.vpi_old {
            Some(reading) => reading,
            None => self
                .latest_vpi_values(contract_id)?
                .ok_or_else(|| LedgerError::MissingVpiBaseline(contract_id.clone()))?,
        };

        let adjustment = adjust_rent(current.cold_rent, baseline, request.vpi_new)?;

        // The twelve-month lockout counts from the newest recorded change,
        // planned rows included: a scheduled increase blocks the next one.
        let last_change = self
            .rent_periods(contract_id)?
            .last()
            .map(|period| period.effective_date)
            .unwrap_or(current.effective_date);

        let effective = earliest_effective_date(today, request.possible_since, Some(last_change));

        Ok(IndexAdjustmentProposal {
            contract_id: contract_id.clone(),
            current,
            adjustment,
            earliest_effective_date: effective,
        })
    }
}

fn sort_by_effective_date(periods: &mut [RentPeriod]) {
    periods.sort_by(|a, b| {
        (a.effective_date, a.created_at).cmp(&(b.effective_date, b.created_at))
    });
}

/// Inputs for an index-adjustment preview. `vpi_old` overrides the chained
/// baseline for contracts whose history was kept outside the ledger.
#[derive(Debug, Clone)]
pub struct IndexPreviewRequest {
    pub vpi_new: VpiReading,
    pub vpi_old: Option<VpiReading>,
    pub possible_since: Option<NaiveDate>,
}

/// A computed, unpersisted index adjustment for one contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexAdjustmentProposal {
    pub contract_id: ContractId,
    pub current: CurrentRent,
    pub adjustment: IndexAdjustment,
    pub earliest_effective_date: NaiveDate,
}

/// Error raised by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("contract {0} does not exist")]
    ContractNotFound(ContractId),
    #[error("planned rent period must be dated after {today} (got {effective_date})")]
    PlannedPeriodNotFuture {
        effective_date: NaiveDate,
        today: NaiveDate,
    },
    #[error("contract {0} has no index baseline on the ledger")]
    MissingVpiBaseline(ContractId),
    #[error(transparent)]
    Index(#[from] IndexationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
