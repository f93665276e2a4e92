//! Index-linked rent adjustment per §557b BGB: the adjustment arithmetic
//! and the statutory timing bounds for the effective date.

mod effective_date;

pub use effective_date::earliest_effective_date;

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A consumer price index (Verbraucherpreisindex) reading for one
/// reference month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpiReading {
    pub month: NaiveDate,
    pub value: Decimal,
}

impl VpiReading {
    pub fn new(month: NaiveDate, value: Decimal) -> Self {
        Self { month, value }
    }

    /// Reference month normalized to its first day, so readings quoted with
    /// an arbitrary day-of-month still compare by calendar month.
    pub fn reference_month(&self) -> NaiveDate {
        first_of_month(self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexationError {
    #[error("index value for {month} must be positive (got {value})")]
    NonPositiveIndex { month: NaiveDate, value: Decimal },
    #[error("new index value {new} does not exceed the old value {old}")]
    IndexNotIncreased { old: Decimal, new: Decimal },
    #[error("new reference month {new_month} must lie after {old_month}")]
    ReferenceMonthNotAdvanced {
        old_month: NaiveDate,
        new_month: NaiveDate,
    },
}

/// Outcome of one index adjustment. Only `new_rent` is ever persisted (as
/// the cold rent of the resulting ledger row); the percentage and delta are
/// derived figures for tenant letters and previews.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndexAdjustment {
    pub current_rent: Decimal,
    pub new_rent: Decimal,
    pub percentage_change: Decimal,
    pub absolute_delta: Decimal,
    pub vpi_old: VpiReading,
    pub vpi_new: VpiReading,
}

/// Check the statutory preconditions for an index-linked increase: both
/// readings positive, the index risen, and the reference month advanced.
pub fn validate_readings(old: &VpiReading, new: &VpiReading) -> Result<(), IndexationError> {
    for reading in [old, new] {
        if reading.value <= Decimal::ZERO {
            return Err(IndexationError::NonPositiveIndex {
                month: reading.month,
                value: reading.value,
            });
        }
    }

    if new.value <= old.value {
        return Err(IndexationError::IndexNotIncreased {
            old: old.value,
            new: new.value,
        });
    }

    if new.reference_month() <= old.reference_month() {
        return Err(IndexationError::ReferenceMonthNotAdvanced {
            old_month: old.month,
            new_month: new.month,
        });
    }

    Ok(())
}

/// Scale the current cold rent by the index movement,
/// `new_rent = round(current_rent * vpi_new / vpi_old, 2)`, with commercial
/// rounding (half away from zero) at the cent boundary.
pub fn adjust_rent(
    current_rent: Decimal,
    vpi_old: VpiReading,
    vpi_new: VpiReading,
) -> Result<IndexAdjustment, IndexationError> {
    validate_readings(&vpi_old, &vpi_new)?;

    let new_rent = (current_rent * vpi_new.value / vpi_old.value)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let percentage_change = ((vpi_new.value / vpi_old.value - Decimal::ONE)
        * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    Ok(IndexAdjustment {
        current_rent,
        new_rent,
        percentage_change,
        absolute_delta: new_rent - current_rent,
        vpi_old,
        vpi_new,
    })
}

pub(crate) fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
