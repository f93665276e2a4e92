use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::indexation::VpiReading;

/// Identifier wrapper for rental contracts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractId(pub String);

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for rent ledger rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RentPeriodId(pub String);

impl fmt::Display for RentPeriodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a rent amount changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RentReason {
    Initial,
    Increase,
    Index,
    Stepped,
    Migration,
    Manual,
    Import,
}

impl RentReason {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Increase => "increase",
            Self::Index => "index",
            Self::Stepped => "stepped",
            Self::Migration => "migration",
            Self::Manual => "manual",
            Self::Import => "import",
        }
    }

    /// Lenient lookup used by bulk imports; unrecognized values fall back
    /// to `Import` at the call site.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "initial" => Some(Self::Initial),
            "increase" => Some(Self::Increase),
            "index" => Some(Self::Index),
            "stepped" => Some(Self::Stepped),
            "migration" => Some(Self::Migration),
            "manual" => Some(Self::Manual),
            "import" => Some(Self::Import),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RentPeriodStatus {
    Active,
    Planned,
}

impl RentPeriodStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Planned => "planned",
        }
    }
}

/// One row of the rent ledger: a rent amount valid from its effective date
/// until superseded by a later row. Rows are append-only; only planned rows
/// may be deleted again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentPeriod {
    pub id: RentPeriodId,
    pub contract_id: ContractId,
    pub effective_date: NaiveDate,
    pub cold_rent: Decimal,
    pub utilities: Decimal,
    pub reason: RentReason,
    pub status: RentPeriodStatus,
    pub vpi_old: Option<VpiReading>,
    pub vpi_new: Option<VpiReading>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RentPeriod {
    pub fn total_rent(&self) -> Decimal {
        self.cold_rent + self.utilities
    }
}

/// Contract master data as far as the ledger needs it: the identifier plus
/// the denormalized rent fields other parts of the system read directly.
/// For contracts predating the ledger these fields double as the legacy
/// rent source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRecord {
    pub id: ContractId,
    pub unit_id: String,
    pub start_date: NaiveDate,
    pub cold_rent: Decimal,
    pub utilities: Decimal,
    pub rent_since: Option<NaiveDate>,
}

/// The authoritative rent for a contract at a point in time. Either backed
/// by a ledger row (`period_id` set) or synthesized from the contract's
/// legacy fields with `reason = migration`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentRent {
    pub contract_id: ContractId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_id: Option<RentPeriodId>,
    pub effective_date: NaiveDate,
    pub cold_rent: Decimal,
    pub utilities: Decimal,
    pub total_rent: Decimal,
    pub reason: RentReason,
}

impl CurrentRent {
    pub(crate) fn from_period(period: &RentPeriod) -> Self {
        Self {
            contract_id: period.contract_id.clone(),
            period_id: Some(period.id.clone()),
            effective_date: period.effective_date,
            cold_rent: period.cold_rent,
            utilities: period.utilities,
            total_rent: period.total_rent(),
            reason: period.reason,
        }
    }

    pub(crate) fn migration_fallback(contract: &ContractRecord) -> Self {
        Self {
            contract_id: contract.id.clone(),
            period_id: None,
            effective_date: contract.rent_since.unwrap_or(contract.start_date),
            cold_rent: contract.cold_rent,
            utilities: contract.utilities,
            total_rent: contract.cold_rent + contract.utilities,
            reason: RentReason::Migration,
        }
    }
}

/// Write request for a new ledger row.
#[derive(Debug, Clone)]
pub struct NewRentPeriod {
    pub contract_id: ContractId,
    pub effective_date: NaiveDate,
    pub cold_rent: Decimal,
    pub utilities: Decimal,
    pub reason: RentReason,
    pub status: RentPeriodStatus,
    pub vpi_old: Option<VpiReading>,
    pub vpi_new: Option<VpiReading>,
    pub notes: Option<String>,
    pub sync_to_contract: bool,
}

/// Result of a planned-period deletion request. Active and historical rows
/// are never deleted; asking to is reported, not failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePlannedOutcome {
    Deleted,
    NotPlanned,
    Missing,
}
