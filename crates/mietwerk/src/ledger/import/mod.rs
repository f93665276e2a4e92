mod parser;

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::domain::{ContractId, NewRentPeriod, RentPeriodStatus, RentReason};
use super::repository::LedgerRepository;
use super::service::{LedgerError, RentLedger};

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: usize, detail: String },
    Ledger(LedgerError),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read rent period export: {}", err),
            ImportError::Csv(err) => write!(f, "invalid rent period CSV data: {}", err),
            ImportError::InvalidRow { line, detail } => {
                write!(f, "rent period CSV line {}: {}", line, detail)
            }
            ImportError::Ledger(err) => {
                write!(f, "could not apply imported rent period: {}", err)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::InvalidRow { .. } => None,
            ImportError::Ledger(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<LedgerError> for ImportError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}

/// Counters reported back after a bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub planned: usize,
    pub skipped_duplicates: usize,
}

/// Bulk intake of rent periods from CSV exports of predecessor systems.
///
/// Rows dated in the future become planned periods; everything else lands
/// as history. The contract's denormalized rent fields are left alone —
/// after an import the ledger read path is the authority.
pub struct RentPeriodImporter;

impl RentPeriodImporter {
    pub fn from_path<P, R>(
        path: P,
        ledger: &RentLedger<R>,
        contract_id: &ContractId,
        today: NaiveDate,
    ) -> Result<ImportSummary, ImportError>
    where
        P: AsRef<Path>,
        R: LedgerRepository + 'static,
    {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, ledger, contract_id, today)
    }

    pub fn from_reader<Rd, R>(
        reader: Rd,
        ledger: &RentLedger<R>,
        contract_id: &ContractId,
        today: NaiveDate,
    ) -> Result<ImportSummary, ImportError>
    where
        Rd: Read,
        R: LedgerRepository + 'static,
    {
        let mut summary = ImportSummary::default();
        let mut seen: HashSet<(NaiveDate, Decimal)> = HashSet::new();

        for row in parser::parse_rows(reader)? {
            if !seen.insert((row.effective_date, row.cold_rent)) {
                summary.skipped_duplicates += 1;
                continue;
            }

            let status = if row.effective_date > today {
                RentPeriodStatus::Planned
            } else {
                RentPeriodStatus::Active
            };
            let reason = row
                .reason
                .as_deref()
                .and_then(RentReason::parse)
                .unwrap_or(RentReason::Import);

            ledger.create_rent_period(
                NewRentPeriod {
                    contract_id: contract_id.clone(),
                    effective_date: row.effective_date,
                    cold_rent: row.cold_rent,
                    utilities: row.utilities,
                    reason,
                    status,
                    vpi_old: None,
                    vpi_new: None,
                    notes: row.notes,
                    sync_to_contract: false,
                },
                today,
            )?;

            summary.created += 1;
            if status == RentPeriodStatus::Planned {
                summary.planned += 1;
            }
        }

        Ok(summary)
    }
}
