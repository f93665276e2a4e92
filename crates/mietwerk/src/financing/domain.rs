use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for financing loans.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanId(pub String);

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Loan master data as read from the persistence collaborator. The
/// schedule engine never writes loans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub remaining_balance: Decimal,
    /// Annual nominal interest rate in percent (e.g. 3.5 for 3.5 % p.a.).
    pub interest_rate: Decimal,
    pub monthly_payment: Decimal,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub fixed_interest_end_date: Option<NaiveDate>,
}

impl Loan {
    /// The date the simulation runs to: the end of the fixed-interest
    /// window when one exists, otherwise the contractual end. `None` means
    /// no schedule can be computed.
    pub fn relevant_end_date(&self) -> Option<NaiveDate> {
        self.fixed_interest_end_date.or(self.end_date)
    }
}

/// One simulated month. `balance` is the remaining balance *after* the
/// month's payment. Rows are recomputed on every request and never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthRow {
    pub month: NaiveDate,
    pub balance: Decimal,
    pub principal: Decimal,
    pub interest: Decimal,
}

/// A full amortization run with its aggregates. An empty `rows` vector is
/// a legitimate outcome (no usable end date, or one already in the past)
/// and must be rendered as "no schedule computable", not treated as a
/// failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmortizationSchedule {
    pub rows: Vec<MonthRow>,
    pub total_interest: Decimal,
    pub total_principal: Decimal,
    pub final_balance: Decimal,
}

impl AmortizationSchedule {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Downsampled series for charting. The full series stays authoritative
    /// for tables and aggregates; this keeps long schedules to a plottable
    /// number of points while always retaining the final row.
    pub fn chart_rows(&self) -> Vec<MonthRow> {
        if self.rows.len() <= 24 {
            return self.rows.clone();
        }

        let step = (self.rows.len() / 60).max(1);
        let mut sampled: Vec<MonthRow> = self.rows.iter().step_by(step).copied().collect();
        if let (Some(last), Some(tail)) = (self.rows.last(), sampled.last()) {
            if tail.month != last.month {
                sampled.push(*last);
            }
        }

        sampled
    }
}
