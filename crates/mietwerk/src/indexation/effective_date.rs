use chrono::{Months, NaiveDate};

use super::first_of_month;

/// Earliest date an index-linked rent increase may take effect, given the
/// declaration happens `today`.
///
/// Three lower bounds apply, and the latest one wins:
/// 1. §557b Abs. 3 BGB: the adjusted rent is owed from the beginning of
///    the month after next, so the declaration always leaves one full
///    month of notice.
/// 2. A contractual clause may push the first permissible recalculation
///    out further (`possible_since`).
/// 3. The rent must have been unchanged for at least twelve months; a
///    prior change locks the next one to the same day-of-month one year
///    later. When the anniversary day does not exist in the target month
///    the date clamps to that month's final day (Feb 29 -> Feb 28).
///
/// The result is monotonically non-decreasing in every input.
pub fn earliest_effective_date(
    today: NaiveDate,
    possible_since: Option<NaiveDate>,
    last_change: Option<NaiveDate>,
) -> NaiveDate {
    let mut candidate = first_of_month(today)
        .checked_add_months(Months::new(2))
        .unwrap_or(today);

    if let Some(possible_since) = possible_since {
        candidate = candidate.max(possible_since);
    }

    if let Some(last_change) = last_change {
        let lockout_end = last_change
            .checked_add_months(Months::new(12))
            .unwrap_or(last_change);
        candidate = candidate.max(lockout_end);
    }

    candidate
}
