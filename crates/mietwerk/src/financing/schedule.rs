use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use super::domain::{AmortizationSchedule, Loan, MonthRow};
use crate::indexation::first_of_month;

/// Simulate the loan month by month from the first day of `today`'s month
/// until the relevant end date or a zero balance, whichever comes first.
///
/// Each month accrues `balance * rate / 1200` of interest (rounded to the
/// cent, half away from zero); the payment covers interest first and the
/// remainder reduces the balance. A payment that does not cover the
/// interest stagnates: the emitted principal is zero and the balance is
/// clamped, never driven negative. A month is simulated when its first day
/// is on or before the end date.
pub fn amortization_schedule(loan: &Loan, today: NaiveDate) -> AmortizationSchedule {
    let initial = loan.remaining_balance;
    let mut rows = Vec::new();
    let mut total_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;

    if let Some(end) = loan.relevant_end_date() {
        let mut cursor = first_of_month(today);
        let mut balance = initial;

        while cursor <= end && balance > Decimal::ZERO {
            let interest = (balance * loan.interest_rate / Decimal::from(1200))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            let principal = (loan.monthly_payment - interest)
                .max(Decimal::ZERO)
                .min(balance);

            balance -= principal;
            total_interest += interest;
            total_principal += principal;
            rows.push(MonthRow {
                month: cursor,
                balance,
                principal,
                interest,
            });

            match cursor.checked_add_months(Months::new(1)) {
                Some(next) => cursor = next,
                None => break,
            }
        }
    }

    let final_balance = rows.last().map(|row| row.balance).unwrap_or(initial);

    AmortizationSchedule {
        rows,
        total_interest,
        total_principal,
        final_balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn loan(balance: Decimal, rate: Decimal, payment: Decimal, end: NaiveDate) -> Loan {
        Loan {
            remaining_balance: balance,
            interest_rate: rate,
            monthly_payment: payment,
            start_date: date(2021, 7, 1),
            end_date: Some(end),
            fixed_interest_end_date: None,
        }
    }

    #[test]
    fn settled_loan_yields_an_empty_schedule() {
        let schedule = amortization_schedule(
            &loan(dec!(0), dec!(3.5), dec!(1200), date(2040, 12, 31)),
            date(2026, 8, 6),
        );

        assert!(schedule.rows.len() <= 1);
        assert_eq!(schedule.final_balance, dec!(0));
        assert_eq!(schedule.total_principal, dec!(0));
    }

    #[test]
    fn missing_or_past_end_date_yields_an_empty_schedule() {
        let mut open_ended = loan(dec!(50000), dec!(2.0), dec!(800), date(2030, 1, 1));
        open_ended.end_date = None;
        let schedule = amortization_schedule(&open_ended, date(2026, 8, 6));
        assert!(schedule.is_empty());
        assert_eq!(schedule.final_balance, dec!(50000));

        let expired = loan(dec!(50000), dec!(2.0), dec!(800), date(2026, 7, 31));
        let schedule = amortization_schedule(&expired, date(2026, 8, 6));
        assert!(schedule.is_empty());
        assert_eq!(schedule.total_interest, dec!(0));
    }

    #[test]
    fn pays_off_before_the_stated_end() {
        let schedule = amortization_schedule(
            &loan(dec!(1000), dec!(12), dec!(500), date(2028, 12, 31)),
            date(2026, 1, 10),
        );

        assert_eq!(schedule.rows.len(), 3);
        assert_eq!(schedule.rows[0].interest, dec!(10.00));
        assert_eq!(schedule.rows[0].principal, dec!(490.00));
        assert_eq!(schedule.rows[0].balance, dec!(510.00));
        // Final month pays only the remainder.
        assert_eq!(schedule.rows[2].principal, dec!(15.10));
        assert_eq!(schedule.final_balance, dec!(0));
        assert_eq!(schedule.total_principal, dec!(1000));
        assert_eq!(schedule.total_interest, dec!(15.25));
    }

    #[test]
    fn payment_below_interest_stagnates_without_going_negative() {
        let schedule = amortization_schedule(
            &loan(dec!(100000), dec!(6), dec!(400), date(2026, 6, 30)),
            date(2026, 1, 15),
        );

        assert_eq!(schedule.rows.len(), 6);
        for row in &schedule.rows {
            assert_eq!(row.principal, dec!(0));
            assert_eq!(row.interest, dec!(500.00));
            assert_eq!(row.balance, dec!(100000));
        }
        assert_eq!(schedule.final_balance, dec!(100000));
        assert_eq!(schedule.total_principal, dec!(0));
    }

    #[test]
    fn fixed_interest_window_bounds_the_simulation() {
        let mut financing = loan(dec!(250000), dec!(3.5), dec!(1200), date(2056, 6, 30));
        financing.fixed_interest_end_date = Some(date(2031, 5, 31));

        let schedule = amortization_schedule(&financing, date(2026, 8, 15));

        // 2026-08 through 2031-05 inclusive.
        assert_eq!(schedule.rows.len(), 58);
        assert_eq!(schedule.rows[0].month, date(2026, 8, 1));
        assert_eq!(
            schedule.rows.last().map(|row| row.month),
            Some(date(2031, 5, 1))
        );
        assert!(schedule.rows.iter().all(|row| row.balance >= dec!(0)));
        assert!(schedule.total_interest > dec!(0));
        // Principal repaid plus remaining balance reproduces the start.
        assert_eq!(
            schedule.total_principal + schedule.final_balance,
            dec!(250000)
        );
    }

    #[test]
    fn short_schedules_chart_unsampled() {
        let schedule = amortization_schedule(
            &loan(dec!(100000), dec!(6), dec!(400), date(2026, 6, 30)),
            date(2026, 1, 15),
        );

        assert_eq!(schedule.chart_rows(), schedule.rows);
    }

    #[test]
    fn long_schedules_downsample_but_keep_the_final_row() {
        let schedule = amortization_schedule(
            &loan(dec!(1000000), dec!(1), dec!(7000), date(2038, 6, 20)),
            date(2026, 1, 5),
        );
        assert_eq!(schedule.rows.len(), 150);

        let chart = schedule.chart_rows();
        // Every second row plus the final one.
        assert_eq!(chart.len(), 76);
        assert_eq!(chart.first(), schedule.rows.first());
        assert_eq!(chart.last(), schedule.rows.last());
        // Aggregates stay anchored to the full series.
        assert_eq!(
            schedule.total_principal + schedule.final_balance,
            dec!(1000000)
        );
    }
}
