use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, Months, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::infra::{parse_date, InMemoryLedgerRepository};
use mietwerk::error::AppError;
use mietwerk::financing::{amortization_schedule, AmortizationSchedule, Loan};
use mietwerk::indexation::VpiReading;
use mietwerk::ledger::{
    ContractId, ContractRecord, IndexPreviewRequest, NewRentPeriod, RentLedger,
    RentPeriodImporter, RentPeriodStatus, RentReason,
};

#[derive(Args, Debug)]
pub(crate) struct ScheduleArgs {
    /// Outstanding balance (Restschuld) to amortize
    #[arg(long)]
    balance: Decimal,
    /// Annual nominal interest rate in percent
    #[arg(long)]
    rate: Decimal,
    /// Monthly payment
    #[arg(long)]
    payment: Decimal,
    /// Loan end date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,
    /// End of the fixed-interest window (YYYY-MM-DD), bounds the run if set
    #[arg(long, value_parser = parse_date)]
    fixed_interest_end: Option<NaiveDate>,
    /// Loan start date (YYYY-MM-DD, informational)
    #[arg(long, value_parser = parse_date)]
    start: Option<NaiveDate>,
    /// Computation date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Path to the rent period CSV export
    #[arg(long)]
    csv: PathBuf,
    /// Contract identifier the imported rows belong to
    #[arg(long, default_value = "ct-import")]
    contract: String,
    /// Import date deciding active vs. planned (defaults to today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date for the walkthrough (defaults to today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
}

pub(crate) fn run_financing_schedule(args: ScheduleArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let loan = Loan {
        remaining_balance: args.balance,
        interest_rate: args.rate,
        monthly_payment: args.payment,
        start_date: args.start.unwrap_or(today),
        end_date: args.end,
        fixed_interest_end_date: args.fixed_interest_end,
    };

    let schedule = amortization_schedule(&loan, today);
    render_schedule(&schedule, today);

    Ok(())
}

pub(crate) fn run_ledger_import(args: ImportArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let contract_id = ContractId(args.contract.clone());

    let repository = Arc::new(InMemoryLedgerRepository::default());
    repository.seed_contract(ContractRecord {
        id: contract_id.clone(),
        unit_id: args.contract,
        start_date: today,
        cold_rent: dec!(0),
        utilities: dec!(0),
        rent_since: None,
    });
    let ledger = RentLedger::new(repository);

    let summary = RentPeriodImporter::from_path(&args.csv, &ledger, &contract_id, today)?;

    println!(
        "Imported {} rent periods ({} planned, {} duplicates skipped)",
        summary.created, summary.planned, summary.skipped_duplicates
    );

    println!("\nRent history");
    for period in ledger.rent_periods(&contract_id)? {
        println!(
            "- {} | cold {} | utilities {} | {} | {}",
            period.effective_date,
            period.cold_rent,
            period.utilities,
            period.reason.label(),
            period.status.label()
        );
    }

    if let Some(current) = ledger.current_rent(&contract_id, today)? {
        println!(
            "\nAuthoritative rent on {}: {} cold / {} total ({})",
            today,
            current.cold_rent,
            current.total_rent,
            current.reason.label()
        );
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let repository = Arc::new(InMemoryLedgerRepository::default());
    let contract = ContractRecord {
        id: ContractId("ct-1020".to_string()),
        unit_id: "LIN12-03".to_string(),
        start_date: date(2021, 7, 1),
        cold_rent: dec!(780.00),
        utilities: dec!(220.00),
        rent_since: Some(date(2021, 7, 1)),
    };
    repository.seed_contract(contract.clone());
    let ledger = RentLedger::new(repository);

    println!("Rent ledger demo (evaluated {today})");
    println!(
        "Contract {} / unit {}",
        contract.id, contract.unit_id
    );

    if let Some(current) = ledger.current_rent(&contract.id, today)? {
        println!(
            "\nLegacy rent before any ledger rows: {} cold / {} total ({})",
            current.cold_rent,
            current.total_rent,
            current.reason.label()
        );
    }

    ledger.create_rent_period(
        NewRentPeriod {
            contract_id: contract.id.clone(),
            effective_date: date(2024, 9, 1),
            cold_rent: dec!(800.00),
            utilities: dec!(220.00),
            reason: RentReason::Initial,
            status: RentPeriodStatus::Active,
            vpi_old: None,
            vpi_new: Some(VpiReading::new(date(2024, 6, 1), dec!(110.0))),
            notes: Some("Neuvermietung".to_string()),
            sync_to_contract: true,
        },
        today,
    )?;
    println!("\nRecorded the initial ledger row: 800.00 cold from 2024-09-01 (VPI baseline 110.0)");

    let proposal = ledger.preview_index_adjustment(
        &contract.id,
        IndexPreviewRequest {
            vpi_new: VpiReading::new(date(2025, 12, 1), dec!(115.5)),
            vpi_old: None,
            possible_since: None,
        },
        today,
    )?;
    println!("\nIndex adjustment preview");
    println!(
        "- index {} -> {} ({} %)",
        proposal.adjustment.vpi_old.value,
        proposal.adjustment.vpi_new.value,
        proposal.adjustment.percentage_change
    );
    println!(
        "- cold rent {} -> {} (+{})",
        proposal.adjustment.current_rent,
        proposal.adjustment.new_rent,
        proposal.adjustment.absolute_delta
    );
    println!(
        "- earliest legal effective date: {}",
        proposal.earliest_effective_date
    );

    let planned = ledger.create_rent_period(
        NewRentPeriod {
            contract_id: contract.id.clone(),
            effective_date: proposal.earliest_effective_date,
            cold_rent: proposal.adjustment.new_rent,
            utilities: dec!(220.00),
            reason: RentReason::Index,
            status: RentPeriodStatus::Planned,
            vpi_old: Some(proposal.adjustment.vpi_old),
            vpi_new: Some(proposal.adjustment.vpi_new),
            notes: None,
            sync_to_contract: false,
        },
        today,
    )?;
    println!(
        "\nScheduled the increase as planned period {} from {}",
        planned.id, planned.effective_date
    );

    if let Some(current) = ledger.current_rent(&contract.id, today)? {
        println!(
            "Authoritative rent today is still {} cold ({})",
            current.cold_rent,
            current.reason.label()
        );
    }

    let loan = Loan {
        remaining_balance: dec!(248500.00),
        interest_rate: dec!(3.45),
        monthly_payment: dec!(1180.00),
        start_date: date(2022, 4, 1),
        end_date: Some(date(2052, 3, 31)),
        fixed_interest_end_date: today.checked_add_months(Months::new(60)),
    };
    println!("\nFinancing outlook for the property loan");
    let schedule = amortization_schedule(&loan, today);
    render_schedule(&schedule, today);

    Ok(())
}

fn render_schedule(schedule: &AmortizationSchedule, computed_from: NaiveDate) {
    if schedule.is_empty() {
        println!("No schedule computable (missing or past end date).");
        return;
    }

    println!("Amortization from {} ({} months)", computed_from, schedule.rows.len());
    println!("{:<10} {:>12} {:>12} {:>14}", "Month", "Interest", "Principal", "Balance");
    for row in &schedule.rows {
        println!(
            "{:<10} {:>12} {:>12} {:>14}",
            row.month.format("%Y-%m").to_string(),
            row.interest,
            row.principal,
            row.balance
        );
    }
    println!(
        "\nTotals: {} interest, {} principal, {} remaining",
        schedule.total_interest, schedule.total_principal, schedule.final_balance
    );
    println!("Chart series: {} points", schedule.chart_rows().len());
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid demo date")
}
