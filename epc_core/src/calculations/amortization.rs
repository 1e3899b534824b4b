//! Loan amortization schedule.
//!
//! The contractor's financial contribution is repaid in monthly payments
//! entered in `project_measurements_table`. Interest is charged monthly on
//! the beginning balance at `interest_rate_percent + EUROBOR` per year.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;

use super::Calculation;
use crate::catalog::{self, schedule as columns, summary as summary_rows, SCHEDULE_MONTHS};
use crate::cell::{self, Cell, DISPLAY_PLACES};
use crate::contract::{fields, Contract};
use crate::errors::EpcResult;

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Balance after one monthly payment.
///
/// ```text
/// interest  = balance × (rate + eurobor) / 100 / 12
/// principal = payment − interest
/// ending    = max(0, balance − principal)
/// ```
///
/// rounded to 2 places with trailing zeros stripped. When `balance`,
/// `payment` or `rate` does not parse the result is `"0"`.
///
/// ```rust
/// use epc_core::calculations::ending_balance;
/// use rust_decimal::Decimal;
///
/// assert_eq!(ending_balance("5000", "34.39", "5.5", Decimal::ZERO), "4988.53");
/// assert_eq!(ending_balance("n/a", "34.39", "5.5", Decimal::ZERO), "0");
/// ```
pub fn ending_balance(balance: &str, payment: &str, rate: &str, eurobor: Decimal) -> String {
    let parsed = (
        Cell::from(balance).try_decimal(),
        Cell::from(payment).try_decimal(),
        Cell::from(rate).try_decimal(),
    );
    let (Some(balance), Some(payment), Some(rate)) = parsed else {
        return "0".to_string();
    };

    let interest = balance * (rate + eurobor) / Decimal::ONE_HUNDRED / MONTHS_PER_YEAR;
    let principal = payment - interest;
    let ending = (balance - principal).max(Decimal::ZERO);
    Cell::from_decimal(cell::round(ending, DISPLAY_PLACES)).0
}

fn start_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Walk the schedule until the first empty payment, filling in dates and
/// balances. The first payment is the summary renovation fee.
pub fn schedule(
    contract: &mut Contract,
    calculation: &mut Calculation,
    summary: &mut [Decimal; 3],
) -> EpcResult<()> {
    let mut balance = contract
        .field(fields::CONTRACTOR_FIN_CONTRIBUTION)
        .trim()
        .to_string();
    let rate = contract.field(fields::INTEREST_RATE_PERCENT).trim().to_string();
    let start = start_date(contract.field(fields::START_DATE_OF_LOAN));
    let eurobor = contract.eurobor;

    let table = contract.table_mut(catalog::PROJECT_MEASUREMENTS_TABLE)?;
    let months = table.row_count().min(SCHEDULE_MONTHS);
    for month in 0..months {
        let payment = table.cell(month, columns::PAYMENT).clone();
        if payment.is_empty() {
            break;
        }

        let date = start
            .and_then(|start| start.checked_add_months(Months::new(month as u32)))
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let ending = ending_balance(&balance, payment.as_str(), &rate, eurobor);

        table.set_cell(month, columns::DATE, Cell::from(date));
        table.set_cell(month, columns::BEGINNING_BALANCE, Cell::from(balance.as_str()));
        table.set_cell(month, columns::ENDING_BALANCE, Cell::from(ending.as_str()));
        balance = ending;
    }

    let amp = table.cell(0, columns::PAYMENT).decimal();
    calculation.amp = amp;
    summary[summary_rows::RENOVATION_FEE] = amp;
    Ok(())
}
