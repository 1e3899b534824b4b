//! Fee tables, renovation totals and the monthly summary.

use rust_decimal::Decimal;

use super::{div_or_zero, Calculation};
use crate::catalog::{self, summary as summary_rows};
use crate::cell::{self, Cell, DISPLAY_PLACES};
use crate::contract::Contract;
use crate::errors::EpcResult;
use crate::project::ProjectSnapshot;
use crate::table::Table;

const MONTHS: Decimal = Decimal::from_parts(12, 0, 0, false, 0);
const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

fn money(value: Decimal) -> Cell {
    Cell::fixed(value, DISPLAY_PLACES)
}

/// Yearly operation and maintenance budget (`OM1`) and its share per m².
pub fn operation_maintenance_base(
    contract: &Contract,
    project: &ProjectSnapshot,
    calculation: &mut Calculation,
    summary: &mut [Decimal; 3],
) -> EpcResult<()> {
    let om1 = contract
        .table(catalog::OPERATION_MAINTENANCE_BUDGET)?
        .total(1)?;
    calculation.om1 = om1;
    summary[summary_rows::OPERATION_FEE] = div_or_zero(om1, project.heated_area);
    Ok(())
}

/// `c = a × b` and the actual fee `f × b`; every numeric cell ends up with
/// 2 decimals. Row 0's energy fee is the summary energy fee.
pub fn balancing_period_fee(
    contract: &mut Contract,
    calculation: &mut Calculation,
    summary: &mut [Decimal; 3],
) -> EpcResult<()> {
    let table = contract.table_mut(catalog::BALANCING_PERIOD_FEE)?;
    for row in 0..table.row_count() {
        let a = table.cell(row, 1).decimal();
        let b = table.cell(row, 2).decimal();
        let f = table.cell(row, 5).decimal();
        table.set_cell(row, 3, Cell::from_decimal(a * b));
        table.set_cell(row, 6, Cell::from_decimal(f * b));
        format_numbers(table, row);
    }

    if table.row_count() > 0 {
        let etmfg = table.cell(0, 3).decimal();
        calculation.etmfg = etmfg;
        summary[summary_rows::ENERGY_FEE] = etmfg;
    }
    Ok(())
}

fn format_numbers(table: &mut Table, row: usize) {
    for column in 0..table.column_count() {
        if table.column(column).kind.is_number() {
            let value = table.cell(row, column).decimal();
            table.set_cell(row, column, money(value));
        }
    }
}

/// Yearly fee `c = a × b` and the monthly fee `e = c / d`.
pub fn calc_energy_fee(contract: &mut Contract) -> EpcResult<()> {
    let table = contract.table_mut(catalog::CALC_ENERGY_FEE)?;
    for row in 0..table.row_count() {
        let a = table.cell(row, 1).decimal();
        let b = table.cell(row, 2).decimal();
        let d = table.cell(row, 4).decimal();
        let c = a * b;
        table.set_cell(row, 3, money(c));
        table.set_cell(row, 5, money(div_or_zero(c, d)));
    }
    Ok(())
}

/// Monthly operation fee in total and per m² of heated area.
pub fn operations_maintenance_fee(contract: &mut Contract, project: &ProjectSnapshot) -> EpcResult<()> {
    let area = project.heated_area;
    let table = contract.table_mut(catalog::OPERATIONS_MAINTENANCE_FEE)?;
    for row in 0..table.row_count() {
        let monthly = table.cell(row, 2).decimal() / MONTHS;
        table.set_cell(row, 3, money(monthly));
        table.set_cell(row, 4, Cell::from_decimal(area));
        table.set_cell(row, 5, money(div_or_zero(monthly, area)));
    }
    Ok(())
}

/// Cost tables summed into the overall budget; the grand total with VAT
/// goes into the last row of the financial plan.
pub fn renovation_totals(contract: &mut Contract) -> EpcResult<()> {
    let sources = [
        catalog::PROJECT_DEVELOPMENT_RENOVATIONS,
        catalog::CONSTRUCTION_COSTS_RENOVATIONS,
        catalog::PROJECT_SUPERVISION,
        catalog::FINANCIAL_CHARGES,
    ];
    let mut subtotals = Vec::with_capacity(sources.len());
    for name in sources {
        subtotals.push(contract.table(name)?.total(2)?);
    }
    let ttcrw: Decimal = subtotals.iter().sum();
    let with_vat = cell::round(ttcrw + ttcrw * contract.vat, DISPLAY_PLACES);

    let budget = contract.table_mut(catalog::RENOVATION_OVERALL_BUDGET)?;
    for (row, subtotal) in subtotals.iter().enumerate() {
        budget.set_cell(row, 1, money(*subtotal));
        budget.set_cell(row, 2, money(div_or_zero(*subtotal * HUNDRED, ttcrw)));
    }
    let total_row = subtotals.len();
    if total_row < budget.row_count() {
        budget.set_cell(total_row, 1, money(ttcrw));
        let share = if ttcrw.is_zero() { Decimal::ZERO } else { HUNDRED };
        budget.set_cell(total_row, 2, money(share));
    }

    let plan = contract.table_mut(catalog::RENOVATION_FINANCIAL_PLAN)?;
    plan.set_cell(4, 1, money(with_vat));
    for row in 0..4 {
        let amount = plan.cell(row, 1).decimal();
        plan.set_cell(row, 2, money(div_or_zero(amount * HUNDRED, with_vat)));
    }
    Ok(())
}

/// Each summary row gets the sum, its VAT and the sum including VAT.
pub fn summary(contract: &mut Contract, sums: &[Decimal; 3]) -> EpcResult<()> {
    let vat = contract.vat;
    let table = contract.table_mut(catalog::SUMMARY)?;
    for (row, sum) in sums.iter().enumerate() {
        let tax = *sum * vat;
        table.set_cell(row, 1, money(*sum));
        table.set_cell(row, 2, money(tax));
        table.set_cell(row, 3, money(*sum + tax));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn contract() -> Contract {
        Contract::new(Uuid::new_v4())
    }

    #[test]
    fn test_balancing_period_fee() {
        let mut contract = contract();
        let table = contract.table_mut(catalog::BALANCING_PERIOD_FEE).unwrap();
        table.set_cell(0, 1, "250".into());
        table.set_cell(0, 2, "65.5".into());
        table.set_cell(0, 5, "240.123".into());

        let mut calculation = Calculation::default();
        let mut sums = [Decimal::ZERO; 3];
        balancing_period_fee(&mut contract, &mut calculation, &mut sums).unwrap();

        let table = contract.table(catalog::BALANCING_PERIOD_FEE).unwrap();
        assert_eq!(table.cell(0, 1).as_str(), "250.00");
        assert_eq!(table.cell(0, 3).as_str(), "16375.00");
        assert_eq!(table.cell(0, 5).as_str(), "240.12");
        assert_eq!(table.cell(0, 6).as_str(), "15728.06");
        assert_eq!(calculation.etmfg, Decimal::from(16375));
        assert_eq!(sums[summary_rows::ENERGY_FEE], Decimal::from(16375));
    }

    #[test]
    fn test_calc_energy_fee_zero_months() {
        let mut contract = contract();
        let table = contract.table_mut(catalog::CALC_ENERGY_FEE).unwrap();
        table.set_cell(0, 1, "10".into());
        table.set_cell(0, 2, "3".into());
        calc_energy_fee(&mut contract).unwrap();
        assert_eq!(contract.table(catalog::CALC_ENERGY_FEE).unwrap().cell(0, 5).as_str(), "2.50");

        contract
            .table_mut(catalog::CALC_ENERGY_FEE)
            .unwrap()
            .set_cell(0, 4, "0".into());
        calc_energy_fee(&mut contract).unwrap();
        let table = contract.table(catalog::CALC_ENERGY_FEE).unwrap();
        assert_eq!(table.cell(0, 3).as_str(), "30.00");
        assert_eq!(table.cell(0, 5).as_str(), "0.00");
    }

    #[test]
    fn test_operations_maintenance_fee() {
        let mut contract = contract();
        contract
            .table_mut(catalog::OPERATIONS_MAINTENANCE_FEE)
            .unwrap()
            .set_cell(0, 2, "6000".into());
        let project = ProjectSnapshot::new("Latvia").with_heated_area(Decimal::from(400));
        operations_maintenance_fee(&mut contract, &project).unwrap();

        let table = contract.table(catalog::OPERATIONS_MAINTENANCE_FEE).unwrap();
        assert_eq!(table.cell(0, 3).as_str(), "500.00");
        assert_eq!(table.cell(0, 4).as_str(), "400");
        assert_eq!(table.cell(0, 5).as_str(), "1.25");
    }

    #[test]
    fn test_operation_maintenance_base_without_area() {
        let mut contract = contract();
        contract
            .table_mut(catalog::OPERATION_MAINTENANCE_BUDGET)
            .unwrap()
            .set_cell(1, 1, "900".into());
        let project = ProjectSnapshot::new("Latvia");
        let mut calculation = Calculation::default();
        let mut sums = [Decimal::ZERO; 3];
        operation_maintenance_base(&contract, &project, &mut calculation, &mut sums).unwrap();
        assert_eq!(calculation.om1, Decimal::from(900));
        assert_eq!(sums[summary_rows::OPERATION_FEE], Decimal::ZERO);
    }

    #[test]
    fn test_renovation_totals_with_vat() {
        let mut contract = contract();
        contract.vat = Decimal::new(21, 2);
        contract
            .table_mut(catalog::CONSTRUCTION_COSTS_RENOVATIONS)
            .unwrap()
            .set_cell(0, 2, "75000".into());
        contract
            .table_mut(catalog::PROJECT_DEVELOPMENT_RENOVATIONS)
            .unwrap()
            .set_cell(0, 2, "25000".into());

        renovation_totals(&mut contract).unwrap();
        let budget = contract.table(catalog::RENOVATION_OVERALL_BUDGET).unwrap();
        assert_eq!(budget.cell(0, 1).as_str(), "25000.00");
        assert_eq!(budget.cell(1, 1).as_str(), "75000.00");
        assert_eq!(budget.cell(1, 2).as_str(), "75.00");
        assert_eq!(budget.cell(4, 1).as_str(), "100000.00");
        let plan = contract.table(catalog::RENOVATION_FINANCIAL_PLAN).unwrap();
        assert_eq!(plan.cell(4, 1).as_str(), "121000.00");
    }

    #[test]
    fn test_summary_applies_vat() {
        let mut contract = contract();
        contract.vat = Decimal::new(2, 1);
        let sums = [Decimal::from(100), Decimal::new(3439, 2), Decimal::ZERO];
        summary(&mut contract, &sums).unwrap();
        let table = contract.table(catalog::SUMMARY).unwrap();
        assert_eq!(table.row(0).cells()[1..].iter().map(Cell::as_str).collect::<Vec<_>>(), vec!["100.00", "20.00", "120.00"]);
        assert_eq!(table.cell(1, 3).as_str(), "41.27");
        assert_eq!(table.cell(2, 3).as_str(), "0.00");
    }
}
