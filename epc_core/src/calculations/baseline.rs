//! Baseline figures derived from the three base years.
//!
//! Base-year tables hold monthly metered consumption, base-condition tables
//! the monthly temperatures. The `baseline` table collects one value per
//! year (columns 3..5) and a reference value (column 6) per energy figure.

use rust_decimal::Decimal;

use super::{Calculation, Reference};
use crate::catalog::{
    self, baseconditions, baseline as rows, baseyear, BASECONDITIONS, BASEYEARS,
};
use crate::cell::{self, Cell, DISPLAY_PLACES};
use crate::contract::Contract;
use crate::errors::EpcResult;
use crate::table::Table;

/// Cold water temperature in °C.
pub const COLD_WATER_TEMPERATURE: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Density of water in kg/m³.
pub const WATER_DENSITY: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Specific heat of water in J/(kg·K).
pub const WATER_SPECIFIC_HEAT: Decimal = Decimal::from_parts(4186, 0, 0, false, 0);

const SECONDS_PER_HOUR: Decimal = Decimal::from_parts(3600, 0, 0, false, 0);

/// Copy heating days from each base year and derive degree days.
///
/// `GDD = heating days × (indoor T3 − outdoor T1)`, rounded to 2 places.
pub fn populate_base_conditions(contract: &mut Contract) -> EpcResult<()> {
    for (year, conditions) in BASEYEARS.iter().zip(BASECONDITIONS) {
        let heating_days: Vec<Cell> = contract
            .table(year)?
            .rows()
            .iter()
            .map(|row| row.cell(baseyear::HEATING_DAYS).clone())
            .collect();

        let table = contract.table_mut(conditions)?;
        for row in 0..table.row_count() {
            let days = heating_days.get(row).cloned().unwrap_or_default();
            let outdoor = table.cell(row, baseconditions::OUTDOOR).decimal();
            let indoor = table.cell(row, baseconditions::INDOOR).decimal();
            let gdd = cell::round(days.decimal() * (indoor - outdoor), DISPLAY_PLACES);

            table.set_cell(row, baseconditions::HEATING_DAYS, days);
            table.set_cell(row, baseconditions::GDD, Cell::from_decimal(gdd));
        }
    }
    Ok(())
}

/// Yearly totals of heat energy and degree days, and the average indoor
/// temperature, written into the baseline year columns.
pub fn baseline_totals(contract: &mut Contract) -> EpcResult<()> {
    let mut totals = Vec::with_capacity(BASEYEARS.len());
    for (year, conditions) in BASEYEARS.iter().zip(BASECONDITIONS) {
        let heat = contract.table(year)?.total(baseyear::TOTAL_HEAT)?;
        let conditions = contract.table(conditions)?;
        let gdd = conditions.total(baseconditions::GDD)?;
        let indoor = conditions.average(baseconditions::INDOOR)?;
        totals.push((heat, gdd, indoor));
    }

    let baseline = contract.table_mut(catalog::BASELINE)?;
    for (offset, (heat, gdd, indoor)) in totals.into_iter().enumerate() {
        let column = rows::FIRST_YEAR + offset;
        baseline.set_cell(rows::QT, column, Cell::from_decimal(heat));
        baseline.set_cell(rows::GDD, column, Cell::from_decimal(gdd));
        baseline.set_cell(rows::T1, column, Cell::from_decimal(indoor));
    }
    Ok(())
}

/// Four cells of a baseline row starting at the first year column.
///
/// # Panics
///
/// When the row is shorter than the baseline layout.
pub fn reference(baseline: &Table, row: usize) -> Reference {
    let cells = &baseline.row(row).cells()[rows::FIRST_YEAR..=rows::REFERENCE];
    [
        cells[0].decimal(),
        cells[1].decimal(),
        cells[2].decimal(),
        cells[3].decimal(),
    ]
}

pub fn reference_vectors(contract: &Contract, calculation: &mut Calculation) -> EpcResult<()> {
    let baseline = contract.table(catalog::BASELINE)?;
    calculation.qt_ref = reference(baseline, rows::QT);
    calculation.q_apk_ref = reference(baseline, rows::QAPK);
    calculation.q_cz_ref = reference(baseline, rows::QCZ);
    calculation.q_ku_ref = reference(baseline, rows::QKU);
    calculation.q_apk_cz_ref = reference(baseline, rows::QAPKCZ);
    calculation.q_t1_ref = reference(baseline, rows::T1);
    calculation.gdd_ref = reference(baseline, rows::GDD);
    Ok(())
}

/// Energy for heating `volume` m³ of water to `temperature` °C.
///
/// `V × (Oku − Tw) × c × ρ / 3600`, rounded to 2 places.
pub fn dhw_energy(volume: Decimal, temperature: Decimal) -> Decimal {
    let energy = volume * (temperature - COLD_WATER_TEMPERATURE) * WATER_SPECIFIC_HEAT
        * WATER_DENSITY
        / SECONDS_PER_HOUR;
    cell::round(energy, DISPLAY_PLACES)
}

/// Domestic hot water per base year into baseline row QKu.
///
/// Volume and temperature are summed over all months before the formula
/// is applied.
pub fn domestic_hot_water(contract: &mut Contract) -> EpcResult<()> {
    let mut energies = Vec::with_capacity(BASEYEARS.len());
    for year in BASEYEARS {
        let table = contract.table(year)?;
        let volume = table.column_sum(baseyear::DHW_VOLUME)?;
        let temperature = table.column_sum(baseyear::DHW_TEMPERATURE)?;
        energies.push(dhw_energy(volume, temperature));
    }

    let baseline = contract.table_mut(catalog::BASELINE)?;
    for (offset, energy) in energies.into_iter().enumerate() {
        baseline.set_cell(rows::QKU, rows::FIRST_YEAR + offset, Cell::from_decimal(energy));
    }
    Ok(())
}

/// Split the reference heating energy by the guaranteed savings fraction.
pub fn savings_split(calculation: &mut Calculation, guaranteed_savings: Decimal) {
    let reference = calculation.q_apk_cz_ref[3];
    calculation.q_iet_g = cell::round(reference * guaranteed_savings, cell::WORK_PLACES);
    calculation.q_apk_cz_g = reference - calculation.q_iet_g;
    calculation.q_m_apk_cz_g = cell::round(calculation.q_apk_cz_g / Decimal::from(12), cell::WORK_PLACES);
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn contract() -> Contract {
        Contract::new(Uuid::new_v4())
    }

    #[test]
    fn test_dhw_energy() {
        let energy = dhw_energy(Decimal::from(100), Decimal::from(60));
        assert_eq!(energy.to_string(), "5813888.89");
    }

    #[test]
    fn test_dhw_sums_months_first() {
        let mut contract = contract();
        let year = contract.table_mut(catalog::BASEYEAR_N_1).unwrap();
        year.set_cell(0, baseyear::DHW_VOLUME, "40".into());
        year.set_cell(1, baseyear::DHW_VOLUME, "60".into());
        year.set_cell(0, baseyear::DHW_TEMPERATURE, "25".into());
        year.set_cell(1, baseyear::DHW_TEMPERATURE, "35".into());

        domestic_hot_water(&mut contract).unwrap();
        let baseline = contract.table(catalog::BASELINE).unwrap();
        assert_eq!(baseline.cell(rows::QKU, rows::FIRST_YEAR + 1).as_str(), "5813888.89");
        assert_eq!(baseline.cell(rows::QKU, rows::FIRST_YEAR).as_str(), "0");
    }

    #[test]
    fn test_base_conditions_and_totals() {
        let mut contract = contract();
        let year = contract.table_mut(catalog::BASEYEAR_N).unwrap();
        year.set_cell(0, baseyear::HEATING_DAYS, "31".into());
        year.set_cell(1, baseyear::HEATING_DAYS, "28".into());
        year.set_cell(0, baseyear::TOTAL_HEAT, "120.5".into());
        year.set_cell(1, baseyear::TOTAL_HEAT, "99.5".into());

        let conditions = contract.table_mut(catalog::BASECONDITIONS_N).unwrap();
        conditions.set_cell(0, baseconditions::OUTDOOR, "-2.5".into());
        conditions.set_cell(0, baseconditions::INDOOR, "20".into());
        conditions.set_cell(1, baseconditions::OUTDOOR, "-1".into());
        conditions.set_cell(1, baseconditions::INDOOR, "21".into());

        populate_base_conditions(&mut contract).unwrap();
        let conditions = contract.table(catalog::BASECONDITIONS_N).unwrap();
        assert_eq!(conditions.cell(0, baseconditions::HEATING_DAYS).as_str(), "31");
        assert_eq!(conditions.cell(0, baseconditions::GDD).as_str(), "697.5");
        assert_eq!(conditions.cell(1, baseconditions::GDD).as_str(), "616");

        baseline_totals(&mut contract).unwrap();
        let baseline = contract.table(catalog::BASELINE).unwrap();
        assert_eq!(baseline.cell(rows::QT, rows::FIRST_YEAR).as_str(), "220");
        assert_eq!(baseline.cell(rows::GDD, rows::FIRST_YEAR).as_str(), "1313.5");
        // (20 + 21) / 12 months
        assert_eq!(baseline.cell(rows::T1, rows::FIRST_YEAR).as_str(), "3.42");
    }

    #[test]
    fn test_reference_vectors_include_reference_column() {
        let mut contract = contract();
        let baseline = contract.table_mut(catalog::BASELINE).unwrap();
        for (column, value) in ["10", "20", "30", "25"].iter().enumerate() {
            baseline.set_cell(rows::QAPKCZ, rows::FIRST_YEAR + column, (*value).into());
        }

        let mut calculation = Calculation::default();
        reference_vectors(&contract, &mut calculation).unwrap();
        assert_eq!(calculation.q_apk_cz_ref[3], Decimal::from(25));

        savings_split(&mut calculation, Decimal::new(2, 1));
        assert_eq!(calculation.q_iet_g, Decimal::from(5));
        assert_eq!(calculation.q_apk_cz_g, Decimal::from(20));
        assert_eq!(calculation.q_m_apk_cz_g.to_string(), "1.6667");
    }
}
