//! # Contract Calculations
//!
//! One pass over a contract's tables that derives the baseline figures, the
//! fee tables, the renovation totals, the amortization schedule and the
//! monthly summary. Every derived value is written back into the tables in
//! place; the headline figures are also returned as a [`Calculation`].
//!
//! ## Order
//!
//! 1. base conditions (heating days, degree days) - [`baseline`]
//! 2. baseline totals, averages and reference vectors - [`baseline`]
//! 3. domestic hot water - [`baseline`]
//! 4. guaranteed-savings split - [`baseline`]
//! 5. operation and maintenance, fee tables, renovation totals - [`fees`]
//! 6. amortization schedule - [`amortization`]
//! 7. summary with VAT - [`fees`]
//!
//! A table missing from the contract is reported as
//! [`EpcError::DependencyMissing`]. A panic inside the pass (for example a
//! malformed baseline row) is caught and reported as
//! [`EpcError::CalculationFailed`] with a backtrace.
//!
//! ## Example
//!
//! ```rust
//! use epc_core::contract::Contract;
//! use epc_core::project::ProjectSnapshot;
//!
//! let project = ProjectSnapshot::new("Latvia");
//! let mut contract = Contract::new(project.id);
//! let calculation = epc_core::calculations::calculate(&mut contract, &project).unwrap();
//! assert!(calculation.om1.is_zero());
//! ```

pub mod amortization;
pub mod baseline;
pub mod fees;

use std::backtrace::Backtrace;
use std::panic::{self, AssertUnwindSafe};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::contract::Contract;
use crate::errors::{EpcError, EpcResult};
use crate::project::ProjectSnapshot;

pub use amortization::ending_balance;

/// Four-element slice of a baseline row: years n, n−1, n−2 and reference.
pub type Reference = [Decimal; 4];

/// Headline figures of one calculation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    /// Total heat energy consumption
    pub qt_ref: Reference,
    /// Space heating
    pub q_apk_ref: Reference,
    /// Circulation losses
    pub q_cz_ref: Reference,
    /// Space heating and circulation losses
    pub q_apk_cz_ref: Reference,
    /// Domestic hot water
    pub q_ku_ref: Reference,
    /// Average indoor temperature
    pub q_t1_ref: Reference,
    /// Degree days
    pub gdd_ref: Reference,

    /// Guaranteed savings slice of the reference energy
    pub q_iet_g: Decimal,
    /// Reference energy left after the guaranteed savings
    pub q_apk_cz_g: Decimal,
    /// Monthly share of `q_apk_cz_g`
    pub q_m_apk_cz_g: Decimal,
    /// Energy fee (balancing period, row 0)
    pub etmfg: Decimal,
    /// First amortization payment
    pub amp: Decimal,
    /// Yearly operation and maintenance budget
    pub om1: Decimal,
}

/// Run the whole pass over `contract`.
pub fn calculate(contract: &mut Contract, project: &ProjectSnapshot) -> EpcResult<Calculation> {
    debug!(project = %contract.project, "calculation started");
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| run(contract, project)));
    match outcome {
        Ok(result) => {
            if let Err(err) = &result {
                warn!(project = %contract.project, error = %err, "calculation failed");
            }
            result
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            warn!(project = %contract.project, %reason, "calculation panicked");
            Err(EpcError::CalculationFailed {
                reason,
                backtrace: Backtrace::force_capture().to_string(),
            })
        }
    }
}

fn run(contract: &mut Contract, project: &ProjectSnapshot) -> EpcResult<Calculation> {
    let mut calculation = Calculation::default();
    // Monthly sums for the summary rows: energy, renovation, operation.
    let mut summary = [Decimal::ZERO; 3];

    baseline::populate_base_conditions(contract)?;
    baseline::baseline_totals(contract)?;
    baseline::reference_vectors(contract, &mut calculation)?;
    baseline::domestic_hot_water(contract)?;
    baseline::savings_split(&mut calculation, project.guaranteed_savings);

    fees::operation_maintenance_base(contract, project, &mut calculation, &mut summary)?;
    fees::balancing_period_fee(contract, &mut calculation, &mut summary)?;
    fees::calc_energy_fee(contract)?;
    fees::operations_maintenance_fee(contract, project)?;
    fees::renovation_totals(contract)?;

    amortization::schedule(contract, &mut calculation, &mut summary)?;

    fees::summary(contract, &summary)?;

    debug!(project = %contract.project, om1 = %calculation.om1, amp = %calculation.amp, "calculation finished");
    Ok(calculation)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "calculation panicked".to_string()
    }
}

/// `a / b`, or zero when `b` is zero.
pub(crate) fn div_or_zero(a: Decimal, b: Decimal) -> Decimal {
    if b.is_zero() {
        Decimal::ZERO
    } else {
        a / b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::cell::Cell;
    use crate::table::{Column, Row, Table};

    #[test]
    fn test_calculate_fresh_contract() {
        let project = ProjectSnapshot::new("Latvia");
        let mut contract = Contract::new(project.id);
        let calculation = calculate(&mut contract, &project).unwrap();
        assert_eq!(calculation.qt_ref, [Decimal::ZERO; 4]);
        assert!(calculation.amp.is_zero());
    }

    #[test]
    fn test_missing_table_is_dependency_error() {
        let project = ProjectSnapshot::new("Latvia");
        let mut contract = Contract::new(project.id);
        contract.tables.remove(catalog::PROJECT_SUPERVISION);
        let err = calculate(&mut contract, &project).unwrap_err();
        assert_eq!(err, EpcError::dependency_missing(catalog::PROJECT_SUPERVISION));
    }

    #[test]
    fn test_short_baseline_row_is_calculation_failure() {
        let project = ProjectSnapshot::new("Latvia");
        let mut contract = Contract::new(project.id);
        let short = Table::from_rows(
            vec![Column::new("Symbol", crate::cell::Kind::Name)],
            (0..7).map(|_| Row::new(vec![Cell::from("x")])).collect(),
        )
        .unwrap();
        contract.tables.insert(catalog::BASELINE.to_string(), short);

        let err = calculate(&mut contract, &project).unwrap_err();
        match err {
            EpcError::CalculationFailed { reason, backtrace } => {
                assert!(reason.contains("out of range"), "{reason}");
                assert!(!backtrace.is_empty());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_div_or_zero() {
        assert_eq!(div_or_zero(Decimal::ONE, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(div_or_zero(Decimal::new(10, 0), Decimal::new(4, 0)), Decimal::new(25, 1));
    }
}
