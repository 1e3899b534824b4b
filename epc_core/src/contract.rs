//! # Contract
//!
//! A [`Contract`] belongs to one project and carries everything a contract
//! document is rendered from: free-form fields, the agreement text fields,
//! maintenance notes, the Markdown body and the table catalog.
//!
//! VAT and EUROBOR are runtime values. They are never written to disk and
//! are refreshed from a [`RateProvider`] when a contract is loaded and again
//! right before it is saved.
//!
//! ## JSON Format
//!
//! ```json
//! {
//!   "project": "0b6b0c4e-...",
//!   "fields": { "contractor_fin_contribution": "5000" },
//!   "agreement": {},
//!   "maintenance": {},
//!   "markdown": "# Contract\n...",
//!   "tables": { "baseline": { "columns": [...], "rows": [...] } }
//! }
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::calculations::{self, Calculation};
use crate::catalog;
use crate::cell;
use crate::errors::{EpcError, EpcResult};
use crate::project::ProjectSnapshot;
use crate::rates::RateProvider;
use crate::table::Table;

/// Field keys the engine reads or writes.
pub mod fields {
    pub const CONTRACTOR_FIN_CONTRIBUTION: &str = "contractor_fin_contribution";
    pub const START_DATE_OF_LOAN: &str = "start_date_of_loan";
    pub const INTEREST_RATE_PERCENT: &str = "interest_rate_percent";
    pub const CALCULATIONS_QIETG: &str = "calculations_qietg";
    pub const CALCULATIONS_QAPKCZG: &str = "calculations_qapkczg";
    pub const CALCULATIONS_OM1: &str = "calculations_om1";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Owning project
    pub project: Uuid,

    #[serde(default)]
    pub fields: BTreeMap<String, String>,

    #[serde(default)]
    pub agreement: BTreeMap<String, String>,

    #[serde(default)]
    pub maintenance: BTreeMap<String, String>,

    /// Markdown body, stored as UTF-8 text
    #[serde(default, with = "markdown_text")]
    pub markdown: Vec<u8>,

    #[serde(default)]
    pub tables: BTreeMap<String, Table>,

    /// VAT as a fraction, loaded from the rate provider
    #[serde(skip)]
    pub vat: Decimal,

    /// EUROBOR base rate in percent, loaded from the rate provider
    #[serde(skip)]
    pub eurobor: Decimal,
}

impl Contract {
    /// New contract for `project` with a fresh copy of the catalog.
    pub fn new(project: Uuid) -> Self {
        Contract {
            project,
            fields: BTreeMap::new(),
            agreement: BTreeMap::new(),
            maintenance: BTreeMap::new(),
            markdown: Vec::new(),
            tables: catalog::new_catalog(),
            vat: Decimal::ZERO,
            eurobor: Decimal::ZERO,
        }
    }

    pub fn table(&self, name: &str) -> EpcResult<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| EpcError::dependency_missing(name))
    }

    pub fn table_mut(&mut self, name: &str) -> EpcResult<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| EpcError::dependency_missing(name))
    }

    /// Field value, empty when unset.
    pub fn field(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn markdown_text(&self) -> String {
        String::from_utf8_lossy(&self.markdown).into_owned()
    }

    /// Add catalog tables missing from a contract saved by an older build.
    ///
    /// Returns the number of tables added.
    pub fn fill_missing_tables(&mut self) -> usize {
        let mut added = 0;
        for (name, table) in catalog::new_catalog() {
            if !self.tables.contains_key(&name) {
                self.tables.insert(name, table);
                added += 1;
            }
        }
        added
    }

    /// Refresh VAT for `country` and the current EUROBOR rate.
    pub fn apply_rates(&mut self, rates: &dyn RateProvider, country: &str) -> EpcResult<()> {
        self.vat = rates.vat(country)?;
        self.eurobor = cell::round(rates.eurobor()?, cell::WORK_PLACES);
        debug!(project = %self.project, vat = %self.vat, eurobor = %self.eurobor, "rates applied");
        Ok(())
    }

    /// Run the calculation engine over this contract.
    pub fn calculate(&mut self, project: &ProjectSnapshot) -> EpcResult<Calculation> {
        calculations::calculate(self, project)
    }

    /// Recalculate and copy the headline figures into `fields`.
    pub fn prepare_for_save(&mut self, project: &ProjectSnapshot) -> EpcResult<Calculation> {
        let calculation = self.calculate(project)?;
        self.set_field(
            fields::CALCULATIONS_QIETG,
            cell::fixed(calculation.q_iet_g, cell::DISPLAY_PLACES),
        );
        self.set_field(
            fields::CALCULATIONS_QAPKCZG,
            cell::fixed(calculation.q_apk_cz_g, cell::DISPLAY_PLACES),
        );
        self.set_field(
            fields::CALCULATIONS_OM1,
            cell::fixed(calculation.om1, cell::DISPLAY_PLACES),
        );
        Ok(calculation)
    }
}

mod markdown_text {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = Option::<String>::deserialize(deserializer)?;
        Ok(text.unwrap_or_default().into_bytes())
    }
}
