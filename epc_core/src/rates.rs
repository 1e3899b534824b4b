//! VAT and EUROBOR lookup.
//!
//! The surrounding system owns the real rate tables; the core only needs
//! the [`RateProvider`] seam. [`StaticRates`] serves fixed values from
//! configuration and is what the CLI and the tests use.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::cell;
use crate::errors::{EpcError, EpcResult};

pub trait RateProvider: Send + Sync {
    /// VAT for `country` as a fraction in `0..=1`.
    fn vat(&self, country: &str) -> EpcResult<Decimal>;

    /// Most recent EUROBOR rate in percent, 4 decimal places.
    fn eurobor(&self) -> EpcResult<Decimal>;
}

/// Fixed rates keyed by lowercase country.
#[derive(Debug, Clone, Default)]
pub struct StaticRates {
    vat: HashMap<String, Decimal>,
    default_vat: Option<Decimal>,
    eurobor: Decimal,
}

impl StaticRates {
    pub fn new(eurobor: Decimal) -> Self {
        StaticRates {
            vat: HashMap::new(),
            default_vat: None,
            eurobor: cell::round(eurobor, cell::WORK_PLACES),
        }
    }

    pub fn with_vat(mut self, country: &str, vat: Decimal) -> Self {
        self.vat.insert(country.trim().to_lowercase(), vat);
        self
    }

    /// VAT used for countries without their own entry.
    pub fn with_default_vat(mut self, vat: Decimal) -> Self {
        self.default_vat = Some(vat);
        self
    }
}

impl RateProvider for StaticRates {
    fn vat(&self, country: &str) -> EpcResult<Decimal> {
        let key = country.trim().to_lowercase();
        let vat = self
            .vat
            .get(&key)
            .copied()
            .or(self.default_vat)
            .ok_or_else(|| EpcError::invalid_input("country", country, "no VAT rate configured"))?;
        if vat < Decimal::ZERO || vat > Decimal::ONE {
            return Err(EpcError::invalid_input(
                "vat",
                vat.to_string(),
                "must be a fraction between 0 and 1",
            ));
        }
        Ok(vat)
    }

    fn eurobor(&self) -> EpcResult<Decimal> {
        Ok(self.eurobor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vat_lookup_is_case_insensitive() {
        let rates = StaticRates::new(Decimal::ZERO).with_vat("Latvia", Decimal::new(21, 2));
        assert_eq!(rates.vat("LATVIA").unwrap(), Decimal::new(21, 2));
        assert!(rates.vat("poland").is_err());
    }

    #[test]
    fn test_default_vat() {
        let rates = StaticRates::new(Decimal::ZERO).with_default_vat(Decimal::new(2, 1));
        assert_eq!(rates.vat("bulgaria").unwrap(), Decimal::new(2, 1));
    }

    #[test]
    fn test_vat_must_be_fraction() {
        let rates = StaticRates::new(Decimal::ZERO).with_vat("romania", Decimal::new(19, 0));
        assert!(matches!(rates.vat("romania"), Err(EpcError::InvalidInput { .. })));
    }

    #[test]
    fn test_eurobor_rounds_to_four_places() {
        let rates = StaticRates::new(Decimal::new(3_456_789, 6));
        assert_eq!(rates.eurobor().unwrap().to_string(), "3.4568");
    }
}
