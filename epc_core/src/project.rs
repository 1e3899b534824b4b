//! # Project Snapshot
//!
//! The handful of project facts the contract core needs. Projects live in
//! the surrounding system; contracts and indoor-climate records reference
//! them by id only, and a [`ProjectSnapshot`] is handed in when a
//! calculation or render runs.
//!
//! ## Example
//!
//! ```rust
//! use epc_core::project::ProjectSnapshot;
//! use rust_decimal::Decimal;
//!
//! let project = ProjectSnapshot::new("Latvia")
//!     .with_heated_area(Decimal::new(2450, 0))
//!     .with_guaranteed_savings(Decimal::new(35, 2))
//!     .with_floors(5);
//!
//! assert_eq!(project.country_key(), "latvia");
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-only view of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// Project id, shared with the contract and indoor-climate records
    pub id: Uuid,

    /// Country name as entered, e.g. "Latvia"
    pub country: String,

    /// Heated floor area in m²
    #[serde(default)]
    pub heated_area: Decimal,

    /// Guaranteed savings as a fraction (0.35 = 35 %)
    #[serde(default)]
    pub guaranteed_savings: Decimal,

    /// Number of floors above ground
    #[serde(default)]
    pub floors: u32,
}

impl ProjectSnapshot {
    /// New snapshot with a fresh id and zeroed figures.
    pub fn new(country: impl Into<String>) -> Self {
        ProjectSnapshot {
            id: Uuid::new_v4(),
            country: country.into(),
            heated_area: Decimal::ZERO,
            guaranteed_savings: Decimal::ZERO,
            floors: 0,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_heated_area(mut self, area: Decimal) -> Self {
        self.heated_area = area;
        self
    }

    pub fn with_guaranteed_savings(mut self, savings: Decimal) -> Self {
        self.guaranteed_savings = savings;
        self
    }

    pub fn with_floors(mut self, floors: u32) -> Self {
        self.floors = floors;
        self
    }

    /// Lowercase country, the key used for template sets and VAT lookup.
    pub fn country_key(&self) -> String {
        self.country.trim().to_lowercase()
    }
}

impl Default for ProjectSnapshot {
    fn default() -> Self {
        ProjectSnapshot::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_builder() {
        let project = ProjectSnapshot::new(" Austria ")
            .with_heated_area(Decimal::new(1200, 0))
            .with_floors(4);
        assert_eq!(project.country_key(), "austria");
        assert_eq!(project.heated_area, Decimal::new(1200, 0));
        assert_eq!(project.floors, 4);
        assert_eq!(project.guaranteed_savings, Decimal::ZERO);
    }

    #[test]
    fn test_snapshot_serialization() {
        let project = ProjectSnapshot::new("Poland").with_heated_area(Decimal::new(5005, 1));
        let json = serde_json::to_string(&project).unwrap();
        let roundtrip: ProjectSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, project);
    }

    #[test]
    fn test_missing_figures_default_to_zero() {
        let json = format!(r#"{{"id":"{}","country":"Romania"}}"#, Uuid::nil());
        let project: ProjectSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(project.heated_area, Decimal::ZERO);
        assert_eq!(project.floors, 0);
    }
}
