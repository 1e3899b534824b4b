//! # Cells and Kinds
//!
//! A [`Cell`] is the opaque text stored in a table; a [`Kind`] tags a column
//! with its meaning, which decides the display unit, the rounding and the
//! aggregations that make sense.
//!
//! Money and every value written back into a table go through fixed-point
//! [`Decimal`] arithmetic. Unparseable cells read as zero.
//!
//! ## Example
//!
//! ```rust
//! use epc_core::cell::{Cell, Kind};
//!
//! assert_eq!(Cell::from("3.14").format(Kind::Money), "3.14€");
//! assert_eq!(Cell::from("3.14").format(Kind::Count), "3");
//! assert_eq!(Cell::from("five").decimal().to_string(), "0");
//! ```

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Decimal places kept for intermediate results.
pub const WORK_PLACES: u32 = 4;

/// Decimal places used when a value is displayed.
pub const DISPLAY_PLACES: u32 = 2;

/// Round half away from zero to `places` decimals.
pub fn round(value: Decimal, places: u32) -> Decimal {
    value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to `places` and always print exactly that many decimals.
pub fn fixed(value: Decimal, places: u32) -> String {
    let mut rounded = round(value, places);
    rounded.rescale(places);
    rounded.to_string()
}

/// Parse a decimal leniently; anything unparseable is zero.
pub fn parse_decimal(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or(Decimal::ZERO)
}

/// Semantic tag of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Kind {
    #[default]
    String,
    Name,
    Decimal,
    Money,
    Temperature,
    Count,
    Volume,
    Energy,
    Area,
    Percent,
}

impl Kind {
    pub const ALL: [Kind; 10] = [
        Kind::String,
        Kind::Name,
        Kind::Decimal,
        Kind::Money,
        Kind::Temperature,
        Kind::Count,
        Kind::Volume,
        Kind::Energy,
        Kind::Area,
        Kind::Percent,
    ];

    /// Everything except `String` and `Name` holds a number.
    pub fn is_number(&self) -> bool {
        !matches!(self, Kind::String | Kind::Name)
    }

    /// Whether a column total is meaningful.
    ///
    /// Narrower than [`Kind::is_number`]: adding up temperatures or areas
    /// of different rows does not give a useful figure.
    pub fn can_sum(&self) -> bool {
        matches!(
            self,
            Kind::Decimal | Kind::Money | Kind::Count | Kind::Energy | Kind::Volume
        )
    }

    /// Whether a column average is meaningful (temperatures only).
    pub fn can_avg(&self) -> bool {
        matches!(self, Kind::Temperature)
    }

    /// Unit suffix appended when formatting.
    pub fn unit(&self) -> &'static str {
        match self {
            Kind::String | Kind::Name | Kind::Decimal | Kind::Count => "",
            Kind::Money => "€",
            Kind::Temperature => "°C",
            Kind::Volume => "m³",
            Kind::Energy => "MWh",
            Kind::Area => "m²",
            Kind::Percent => "%",
        }
    }

    /// Decimal places shown for this kind.
    pub fn display_places(&self) -> u32 {
        match self {
            Kind::Count => 0,
            _ => DISPLAY_PLACES,
        }
    }

    /// Format a value with this kind's rounding and unit.
    pub fn format(&self, value: Decimal) -> String {
        let rounded = round(value, self.display_places()).normalize();
        format!("{}{}", rounded, self.unit())
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Kind::String => "String",
            Kind::Name => "Name",
            Kind::Decimal => "Decimal",
            Kind::Money => "Money",
            Kind::Temperature => "Temperature",
            Kind::Count => "Count",
            Kind::Volume => "Volume",
            Kind::Energy => "Energy",
            Kind::Area => "Area",
            Kind::Percent => "Percent",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A single table value, stored as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cell(pub String);

impl Cell {
    pub fn empty() -> Self {
        Cell(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Fixed-point value of the cell; zero when it does not parse.
    pub fn decimal(&self) -> Decimal {
        parse_decimal(&self.0)
    }

    /// Strict parse, for callers that must tell "0" from garbage.
    pub fn try_decimal(&self) -> Option<Decimal> {
        let trimmed = self.0.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .ok()
    }

    /// Display form for a column of `kind`. Text kinds pass through.
    pub fn format(&self, kind: Kind) -> String {
        if !kind.is_number() {
            return self.0.clone();
        }
        kind.format(self.decimal())
    }

    /// Cell from an engineering float. NaN and infinities become `0.00`.
    pub fn from_float(value: f64) -> Self {
        if !value.is_finite() {
            return Cell("0.00".to_string());
        }
        Cell(format!("{:.2}", value))
    }

    /// Cell holding `value` with trailing zeros stripped.
    pub fn from_decimal(value: Decimal) -> Self {
        Cell(value.normalize().to_string())
    }

    /// Cell holding `value` rounded and padded to `places` decimals.
    pub fn fixed(value: Decimal, places: u32) -> Self {
        Cell(fixed(value, places))
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell(value)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decimal from an engineering float, NaN-safe.
pub fn decimal_from_f64(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}
