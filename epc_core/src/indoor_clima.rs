//! # Indoor Climate
//!
//! Heat balance of a building for the three base years: transmission
//! losses through the envelope zones, air exchange, internal and solar
//! gains, and distribution losses of the heating pipes in the basement and
//! the attic. The measured consumption (from the contract's baseline
//! tables) is compared against the calculated demand.
//!
//! ## Persistence
//!
//! Per-year values are stored as child rows tagged with a [`PeriodKind`].
//! [`IndoorClima::expand`] turns the typed fields into rows on save and
//! [`IndoorClima::fold`] turns rows back into fields on load; a kind with no
//! row keeps its current value. [`IndoorClimaRecord`] is the persisted shape.
//!
//! ## Example
//!
//! ```rust
//! use epc_core::contract::Contract;
//! use epc_core::indoor_clima::{DemandScale, IndoorClima, Zone};
//! use epc_core::project::ProjectSnapshot;
//!
//! let project = ProjectSnapshot::new("Latvia").with_floors(5);
//! let contract = Contract::new(project.id);
//!
//! let mut clima = IndoorClima::new(project.id);
//! clima.zones.insert("zone1_walls".into(), Zone::new(800.0, 1.25));
//! clima.calculate(&contract, &project, DemandScale::PerMillion).unwrap();
//!
//! assert_eq!(clima.total_ht, 1000.0);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::catalog::{self, baseconditions, baseline, baseyear, BASECONDITIONS, BASEYEARS};
use crate::contract::Contract;
use crate::errors::{EpcError, EpcResult};
use crate::project::ProjectSnapshot;

/// Internal heat gains per m² of heated area.
pub const INTERNAL_GAINS_PER_M2: f64 = 6.0;

/// Solar heat gains per m² of window area.
pub const SOLAR_GAINS_PER_M2: f64 = 12.8;

/// Volumetric heat capacity of air in Wh/(m³·K).
pub const AIR_HEAT_CAPACITY: f64 = 0.34;

/// Temperature drop assumed for zones outside the main heated zone.
pub const UNHEATED_ZONE_DROP: f64 = 3.0;

/// Distribution loss coefficient by row (basement Good/Poor/No, then attic
/// Good/Poor/No) and diameter bucket.
pub const HEAT_LOSS_TABLE: [[f64; 6]; 6] = [
    [0.14, 0.17, 0.20, 0.23, 0.26, 0.30],
    [0.20, 0.25, 0.30, 0.35, 0.40, 0.45],
    [0.36, 0.46, 0.56, 0.66, 0.76, 0.86],
    [0.17, 0.20, 0.24, 0.28, 0.32, 0.36],
    [0.24, 0.30, 0.36, 0.42, 0.48, 0.54],
    [0.44, 0.56, 0.68, 0.80, 0.92, 1.04],
];

/// Replace NaN and infinities with zero.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Multiplier that turns `W/K × K × days` into the demand unit.
///
/// The legacy figure is what existing contracts were computed with; the
/// per-million figure is the physical conversion. Which one the contracts
/// should use is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DemandScale {
    /// `24 ^ -6` evaluated as a bitwise XOR, i.e. `-30`
    #[default]
    LegacyXor,
    /// `24 × 10⁻⁶`
    PerMillion,
}

impl DemandScale {
    pub fn factor(&self) -> f64 {
        match self {
            DemandScale::LegacyXor => (24_i64 ^ -6_i64) as f64,
            DemandScale::PerMillion => 24.0e-6,
        }
    }
}

impl FromStr for DemandScale {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "legacy" | "legacy-xor" | "xor" => Ok(DemandScale::LegacyXor),
            "per-million" | "million" | "24e-6" => Ok(DemandScale::PerMillion),
            other => Err(format!("unknown demand scale '{other}'")),
        }
    }
}

impl fmt::Display for DemandScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemandScale::LegacyXor => write!(f, "legacy-xor"),
            DemandScale::PerMillion => write!(f, "per-million"),
        }
    }
}

/// Pipe insulation quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    Good = 1,
    Poor = 2,
    No = 3,
}

impl Quality {
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Diameter bucket of the heat-loss table: `<30, <50, <70, <90, <110, else`.
pub fn diameter_bucket(diameter: f64) -> usize {
    const LIMITS: [f64; 5] = [30.0, 50.0, 70.0, 90.0, 110.0];
    LIMITS
        .iter()
        .position(|limit| diameter < *limit)
        .unwrap_or(LIMITS.len())
}

/// Loss coefficient of a basement pipe.
pub fn heat_loss_basement(diameter: f64, quality: Quality) -> f64 {
    HEAT_LOSS_TABLE[quality.index() - 1][diameter_bucket(diameter)]
}

/// Loss coefficient of an attic pipe.
pub fn heat_loss_attic(diameter: f64, quality: Quality) -> f64 {
    HEAT_LOSS_TABLE[quality.index() + 2][diameter_bucket(diameter)]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipe {
    pub quality: Quality,
    /// Installed length in m
    pub installed_length: f64,
    /// Outer diameter in mm
    pub diameter: f64,
    /// Loss per metre, from the heat-loss table
    #[serde(default)]
    pub heat_loss_unit: f64,
    /// Yearly loss of the whole pipe
    #[serde(default)]
    pub heat_loss_year: f64,
}

impl Pipe {
    pub fn new(quality: Quality, installed_length: f64, diameter: f64) -> Self {
        Pipe {
            quality,
            installed_length,
            diameter,
            heat_loss_unit: 0.0,
            heat_loss_year: 0.0,
        }
    }

    fn apply(&mut self, coefficient: f64) {
        self.heat_loss_unit = sanitize(coefficient);
        self.heat_loss_year = sanitize(self.heat_loss_unit * self.installed_length);
    }
}

/// One value per base year.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Period {
    pub n: f64,
    pub n1: f64,
    pub n2: f64,
}

impl Period {
    pub fn new(n: f64, n1: f64, n2: f64) -> Self {
        Period { n, n1, n2 }
    }

    pub fn splat(value: f64) -> Self {
        Period::new(value, value, value)
    }

    fn from_fn(mut f: impl FnMut(usize) -> f64) -> Self {
        Period::new(sanitize(f(0)), sanitize(f(1)), sanitize(f(2)))
    }

    pub fn get(&self, year: usize) -> f64 {
        match year {
            0 => self.n,
            1 => self.n1,
            _ => self.n2,
        }
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Period::from_fn(|year| f(self.get(year)))
    }

    pub fn zip(&self, other: &Period, f: impl Fn(f64, f64) -> f64) -> Self {
        Period::from_fn(|year| f(self.get(year), other.get(year)))
    }
}

/// Envelope zone, e.g. `zone1_walls` or `zone2_windows`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Zone {
    /// Area in m²
    pub area: f64,
    /// Thermal transmittance in W/(m²·K)
    pub u_value: f64,
    #[serde(default)]
    pub temp_diff: Period,
    #[serde(default)]
    pub heat_loss_coeff: f64,
}

impl Zone {
    pub fn new(area: f64, u_value: f64) -> Self {
        Zone {
            area,
            u_value,
            ..Zone::default()
        }
    }
}

/// Tag of a persisted per-year row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    AirexWindows,
    AirexBuilding,
    AirexTotal,
    IndoorTemp,
    OutdoorTemp,
    HeatingDays,
    TotalEConsumptionCircLosses,
    CirculationLosses,
    TotalEnergyConsumption,
    DistributionLossesBasement,
    DistributionLossesAttic,
    TotalMeasured,
    TotalCalculated,
}

impl PeriodKind {
    pub const ALL: [PeriodKind; 13] = [
        PeriodKind::AirexWindows,
        PeriodKind::AirexBuilding,
        PeriodKind::AirexTotal,
        PeriodKind::IndoorTemp,
        PeriodKind::OutdoorTemp,
        PeriodKind::HeatingDays,
        PeriodKind::TotalEConsumptionCircLosses,
        PeriodKind::CirculationLosses,
        PeriodKind::TotalEnergyConsumption,
        PeriodKind::DistributionLossesBasement,
        PeriodKind::DistributionLossesAttic,
        PeriodKind::TotalMeasured,
        PeriodKind::TotalCalculated,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodRow {
    pub kind: PeriodKind,
    #[serde(flatten)]
    pub period: Period,
}

/// Per-year values, stored as [`PeriodRow`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Periods {
    pub airex_windows: Period,
    pub airex_building: Period,
    pub airex_total: Period,
    pub indoor_temp: Period,
    pub outdoor_temp: Period,
    pub heating_days: Period,
    pub total_e_consumption_circ_losses: Period,
    pub circulation_losses: Period,
    pub total_energy_consumption: Period,
    pub distribution_losses_basement: Period,
    pub distribution_losses_attic: Period,
    pub total_measured: Period,
    pub total_calculated: Period,
}

impl Periods {
    pub fn get(&self, kind: PeriodKind) -> &Period {
        match kind {
            PeriodKind::AirexWindows => &self.airex_windows,
            PeriodKind::AirexBuilding => &self.airex_building,
            PeriodKind::AirexTotal => &self.airex_total,
            PeriodKind::IndoorTemp => &self.indoor_temp,
            PeriodKind::OutdoorTemp => &self.outdoor_temp,
            PeriodKind::HeatingDays => &self.heating_days,
            PeriodKind::TotalEConsumptionCircLosses => &self.total_e_consumption_circ_losses,
            PeriodKind::CirculationLosses => &self.circulation_losses,
            PeriodKind::TotalEnergyConsumption => &self.total_energy_consumption,
            PeriodKind::DistributionLossesBasement => &self.distribution_losses_basement,
            PeriodKind::DistributionLossesAttic => &self.distribution_losses_attic,
            PeriodKind::TotalMeasured => &self.total_measured,
            PeriodKind::TotalCalculated => &self.total_calculated,
        }
    }

    pub fn get_mut(&mut self, kind: PeriodKind) -> &mut Period {
        match kind {
            PeriodKind::AirexWindows => &mut self.airex_windows,
            PeriodKind::AirexBuilding => &mut self.airex_building,
            PeriodKind::AirexTotal => &mut self.airex_total,
            PeriodKind::IndoorTemp => &mut self.indoor_temp,
            PeriodKind::OutdoorTemp => &mut self.outdoor_temp,
            PeriodKind::HeatingDays => &mut self.heating_days,
            PeriodKind::TotalEConsumptionCircLosses => &mut self.total_e_consumption_circ_losses,
            PeriodKind::CirculationLosses => &mut self.circulation_losses,
            PeriodKind::TotalEnergyConsumption => &mut self.total_energy_consumption,
            PeriodKind::DistributionLossesBasement => &mut self.distribution_losses_basement,
            PeriodKind::DistributionLossesAttic => &mut self.distribution_losses_attic,
            PeriodKind::TotalMeasured => &mut self.total_measured,
            PeriodKind::TotalCalculated => &mut self.total_calculated,
        }
    }
}

/// Indoor-climate record of one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndoorClima {
    pub project: Uuid,
    #[serde(default)]
    pub basement_pipes: Vec<Pipe>,
    #[serde(default)]
    pub attic_pipes: Vec<Pipe>,
    /// Heated volume in m³
    #[serde(default)]
    pub heated_volume: f64,
    #[serde(default)]
    pub zones: BTreeMap<String, Zone>,

    #[serde(default)]
    pub total_ht: f64,
    #[serde(default)]
    pub total_window_area: f64,
    #[serde(default)]
    pub heat_gains_internal: f64,
    #[serde(default)]
    pub heat_gains_solar: f64,

    /// Per-year values; persisted separately as period rows
    #[serde(skip)]
    pub periods: Periods,
}

/// Persisted form: the main record plus its period rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndoorClimaRecord {
    #[serde(flatten)]
    pub clima: IndoorClima,
    #[serde(default)]
    pub periods: Vec<PeriodRow>,
}

impl From<&IndoorClima> for IndoorClimaRecord {
    fn from(clima: &IndoorClima) -> Self {
        IndoorClimaRecord {
            clima: clima.clone(),
            periods: clima.expand(),
        }
    }
}

impl From<IndoorClimaRecord> for IndoorClima {
    fn from(record: IndoorClimaRecord) -> Self {
        let mut clima = record.clima;
        clima.fold(&record.periods);
        clima
    }
}

impl IndoorClima {
    pub fn new(project: Uuid) -> Self {
        IndoorClima {
            project,
            basement_pipes: Vec::new(),
            attic_pipes: Vec::new(),
            heated_volume: 0.0,
            zones: BTreeMap::new(),
            total_ht: 0.0,
            total_window_area: 0.0,
            heat_gains_internal: 0.0,
            heat_gains_solar: 0.0,
            periods: Periods::default(),
        }
    }

    /// Load period rows into the typed fields.
    pub fn fold(&mut self, rows: &[PeriodRow]) {
        for row in rows {
            *self.periods.get_mut(row.kind) = row.period;
        }
    }

    /// Typed fields as period rows, one per kind.
    pub fn expand(&self) -> Vec<PeriodRow> {
        PeriodKind::ALL
            .iter()
            .map(|kind| PeriodRow {
                kind: *kind,
                period: *self.periods.get(*kind),
            })
            .collect()
    }

    /// Derive every calculated field from the contract tables and the
    /// project figures.
    pub fn calculate(
        &mut self,
        contract: &Contract,
        project: &ProjectSnapshot,
        scale: DemandScale,
    ) -> EpcResult<()> {
        let heated_area = project.heated_area.to_f64().ok_or_else(|| {
            EpcError::invalid_input("heated_area", project.heated_area.to_string(), "out of range")
        })?;
        let floors = f64::from(project.floors);

        self.read_baseline(contract)?;

        self.heat_gains_internal = sanitize(INTERNAL_GAINS_PER_M2 * heated_area);

        for zone in self.zones.values_mut() {
            zone.heat_loss_coeff = sanitize(zone.u_value * zone.area);
        }
        self.total_ht = sanitize(self.zones.values().map(|zone| zone.heat_loss_coeff).sum());
        self.total_window_area = sanitize(
            self.zones
                .iter()
                .filter(|(key, _)| key.contains("window"))
                .map(|(_, zone)| zone.area)
                .sum(),
        );
        self.heat_gains_solar = sanitize(SOLAR_GAINS_PER_M2 * self.total_window_area);

        let periods = &mut self.periods;
        periods.airex_building = periods
            .airex_windows
            .map(|windows| (-0.0083 * floors - 0.175) * (windows / 100.0) + 0.0167 * floors + 0.55);
        let volume = self.heated_volume;
        periods.airex_total = periods
            .airex_building
            .map(|ach| AIR_HEAT_CAPACITY * ach * volume);

        let difference = periods
            .indoor_temp
            .zip(&periods.outdoor_temp, |indoor, outdoor| indoor - outdoor);
        for (key, zone) in self.zones.iter_mut() {
            zone.temp_diff = if key.contains("zone1") {
                difference
            } else {
                difference.map(|diff| diff - UNHEATED_ZONE_DROP)
            };
        }

        let basement: f64 = self
            .basement_pipes
            .iter_mut()
            .map(|pipe| {
                pipe.apply(heat_loss_basement(pipe.diameter, pipe.quality));
                pipe.heat_loss_year
            })
            .sum();
        let attic: f64 = self
            .attic_pipes
            .iter_mut()
            .map(|pipe| {
                pipe.apply(heat_loss_attic(pipe.diameter, pipe.quality));
                pipe.heat_loss_year
            })
            .sum();
        let periods = &mut self.periods;
        periods.distribution_losses_basement = Period::splat(sanitize(basement));
        periods.distribution_losses_attic = Period::splat(sanitize(attic));

        periods.total_measured = Period::from_fn(|year| {
            periods.total_e_consumption_circ_losses.get(year)
                - periods.circulation_losses.get(year)
                - periods.distribution_losses_basement.get(year)
                - periods.distribution_losses_attic.get(year)
        });

        let factor = scale.factor();
        let total_ht = self.total_ht;
        let gains = self.heat_gains_internal + self.heat_gains_solar;
        let periods = &mut self.periods;
        periods.total_calculated = Period::from_fn(|year| {
            ((total_ht + periods.airex_total.get(year)) * difference.get(year) - gains)
                * periods.heating_days.get(year)
                * factor
        });

        debug!(project = %self.project, total_ht = self.total_ht, %scale, "indoor climate calculated");
        Ok(())
    }

    fn read_baseline(&mut self, contract: &Contract) -> EpcResult<()> {
        let baseline_table = contract.table(catalog::BASELINE)?;
        let baseline_value = |row: usize, year: usize| -> f64 {
            let value = baseline_table.cell(row, baseline::FIRST_YEAR + year).decimal();
            to_f64(value)
        };

        let mut outdoor = [0.0; 3];
        let mut heating_days = [0.0; 3];
        let mut consumption = [0.0; 3];
        for year in 0..3 {
            let conditions = contract.table(BASECONDITIONS[year])?;
            let base = contract.table(BASEYEARS[year])?;
            outdoor[year] = to_f64(conditions.average(baseconditions::OUTDOOR)?);
            heating_days[year] = to_f64(base.column_sum(baseyear::HEATING_DAYS)?);
            consumption[year] = to_f64(base.total(baseyear::TOTAL_HEAT)?);
        }

        let periods = &mut self.periods;
        periods.indoor_temp = Period::from_fn(|year| baseline_value(baseline::T1, year));
        periods.outdoor_temp = Period::from_fn(|year| outdoor[year]);
        periods.heating_days = Period::from_fn(|year| heating_days[year]);
        periods.total_e_consumption_circ_losses =
            Period::from_fn(|year| baseline_value(baseline::QAPKCZ, year));
        periods.circulation_losses = Period::from_fn(|year| baseline_value(baseline::QCZ, year));
        periods.total_energy_consumption = Period::from_fn(|year| consumption[year]);
        Ok(())
    }
}

fn to_f64(value: Decimal) -> f64 {
    sanitize(value.to_f64().unwrap_or(0.0))
}
