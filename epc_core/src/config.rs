//! # Configuration
//!
//! Runtime settings come from the environment (a `.env` file is read first
//! when present). Command-line flags override individual values.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `EPC_ENV` | `development` | `development`, `test` or `production` |
//! | `EPC_LOG_LEVEL` | `info` | tracing filter, `RUST_LOG` wins |
//! | `EPC_TEMPLATES_DIR` | `templates` | template sets and `base/` |
//! | `EPC_IMAGES_DIR` | `<templates>/images` | linked into each render |
//! | `EPC_WORK_DIR` | system temp dir | parent of render directories |
//! | `EPC_PANDOC` | `pandoc` | Markdown converter |
//! | `EPC_LATEX` | `xelatex` | LaTeX engine |
//! | `EPC_LATEX_TIMEOUT_SECS` | `120` | LaTeX run limit |
//! | `EPC_TEX_DUMP` | `false` | emit `out.tex` instead of a PDF |
//! | `EPC_DEMAND_SCALE` | `legacy-xor` | indoor-climate demand factor |
//! | `EPC_EUROBOR` | `0` | EUROBOR rate in percent |
//! | `EPC_VAT_<COUNTRY>` | - | VAT fraction for one country |
//! | `EPC_VAT_DEFAULT` | - | VAT fraction for other countries |
//! | `EPC_DATA_DIR` | `data` | contract store root |

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::indoor_clima::DemandScale;
use crate::rates::StaticRates;

const VAT_PREFIX: &str = "EPC_VAT_";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a decimal number, got '{value}'")]
    InvalidDecimal { key: String, value: String },

    #[error("{key} must be a whole number of seconds, got '{value}'")]
    InvalidTimeout { key: String, value: String },

    #[error("{key} must be true or false, got '{value}'")]
    InvalidFlag { key: String, value: String },

    #[error("EPC_DEMAND_SCALE: {0}")]
    InvalidDemandScale(String),
}

/// Top-level configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub renderer: RendererConfig,
    pub rates: RatesConfig,
    pub demand_scale: DemandScale,
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Paths and external programs used by the document renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    pub templates_dir: PathBuf,
    pub images_dir: PathBuf,
    pub work_dir: PathBuf,
    pub pandoc: PathBuf,
    pub latex: PathBuf,
    pub latex_timeout: Duration,
    /// Write `out.tex` instead of running LaTeX
    pub tex_dump: bool,
}

impl RendererConfig {
    /// Defaults rooted at `templates_dir`.
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        let templates_dir = templates_dir.into();
        RendererConfig {
            images_dir: templates_dir.join("images"),
            templates_dir,
            work_dir: env::temp_dir(),
            pandoc: PathBuf::from("pandoc"),
            latex: PathBuf::from("xelatex"),
            latex_timeout: Duration::from_secs(120),
            tex_dump: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatesConfig {
    pub eurobor: Decimal,
    /// VAT fraction keyed by lowercase country
    pub vat: HashMap<String, Decimal>,
    pub default_vat: Option<Decimal>,
}

impl RatesConfig {
    pub fn provider(&self) -> StaticRates {
        let mut rates = StaticRates::new(self.eurobor);
        for (country, vat) in &self.vat {
            rates = rates.with_vat(country, *vat);
        }
        if let Some(vat) = self.default_vat {
            rates = rates.with_default_vat(vat);
        }
        rates
    }
}

impl AppConfig {
    /// Read `.env` (if any) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(env::vars())
    }

    /// Build from explicit key/value pairs.
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = vars.into_iter().collect();
        let get = |key: &str| vars.get(key).map(|value| value.trim().to_string());

        let environment = AppEnvironment::parse(&get("EPC_ENV").unwrap_or_default());
        let log_level = get("EPC_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let mut renderer =
            RendererConfig::new(get("EPC_TEMPLATES_DIR").unwrap_or_else(|| "templates".to_string()));
        if let Some(images) = get("EPC_IMAGES_DIR") {
            renderer.images_dir = images.into();
        }
        if let Some(work) = get("EPC_WORK_DIR") {
            renderer.work_dir = work.into();
        }
        if let Some(pandoc) = get("EPC_PANDOC") {
            renderer.pandoc = pandoc.into();
        }
        if let Some(latex) = get("EPC_LATEX") {
            renderer.latex = latex.into();
        }
        if let Some(timeout) = get("EPC_LATEX_TIMEOUT_SECS") {
            let seconds = timeout.parse::<u64>().map_err(|_| ConfigError::InvalidTimeout {
                key: "EPC_LATEX_TIMEOUT_SECS".to_string(),
                value: timeout.clone(),
            })?;
            renderer.latex_timeout = Duration::from_secs(seconds);
        }
        if let Some(flag) = get("EPC_TEX_DUMP") {
            renderer.tex_dump = parse_flag("EPC_TEX_DUMP", &flag)?;
        }

        let demand_scale = match get("EPC_DEMAND_SCALE") {
            Some(value) => DemandScale::from_str(&value).map_err(ConfigError::InvalidDemandScale)?,
            None => DemandScale::default(),
        };

        let mut rates = RatesConfig::default();
        if let Some(eurobor) = get("EPC_EUROBOR") {
            rates.eurobor = parse_decimal("EPC_EUROBOR", &eurobor)?;
        }
        for (key, value) in &vars {
            let Some(country) = key.strip_prefix(VAT_PREFIX) else {
                continue;
            };
            let vat = parse_decimal(key, value.trim())?;
            if country == "DEFAULT" {
                rates.default_vat = Some(vat);
            } else {
                rates.vat.insert(country.to_lowercase(), vat);
            }
        }

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            renderer,
            rates,
            demand_scale,
            data_dir: get("EPC_DATA_DIR").unwrap_or_else(|| "data".to_string()).into(),
        })
    }
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    Decimal::from_str(value).map_err(|_| ConfigError::InvalidDecimal {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
