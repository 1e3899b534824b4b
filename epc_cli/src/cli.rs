//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
    name = "epc",
    version,
    about = "Calculate energy-performance contracts and render contract documents",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Contract store root (overrides EPC_DATA_DIR)
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Template root (overrides EPC_TEMPLATES_DIR)
    #[arg(long, value_name = "DIR", global = true)]
    pub templates: Option<PathBuf>,

    /// Log level or filter (overrides EPC_LOG_LEVEL)
    #[arg(long, value_name = "FILTER", global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a project snapshot and an empty contract
    New(NewArgs),
    /// Merge fields, tables or the Markdown body from a JSON file
    Import(ImportArgs),
    /// Recalculate a stored contract and print the headline figures
    Calculate(ProjectArg),
    /// Recalculate the indoor-climate record of a project
    IndoorClima(IndoorClimaArgs),
    /// Render a contract to PDF (or LaTeX with --tex)
    Render(RenderArgs),
    /// Load and verify every template set
    CheckTemplates,
    /// Encode or decode list cursors
    Cursor {
        #[command(subcommand)]
        command: CursorCommand,
    },
}

#[derive(Args, Debug)]
pub struct NewArgs {
    /// Project country, e.g. Latvia
    #[arg(long)]
    pub country: String,

    /// Reuse an existing project id
    #[arg(long)]
    pub project: Option<Uuid>,

    /// Heated floor area in m²
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub heated_area: Decimal,

    /// Guaranteed savings as a fraction, e.g. 0.35
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub guaranteed_savings: Decimal,

    /// Floors above ground
    #[arg(long, default_value_t = 0)]
    pub floors: u32,
}

#[derive(Args, Debug)]
pub struct ProjectArg {
    /// Project id
    pub project: Uuid,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Project id
    pub project: Uuid,

    /// JSON object with any of `fields`, `agreement`, `maintenance`,
    /// `tables` and `markdown`
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct IndoorClimaArgs {
    /// Project id
    pub project: Uuid,

    /// Pipes, zones and heated volume to store before calculating
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Project id
    pub project: Uuid,

    /// Output file (default: contract-<project>.pdf or .tex)
    #[arg(long, short, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Use the adapted contract variant
    #[arg(long)]
    pub adapted: bool,

    /// Write the LaTeX source instead of running LaTeX
    #[arg(long)]
    pub tex: bool,
}

#[derive(Subcommand, Debug)]
pub enum CursorCommand {
    /// Print the cursor for an offset
    Encode { offset: u64 },
    /// Print the offset of a cursor, -1 when malformed
    Decode { cursor: String },
}
