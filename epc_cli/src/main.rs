//! # EPC command-line front end
//!
//! Thin wiring around `epc_core`: configuration from the environment,
//! project snapshots kept as JSON next to the contract store, and one
//! subcommand per core operation.

mod cli;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use epc_core::config::{AppConfig, ConfigError};
use epc_core::contract::Contract;
use epc_core::cursor::{decode_cursor, encode_cursor};
use epc_core::entity::EntityKind;
use epc_core::errors::{EpcError, EpcResult};
use epc_core::file_io::{ContractStore, FileContractStore};
use epc_core::indoor_clima::{IndoorClima, IndoorClimaRecord};
use epc_core::project::ProjectSnapshot;
use epc_core::render::{RenderOptions, Renderer};
use epc_core::table::Table;
use epc_core::telemetry::{self, TelemetryError};

use cli::{Cli, Command, CursorCommand, ImportArgs, IndoorClimaArgs, NewArgs, RenderArgs};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error(transparent)]
    Core(#[from] EpcError),

    #[error("{program} not found: {source}")]
    ProgramNotFound {
        program: String,
        #[source]
        source: which::Error,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("epc: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = cli.templates {
        config.renderer.images_dir = dir.join("images");
        config.renderer.templates_dir = dir;
    }
    if let Some(level) = cli.log_level {
        config.telemetry.log_level = level;
    }
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::New(args) => new_contract(&config, args),
        Command::Import(args) => import(&config, args),
        Command::Calculate(args) => calculate(&config, args.project),
        Command::IndoorClima(args) => indoor_clima(&config, args),
        Command::Render(args) => render(&config, args).await,
        Command::CheckTemplates => check_templates(&config),
        Command::Cursor { command } => {
            match command {
                CursorCommand::Encode { offset } => println!("{}", encode_cursor(offset)),
                CursorCommand::Decode { cursor } => println!("{}", decode_cursor(&cursor)),
            }
            Ok(())
        }
    }
}

fn store(config: &AppConfig) -> FileContractStore {
    let user = std::env::var("USER").unwrap_or_else(|_| "epc".to_string());
    FileContractStore::new(&config.data_dir, Arc::new(config.rates.provider()), user)
}

fn project_path(config: &AppConfig, id: Uuid) -> PathBuf {
    config
        .data_dir
        .join(EntityKind::Project.as_str())
        .join(format!("{id}.json"))
}

fn load_project(config: &AppConfig, id: Uuid) -> EpcResult<ProjectSnapshot> {
    let path = project_path(config, id);
    let text = fs::read_to_string(&path)
        .map_err(|e| EpcError::file_error("open", path.display().to_string(), e.to_string()))?;
    Ok(serde_json::from_str(&text)?)
}

fn save_project(config: &AppConfig, project: &ProjectSnapshot) -> EpcResult<()> {
    let path = project_path(config, project.id);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| EpcError::file_error("create dir", parent.display().to_string(), e.to_string()))?;
    }
    fs::write(&path, serde_json::to_string_pretty(project)?)
        .map_err(|e| EpcError::file_error("write", path.display().to_string(), e.to_string()))
}

fn print_json<T: serde::Serialize>(value: &T) -> EpcResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn new_contract(config: &AppConfig, args: NewArgs) -> Result<(), CliError> {
    let mut project = ProjectSnapshot::new(args.country)
        .with_heated_area(args.heated_area)
        .with_guaranteed_savings(args.guaranteed_savings)
        .with_floors(args.floors);
    if let Some(id) = args.project {
        project = project.with_id(id);
    }
    save_project(config, &project)?;

    let mut contract = Contract::new(project.id);
    store(config).save(&mut contract, &project)?;
    info!(project = %project.id, country = %project.country, "contract created");
    println!("{}", project.id);
    Ok(())
}

/// Partial contract read by `import`.
#[derive(Debug, Default, Deserialize)]
struct ContractPatch {
    #[serde(default)]
    fields: BTreeMap<String, String>,
    #[serde(default)]
    agreement: BTreeMap<String, String>,
    #[serde(default)]
    maintenance: BTreeMap<String, String>,
    #[serde(default)]
    tables: BTreeMap<String, Table>,
    markdown: Option<String>,
}

impl ContractPatch {
    /// Merge into `contract`. Only catalog tables can be replaced.
    fn apply(self, contract: &mut Contract) -> EpcResult<()> {
        for (name, table) in self.tables {
            *contract.table_mut(&name)? = table;
        }
        contract.fields.extend(self.fields);
        contract.agreement.extend(self.agreement);
        contract.maintenance.extend(self.maintenance);
        if let Some(markdown) = self.markdown {
            contract.markdown = markdown.into_bytes();
        }
        Ok(())
    }
}

fn import(config: &AppConfig, args: ImportArgs) -> Result<(), CliError> {
    let project = load_project(config, args.project)?;
    let store = store(config);
    let mut contract = store.load(&project)?;

    let text = fs::read_to_string(&args.file)
        .map_err(|e| EpcError::file_error("open", args.file.display().to_string(), e.to_string()))?;
    let patch: ContractPatch = serde_json::from_str(&text).map_err(EpcError::from)?;
    patch.apply(&mut contract)?;

    let calculation = store.save(&mut contract, &project)?;
    print_json(&calculation)?;
    Ok(())
}

fn calculate(config: &AppConfig, id: Uuid) -> Result<(), CliError> {
    let project = load_project(config, id)?;
    let store = store(config);
    let mut contract = store.load(&project)?;
    let calculation = store.save(&mut contract, &project)?;
    print_json(&calculation)?;
    Ok(())
}

fn indoor_clima(config: &AppConfig, args: IndoorClimaArgs) -> Result<(), CliError> {
    let project = load_project(config, args.project)?;
    let store = store(config);
    let contract = store.load(&project)?;

    let mut clima = match &args.input {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| EpcError::file_error("open", path.display().to_string(), e.to_string()))?;
            let mut value: serde_json::Value = serde_json::from_str(&text).map_err(EpcError::from)?;
            if let Some(object) = value.as_object_mut() {
                object.insert("project".to_string(), serde_json::json!(project.id));
            }
            let record: IndoorClimaRecord = serde_json::from_value(value).map_err(EpcError::from)?;
            IndoorClima::from(record)
        }
        None => match store.load_indoor_clima(project.id) {
            Ok(clima) => clima,
            Err(EpcError::FileError { .. }) => IndoorClima::new(project.id),
            Err(e) => return Err(e.into()),
        },
    };

    clima.calculate(&contract, &project, config.demand_scale)?;
    store.save_indoor_clima(&clima)?;
    print_json(&IndoorClimaRecord::from(&clima))?;
    Ok(())
}

fn resolve_program(program: &Path) -> Result<PathBuf, CliError> {
    which::which(program).map_err(|source| CliError::ProgramNotFound {
        program: program.display().to_string(),
        source,
    })
}

async fn render(config: &AppConfig, args: RenderArgs) -> Result<(), CliError> {
    let mut renderer_config = config.renderer.clone();
    renderer_config.tex_dump |= args.tex;
    renderer_config.pandoc = resolve_program(&renderer_config.pandoc)?;
    if !renderer_config.tex_dump {
        renderer_config.latex = resolve_program(&renderer_config.latex)?;
    }
    let tex_dump = renderer_config.tex_dump;
    let renderer = Renderer::new(renderer_config)?;

    let project = load_project(config, args.project)?;
    let contract = store(config).load(&project)?;

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, cancelling render");
                cancel.cancel();
            }
        })
    };
    let options = RenderOptions {
        adapted: args.adapted,
    };
    let result = renderer.render(&contract, &project, options, &cancel).await;
    interrupt.abort();

    let document = result?;
    let out = args.out.unwrap_or_else(|| {
        let extension = if tex_dump { "tex" } else { "pdf" };
        PathBuf::from(format!("contract-{}.{extension}", project.id))
    });
    let bytes = document.persist(&out)?;
    println!("{} ({bytes} bytes)", out.display());
    Ok(())
}

fn check_templates(config: &AppConfig) -> Result<(), CliError> {
    let renderer = Renderer::new(config.renderer.clone())?;
    for set in renderer.templates().sets() {
        let names: Vec<&str> = set.template_names().collect();
        println!("{:<12} {}  {}", set.name(), set.language(), names.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use epc_core::catalog;
    use epc_core::cell::Kind;
    use epc_core::table::{Column, Row};

    #[test]
    fn test_patch_replaces_catalog_table() {
        let mut contract = Contract::new(Uuid::new_v4());
        let table = Table::from_rows(
            vec![Column::new("Name", Kind::Name), Column::new("Cost", Kind::Money)],
            vec![Row::from_strs(&["Roof", "100"])],
        )
        .unwrap();
        let mut patch = ContractPatch::default();
        patch.tables.insert(catalog::MAINTENANCE_LOG.to_string(), table);
        patch.fields.insert("client".to_string(), "ACME".to_string());
        patch.markdown = Some("# Body".to_string());

        patch.apply(&mut contract).unwrap();
        let stored = contract.table(catalog::MAINTENANCE_LOG).unwrap();
        assert_eq!(stored.row_count(), 1);
        assert_eq!(stored.cell(0, 0).to_string(), "Roof");
        assert_eq!(contract.field("client"), "ACME");
        assert_eq!(contract.markdown_text(), "# Body");
    }

    #[test]
    fn test_patch_rejects_unknown_table() {
        let mut contract = Contract::new(Uuid::new_v4());
        let mut patch = ContractPatch::default();
        patch.tables.insert("no_such_table".to_string(), Table::default());
        assert!(matches!(
            patch.apply(&mut contract),
            Err(EpcError::DependencyMissing { .. })
        ));
    }
}
