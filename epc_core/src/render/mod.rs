//! # Document Renderer
//!
//! Turns a contract into a PDF (or, in TeX-dump mode, the LaTeX source)
//! localized for the project's country.
//!
//! [`Renderer::new`] loads every template set and renders each `main.tex`
//! once against a blank contract; a set that fails is a startup error. After
//! that the renderer is immutable and can be shared behind an `Arc`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use epc_core::config::RendererConfig;
//! use epc_core::contract::Contract;
//! use epc_core::project::ProjectSnapshot;
//! use epc_core::render::{RenderOptions, Renderer};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> epc_core::errors::EpcResult<()> {
//! let renderer = Renderer::new(RendererConfig::new("templates"))?;
//! let project = ProjectSnapshot::new("Latvia");
//! let contract = Contract::new(project.id);
//!
//! let doc = renderer
//!     .render(&contract, &project, RenderOptions::default(), &CancellationToken::new())
//!     .await?;
//! doc.persist(std::path::Path::new("contract.pdf"))?;
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod helpers;
pub mod pipeline;
pub mod templates;

use std::collections::BTreeMap;

use chrono::Local;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::RendererConfig;
use crate::contract::Contract;
use crate::errors::{EpcError, EpcResult};
use crate::project::ProjectSnapshot;
use crate::table::Table;

pub use document::Document;
pub use templates::{TemplateSet, TemplateSets};

/// Values a template sees. `markdown` is filled in by the pipeline with the
/// converted contract body.
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext {
    pub lang: String,
    pub country: String,
    pub template_set: String,
    pub adapted: bool,
    pub project: ProjectSnapshot,
    pub fields: BTreeMap<String, String>,
    pub agreement: BTreeMap<String, String>,
    pub maintenance: BTreeMap<String, String>,
    pub tables: BTreeMap<String, Table>,
    pub vat: Decimal,
    pub eurobor: Decimal,
    /// Render date, `YYYY-MM-DD`
    pub today: String,
    pub markdown: String,
}

impl RenderContext {
    pub fn new(contract: &Contract, project: &ProjectSnapshot, set: &TemplateSet) -> Self {
        RenderContext {
            lang: set.language().to_string(),
            country: project.country_key(),
            template_set: set.name().to_string(),
            adapted: set.is_adapted(),
            project: project.clone(),
            fields: contract.fields.clone(),
            agreement: contract.agreement.clone(),
            maintenance: contract.maintenance.clone(),
            tables: contract.tables.clone(),
            vat: contract.vat,
            eurobor: contract.eurobor,
            today: Local::now().date_naive().format("%Y-%m-%d").to_string(),
            markdown: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Use the adapted contract variant where the country has one
    pub adapted: bool,
}

/// Template sets plus the programs that turn them into documents.
#[derive(Debug)]
pub struct Renderer {
    config: RendererConfig,
    templates: TemplateSets,
}

impl Renderer {
    /// Load and verify every template set.
    pub fn new(config: RendererConfig) -> EpcResult<Self> {
        let templates = TemplateSets::load(&config.templates_dir)?;
        let renderer = Renderer { config, templates };
        renderer.verify()?;
        tracing::info!(
            templates = %renderer.config.templates_dir.display(),
            sets = renderer.templates.sets().count(),
            "renderer ready"
        );
        Ok(renderer)
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn templates(&self) -> &TemplateSets {
        &self.templates
    }

    /// Render the root template of every set against a blank contract.
    pub fn verify(&self) -> EpcResult<()> {
        for set in self.templates.sets() {
            let project = ProjectSnapshot::new(set.country()).with_id(Uuid::nil());
            let contract = Contract::new(project.id);
            let context = RenderContext::new(&contract, &project, set);
            let env = self.templates.environment(set)?;
            env.get_template(templates::ROOT_TEMPLATE)
                .and_then(|template| template.render(&context))
                .map_err(|e| EpcError::template(format!("{}: {e}", set.name())))?;
            tracing::debug!(set = set.name(), "template set verified");
        }
        Ok(())
    }

    /// Render `contract` for `project`.
    ///
    /// Returns [`EpcError::Cancelled`] when `cancel` fires first; in that
    /// case and on any failure no working directory is left behind.
    pub async fn render(
        &self,
        contract: &Contract,
        project: &ProjectSnapshot,
        options: RenderOptions,
        cancel: &CancellationToken,
    ) -> EpcResult<Document> {
        let set = self.templates.resolve(&project.country_key(), options.adapted)?;
        let env = self.templates.environment(set)?;
        let context = RenderContext::new(contract, project, set);
        tracing::info!(
            project = %project.id,
            set = set.name(),
            tex_dump = self.config.tex_dump,
            "render started"
        );
        let job = pipeline::Job {
            env,
            context,
            markdown: contract.markdown.clone(),
        };
        pipeline::run(&self.config, job, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write(dir: &Path, name: &str, source: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), source).unwrap();
    }

    fn template_root(main: &str) -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        write(&root.path().join(templates::BASE_DIR), "macros.tex", "((* macro hello() *))hi((* endmacro *))");
        for (name, _) in TemplateSets::set_names() {
            write(&root.path().join(name), templates::ROOT_TEMPLATE, main);
        }
        root
    }

    #[test]
    fn test_context_carries_contract() {
        let project = ProjectSnapshot::new("Estonia");
        let mut contract = Contract::new(project.id);
        contract.set_field("client", "ACME");
        contract.vat = Decimal::new(2, 1);

        let root = template_root("x");
        let renderer = Renderer::new(RendererConfig::new(root.path())).unwrap();
        let set = renderer.templates().resolve(&project.country_key(), false).unwrap();
        let context = RenderContext::new(&contract, &project, set);

        assert_eq!(context.lang, "lv");
        assert_eq!(context.template_set, "latvia");
        assert_eq!(context.country, "estonia");
        assert_eq!(context.fields["client"], "ACME");
        assert_eq!(context.tables.len(), 26);
        assert!(context.markdown.is_empty());
    }

    #[test]
    fn test_verify_renders_every_set() {
        let root = template_root("((* import \"macros.tex\" as m *))((( m.hello() ))) ((( lang ))) ((( tables.baseline.rows | length )))");
        assert!(Renderer::new(RendererConfig::new(root.path())).is_ok());
    }

    #[test]
    fn test_verify_fails_on_runtime_error() {
        let root = template_root("((( no_such_helper() )))");
        let err = Renderer::new(RendererConfig::new(root.path())).unwrap_err();
        assert!(matches!(err, EpcError::TemplateFailure { .. }));
    }
}
