//! # Template Sets
//!
//! The templates directory holds a `base/` directory shared by every
//! document, one directory per consortium country and `<country>_adp`
//! directories for the adapted contract variants:
//!
//! ```text
//! templates/
//!   base/        parsed once at startup
//!   latvia/      main.tex and friends
//!   latvia_adp/
//!   poland/
//!   ...
//!   images/      linked into every render
//! ```
//!
//! Templates use LaTeX-friendly delimiters: `((* block *))`,
//! `((( variable )))` and `((= comment =))`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use minijinja::syntax::SyntaxConfig;
use minijinja::Environment;

use crate::errors::{EpcError, EpcResult};
use crate::render::helpers;

/// Countries with their own template set and their document language.
pub const CONSORTIUM: [(&str, &str); 5] = [
    ("latvia", "lv"),
    ("poland", "pl"),
    ("romania", "ro"),
    ("austria", "au"),
    ("bulgaria", "bg"),
];

/// Consortium countries that also ship an adapted variant.
pub const ADAPTED: [&str; 2] = ["latvia", "austria"];

/// Set used for countries outside the consortium.
pub const FALLBACK: &str = "latvia";

pub const BASE_DIR: &str = "base";
pub const ROOT_TEMPLATE: &str = "main.tex";
const ADAPTED_SUFFIX: &str = "_adp";
const TEMPLATE_EXTENSION: &str = "tex";

/// Templates of one directory, held in memory.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    name: String,
    language: &'static str,
    sources: Vec<(String, String)>,
}

impl TemplateSet {
    /// Directory name, e.g. `austria_adp`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Country the set belongs to.
    pub fn country(&self) -> &str {
        self.name.strip_suffix(ADAPTED_SUFFIX).unwrap_or(&self.name)
    }

    pub fn is_adapted(&self) -> bool {
        self.name.ends_with(ADAPTED_SUFFIX)
    }

    pub fn language(&self) -> &'static str {
        self.language
    }

    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|(name, _)| name.as_str())
    }
}

/// Base environment plus every country set, immutable after loading.
#[derive(Debug)]
pub struct TemplateSets {
    base: Environment<'static>,
    sets: BTreeMap<String, TemplateSet>,
}

fn syntax() -> EpcResult<SyntaxConfig> {
    SyntaxConfig::builder()
        .block_delimiters("((*", "*))")
        .variable_delimiters("(((", ")))")
        .comment_delimiters("((=", "=))")
        .build()
        .map_err(|e| EpcError::template(e.to_string()))
}

/// Empty environment with the delimiters and helpers installed.
pub fn environment() -> EpcResult<Environment<'static>> {
    let mut env = Environment::new();
    env.set_syntax(syntax()?);
    env.set_keep_trailing_newline(true);
    helpers::register(&mut env);
    Ok(env)
}

/// `*.tex` files of `dir` as (file name, source), sorted by name.
fn read_sources(dir: &Path) -> EpcResult<Vec<(String, String)>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| EpcError::file_error("read templates", dir.display().to_string(), e.to_string()))?;

    let mut sources = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| EpcError::file_error("read templates", dir.display().to_string(), e.to_string()))?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(TEMPLATE_EXTENSION) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let source = fs::read_to_string(&path)
            .map_err(|e| EpcError::file_error("read template", path.display().to_string(), e.to_string()))?;
        sources.push((name.to_string(), source));
    }
    sources.sort();
    Ok(sources)
}

impl TemplateSets {
    /// Parse `base/` and read every country set under `root`.
    pub fn load(root: &Path) -> EpcResult<Self> {
        let mut base = environment()?;
        for (name, source) in read_sources(&root.join(BASE_DIR))? {
            base.add_template_owned(name.clone(), source)
                .map_err(|e| EpcError::template(format!("{BASE_DIR}/{name}: {e}")))?;
        }

        let mut sets = BTreeMap::new();
        for (name, language) in Self::set_names() {
            let sources = read_sources(&root.join(&name))?;
            sets.insert(
                name.clone(),
                TemplateSet {
                    name,
                    language,
                    sources,
                },
            );
        }

        tracing::debug!(root = %root.display(), sets = sets.len(), "template sets loaded");
        Ok(TemplateSets { base, sets })
    }

    /// Every directory that must exist: the consortium and adapted sets.
    pub fn set_names() -> Vec<(String, &'static str)> {
        let mut names: Vec<(String, &'static str)> = CONSORTIUM
            .iter()
            .map(|(country, lang)| (country.to_string(), *lang))
            .collect();
        for country in ADAPTED {
            let lang = language_of(country);
            names.push((format!("{country}{ADAPTED_SUFFIX}"), lang));
        }
        names
    }

    pub fn sets(&self) -> impl Iterator<Item = &TemplateSet> {
        self.sets.values()
    }

    /// Set for `country`, falling back to the common set. `adapted` picks
    /// the adapted variant where one exists.
    pub fn resolve(&self, country: &str, adapted: bool) -> EpcResult<&TemplateSet> {
        let name = set_name(country, adapted);
        self.sets
            .get(&name)
            .ok_or_else(|| EpcError::template(format!("no template set '{name}'")))
    }

    /// Clone of the base environment with `set` parsed into it.
    pub fn environment(&self, set: &TemplateSet) -> EpcResult<Environment<'static>> {
        let mut env = self.base.clone();
        for (name, source) in &set.sources {
            env.add_template_owned(name.clone(), source.clone())
                .map_err(|e| EpcError::template(format!("{}/{name}: {e}", set.name)))?;
        }
        Ok(env)
    }
}

/// Document language for a consortium country, the fallback's otherwise.
pub fn language_of(country: &str) -> &'static str {
    CONSORTIUM
        .iter()
        .find(|(name, _)| *name == country)
        .or_else(|| CONSORTIUM.iter().find(|(name, _)| *name == FALLBACK))
        .map(|(_, lang)| *lang)
        .unwrap_or(crate::l10n::DEFAULT_LANGUAGE)
}

/// Directory name for a (lowercase) country.
pub fn set_name(country: &str, adapted: bool) -> String {
    let country = if CONSORTIUM.iter().any(|(name, _)| *name == country) {
        country
    } else {
        FALLBACK
    };
    if adapted && ADAPTED.contains(&country) {
        format!("{country}{ADAPTED_SUFFIX}")
    } else {
        country.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    fn write(dir: &Path, name: &str, source: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), source).unwrap();
    }

    fn fixture() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        write(
            &root.path().join(BASE_DIR),
            "layout.tex",
            "((* block body *))base((* endblock *))\n",
        );
        for (name, _) in TemplateSets::set_names() {
            write(
                &root.path().join(&name),
                ROOT_TEMPLATE,
                &format!("((* extends \"layout.tex\" *))((* block body *)){name}:((( lang )))((= note =))((* endblock *))"),
            );
        }
        root
    }

    #[test]
    fn test_set_name_resolution() {
        assert_eq!(set_name("latvia", false), "latvia");
        assert_eq!(set_name("latvia", true), "latvia_adp");
        assert_eq!(set_name("poland", true), "poland");
        assert_eq!(set_name("estonia", false), "latvia");
        assert_eq!(set_name("estonia", true), "latvia_adp");
        assert_eq!(language_of("bulgaria"), "bg");
        assert_eq!(language_of("estonia"), "lv");
    }

    #[test]
    fn test_set_names() {
        let names: Vec<String> = TemplateSets::set_names().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names.len(), 7);
        assert!(names.contains(&"austria_adp".to_string()));
    }

    #[test]
    fn test_load_and_render() {
        let root = fixture();
        let sets = TemplateSets::load(root.path()).unwrap();
        let set = sets.resolve("austria", true).unwrap();
        assert_eq!(set.language(), "au");
        assert_eq!(set.country(), "austria");
        assert!(set.is_adapted());

        let env = sets.environment(set).unwrap();
        let out = env
            .get_template(ROOT_TEMPLATE)
            .unwrap()
            .render(context! { lang => "au" })
            .unwrap();
        assert_eq!(out, "austria_adp:au\n");
    }

    #[test]
    fn test_clone_leaves_base_untouched() {
        let root = fixture();
        let sets = TemplateSets::load(root.path()).unwrap();
        let set = sets.resolve("poland", false).unwrap();
        sets.environment(set).unwrap();
        assert!(sets.base.get_template(ROOT_TEMPLATE).is_err());
    }

    #[test]
    fn test_missing_set_directory_fails() {
        let root = fixture();
        fs::remove_dir_all(root.path().join("bulgaria")).unwrap();
        assert!(matches!(
            TemplateSets::load(root.path()),
            Err(EpcError::FileError { .. })
        ));
    }

    #[test]
    fn test_syntax_error_reports_template() {
        let root = fixture();
        write(&root.path().join("romania"), "broken.tex", "((* if *))");
        let sets = TemplateSets::load(root.path()).unwrap();
        let set = sets.resolve("romania", false).unwrap();
        let err = sets.environment(set).unwrap_err();
        assert!(err.to_string().starts_with("template: romania/broken.tex"));
    }
}
