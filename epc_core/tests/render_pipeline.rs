//! Renderer tests: the shipped template sets, and the three-stage pipeline
//! driven by stand-in pandoc and LaTeX scripts.

use std::path::{Path, PathBuf};

use epc_core::config::RendererConfig;
use epc_core::render::document::{MIME_PDF, MIME_TEX};
use epc_core::render::templates::{self, TemplateSets};
use epc_core::{Contract, EpcError, ProjectSnapshot, RenderOptions, Renderer};

fn shipped_templates() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../templates")
}

#[test]
fn test_shipped_templates_verify() {
    let renderer = Renderer::new(RendererConfig::new(shipped_templates())).unwrap();
    let names: Vec<&str> = renderer.templates().sets().map(|set| set.name()).collect();
    assert_eq!(names.len(), 7);
    for adapted in ["latvia_adp", "austria_adp"] {
        assert!(names.contains(&adapted), "missing {adapted}");
    }
}

#[test]
fn test_shipped_templates_resolve_by_country() {
    let sets = TemplateSets::load(&shipped_templates()).unwrap();
    assert_eq!(sets.resolve("poland", true).unwrap().name(), "poland");
    assert_eq!(sets.resolve("austria", true).unwrap().name(), "austria_adp");
    assert_eq!(sets.resolve("bulgaria", false).unwrap().language(), "bg");
    assert_eq!(sets.resolve("lithuania", false).unwrap().name(), "latvia");
}

#[cfg(unix)]
mod pipeline {
    use super::*;
    use std::fs;
    use std::io::Read;
    use std::os::unix::fs::PermissionsExt;
    use std::time::{Duration, Instant};

    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    const MAIN: &str = "\\documentclass{article}
\\begin{document}
((( read(fields.client_name) | escape_tex )))
((( markdown )))
\\end{document}
";

    /// Turns `# Title` lines into `\section{Title}` and passes the rest.
    const PANDOC: &str = "#!/bin/sh\nsed 's/^# \\(.*\\)/\\\\section{\\1}/'\n";

    const LATEX_OK: &str = "#!/bin/sh\ncat > source.tex\nprintf '%%PDF-1.4\\n' > out.pdf\n";

    const LATEX_FAIL: &str = "#!/bin/sh\ncat > /dev/null\necho '! Undefined control sequence.' > out.log\nexit 1\n";

    const LATEX_HANG: &str = "#!/bin/sh\ncat > /dev/null\nexec sleep 30\n";

    const PANDOC_FAIL: &str = "#!/bin/sh\ncat > /dev/null\necho 'pandoc: unknown reader' >&2\nexit 64\n";

    struct Fixture {
        root: TempDir,
        config: RendererConfig,
    }

    impl Fixture {
        fn new(pandoc: &str, latex: &str) -> Self {
            let root = tempfile::tempdir().unwrap();
            let templates_dir = root.path().join("templates");
            fs::create_dir_all(templates_dir.join(templates::BASE_DIR)).unwrap();
            for (name, _) in TemplateSets::set_names() {
                let dir = templates_dir.join(&name);
                fs::create_dir_all(&dir).unwrap();
                fs::write(dir.join(templates::ROOT_TEMPLATE), MAIN).unwrap();
            }
            fs::create_dir_all(templates_dir.join("images")).unwrap();

            let mut config = RendererConfig::new(&templates_dir);
            config.work_dir = root.path().join("work");
            config.pandoc = script(root.path(), "pandoc", pandoc);
            config.latex = script(root.path(), "latex", latex);
            config.latex_timeout = Duration::from_secs(20);
            Fixture { root, config }
        }

        fn renderer(&self) -> Renderer {
            Renderer::new(self.config.clone()).unwrap()
        }

        fn work_entries(&self) -> usize {
            fs::read_dir(&self.config.work_dir).map(|dir| dir.count()).unwrap_or(0)
        }
    }

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn contract() -> (Contract, ProjectSnapshot) {
        let project = ProjectSnapshot::new("Latvia");
        let mut contract = Contract::new(project.id);
        contract.set_field("client_name", "Smith & Sons");
        contract.markdown = b"# Scope\n\nReplace the windows.\n".to_vec();
        (contract, project)
    }

    #[tokio::test]
    async fn test_renders_pdf() {
        let fixture = Fixture::new(PANDOC, LATEX_OK);
        let (contract, project) = contract();

        let doc = fixture
            .renderer()
            .render(&contract, &project, RenderOptions::default(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(doc.mime(), MIME_PDF);
        assert_eq!(doc.path().file_name().unwrap(), "out.pdf");

        let source = fs::read_to_string(doc.path().with_file_name("source.tex")).unwrap();
        assert!(source.contains("Smith \\& Sons"));
        assert!(source.contains("\\section{Scope}"));
        assert!(doc.path().with_file_name("images").exists());

        let dest = fixture.root.path().join("contract.pdf");
        doc.persist(&dest).unwrap();
        assert!(fs::read(&dest).unwrap().starts_with(b"%PDF"));
        assert_eq!(fixture.work_entries(), 0);
    }

    #[tokio::test]
    async fn test_tex_dump_skips_latex() {
        let mut fixture = Fixture::new(PANDOC, LATEX_FAIL);
        fixture.config.tex_dump = true;
        let (contract, project) = contract();

        let mut doc = fixture
            .renderer()
            .render(&contract, &project, RenderOptions::default(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(doc.mime(), MIME_TEX);
        assert_eq!(doc.path().file_name().unwrap(), "out.tex");

        let mut text = String::new();
        doc.read_to_string(&mut text).unwrap();
        assert!(text.starts_with("\\documentclass{article}"));
        assert!(text.contains("\\section{Scope}"));
        assert!(text.contains("Replace the windows."));
        doc.close().unwrap();
        assert_eq!(fixture.work_entries(), 0);
    }

    #[tokio::test]
    async fn test_latex_failure_carries_log() {
        let fixture = Fixture::new(PANDOC, LATEX_FAIL);
        let (contract, project) = contract();

        let err = fixture
            .renderer()
            .render(&contract, &project, RenderOptions::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            EpcError::LatexFailure { reason } => assert!(reason.contains("Undefined control sequence")),
            other => panic!("expected latex failure, got {other:?}"),
        }
        assert_eq!(fixture.work_entries(), 0);
    }

    #[tokio::test]
    async fn test_pandoc_failure_carries_stderr() {
        let fixture = Fixture::new(PANDOC_FAIL, LATEX_OK);
        let (contract, project) = contract();

        let err = fixture
            .renderer()
            .render(&contract, &project, RenderOptions::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            EpcError::MarkdownFailure { reason } => assert!(reason.contains("unknown reader")),
            other => panic!("expected markdown failure, got {other:?}"),
        }
        assert_eq!(fixture.work_entries(), 0);
    }

    #[tokio::test]
    async fn test_missing_program() {
        let mut fixture = Fixture::new(PANDOC, LATEX_OK);
        fixture.config.pandoc = fixture.root.path().join("no-such-pandoc");
        let (contract, project) = contract();

        let err = fixture
            .renderer()
            .render(&contract, &project, RenderOptions::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EpcError::MarkdownFailure { .. }));
        assert_eq!(fixture.work_entries(), 0);
    }

    #[tokio::test]
    async fn test_cancel_stops_latex() {
        let fixture = Fixture::new(PANDOC, LATEX_HANG);
        let (contract, project) = contract();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let err = fixture
            .renderer()
            .render(&contract, &project, RenderOptions::default(), &cancel)
            .await
            .unwrap_err();
        assert_eq!(err, EpcError::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(fixture.work_entries(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let fixture = Fixture::new(PANDOC, LATEX_OK);
        let (contract, project) = contract();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = fixture
            .renderer()
            .render(&contract, &project, RenderOptions::default(), &cancel)
            .await
            .unwrap_err();
        assert_eq!(err, EpcError::Cancelled);
        assert_eq!(fixture.work_entries(), 0);
    }
}
