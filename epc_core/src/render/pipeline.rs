//! # Render Pipeline
//!
//! Three concurrent stages joined by in-memory byte pipes:
//!
//! 1. Markdown body -> converter (`--read=markdown --write=latex`) -> pipe 1
//! 2. pipe 1 -> `markdown` context field -> `main.tex` -> pipe 2
//! 3. pipe 2 -> LaTeX engine (`out.pdf`) or a verbatim copy (`out.tex`)
//!
//! Every writer shuts its pipe down when done. Stages report into a bounded
//! channel and the caller takes exactly one message: the first error, or the
//! output path from the last stage. A stage whose upstream failed never
//! reports success. On error or cancellation the remaining stages are
//! cancelled and awaited before the working directory is removed.

use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use minijinja::Environment;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tokio_util::io::SyncIoBridge;
use tokio_util::sync::CancellationToken;

use crate::config::RendererConfig;
use crate::errors::{EpcError, EpcResult};
use crate::render::document::{self, Document, MIME_PDF, MIME_TEX};
use crate::render::templates::ROOT_TEMPLATE;
use crate::render::RenderContext;

/// Stages that may fail; the result channel holds one message less.
const STAGES: usize = 3;
const PIPE_CAPACITY: usize = 64 * 1024;
const LOG_TAIL_LINES: usize = 20;
const WORKDIR_PREFIX: &str = "epc-render-";
const IMAGES_LINK: &str = "images";

#[derive(Debug, Clone, Copy)]
enum Stage {
    Markdown,
    Template,
    Output,
}

impl Stage {
    fn as_str(&self) -> &'static str {
        match self {
            Stage::Markdown => "markdown",
            Stage::Template => "template",
            Stage::Output => "output",
        }
    }
}

/// Everything one render needs besides the configuration.
pub(crate) struct Job {
    pub env: Environment<'static>,
    pub context: RenderContext,
    pub markdown: Vec<u8>,
}

pub(crate) async fn run(
    config: &RendererConfig,
    job: Job,
    cancel: &CancellationToken,
) -> EpcResult<Document> {
    if cancel.is_cancelled() {
        return Err(EpcError::Cancelled);
    }
    let started = Instant::now();
    let workdir = create_workdir(config)?;
    let root = workdir.path().to_path_buf();

    let (md_writer, md_reader) = tokio::io::duplex(PIPE_CAPACITY);
    let (tex_writer, tex_reader) = tokio::io::duplex(PIPE_CAPACITY);
    let (results_tx, mut results) = mpsc::channel(STAGES - 1);
    let (md_ok_tx, md_ok_rx) = oneshot::channel();
    let (tex_ok_tx, tex_ok_rx) = oneshot::channel();
    let token = cancel.child_token();

    let pandoc = config.pandoc.clone();
    let handles = [
        tokio::spawn(supervise(
            Stage::Markdown,
            token.clone(),
            None,
            Some(md_ok_tx),
            results_tx.clone(),
            async move { markdown_stage(&pandoc, job.markdown, md_writer).await.map(|()| None) },
        )),
        tokio::spawn(supervise(
            Stage::Template,
            token.clone(),
            Some(md_ok_rx),
            Some(tex_ok_tx),
            results_tx.clone(),
            template_stage(job.env, job.context, md_reader, tex_writer, token.clone()),
        )),
        tokio::spawn(supervise(
            Stage::Output,
            token.clone(),
            Some(tex_ok_rx),
            None,
            results_tx,
            output_stage(config.clone(), root.clone(), tex_reader),
        )),
    ];

    let first = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(EpcError::Cancelled),
        message = results.recv() => message.unwrap_or_else(|| {
            Err(EpcError::internal("render pipeline stopped without a result"))
        }),
    };
    let first = match first {
        Err(_) if cancel.is_cancelled() => Err(EpcError::Cancelled),
        other => other,
    };

    if first.is_err() {
        token.cancel();
    }
    // Late reports are discarded.
    drop(results);
    for handle in handles {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "render stage panicked");
        }
    }

    let elapsed_ms = started.elapsed().as_millis() as u64;
    match first {
        Ok(path) => {
            let mime = if config.tex_dump { MIME_TEX } else { MIME_PDF };
            let doc = Document::open(workdir, path, mime)?;
            tracing::info!(elapsed_ms, path = %doc.path().display(), "render finished");
            Ok(doc)
        }
        Err(err) => {
            document::discard(workdir);
            tracing::warn!(elapsed_ms, error = %err, "render failed");
            Err(err)
        }
    }
}

/// Run one stage, report its outcome and tell the next stage whether
/// everything up to here succeeded.
async fn supervise<F>(
    stage: Stage,
    token: CancellationToken,
    upstream: Option<oneshot::Receiver<bool>>,
    downstream: Option<oneshot::Sender<bool>>,
    results: mpsc::Sender<EpcResult<PathBuf>>,
    work: F,
) where
    F: Future<Output = EpcResult<Option<PathBuf>>>,
{
    let started = Instant::now();
    let outcome = tokio::select! {
        biased;
        _ = token.cancelled() => Err(EpcError::Cancelled),
        outcome = work => outcome,
    };

    let output = match outcome {
        Ok(output) => output,
        Err(err) => {
            if !matches!(err, EpcError::Cancelled) {
                tracing::warn!(stage = stage.as_str(), error = %err, "render stage failed");
            }
            let _ = results.send(Err(err)).await;
            signal(downstream, false);
            return;
        }
    };

    let upstream_ok = match upstream {
        Some(rx) => rx.await.unwrap_or(false),
        None => true,
    };
    signal(downstream, upstream_ok);
    if !upstream_ok {
        return;
    }

    tracing::debug!(
        stage = stage.as_str(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "render stage finished"
    );
    if let Some(path) = output {
        let _ = results.send(Ok(path)).await;
    }
}

fn signal(downstream: Option<oneshot::Sender<bool>>, ok: bool) {
    if let Some(tx) = downstream {
        let _ = tx.send(ok);
    }
}

fn create_workdir(config: &RendererConfig) -> EpcResult<TempDir> {
    let work_root = config.work_dir.display().to_string();
    std::fs::create_dir_all(&config.work_dir)
        .map_err(|e| EpcError::file_error("create", &work_root, e.to_string()))?;
    let dir = tempfile::Builder::new()
        .prefix(WORKDIR_PREFIX)
        .tempdir_in(&config.work_dir)
        .map_err(|e| EpcError::file_error("create", &work_root, e.to_string()))?;

    let images = absolute(&config.images_dir)
        .map_err(|e| EpcError::file_error("resolve", config.images_dir.display().to_string(), e.to_string()))?;
    let link = dir.path().join(IMAGES_LINK);
    symlink_dir(&images, &link)
        .map_err(|e| EpcError::file_error("symlink", link.display().to_string(), e.to_string()))?;
    Ok(dir)
}

fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

/// Stage 1: feed the body to the converter and forward its output.
async fn markdown_stage(pandoc: &Path, markdown: Vec<u8>, mut out: DuplexStream) -> EpcResult<()> {
    let mut child = Command::new(pandoc)
        .args(["--read=markdown", "--write=latex"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| EpcError::markdown(format!("failed to start {}: {e}", pandoc.display())))?;

    let (Some(mut stdin), Some(mut stdout), Some(mut stderr)) =
        (child.stdin.take(), child.stdout.take(), child.stderr.take())
    else {
        return Err(EpcError::markdown("child stdio was not captured"));
    };

    let feed = async move {
        let written = stdin.write_all(&markdown).await;
        drop(stdin);
        written
    };
    let forward = async {
        tokio::io::copy(&mut stdout, &mut out).await?;
        out.shutdown().await
    };
    let diagnostics = async {
        let mut raw = Vec::new();
        let _ = stderr.read_to_end(&mut raw).await;
        String::from_utf8_lossy(&raw).trim().to_string()
    };
    let (fed, forwarded, diagnostics) = tokio::join!(feed, forward, diagnostics);

    let status = child
        .wait()
        .await
        .map_err(|e| EpcError::markdown(format!("wait: {e}")))?;
    if !status.success() {
        return Err(EpcError::markdown(format!("{status}: {diagnostics}")));
    }
    fed.map_err(|e| EpcError::markdown(format!("write input: {e}")))?;
    forwarded.map_err(|e| EpcError::markdown(format!("forward output: {e}")))?;
    Ok(())
}

/// `io::Write` that fails once the render is cancelled, so template
/// execution stops at its next write.
struct Interruptible<W> {
    inner: W,
    token: CancellationToken,
}

impl<W: Write> Write for Interruptible<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.token.is_cancelled() {
            return Err(io::Error::other("render cancelled"));
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Stage 2: execute the root template with the converted body.
async fn template_stage(
    env: Environment<'static>,
    mut context: RenderContext,
    mut input: DuplexStream,
    out: DuplexStream,
    token: CancellationToken,
) -> EpcResult<Option<PathBuf>> {
    let mut raw = Vec::new();
    input
        .read_to_end(&mut raw)
        .await
        .map_err(|e| EpcError::template(format!("read converted markdown: {e}")))?;
    context.markdown = String::from_utf8_lossy(&raw).into_owned();

    let mut writer = Interruptible {
        inner: SyncIoBridge::new(out),
        token: token.clone(),
    };
    let rendered = tokio::task::spawn_blocking(move || {
        let template = env
            .get_template(ROOT_TEMPLATE)
            .map_err(|e| EpcError::template(e.to_string()))?;
        template
            .render_to_write(&context, &mut writer)
            .map_err(|e| EpcError::template(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| EpcError::template(format!("flush: {e}")))?;
        Ok::<_, EpcError>(writer.inner.into_inner())
    })
    .await
    .map_err(|e| EpcError::internal(format!("template task: {e}")));

    if token.is_cancelled() {
        return Err(EpcError::Cancelled);
    }
    let mut out = rendered??;
    out.shutdown()
        .await
        .map_err(|e| EpcError::template(format!("close output: {e}")))?;
    Ok(None)
}

/// Stage 3: produce the output file in `workdir`.
async fn output_stage(
    config: RendererConfig,
    workdir: PathBuf,
    input: DuplexStream,
) -> EpcResult<Option<PathBuf>> {
    let path = if config.tex_dump {
        dump_tex(&workdir, input).await?
    } else {
        compile(&config.latex, config.latex_timeout, &workdir, input).await?
    };
    Ok(Some(path))
}

async fn dump_tex(workdir: &Path, mut input: DuplexStream) -> EpcResult<PathBuf> {
    let path = workdir.join("out.tex");
    let shown = path.display().to_string();
    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(|e| EpcError::file_error("create", &shown, e.to_string()))?;
    tokio::io::copy(&mut input, &mut file)
        .await
        .map_err(|e| EpcError::file_error("write", &shown, e.to_string()))?;
    file.flush()
        .await
        .map_err(|e| EpcError::file_error("write", &shown, e.to_string()))?;
    Ok(path)
}

async fn compile(
    latex: &Path,
    timeout: Duration,
    workdir: &Path,
    mut input: DuplexStream,
) -> EpcResult<PathBuf> {
    let mut child = Command::new(latex)
        .args(["-halt-on-error", "-jobname=out"])
        .current_dir(workdir)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| EpcError::latex(format!("failed to start {}: {e}", latex.display())))?;
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| EpcError::latex("child stdin was not captured"))?;

    let feed = async move {
        let copied = tokio::io::copy(&mut input, &mut stdin).await;
        drop(stdin);
        copied
    };
    let finished = tokio::time::timeout(timeout, async { tokio::join!(feed, child.wait()) }).await;
    let (fed, status) = match finished {
        Ok(done) => done,
        Err(_) => {
            let _ = child.kill().await;
            return Err(EpcError::latex(format!("timed out after {}s", timeout.as_secs())));
        }
    };

    let status = status.map_err(|e| EpcError::latex(format!("wait: {e}")))?;
    if !status.success() {
        let log = log_tail(&workdir.join("out.log")).await;
        return Err(EpcError::latex(format!("{status}\n{log}")));
    }
    fed.map_err(|e| EpcError::latex(format!("write source: {e}")))?;

    let pdf = workdir.join("out.pdf");
    if tokio::fs::metadata(&pdf).await.is_err() {
        return Err(EpcError::latex("engine finished without out.pdf"));
    }
    Ok(pdf)
}

/// Last lines of the LaTeX log, empty when there is none.
async fn log_tail(path: &Path) -> String {
    let Ok(raw) = tokio::fs::read(path).await else {
        return String::new();
    };
    let text = String::from_utf8_lossy(&raw);
    let lines: Vec<&str> = text.lines().collect();
    lines[lines.len().saturating_sub(LOG_TAIL_LINES)..].join("\n")
}
