//! CLI binary for pdfedit-intake.
//!
//! A terminal presentation layer over the intake controller: every file
//! argument is one selection on the upload control, and `--interactive`
//! opens a small shell that sends selection and dismiss events as typed.
//! No validation happens here; it only renders view models and forwards
//! events.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdfedit_intake::{
    view::LOADING_TEXT, AlertKind, CandidateFile, DocumentEngine, DocumentHandle, HeaderCheckEngine,
    IntakeConfig, IntakeController, IntakeObserver, Phase, PlaceholderEngine, SharedObserver,
    UiEvent, ViewModel, Workspace,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Loading indicator using indicatif ────────────────────────────────────────

/// Terminal observer: shows a spinner while a file is loading.
struct SpinnerObserver {
    bar: Mutex<Option<ProgressBar>>,
}

impl SpinnerObserver {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
        })
    }

    fn finish(&self) {
        if let Some(bar) = self.bar.lock().ok().and_then(|mut b| b.take()) {
            bar.finish_and_clear();
        }
    }
}

impl IntakeObserver for SpinnerObserver {
    fn on_load_start(&self, name: &str, size_bytes: u64) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix(LOADING_TEXT);
        bar.set_message(format!("{name} ({size_bytes} bytes)"));
        bar.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(bar);
        }
    }

    fn on_load_complete(&self, _document: &DocumentHandle) {
        self.finish();
    }

    fn on_selection_ignored(&self, name: &str) {
        let note = dim(&format!("upload in progress; {name} ignored"));
        match self.bar.lock().ok().and_then(|b| b.clone()) {
            Some(bar) => bar.println(note),
            None => eprintln!("{note}"),
        }
    }

    fn on_error(&self, _message: &str) {
        self.finish();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Validate and load one file
  pdfedit document.pdf

  # Several selections in a row (each one replaces the previous)
  pdfedit scan.png report.pdf

  # Treat a file as if the picker declared it a PDF
  pdfedit --mime application/pdf download.bin

  # Skip the %PDF header check (accept on validation alone)
  pdfedit --engine placeholder document.pdf

  # Machine-readable view model after each selection
  pdfedit --json document.pdf

  # Interactive session
  pdfedit --interactive

INTERACTIVE COMMANDS:
  open <path>        select a file
  open               select nothing (no-op)
  dismiss error      close the error alert
  dismiss success    close the success alert
  state              print the current view
  quit               end the session

LIMITS:
  Only application/pdf files up to 50 MiB are accepted. The MIME type is
  declared from the file extension, the way a browser file picker does.
"#;

/// Validate and load PDF files into the editor workspace.
#[derive(Parser, Debug)]
#[command(
    name = "pdfedit",
    version,
    about = "Validate and load PDF files into the editor workspace",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Files to select, in order.
    files: Vec<PathBuf>,

    /// Read commands from stdin instead of taking files as arguments.
    #[arg(short, long)]
    interactive: bool,

    /// Override the declared MIME type of every selected file.
    #[arg(long, env = "PDFEDIT_MIME")]
    mime: Option<String>,

    /// Document engine: header-check or placeholder.
    #[arg(long, env = "PDFEDIT_ENGINE", value_enum, default_value = "header-check")]
    engine: EngineArg,

    /// Maximum upload size in MiB.
    #[arg(
        long,
        env = "PDFEDIT_MAX_SIZE_MB",
        default_value_t = 50,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    max_size_mb: u64,

    /// Load timeout in seconds (0 disables).
    #[arg(long, env = "PDFEDIT_LOAD_TIMEOUT", default_value_t = 60)]
    load_timeout: u64,

    /// Print the view model as JSON (one object per line) instead of text.
    #[arg(long, env = "PDFEDIT_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFEDIT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFEDIT_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum EngineArg {
    HeaderCheck,
    Placeholder,
}

impl EngineArg {
    fn build(&self) -> Arc<dyn DocumentEngine> {
        match self {
            EngineArg::HeaderCheck => Arc::new(HeaderCheckEngine),
            EngineArg::Placeholder => Arc::new(PlaceholderEngine),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || !cli.interactive {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;
    let mut controller = IntakeController::new(cli.engine.build(), config);
    if !cli.quiet && !cli.json {
        controller = controller.with_observer(SpinnerObserver::new() as SharedObserver);
    }

    let final_phase = if cli.interactive {
        run_interactive(&cli, controller).await?
    } else {
        run_batch(&cli, controller).await?
    };

    if final_phase == Phase::Failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Map CLI args to `IntakeConfig`.
fn build_config(cli: &Cli) -> Result<IntakeConfig> {
    IntakeConfig::builder()
        .max_file_size_mib(cli.max_size_mb)
        .load_timeout_secs(cli.load_timeout)
        .build()
        .context("Invalid configuration")
}

/// Turn a path into the event the upload control would send.
fn select_event(cli: &Cli, path: &Path) -> Result<UiEvent> {
    let mut file = CandidateFile::from_path(path)?;
    if let Some(ref mime) = cli.mime {
        file = file.with_mime_type(mime.clone());
    }
    Ok(UiEvent::FileSelected(Some(file)))
}

/// One selection per file argument, each run to completion.
async fn run_batch(cli: &Cli, mut controller: IntakeController) -> Result<Phase> {
    for path in &cli.files {
        let event = select_event(cli, path)
            .with_context(|| format!("Failed to select {}", path.display()))?;
        controller.dispatch(event);
        controller.settle().await;
        render(cli, &controller.view())?;
    }
    Ok(controller.state().phase)
}

/// Read commands from stdin and feed them to the controller's event loop.
async fn run_interactive(cli: &Cli, controller: IntakeController) -> Result<Phase> {
    let config = controller.config().clone();
    let state_rx = controller.subscribe();
    let mut updates = controller.updates();

    let (tx, rx) = mpsc::channel(16);
    let runner = tokio::spawn(controller.run(rx));

    let json = cli.json;
    let quiet = cli.quiet;
    let printer_config = config.clone();
    let printer = tokio::spawn(async move {
        while let Some(state) = updates.next().await {
            let view = ViewModel::project(&state, &printer_config);
            if let Err(e) = render_view(json, quiet, &view) {
                eprintln!("{}", red(&format!("render failed: {e}")));
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        let (cmd, arg) = line
            .split_once(char::is_whitespace)
            .map(|(c, a)| (c, a.trim()))
            .unwrap_or((line, ""));

        let event = match (cmd, arg) {
            ("", _) => continue,
            ("quit" | "exit", _) => break,
            ("help", _) => {
                eprintln!("{AFTER_HELP}");
                continue;
            }
            ("state", _) => {
                let view = ViewModel::project(&state_rx.borrow(), &config);
                render(cli, &view)?;
                continue;
            }
            ("open", "") => UiEvent::FileSelected(None),
            ("open", path) => match select_event(cli, Path::new(path)) {
                Ok(event) => event,
                Err(e) => {
                    eprintln!("{} {e:#}", red("✗"));
                    continue;
                }
            },
            ("dismiss", "error") => UiEvent::DismissError,
            ("dismiss", "success") => UiEvent::DismissSuccess,
            _ => {
                eprintln!("{} unknown command: {line} (try `help`)", red("✗"));
                continue;
            }
        };

        if tx.send(event).await.is_err() {
            break;
        }
    }

    drop(tx);
    let final_state = runner.await.context("Controller task failed")?;
    // The controller, and with it the state sender, is gone: the printer
    // renders the last published state and then its stream ends.
    printer.await.context("Printer task failed")?;
    Ok(final_state.phase)
}

fn render(cli: &Cli, view: &ViewModel) -> Result<()> {
    render_view(cli.json, cli.quiet, view)
}

fn render_view(json: bool, quiet: bool, view: &ViewModel) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string(view).context("Failed to serialise view")?
        );
        return Ok(());
    }
    if quiet {
        if let Some(ref alert) = view.error {
            eprintln!("{}", alert.message);
        }
        return Ok(());
    }

    for alert in view.alerts() {
        match alert.kind {
            AlertKind::Error => eprintln!("{} {}", red("✗"), red(&alert.message)),
            AlertKind::Success => eprintln!("{} {}", green("✓"), alert.message),
        }
    }
    if let Some(ref loading) = view.loading {
        eprintln!("{} {}", cyan("◆"), loading);
    }

    match &view.workspace {
        Workspace::Placeholder { text } => eprintln!("  {}", dim(text)),
        Workspace::Document(doc) => eprintln!(
            "  {} {}  {}",
            cyan("◆"),
            bold(&doc.name),
            dim(&format!(
                "{} bytes{}",
                doc.size_bytes,
                doc.pdf_version
                    .as_deref()
                    .map(|v| format!(", PDF {v}"))
                    .unwrap_or_default()
            )),
        ),
    }
    if !view.upload.enabled {
        eprintln!("  {}", dim("upload disabled while loading"));
    }
    Ok(())
}
