//! Tiller Entry Point
//!
//! Usage:
//!   tiller [OPTIONS]
//!
//! Options:
//!   -p, --prompt <TEXT>   Run one prompt non-interactively and exit
//!   --profile <NAME>      Profile to run (see --list-profiles)
//!   --model <ID>          Override the profile's model
//!   --plain               Line-oriented console instead of the full-screen UI
//!   --config <PATH>       Config file (default: ~/.config/tiller/config.toml)

use std::fs::File;
use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::EventStream,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tiller_conductor::backend::AnthropicGateway;
use tiller_conductor::config::{self, ConfigOverrides, SurfaceKind, TillerConfig};
use tiller_conductor::profile::describe_profiles;
use tiller_conductor::{Conductor, ConductorConfig, ConductorError, DisplaySurface, Profile};
use tiller_tui::{App, ConsoleSurface, Theme, TuiSurface};

/// Log destination for the full-screen UI
const LOG_FILE_ENV: &str = "TILLER_LOG_FILE";

/// How long the UI waits for the core to unwind after quitting
const CORE_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Parser)]
#[command(name = "tiller", version, about = "Terminal AI coding assistant")]
struct Cli {
    /// Run a single prompt non-interactively and exit
    #[arg(short, long, value_name = "TEXT")]
    prompt: Option<String>,

    /// Profile to run
    #[arg(long, value_name = "NAME")]
    profile: Option<String>,

    /// List the built-in profiles and exit
    #[arg(long)]
    list_profiles: bool,

    /// Model identifier override
    #[arg(long, value_name = "ID")]
    model: Option<String>,

    /// Use the plain console surface in interactive mode
    #[arg(long)]
    plain: bool,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Debug)]
enum Mode {
    SingleShot(String),
    Console,
    Tui,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.list_profiles {
        print!("{}", describe_profiles());
        return ExitCode::SUCCESS;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(async {
        match run(cli).await {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        }
    });

    // A console read may still be parked on a blocking stdin thread
    runtime.shutdown_background();
    code
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = resolve_config(&cli)?;
    let mode = select_mode(cli.prompt, &config);
    init_logging(&mode)?;
    log_resolved_config(&mode, &config);

    let profile = Profile::by_name(&config.profile)?
        .with_overrides(config.model.as_deref(), config.max_tokens);
    let gateway = AnthropicGateway::from_config(&config)?;
    let conductor_config = ConductorConfig::from_profile(&profile);
    let mut conductor = Conductor::new(gateway, profile.tools, conductor_config);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received");
                cancel.cancel();
            }
        });
    }

    match mode {
        Mode::SingleShot(prompt) => {
            let surface = ConsoleSurface::stdio(false);
            let result = conductor.run(&surface, Some(prompt), &cancel).await;
            surface.close();
            Ok(exit_code(result))
        }
        Mode::Console => {
            let surface = ConsoleSurface::stdio(true);
            let result = conductor.run(&surface, None, &cancel).await;
            surface.close();
            Ok(exit_code(result))
        }
        Mode::Tui => {
            let (surface, channels) = TuiSurface::channel();
            let surface = Arc::new(surface);

            let mut core = {
                let surface = surface.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    let result = conductor.run(&*surface, None, &cancel).await;
                    surface.close();
                    result
                })
            };

            let mut terminal = setup_terminal()?;
            let mut app = App::new(channels, Theme::default(), config.tool_result_preview_chars);
            let ui_result = app.run(&mut terminal, EventStream::new()).await;
            restore_terminal(&mut terminal)?;

            surface.close();
            cancel.cancel();
            let core_result = match tokio::time::timeout(CORE_SHUTDOWN_GRACE, &mut core).await {
                Ok(joined) => joined.context("conductor task failed")?,
                Err(_) => {
                    tracing::warn!("Conductor did not stop in time; aborting");
                    core.abort();
                    Err(ConductorError::Cancelled)
                }
            };
            ui_result?;
            Ok(exit_code(core_result))
        }
    }
}

/// Config file, then environment, then CLI flags
fn resolve_config(cli: &Cli) -> anyhow::Result<TillerConfig> {
    let path = cli.config.clone().or_else(config::default_config_path);
    let mut config = config::load_config_from_path(path)?;

    let mut overrides = ConfigOverrides::new();
    if let Some(profile) = &cli.profile {
        overrides = overrides.with_profile(profile.clone());
    }
    if let Some(model) = &cli.model {
        overrides = overrides.with_model(model.clone());
    }
    if cli.plain {
        overrides = overrides.with_surface(SurfaceKind::Console);
    }
    overrides.apply(&mut config);
    Ok(config)
}

fn select_mode(prompt: Option<String>, config: &TillerConfig) -> Mode {
    if let Some(prompt) = prompt {
        return Mode::SingleShot(prompt);
    }
    let tty = io::stdin().is_terminal() && io::stdout().is_terminal();
    match config.surface {
        SurfaceKind::Tui if tty => Mode::Tui,
        _ => Mode::Console,
    }
}

/// Config is loaded before the subscriber exists, so its outcome is logged here
fn log_resolved_config(mode: &Mode, config: &TillerConfig) {
    tracing::info!(
        ?mode,
        source = ?config.source(),
        path = ?config.config_file_path,
        profile = %config.profile,
        model = ?config.model,
        surface = ?config.surface,
        "Starting tiller"
    );
}

/// Console modes log to stderr; the full-screen UI logs only to a file
fn init_logging(mode: &Mode) -> anyhow::Result<()> {
    match mode {
        Mode::SingleShot(_) | Mode::Console => {
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(io::stderr),
                )
                .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
                .init();
        }
        Mode::Tui => {
            let Some(path) = std::env::var_os(LOG_FILE_ENV) else {
                return Ok(());
            };
            let path = PathBuf::from(path);
            let file = File::create(&path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
                .init();
        }
    }
    Ok(())
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

/// Errors the surface already displayed are only logged here
fn exit_code(result: Result<(), ConductorError>) -> ExitCode {
    match result {
        Ok(()) | Err(ConductorError::Cancelled) => ExitCode::SUCCESS,
        Err(ConductorError::Gateway(e)) => {
            tracing::error!(error = %e, "Session ended on model error");
            ExitCode::FAILURE
        }
        Err(e @ ConductorError::Conversation(_)) => {
            tracing::error!(error = %e, "Session ended on protocol error");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_resolved_config_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[agent]\nprofile = \"minimal\"\n").unwrap();
        let config = config::load_config_with_env(Some(path.clone()), |_| None).unwrap();

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            log_resolved_config(&Mode::Console, &config);
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Starting tiller"));
        assert!(output.contains("File"));
        assert!(output.contains(&path.display().to_string()));
    }
}
