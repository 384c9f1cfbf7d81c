use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ratatui::Terminal;
use ratatui::crossterm::event;
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use kgraph_core::{BackingService, Latency, MockService};

mod config_file;
mod input;
mod logging;
mod router;
mod runtime;
mod scheduler;
mod screens;
mod theme;
mod tui_event;
mod view;
mod widgets;

use config_file::{Overrides, Settings};

/// kgraph: keyboard-driven terminal UI for notes, links, tags and flashcards.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Color theme: hacker (default) or modern
    #[arg(long)]
    theme: Option<String>,

    /// Input poll interval in milliseconds
    #[arg(long)]
    tick_rate_ms: Option<u64>,

    /// Multiplier on the simulated service latency (0 disables delays)
    #[arg(long)]
    latency_scale: Option<f64>,

    /// Start with an empty store instead of the sample records
    #[arg(long)]
    no_samples: bool,

    /// Log level or tracing filter directive (overridden by KGRAPH_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            theme: self.theme.clone(),
            tick_rate_ms: self.tick_rate_ms,
            latency_scale: self.latency_scale,
            no_samples: self.no_samples,
            log_level: self.log_level.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let (file_config, config_errors) = config_file::load_config();
    let settings = Settings::resolve(
        &file_config,
        std::env::var("KGRAPH_THEME").ok(),
        &args.overrides(),
    );

    let log_path = settings.log_file.clone().or_else(logging::default_log_path);
    let _log_guard = match &log_path {
        Some(path) => Some(logging::init(&settings.log_level, path)?),
        None => None,
    };
    for error in &config_errors {
        tracing::warn!(%error, "ignoring config file");
    }
    let theme = theme::Theme::from_name(&settings.theme);
    tracing::info!(
        theme = theme.name,
        tick_ms = settings.tick_rate.as_millis() as u64,
        latency_scale = settings.latency_scale,
        samples = settings.seed_samples,
        "starting kgraph"
    );

    let latency = Latency::scaled(settings.latency_scale);
    let service: Arc<dyn BackingService> = if settings.seed_samples {
        Arc::new(MockService::with_samples(latency))
    } else {
        Arc::new(MockService::new(latency))
    };

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Install panic hook that restores terminal before printing panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    // Drain any stray input events (e.g. Enter keypress from launching the command)
    while event::poll(Duration::from_millis(50)).unwrap_or(false) {
        let _ = event::read();
    }

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let reader = input::spawn_reader(event_tx.clone(), settings.tick_rate, cancel.clone());

    let scheduler = scheduler::Scheduler::new(service, event_tx);
    let mut event_loop =
        runtime::EventLoop::new(router::Router::new(), scheduler, event_rx, theme);
    let result = event_loop.run(&mut terminal).await;

    cancel.cancel();
    if reader.join().is_err() {
        tracing::warn!("input reader panicked");
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "event loop failed");
    }
    tracing::info!("kgraph exiting");
    result
}
