// src/main.rs
use std::{fs, io::{self, Stdout}, path::PathBuf, sync::Mutex, time::Duration};
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::runtime::Runtime;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use framesift::app::App;
use framesift::coalesce::SystemClock;
use framesift::config::{self, Settings};
use framesift::input::handle_event;
use framesift::network::TaskSource;
use framesift::ui;
use framesift::viewport::{TerminalProbe, ViewportProbe};

const IDLE_POLL: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "framesift", version, about = "Page through image frames and select ranges of them")]
struct Cli {
    /// Task JSON to review, as an http(s) URL or a file path
    #[arg(short, long)]
    task: Option<String>,

    /// Settings file applied over the usual config layers
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `framesift=trace`
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::new(cli.config.as_deref()).context("loading settings")?;
    init_tracing(&settings, cli.log_level.as_deref())?;

    let rt = Runtime::new()?;
    let source = TaskSource::parse(cli.task.as_deref().unwrap_or(&settings.task_url));
    let viewport = TerminalProbe.probe()?;
    info!(%source, width = viewport.width, height = viewport.height, "starting");

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(settings, source, rt.handle().clone(), Box::new(SystemClock), viewport);
    app.start_load();
    let result = run(&mut terminal, &mut app);

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Some(width) = app.chosen_width() {
        if let Err(err) = config::save_frame_width(width) {
            warn!(error = %err, "could not remember frame width");
        }
    }
    if let Some(completion) = app.sink.last() {
        println!("{}", serde_json::to_string_pretty(completion)?);
    }
    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| {
            app.screen = f.area();
            ui::render(f, app);
        })?;

        if event::poll(app.poll_timeout(IDLE_POLL))? {
            if !handle_event(app, event::read()?)? {
                break;
            }
        }
    }
    Ok(())
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_tracing(settings: &Settings, level: Option<&str>) -> Result<()> {
    let path = settings.log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = match level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&settings.log_level))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
