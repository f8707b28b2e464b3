mod error;
mod input;
mod item;
mod list;
mod session;
mod store;
mod ui;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, ExecutableCommand};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::list::ListModel;
use crate::session::SelectorSession;
use crate::store::AnnotationStore;

const LOG_ENV: &str = "THEME_SELECTOR_LOG";

/// Pick a theme file interactively. Prints the chosen name, prints nothing on cancel.
#[derive(Debug, Parser)]
#[command(name = "theme-selector", version)]
struct Args {
    /// Directory whose entries are the candidate themes
    #[arg(long, env = "THEME_SELECTOR_THEMES_DIR")]
    themes_dir: PathBuf,

    /// Annotation store (pins, comments, light/dark tags) [default: ~/.config/selector-config.toml]
    #[arg(long, env = "THEME_SELECTOR_STORE")]
    store: Option<PathBuf>,

    /// Print the full path of the chosen theme instead of its name
    #[arg(long)]
    print_path: bool,

    /// Log file [default: <cache dir>/theme-selector/theme-selector.log]
    #[arg(long, env = "THEME_SELECTOR_LOG_FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.clone());

    let store_path = match args.store.clone() {
        Some(path) => path,
        None => default_store_path()?,
    };
    let names = list_item_names(&args.themes_dir)?;
    let store = AnnotationStore::load(&store_path)?;
    info!(
        themes = names.len(),
        annotations = store.len(),
        "starting selector"
    );

    let mut session = SelectorSession::new(ListModel::new(names, store, store_path));
    if let Err(err) = run_app(&mut session) {
        error!("selector aborted: {err:#}");
        return Err(err);
    }
    info!(outcome = ?session.outcome(), total = session.list().total_len(), "selector finished");

    if let Some(name) = session.into_selection() {
        let mut stdout = io::stdout().lock();
        if args.print_path {
            writeln!(stdout, "{}", args.themes_dir.join(&name).display())?;
        } else {
            writeln!(stdout, "{name}")?;
        }
    }
    Ok(())
}

/// Best-effort: without a writable log file the selector runs unlogged.
fn init_logging(log_file: Option<PathBuf>) {
    let path = match log_file {
        Some(path) => path,
        None => dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("theme-selector")
            .join("theme-selector.log"),
    };
    let Some(file) = open_log_file(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

/// Opens the log for appending, creating it and its directory if needed.
fn open_log_file(path: &Path) -> Option<fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).ok()?;
        }
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .ok()
}

fn default_store_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Unable to determine home directory")?;
    Ok(home.join(".config").join("selector-config.toml"))
}

/// Entry names of `dir`, hidden entries and names that are not UTF-8 skipped.
fn list_item_names(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Unable to list themes in {}", dir.display()))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Unable to list themes in {}", dir.display()))?;
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                warn!(name = ?raw, "skipping theme with a non UTF-8 name");
                continue;
            }
        };
        if !name.starts_with('.') {
            names.push(name);
        }
    }
    Ok(names)
}

fn run_app(session: &mut SelectorSession) -> Result<()> {
    enable_raw_mode()?;
    let mut stderr = io::stderr();
    stderr.execute(EnterAlternateScreen)?;

    // stdout stays clean for the selected name
    let backend = CrosstermBackend::new(stderr);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, session);

    restore_terminal(&mut terminal)?;
    result
}

fn event_loop<B>(terminal: &mut Terminal<B>, session: &mut SelectorSession) -> Result<()>
where
    B: ratatui::backend::Backend + Write,
{
    loop {
        terminal.draw(|frame| ui::render(frame, session))?;
        session.set_page_size(ui::list_rows(terminal.size()?));

        match event::read()? {
            Event::Key(key) => session.handle_key(key)?,
            Event::Resize(_, _) => {}
            Event::Mouse(_) | Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
        }

        if session.is_finished() {
            break;
        }
    }
    Ok(())
}

fn restore_terminal<B>(terminal: &mut Terminal<B>) -> Result<()>
where
    B: ratatui::backend::Backend + Write,
{
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
