use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

use briefing::api::ApiClient;
use briefing::app::{App, AppEvent};
use briefing::bookmarks::BookmarkStore;
use briefing::clock::SystemClock;
use briefing::config::Config;
use briefing::search::SearchHistory;
use briefing::storage::{FileStore, MemoryStore, SharedStore};
use briefing::ui;

/// Get the config directory path (~/.config/briefing/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("briefing"))
}

/// Create `dir` with user-only permissions on Unix.
fn ensure_private_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(dir, perms) {
                    tracing::warn!(
                        path = %dir.display(),
                        error = %e,
                        "Failed to set directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %dir.display(),
                    error = %e,
                    "Failed to read directory metadata"
                );
            }
        }
    }
    Ok(())
}

/// Send logs to `briefing.log`; the terminal belongs to the TUI.
fn init_logging(dir: &Path) -> Result<()> {
    let log_path = dir.join("briefing.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Open the persistent store, degrading to an in-memory one so the
/// session still works (without persistence) when the file is unusable.
fn open_store(path: PathBuf) -> SharedStore {
    match FileStore::open(&path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Store unavailable, nothing will be saved");
            eprintln!("Warning: could not open {} ({e}); changes will not be saved", path.display());
            MemoryStore::shared()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "briefing", about = "Terminal news client for an article API")]
struct Args {
    /// Config file (default: ~/.config/briefing/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Base URL of the article API (overrides config and BRIEFING_API_URL)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Category to open with (e.g. "Science")
    #[arg(long)]
    category: Option<String>,

    /// Print saved articles and exit
    #[arg(long)]
    saved: bool,

    /// Forget recent searches and exit
    #[arg(long)]
    clear_history: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    ensure_private_dir(&config_dir)?;
    init_logging(&config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    config.apply_env();
    if let Some(url) = args.api_url {
        config.api_base_url = url;
    }

    let store = open_store(config_dir.join("store.json"));

    if args.saved {
        let bookmarks = BookmarkStore::load(store);
        if bookmarks.is_empty() {
            println!("No saved articles.");
        }
        for article in bookmarks.articles() {
            println!("{}\n  {}", article.title, article.url);
        }
        return Ok(());
    }

    if args.clear_history {
        SearchHistory::load(store, config.history_limit).clear();
        println!("Search history cleared.");
        return Ok(());
    }

    let api = ApiClient::new(&config.api_base_url)
        .with_context(|| format!("Invalid API base URL: {}", config.api_base_url))?;
    tracing::info!(api = %api.base_url(), "Starting briefing");

    let mut app = App::new(
        config,
        api,
        store,
        Arc::new(SystemClock),
        args.category.as_deref(),
    );

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
