// CLI entry point.
// Parses flags, wires up the injected services, and drives the terminal
// session on a single cooperative runtime.

mod app;
mod browser;
mod cache;
mod config;
mod error;
mod hn;
mod services;
mod state;
mod ui;

use std::sync::Arc;

use app::App;
use cache::{CacheStore, paths};
use config::Config;
use error::{EmberError, Result};
use hn::{AlgoliaClient, FeedKind, HnClient};
use services::Services;

const HELP: &str = "\
ember — browse Hacker News from the terminal

Usage: ember [options]

  --feed <kind>     Start on a feed: top, new, best, ask, show, job
  --search <query>  Start in the search pane with this query
  --no-cache        Disable the persistent cache for this session
  --help,    -h     Show this help message
  --version, -V     Show version and exit";

struct CliArgs {
    feed: Option<FeedKind>,
    search: Option<String>,
    no_cache: bool,
}

fn main() {
    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => return,
        Err(message) => {
            eprintln!("error: {message}");
            std::process::exit(1);
        }
    };

    init_tracing();

    if let Err(err) = run(args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: CliArgs) -> Result<()> {
    // One cooperative task drives the whole session; batch fan-out is
    // concurrency within it, not parallelism.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_session(args))
}

async fn run_session(args: CliArgs) -> Result<()> {
    let mut config = Config::load(paths::config_file().as_deref());
    if let Some(feed) = args.feed {
        config.feed = feed;
    }

    let cache = if args.no_cache {
        CacheStore::disabled()
    } else {
        let path = paths::cache_file().ok_or(EmberError::MissingDirs)?;
        if let Some(parent) = path.parent() {
            // Fatal startup: without the cache directory nothing can persist.
            std::fs::create_dir_all(parent)?;
        }
        CacheStore::new(path)
    };

    let provider = HnClient::new()?;
    let search = AlgoliaClient::new()?;
    let services = Services::new(provider, search, cache, config.ttl.clone());
    let mut app = App::new(services, config);

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal, args.search).await;
    ratatui::restore();
    result
}

fn parse_args() -> std::result::Result<Option<CliArgs>, String> {
    let mut args = CliArgs {
        feed: None,
        search: None,
        no_cache: false,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--feed" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--feed requires a value".to_string())?;
                let kind = FeedKind::parse(&value)
                    .ok_or_else(|| format!("unknown feed kind '{value}'"))?;
                args.feed = Some(kind);
            }
            "--search" => {
                let query = iter
                    .next()
                    .ok_or_else(|| "--search requires a value".to_string())?;
                args.search = Some(query);
            }
            "--no-cache" => args.no_cache = true,
            "--help" | "-h" => {
                println!("{HELP}");
                return Ok(None);
            }
            "--version" | "-V" => {
                println!("ember {}", env!("CARGO_PKG_VERSION"));
                return Ok(None);
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
    }
    Ok(Some(args))
}

/// Send tracing output to a log file; stdout belongs to the TUI. Failure to
/// set up logging is never fatal.
fn init_tracing() {
    let Some(path) = paths::log_file() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = std::fs::File::options().create(true).append(true).open(&path) else {
        return;
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ember=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();
}
