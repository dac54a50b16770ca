//! feedcache - an offline-first client for a mock social backend.
//!
//! Fetches the image feed and the reels collection, caches the last good
//! snapshot locally, and applies like toggles optimistically with rollback
//! when the network refuses them.

mod api;
mod auth;
mod cache;
mod config;
mod models;
mod sync;

use std::io;

use anyhow::{bail, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use api::FeedClient;
use auth::Session;
use cache::{FileStore, SnapshotStore};
use config::Config;
use models::{FeedItem, FeedKind};
use sync::FeedController;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Set up logging with environment-based filter
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn usage() -> &'static str {
    "Usage:\n  \
     feedcache login <email> <password>\n  \
     feedcache logout\n  \
     feedcache feed [--reels]\n  \
     feedcache like <id> [--reels]\n  \
     feedcache clear-cache"
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("feedcache starting");

    let args: Vec<String> = std::env::args().collect();
    let (kind, positional) = split_args(&args);
    let command = positional.first().map(|s| s.as_str()).unwrap_or("feed");

    match command {
        "login" => cmd_login(positional.get(1).copied(), positional.get(2).copied()),
        "logout" => cmd_logout(),
        "feed" => cmd_feed(kind).await,
        "like" => cmd_like(kind, positional.get(1).copied()).await,
        "clear-cache" => cmd_clear_cache(),
        _ => bail!("unknown command '{}'\n{}", command, usage()),
    }
}

/// Split argv into the collection selector and the positional arguments.
/// Flags can appear anywhere, so `feedcache --reels` still defaults to the
/// `feed` command.
fn split_args(args: &[String]) -> (FeedKind, Vec<&String>) {
    let kind = if args.iter().any(|a| a == "--reels") {
        FeedKind::Reels
    } else {
        FeedKind::Posts
    };
    let positional = args
        .iter()
        .skip(1)
        .filter(|a| !a.starts_with("--"))
        .collect();
    (kind, positional)
}

fn cmd_login(email: Option<&String>, password: Option<&String>) -> Result<()> {
    let (Some(email), Some(password)) = (email, password) else {
        bail!("login needs an email and a password\n{}", usage());
    };

    let mut config = Config::load()?;
    let mut session = Session::new(config.cache_dir()?);
    session.login(email, password)?;

    config.last_email = Some(email.clone());
    config.save()?;

    println!("Logged in as {}", email);
    Ok(())
}

fn cmd_logout() -> Result<()> {
    let config = Config::load()?;
    let mut session = Session::new(config.cache_dir()?);
    session.load()?;
    session.logout()?;
    println!("Logged out");
    Ok(())
}

fn cmd_clear_cache() -> Result<()> {
    let config = Config::load()?;
    for kind in [FeedKind::Posts, FeedKind::Reels] {
        let store = FileStore::new(config.cache_dir()?, kind)?;
        store.clear_all();
    }
    println!("Cache cleared");
    Ok(())
}

/// Build the sync controller for one collection kind behind the login gate.
fn build_controller(config: &Config, kind: FeedKind) -> Result<FeedController<FeedClient, FileStore>> {
    let mut session = Session::new(config.cache_dir()?);
    session.load()?;
    if !session.is_logged_in() {
        bail!("not logged in - run `feedcache login <email> <password>` first");
    }

    let client = FeedClient::new(config.base_url(), kind)?;
    let store = FileStore::new(config.cache_dir()?, kind)?;
    Ok(FeedController::new(kind, client, store))
}

async fn cmd_feed(kind: FeedKind) -> Result<()> {
    let config = Config::load()?;
    let mut controller = build_controller(&config, kind)?;

    controller.refresh().await;
    print_state(kind, controller.state());
    Ok(())
}

async fn cmd_like(kind: FeedKind, id: Option<&String>) -> Result<()> {
    let Some(id) = id else {
        bail!("like needs an item id\n{}", usage());
    };

    let config = Config::load()?;
    let mut controller = build_controller(&config, kind)?;

    // The toggle operates on the published list, so load it first - a cache
    // fallback is fine, the optimistic update still lands in the cache
    controller.refresh().await;
    controller.toggle_like(id).await;

    if let Some(notice) = &controller.state().notice {
        println!("! {}", notice);
    } else if let Some(item) = controller.state().items.iter().find(|i| i.id == *id) {
        println!(
            "{} is now {} ({} likes)",
            item.id,
            if item.liked_by_viewer { "liked" } else { "not liked" },
            item.like_count
        );
    } else {
        println!("{} is not in the current {}", id, kind);
    }
    Ok(())
}

fn print_state(kind: FeedKind, state: &sync::SyncState) {
    if let Some(notice) = &state.stale_notice {
        println!("! {}", notice);
    }
    if let Some(error) = &state.error_message {
        println!("error: {}", error);
        return;
    }

    println!("{} ({} items)", kind, state.items.len());
    for item in &state.items {
        println!("  {}", format_item(item));
    }
}

fn format_item(item: &FeedItem) -> String {
    format!(
        "{}  {}  {} likes{}",
        item.id,
        item.author_name,
        item.like_count,
        if item.liked_by_viewer { "  [liked]" } else { "" }
    )
}
