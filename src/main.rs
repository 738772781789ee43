use clap::Parser;
use quakewatch::config::Config;
use quakewatch::favorites::FavoriteStore;
use quakewatch::server::StatusServer;
use quakewatch::{HttpFeed, Poller, Quake, Settings};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "quakewatch", about = "Poll the USGS earthquake feed and serve a status summary")]
struct Cli {
    /// Config file to use instead of ~/.config/quakewatch/config.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds between polls (at least 1).
    #[arg(long)]
    interval: Option<u64>,

    /// Drop events below this magnitude.
    #[arg(long = "min-mag")]
    min_mag: Option<f64>,

    /// Keep feed order instead of sorting by magnitude.
    #[arg(long)]
    no_sort: bool,

    /// Port for the /status endpoint.
    #[arg(long)]
    port: Option<u16>,

    /// Do not start the /status endpoint.
    #[arg(long)]
    no_server: bool,

    /// Override the feed URL.
    #[arg(long)]
    url: Option<String>,

    /// Fetch once, print the table and exit.
    #[arg(long)]
    once: bool,

    /// Log at debug level.
    #[arg(long)]
    debug: bool,

    /// Write logs to this file instead of stderr (tail -f to inspect).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "could not load config, using defaults");
            Config::defaults()
        }),
    };
    apply_overrides(&mut config, &cli);

    let feed = HttpFeed::from_config(&config.feed)?;
    let poller = Arc::new(Poller::new(
        Arc::new(feed),
        Settings::from_config(&config.poller),
    ));

    if cli.once {
        let status = poller.fetch_now().await;
        println!("Status: {status}");
        let favorites = FavoriteStore::from_config(&config.favorites).load();
        print_table(&poller.records(), &favorites);
        return Ok(());
    }

    let server = if config.server.enabled {
        let server = StatusServer::bind(config.server.address()).await?;
        Some(server.spawn(Arc::clone(&poller))?)
    } else {
        None
    };

    poller.start(config.poller.interval());
    tracing::info!(url = %config.feed.url, "quakewatch running, Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");

    poller.stop().await;
    if let Some(server) = server {
        server.shutdown().await?;
    }
    Ok(())
}

fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    let default_level = if cli.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_env_filter(filter)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .init();
        }
    }
    Ok(())
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(interval) = cli.interval {
        config.poller.interval_secs = interval;
    }
    if let Some(min_mag) = cli.min_mag {
        config.poller.min_magnitude = min_mag;
    }
    if cli.no_sort {
        config.poller.sort_by_magnitude = false;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.no_server {
        config.server.enabled = false;
    }
    if let Some(url) = &cli.url {
        config.feed.url = url.clone();
    }
}

/// Pinned ids from the favorites file are marked with `*`.
fn print_table(quakes: &[Quake], favorites: &HashSet<String>) {
    println!("{:1} {:>5}  {:<20}  {:>8}  {:>9}  {:>7}  {}", "", "MAG", "TIME (UTC)", "LAT", "LON", "DEPTH", "PLACE");
    for q in quakes {
        let pin = if favorites.contains(&q.id) { "*" } else { "" };
        let time = q
            .time_utc()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:1} {:>5.1}  {:<20}  {:>8.3}  {:>9.3}  {:>7.1}  {}",
            pin, q.magnitude, time, q.latitude, q.longitude, q.depth_km, q.place
        );
    }
}
