use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use centro_control::api::ElectoralApi;
use centro_control::cancel::CancelSignal;
use centro_control::config::{Config, ConfigStore};
use centro_control::logging::init_tracing;
use centro_control::store::Store;
use centro_control::transport::HttpTransport;
use centro_control::ui::{ViewController, ViewDescription};

/// Headless driver for the Centro de Control dashboard.
///
/// Loads the municipality list, optionally opens one municipality, and prints
/// every view the dashboard passes through.
#[derive(Parser, Debug)]
#[command(name = "centro-control", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.config/centro-control/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Open the results view of this municipality once the list is loaded
    #[arg(short, long)]
    select: Option<u64>,

    /// Filter the municipality list by name
    #[arg(long)]
    search: Option<String>,

    /// Only query the API health endpoint
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let api = Arc::new(ElectoralApi::new(HttpTransport::new(), &config.get()));

    if cli.health {
        let health = api
            .health_check(&CancelSignal::new())
            .await
            .context("API health check failed")?;
        println!(
            "{} {}",
            health.status,
            health.version.as_deref().unwrap_or("")
        );
        return Ok(());
    }

    let store = Store::new();
    let mut controller = ViewController::new(Arc::clone(&api), store, &config.get().dashboard);

    print_view(&controller.start());
    let mut completed = drain(&mut controller).await;

    if completed {
        if let Some(query) = cli.search.as_deref() {
            print_view(&controller.search(query));
        }
        if let Some(id) = cli.select {
            print_view(&controller.select(id));
            completed = drain(&mut controller).await;
        }
    }

    let stats = api.stats();
    tracing::info!(
        total = stats.total_requests,
        successful = stats.successful_requests,
        failed = stats.failed_requests,
        retried = stats.retried_requests,
        average_ms = stats.average_response_time.as_millis() as u64,
        success_rate = stats.success_rate(),
        "API statistics"
    );

    let failed = !completed || matches!(controller.describe(), ViewDescription::Error { .. });
    controller.teardown();
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Print views until no fetch is in flight. Returns false on Ctrl+C.
async fn drain(controller: &mut ViewController<HttpTransport>) -> bool {
    loop {
        tokio::select! {
            view = controller.next_event() => match view {
                Some(view) => print_view(&view),
                None => return true,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("Interrupted, cancelling in-flight fetch");
                return false;
            }
        }
    }
}

fn load_config(cli: &Cli) -> Result<ConfigStore> {
    let path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let store = ConfigStore::new(config, path);

    if let Some(base_url) = &cli.base_url {
        let mut config = store.get();
        config.api.base_url = base_url.clone();
        store
            .replace(config)
            .with_context(|| format!("Invalid --base-url '{}'", base_url))?;
    }

    tracing::debug!(path = %store.path().display(), "Configuration loaded");
    Ok(store)
}

fn print_view(view: &ViewDescription) {
    println!("{}", view);
}
