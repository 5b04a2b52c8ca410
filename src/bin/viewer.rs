//! TUI Dashboard Viewer
//!
//! Interactive terminal dashboard for sensor telemetry. Polls the telemetry
//! backend for readings, history and the average temperature, and submits
//! alert-rule changes.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use sensor_dashboard::config::DashboardConfig;
use sensor_dashboard::util::get_api_url_override;
use sensor_dashboard::viewer::App;

#[derive(Parser, Debug)]
#[command(name = "sensor-viewer")]
#[command(about = "Terminal UI dashboard for sensor telemetry", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Telemetry backend URL (overrides config file and environment)
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,
}

fn init_logging(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // Logs go to a file so they don't scribble over the TUI
    let log_path = dirs::data_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_default()
        .join("sensor-dashboard")
        .join("viewer.log");

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path);

    match log_file {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_level(true)
                .with_max_level(level)
                .with_ansi(false)
                .with_writer(file)
                .init();
        }
        Err(_) => {
            // Without a log file only errors reach stderr
            tracing_subscriber::fmt()
                .with_target(false)
                .with_level(true)
                .with_max_level(tracing::Level::ERROR)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();

    let config = DashboardConfig::load(args.config.as_deref())?;

    // CLI beats environment beats config file
    let config = DashboardConfig {
        api_url: args
            .url
            .or_else(get_api_url_override)
            .unwrap_or(config.api_url),
        ..config
    };

    init_logging(config.debug);
    tracing::info!("starting viewer against {}", config.api_url);

    let mut app = App::new(config)?;
    app.run().await?;

    Ok(())
}
