//! Observation series CLI
//!
//! Prints assembled series or dataset listings as JSON.

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use series_cli::cli::{execute, Args};

fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);
    if args.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(catalog = ?args.catalog, "Starting series CLI");

    let code = match run(&args) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            tracing::error!("{:#}", e);
            2
        }
    };
    std::process::exit(code);
}

fn run(args: &Args) -> anyhow::Result<bool> {
    let service = series_cli::load_service(&args.catalog)?;
    let response = execute(&args.command, &service, args.defaults.as_deref())?;

    let body = response.body()?;
    let text = if args.pretty {
        serde_json::to_string_pretty(&body)?
    } else {
        serde_json::to_string(&body)?
    };
    println!("{}", text);
    Ok(response.is_success())
}
