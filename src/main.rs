//! cy-weather API entry point.

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cy_weather_api::api::docs::openapi_json;
use cy_weather_api::config::Config;
use cy_weather_api::server;

/// cy-weather API service.
#[derive(Parser, Debug)]
#[command(name = "cy-weather-api")]
#[command(about = "Health check, Prometheus metrics and API docs for cy-weather")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// Interface to bind the HTTP server to.
    #[arg(long, global = true)]
    host: Option<String>,

    /// HTTP server port.
    #[arg(short, long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Check configuration validity.
    CheckConfig,

    /// Print the OpenAPI document as JSON.
    Openapi,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Configuration is loaded first so RUST_LOG from .env applies to logging
    let config = Config::load();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("cy_weather_api=debug,tower_http=debug,info")
    } else {
        let level = config.as_ref().map(|c| c.rust_log.as_str()).unwrap_or("info");
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(config),
        Some(Command::Openapi) => cmd_openapi(),
        Some(Command::Serve) | None => cmd_serve(config, args.host, args.port).await,
    }
}

/// Run the HTTP server.
async fn cmd_serve(
    config: Result<Config, envy::Error>,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = config.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Override with CLI args if provided
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    info!("Configuration loaded successfully");
    info!("Latency buckets: {:?}", config.latency_buckets);

    server::run(&config).await.map_err(|e| {
        error!("Server error: {}", e);
        anyhow::anyhow!(e)
    })
}

/// Check configuration validity.
fn cmd_check_config(config: Result<Config, envy::Error>) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("CY-WEATHER API - CONFIGURATION CHECK");
    println!("======================================================================");

    // Load configuration
    print!("Loading configuration... ");
    let config = match config {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!();
    println!("  Bind address:    {}:{}", config.host, config.port);
    println!("  Log level:       {}", config.rust_log);
    println!("  Latency buckets: {:?}", config.latency_buckets);
    println!("======================================================================");

    Ok(())
}

/// Print the OpenAPI document.
fn cmd_openapi() -> anyhow::Result<()> {
    let json = openapi_json()?;
    println!("{}", json);
    Ok(())
}
