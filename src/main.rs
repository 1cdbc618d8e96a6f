//! procwatch - version 0.1.0
//!
//! Live process monitor with tracing logging.
//! This is the main entry point that starts the dashboard server and handles subcommands.

mod cache;
mod cache_updater;
mod cli;
mod commands;
mod config;
mod handlers;
mod startup_checks;
mod state;

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use procwatch::LifecycleController;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};

use cli::{Args, Commands, LogLevel};
use commands::{
    command_chart, command_check, command_config, command_kill, command_report, command_snapshot,
    command_top,
};
use config::{
    resolve_config, show_config, validate_effective_config, Config, DEFAULT_BIND_ADDR, DEFAULT_PORT,
};
use handlers::{
    form_action_handler, health_handler, kill_handler, pause_handler, paused_handler,
    processes_handler, resume_handler, root_handler, snapshot_handler, states_handler, top_handler,
};
use state::{AppState, SharedState};

/// Resolves the log level: CLI flag first, then config, then `info`.
fn resolve_log_level(config: &Config, args: &Args) -> LevelFilter {
    if let Some(level) = &args.log_level {
        return match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        };
    }
    config
        .log_level
        .as_deref()
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::INFO)
}

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(config: &Config, args: &Args) {
    let log_level = resolve_log_level(config, args);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("Logging initialized with level: {}", log_level);
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Builds the HTTP router.
fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/processes", get(processes_handler))
        .route("/states", get(states_handler))
        .route("/snapshot", get(snapshot_handler))
        .route("/paused", get(paused_handler))
        .route("/top", get(top_handler))
        .route("/pause/{pid}", post(pause_handler))
        .route("/resume/{pid}", post(resume_handler))
        .route("/kill/{pid}", post(kill_handler))
        .route("/actions", post(form_action_handler))
        .with_state(state)
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format.clone());
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        // Chart and Config commands don't need config validation
        match command {
            Commands::Chart { input } => return command_chart(input),
            Commands::Config {
                output,
                format,
                commented,
            } => return command_config(output.clone(), format.clone(), *commented),
            _ => {
                // Other commands need config validation
            }
        }

        let config = load_validated_config(&args)?;
        setup_logging(&config, &args);

        return match command {
            Commands::Snapshot { json } => command_snapshot(*json, &config),
            Commands::Top { json } => command_top(*json, &config).await,
            Commands::Kill { pid } => command_kill(*pid),
            Commands::Report {
                output,
                top_output,
                no_top_output,
            } => {
                let top_output = (!*no_top_output).then_some(top_output.as_path());
                command_report(output, top_output, &config).await
            }
            Commands::Check => command_check(&config).await,
            Commands::Chart { .. } => unreachable!("Chart handled above"),
            Commands::Config { .. } => unreachable!("Config handled above"),
        };
    }

    // Load configuration for main server mode
    let config = load_validated_config(&args)?;

    setup_logging(&config, &args);

    info!("Starting procwatch");

    if let Err(e) = startup_checks::validate_requirements(&config) {
        error!("❌ Startup validation failed: {}", e);
        error!("   The server will start but may not function correctly!");
    }

    let bind_ip_str = config
        .bind
        .clone()
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
    let port = config.port.unwrap_or(DEFAULT_PORT);
    let addr: SocketAddr = format!("{}:{}", bind_ip_str, port).parse()?;

    let controller = Arc::new(LifecycleController::with_kernel_signals());
    let state: SharedState = Arc::new(AppState::new(config, controller));

    // Populate the view before accepting requests
    info!("Performing initial refresh");
    cache_updater::refresh_snapshot(&state).await;
    cache_updater::refresh_listing(&state).await;

    let refreshers = cache_updater::spawn_refreshers(&state);

    // Setup graceful shutdown signal handlers
    let shutdown_signal = async {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down gracefully...");
            }
        }
    };

    let app = build_router(state.clone());
    let listener = TcpListener::bind(addr).await?;
    info!("procwatch listening on http://{}", addr);

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(e.into());
            }
        }
        _ = shutdown_signal => {
            info!("Shutdown signal received, exiting...");
        }
    }

    for handle in refreshers {
        handle.abort();
    }

    let still_paused = state.controller.paused();
    if !still_paused.is_empty() {
        warn!(
            "Exiting with {} processes still stopped: {:?}",
            still_paused.len(),
            still_paused
        );
    }

    info!("procwatch stopped gracefully");
    Ok(())
}
