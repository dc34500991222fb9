use clap::Parser;
use lms::{AppState, build_app, config::LmsConfig, db::DbPool, observability};

/// Config file read when `--config` is not given. Missing is fine.
const DEFAULT_CONFIG_PATH: &str = "lms.toml";

/// CLI arguments for the LMS server
#[derive(Parser, Debug)]
#[command(version, about = "Role-based learning management system", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file (defaults to ./lms.toml if it exists, otherwise
    /// built-in defaults plus environment overrides)
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config_path = args.config.as_deref();

    match args.command {
        Some(Command::Migrate) => run_migrate(config_path).await,
        Some(Command::Serve) | None => run_server(config_path).await,
    }
}

/// Load config and install tracing, or exit with a message on stderr.
fn load_config(explicit_config_path: Option<&str>) -> (String, LmsConfig) {
    let path = explicit_config_path.unwrap_or(DEFAULT_CONFIG_PATH).to_string();

    if explicit_config_path.is_some() && !std::path::Path::new(&path).exists() {
        eprintln!("Config file not found: {}", path);
        std::process::exit(1);
    }

    let config = match LmsConfig::load_or_default(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", path, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = observability::init_tracing(&config.observability) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    (path, config)
}

async fn run_server(explicit_config_path: Option<&str>) {
    let (config_path, config) = load_config(explicit_config_path);

    tracing::info!(config_file = %config_path, "Starting LMS server");

    if config.auth.seed_default_accounts {
        tracing::warn!(
            "Default account seeding is enabled. Seeded accounts use well-known passwords; \
             change them or set auth.seed_default_accounts = false in production."
        );
    }

    let state = match AppState::new(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize application state");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let db = state.db.clone();
    let app = build_app(&config, state);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(address = %bind_addr, error = %e, "Failed to bind to address");
            eprintln!("Error: failed to bind to {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on http://{}", bind_addr);

    // Graceful shutdown: wait for SIGINT/SIGTERM, drain connections, then close the pool
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
    }

    db.close().await;
    tracing::info!("Shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}

async fn run_migrate(explicit_config_path: Option<&str>) {
    let (config_path, config) = load_config(explicit_config_path);

    tracing::info!(config_file = %config_path, "Running database migrations");

    match DbPool::from_config(&config.database).await {
        Ok(pool) => {
            let result = pool.run_migrations().await;
            pool.close().await;
            match result {
                Ok(()) => {
                    tracing::info!("Database migrations completed successfully");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Database migrations failed");
                    eprintln!("Error: Database migrations failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            eprintln!("Error: Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    }
}
