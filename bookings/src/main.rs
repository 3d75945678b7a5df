//! Travel experiences booking server.
//!
//! ```bash
//! docker compose up -d postgres redis
//! cargo run --bin bookings
//! ```

use bookings::config::Config;
use bookings::metrics::register_business_metrics;
use bookings::seed::seed_if_empty;
use bookings::server::{AppState, Stores, build_router};
use experiences_auth::stores::RedisSessionStore;
use experiences_auth::{AuthService, PasswordHasher};
use experiences_core::{Clock, SystemClock};
use experiences_postgres::{PostgresStore, PostgresUserRepository};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::Notify;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,bookings=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting booking server");

    let config = Config::from_env()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        app_env = ?config.server.app_env,
        window_days = config.booking.slots.window_days(),
        "Configuration loaded"
    );

    let metrics_addr: SocketAddr =
        format!("{}:{}", config.server.metrics_host, config.server.metrics_port).parse()?;
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()?;
    register_business_metrics();
    info!(address = %metrics_addr, "Metrics exporter listening");

    info!("Connecting to PostgreSQL...");
    let store = PostgresStore::connect(&config.database.url, &config.database.pool_settings()).await?;
    store.migrate().await?;
    info!("Database ready");

    info!("Connecting to Redis...");
    let sessions = RedisSessionStore::new(&config.redis.url).await?;
    info!("Session store ready");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let auth = AuthService::new(
        Arc::new(PostgresUserRepository::new(store.pool().clone())),
        Arc::new(sessions),
        PasswordHasher::new(config.auth.password_hash_cost),
        clock.clone(),
        chrono::Duration::from_std(Duration::from_secs(config.auth.session_ttl))?,
    );

    let store = Arc::new(store);
    if config.server.seed_on_startup {
        seed_if_empty(store.as_ref(), &config.booking.slots, clock.now()).await?;
    }

    let state = AppState::new(
        Stores::shared(store),
        auth,
        clock,
        &config.booking,
        config.server.app_env,
    );
    let app = build_router(state, config.server.cors_origin.clone());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "HTTP server listening");

    let shutdown = Arc::new(Notify::new());
    let notified = shutdown.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { notified.notified().await })
            .await
    });

    tokio::select! {
        result = &mut server => {
            result??;
            return Ok(());
        }
        () = shutdown_signal() => {}
    }

    shutdown.notify_one();
    let grace = Duration::from_secs(config.server.shutdown_timeout);
    match tokio::time::timeout(grace, server).await {
        Ok(result) => result??,
        Err(_) => warn!(timeout_secs = grace.as_secs(), "Shutdown timed out, dropping open connections"),
    }

    info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
