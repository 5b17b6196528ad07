//! FM Transportes tracking monitor HTTP server.
//!
//! Serves the monitoring API on `HOST:PORT` and Prometheus metrics on
//! `METRICS_HOST:METRICS_PORT`.

mod config;

use anyhow::Context;
use axum::{Router, http::HeaderValue, routing::get};
use config::{Config, ServerConfig};
use fm_tracking_carrier::FmTransportesClient;
use fm_tracking_core::environment::SystemClock;
use fm_tracking_postgres::{PgPool, PostgresEventStore, PostgresShipmentRegistry};
use fm_tracking_runtime::metrics::MetricsServer;
use fm_tracking_runtime::{Monitor, TrackingEnvironment};
use fm_tracking_web::{AppState, DatabaseProbe, build_router};
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Readiness probe over the connection pool.
struct PoolProbe(PgPool);

impl DatabaseProbe for PoolProbe {
    fn ping(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            match fm_tracking_postgres::ping(&self.0).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Database ping failed");
                    false
                }
            }
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the process environment still applies
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fm_tracking=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting FM tracking monitor");

    let config = Config::from_env();
    info!(
        carrier_url = %config.carrier.base_url,
        alert_threshold_hours = config.monitor.alert_threshold_hours,
        sync_interval_ms = config.monitor.effective_sync_interval().as_millis(),
        "Configuration loaded"
    );
    if config.carrier.password.is_empty() || config.carrier.client_document.is_empty() {
        warn!("FM_API_PASSWORD or FM_CLIENT_DOCUMENT not set; carrier calls will be rejected");
    }

    info!("Connecting to database...");
    let pool = fm_tracking_postgres::connect(
        &config.database.url,
        config.database.max_connections,
        config.database.connect_timeout,
    )
    .await
    .context("connecting to PostgreSQL")?;
    fm_tracking_postgres::migrate(&pool)
        .await
        .context("applying migrations")?;
    info!("Database ready");

    let shipments = Arc::new(PostgresShipmentRegistry::from_pool(pool.clone()));
    let carrier = Arc::new(
        FmTransportesClient::new(config.carrier.clone()).context("building carrier client")?,
    );
    let clock = Arc::new(SystemClock);

    let env = TrackingEnvironment {
        events: Arc::new(PostgresEventStore::from_pool(pool.clone())),
        shipments: shipments.clone(),
        carrier: carrier.clone(),
        clock: clock.clone(),
    };

    let state = AppState {
        monitor: Monitor::new(env, config.monitor.clone()),
        shipments,
        carrier,
        clock,
        database: Arc::new(PoolProbe(pool)),
    };

    spawn_metrics_server(&config.server).await?;

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.server.cors_origins));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Install the Prometheus recorder and serve `/metrics` in the background.
async fn spawn_metrics_server(server: &ServerConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", server.metrics_host, server.metrics_port)
        .parse()
        .context("parsing metrics address")?;

    let mut metrics = MetricsServer::new(addr);
    metrics.start()?;
    let Some(handle) = metrics.handle().cloned() else {
        warn!("Metrics recorder owned elsewhere; /metrics not served");
        return Ok(());
    };

    let app = Router::new().route("/metrics", get(move || std::future::ready(handle.render())));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding metrics listener {addr}"))?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warn!(error = %e, "Metrics server stopped");
        }
    });
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
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
