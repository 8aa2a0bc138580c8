//! API server entry point.

use std::error::Error;

use api::AppState;
use api::config::{Config, LogFormat};
use clients::{HttpAccountService, HttpCatalogService};
use domain::{OrderService, OrderServiceConfig};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{InMemoryOrderRepository, OrderRepository, PostgresOrderRepository};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

type BoxError = Box<dyn Error + Send + Sync>;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let json = config.log_format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

/// Wires the upstream clients around `repository` and serves until shutdown.
async fn serve<R>(
    config: &Config,
    repository: R,
    metrics_handle: PrometheusHandle,
) -> Result<(), BoxError>
where
    R: OrderRepository + 'static,
{
    let accounts = HttpAccountService::new(&config.account_service_url, config.remote_timeout)?;
    let catalog = HttpCatalogService::new(&config.catalog_service_url, config.remote_timeout)?;
    let service = OrderService::with_config(
        repository,
        accounts,
        catalog,
        OrderServiceConfig {
            remote_timeout: config.remote_timeout,
        },
    );

    let app = api::create_app(AppState::new(service), metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting order service");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // 1. Load configuration and initialize tracing
    let config = Config::from_env();
    init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    // 3. Pick the order store and serve
    match &config.database_url {
        Some(url) => {
            let repository =
                PostgresOrderRepository::connect(url, config.database_max_connections).await?;
            repository.run_migrations().await?;
            tracing::info!("connected to postgres, migrations applied");

            let result = serve(&config, repository.clone(), metrics_handle).await;
            repository.close().await;
            result?;
        }
        None => {
            tracing::warn!("DATABASE_URL not set, orders are kept in memory");
            serve(&config, InMemoryOrderRepository::new(), metrics_handle).await?;
        }
    }

    tracing::info!("server shut down gracefully");
    Ok(())
}
