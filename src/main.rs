use anyhow::Context;
use dotenvy::dotenv;

use schoolyard::logging::init_tracing;
use schoolyard::metrics::{init_metrics, metrics_app};
use schoolyard::router::init_router;
use schoolyard::state::init_app_state;
use schoolyard_config::{DatabaseConfig, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let server = ServerConfig::from_env();
    init_tracing(server.observability_enabled).context("failed to initialise logging")?;

    let state = init_app_state(&DatabaseConfig::from_env())
        .await
        .context("failed to connect to the database")?;

    if server.observability_enabled {
        let handle = init_metrics().context("failed to install the metrics recorder")?;
        let metrics_address = format!("{}:{}", server.host, server.metrics_port);
        let listener = tokio::net::TcpListener::bind(&metrics_address)
            .await
            .with_context(|| format!("failed to bind metrics listener on {metrics_address}"))?;
        tracing::info!(address = %metrics_address, "Metrics exporter listening");
        tokio::spawn(async move {
            if let Err(error) = axum::serve(listener, metrics_app(handle)).await {
                tracing::error!(%error, "Metrics server stopped");
            }
        });
    }

    let app = init_router(state);
    let address = server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    tracing::info!(address = %address, "Server running");
    tracing::info!("Scalar UI available at http://{address}/scalar");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
