use crate::config::MetricsConfig;
use crate::{MetricsError, Result};
use axum::{routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::future::Future;
use tracing::info;

/// Serves the facade's Prometheus metrics over HTTP
pub struct MetricsServer {
    config: MetricsConfig,
}

impl MetricsServer {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    /// Install the global recorder and register descriptions.
    ///
    /// Fails if a recorder is already installed in this process.
    pub fn install_recorder() -> Result<PrometheusHandle> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| MetricsError::Recorder(e.to_string()))?;
        crate::describe();
        Ok(handle)
    }

    pub fn router(handle: PrometheusHandle) -> Router {
        Router::new()
            .route("/metrics", get(move || metrics_handler(handle.clone())))
            .route("/health", get(health_handler))
    }

    /// Serve until the process exits
    pub async fn run(self) -> Result<()> {
        let handle = Self::install_recorder()?;
        self.serve(handle, std::future::pending()).await
    }

    /// Serve until `shutdown` resolves
    pub async fn serve<F>(self, handle: PrometheusHandle, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.address();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| MetricsError::Server(format!("bind {addr}: {e}")))?;

        info!(address = %addr, "Starting metrics server");

        axum::serve(listener, Self::router(handle))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| MetricsError::Server(e.to_string()))?;

        info!("Metrics server stopped");
        Ok(())
    }
}

async fn metrics_handler(handle: PrometheusHandle) -> String {
    handle.render()
}

async fn health_handler() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let server = MetricsServer::new(MetricsConfig {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 0,
        });

        server
            .serve(recorder.handle(), async {})
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let server = MetricsServer::new(MetricsConfig {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: taken.local_addr().unwrap().port(),
        });
        let recorder = PrometheusBuilder::new().build_recorder();
        let err = server.serve(recorder.handle(), async {}).await.unwrap_err();
        assert!(matches!(err, MetricsError::Server(_)));
    }
}
