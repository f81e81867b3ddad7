//! # HTTP Server
//!
//! Combines the squat routes and the health route into one axum router,
//! with permissive cross-origin headers on every response.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::middleware::map_response;
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use super::config::HttpServerConfig;
use super::observability_routes::health_routes;
use super::squat_routes::squat_routes;
use crate::ledger::Ledger;
use crate::observability::{log_event, log_event_with_fields, Event};

/// HTTP Server for the squat record API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server around a recovered ledger
    pub fn new(config: HttpServerConfig, ledger: Arc<Ledger>) -> Self {
        let router = build_router(ledger);
        Self { config, router }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until Ctrl-C.
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr).await?;

        log_event_with_fields(Event::Serving, &[("addr", addr.as_str())]);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        log_event(Event::ShutdownComplete);
        Ok(())
    }
}

/// Build the combined router with all endpoints
pub fn build_router(ledger: Arc<Ledger>) -> Router {
    // Answers preflight requests
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .merge(health_routes(ledger.clone()))
        .nest("/api", squat_routes(ledger))
        .layer(
            ServiceBuilder::new()
                .layer(map_response(add_cors_headers))
                .layer(cors),
        )
}

/// Every response, errors included, carries the cross-origin headers
async fn add_cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

async fn shutdown_signal() {
    // An error here means no signal handler; keep serving until killed
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::durable_log::{DurableLog, SchemaPolicy};
    use tempfile::TempDir;

    fn ledger(dir: &TempDir) -> Arc<Ledger> {
        let log = DurableLog::new(dir.path().join("squats.csv"), SchemaPolicy::Evolve);
        Arc::new(Ledger::open(log).unwrap())
    }

    #[test]
    fn test_server_with_custom_port() {
        let dir = TempDir::new().unwrap();
        let server = HttpServer::new(HttpServerConfig::with_port(8080), ledger(&dir));
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_router_builds() {
        let dir = TempDir::new().unwrap();
        let server = HttpServer::new(HttpServerConfig::default(), ledger(&dir));
        let _router = server.router();
        // If we get here, router construction succeeded
    }
}
