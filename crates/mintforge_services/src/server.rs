use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use tracing::info;

use crate::handlers::{AppState, handle_request};

/// HTTP API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub listen_addr: SocketAddr,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8560".parse().expect("valid default address"),
        }
    }
}

/// The compile/pin/receipt/stats HTTP service.
pub struct ApiServer {
    config: ApiConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: ApiConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// Bind and serve until the process exits.
    pub async fn serve(self) -> Result<()> {
        let state = self.state.clone();
        let make_svc = make_service_fn(move |_| {
            let state = state.clone();
            async move {
                Ok::<_, hyper::Error>(service_fn(move |req| {
                    let state = state.clone();
                    async move { route(state, req).await }
                }))
            }
        });

        info!(addr = %self.config.listen_addr, "starting HTTP API");
        Server::try_bind(&self.config.listen_addr)
            .with_context(|| format!("cannot bind {}", self.config.listen_addr))?
            .serve(make_svc)
            .await
            .context("HTTP API terminated")?;
        Ok(())
    }
}

async fn route(state: Arc<AppState>, req: Request<Body>) -> Result<Response<Body>, hyper::Error> {
    // Browser clients call these endpoints cross-origin.
    let builder = Response::builder()
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type");

    if req.method() == Method::OPTIONS {
        return Ok(builder
            .status(StatusCode::OK)
            .body(Body::empty())
            .expect("static response"));
    }

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    let body_bytes = hyper::body::to_bytes(req.into_body()).await?;
    let (status, payload) =
        handle_request(&state, &method, &path, query.as_deref(), &body_bytes).await;

    Ok(builder
        .status(status)
        .body(Body::from(payload.to_string()))
        .expect("serialized response"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_binds_loopback() {
        let config = ApiConfig::default();
        assert!(config.listen_addr.ip().is_loopback());
        assert_eq!(config.listen_addr.port(), 8560);
    }
}
