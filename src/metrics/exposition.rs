// src/metrics/exposition.rs
use super::MetricsRegistry;
use anyhow::{Context, Result};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, Request, Response, Server, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

/// Bind `addr` and serve the registry at `path` on a background task.
pub fn start_metrics_server(addr: SocketAddr, registry: MetricsRegistry, path: String) -> Result<()> {
    let registry = Arc::new(registry);
    let metrics_path = Arc::new(path); // keep this for logging
    let service_path = metrics_path.clone(); // clone for the service closure

    let make_service = hyper::service::make_service_fn(move |_| {
        let registry = registry.clone();
        let path = service_path.clone();

        async move {
            Ok::<_, Infallible>(hyper::service::service_fn(move |req: Request<Body>| {
                let registry = registry.clone();
                let path = path.clone();

                async move { Ok::<_, Infallible>(metrics_response(&registry, &path, &req)) }
            }))
        }
    });

    let server = Server::try_bind(&addr)
        .with_context(|| format!("Failed to bind metrics server on {}", addr))?
        .serve(make_service);

    info!(
        "Metrics server listening on http://{}{}",
        addr,
        metrics_path.as_str()
    );

    tokio::spawn(async move {
        if let Err(e) = server.await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(())
}

pub fn metrics_response(registry: &MetricsRegistry, path: &str, req: &Request<Body>) -> Response<Body> {
    if req.uri().path() != path {
        let mut response = Response::new(Body::from("Not Found"));
        *response.status_mut() = StatusCode::NOT_FOUND;
        return response;
    }

    match registry.gather() {
        Ok(metrics) => {
            let mut response = Response::new(Body::from(metrics));
            if let Ok(content_type) = HeaderValue::from_str(&registry.content_type()) {
                response.headers_mut().insert(CONTENT_TYPE, content_type);
            }
            response
        }
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}
