// src/server/handler.rs
use hyper::header::{HeaderValue, ORIGIN};
use hyper::{Body, Request, Response};
use std::sync::Arc;
use tower::Service;
use tracing::{debug, info};

use super::cors::Cors;
use super::routes::{dispatch, Route};
use crate::config::ServerConfig;
use crate::metrics::{MetricsCollector, Timer};

pub const REQUEST_ID: &str = "x-request-id";

struct AppState {
    prefix: String,
    message: String,
    cors: Cors,
    metrics: Option<Arc<MetricsCollector>>,
}

#[derive(Clone)]
pub struct RequestHandler {
    state: Arc<AppState>,
}

impl RequestHandler {
    pub fn new(config: &ServerConfig, metrics: Option<Arc<MetricsCollector>>) -> Self {
        Self {
            state: Arc::new(AppState {
                prefix: config.prefix.clone(),
                message: config.message.clone(),
                cors: Cors::new(config.allowed_origins.clone()),
                metrics,
            }),
        }
    }

    async fn handle(state: Arc<AppState>, req: Request<Body>) -> Response<Body> {
        let timer = Timer::new();
        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        let request_id = req
            .headers()
            .get(REQUEST_ID)
            .cloned()
            .unwrap_or_else(new_request_id);

        let route = Route::resolve(&state.prefix, &path);
        let mut response = if Cors::is_preflight(&req) {
            debug!(%path, "CORS preflight");
            state.cors.preflight(&req)
        } else {
            let mut response = dispatch(route, &method, &state.message);
            state.cors.apply(req.headers().get(ORIGIN), &mut response);
            response
        };
        response.headers_mut().insert(REQUEST_ID, request_id.clone());

        let status = response.status();
        if let Some(metrics) = &state.metrics {
            metrics.record_request(
                method.as_str(),
                Route::label(route),
                status.as_u16(),
                timer.elapsed(),
            );
        }
        info!(
            request_id = request_id.to_str().unwrap_or("-"),
            %method,
            %path,
            status = status.as_u16(),
            "handled request"
        );

        response
    }
}

fn new_request_id() -> HeaderValue {
    let id = uuid::Uuid::new_v4().to_string();
    // A hyphenated UUID is always a valid header value.
    HeaderValue::from_str(&id).unwrap_or_else(|_| HeaderValue::from_static("-"))
}

impl Service<Request<Body>> for RequestHandler {
    type Response = Response<Body>;
    type Error = Box<dyn std::error::Error + Send + Sync>;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let state = self.state.clone();
        Box::pin(async move { Ok(Self::handle(state, req).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsRegistry;
    use hyper::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_METHOD};
    use hyper::{Method, StatusCode};
    use tower::ServiceExt;

    fn handler_with_prefix(prefix: &str) -> RequestHandler {
        let config = ServerConfig {
            prefix: prefix.to_string(),
            ..ServerConfig::default()
        };
        RequestHandler::new(&config, None)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_prefixed_routes() {
        let handler = handler_with_prefix("/api");

        let response = handler.clone().oneshot(get("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = handler.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_request_id_echoed_or_generated() {
        let handler = handler_with_prefix("");

        let req = Request::get("/")
            .header(REQUEST_ID, "abc-123")
            .body(Body::empty())
            .unwrap();
        let response = handler.clone().oneshot(req).await.unwrap();
        assert_eq!(response.headers()[REQUEST_ID], "abc-123");

        let response = handler.oneshot(get("/")).await.unwrap();
        let generated = response.headers()[REQUEST_ID].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(generated).is_ok());
    }

    #[tokio::test]
    async fn test_cors_on_simple_and_preflight_requests() {
        let handler = handler_with_prefix("");

        let req = Request::get("/health")
            .header(ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let response = handler.clone().oneshot(req).await.unwrap();
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:5173");

        let preflight = Request::builder()
            .method(Method::OPTIONS)
            .uri("/health")
            .header(ORIGIN, "http://localhost:5173")
            .header(ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();
        let response = handler.clone().oneshot(preflight).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let plain_options = Request::builder()
            .method(Method::OPTIONS)
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = handler.oneshot(plain_options).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_requests_are_recorded() {
        let registry = MetricsRegistry::new().unwrap();
        let config = ServerConfig {
            prefix: "/api".to_string(),
            ..ServerConfig::default()
        };
        let handler = RequestHandler::new(&config, Some(registry.collector()));

        handler.clone().oneshot(get("/api/health")).await.unwrap();
        handler.oneshot(get("/nowhere")).await.unwrap();

        let text = String::from_utf8(registry.gather().unwrap()).unwrap();
        assert!(text.contains(r#"api_http_requests_total{method="GET",path="/health",status="200"} 1"#));
        assert!(text.contains(r#"api_http_requests_total{method="GET",path="unmatched",status="404"} 1"#));
    }

    #[tokio::test]
    async fn test_extension_methods_do_not_grow_metrics() {
        let registry = MetricsRegistry::new().unwrap();
        let handler = RequestHandler::new(&ServerConfig::default(), Some(registry.collector()));

        for i in 0..20 {
            let method = Method::from_bytes(format!("X{i}").as_bytes()).unwrap();
            let req = Request::builder()
                .method(method)
                .uri("/health")
                .body(Body::empty())
                .unwrap();
            let response = handler.clone().oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        }

        let text = String::from_utf8(registry.gather().unwrap()).unwrap();
        assert!(text.contains(
            r#"api_http_requests_total{method="other",path="/health",status="405"} 20"#
        ));
        assert!(!text.contains(r#"method="X0""#));
    }
}
