// src/server/cors.rs
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
    ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, CONTENT_TYPE, ORIGIN, VARY,
};
use hyper::{Body, Method, Request, Response, StatusCode};

const ALLOW_METHODS: &str = "DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT";
const MAX_AGE: &str = "600";

/// Origin allow-list with credentials, any method and any header permitted.
#[derive(Debug, Clone)]
pub struct Cors {
    allowed_origins: Vec<String>,
}

impl Cors {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed_origins
            .iter()
            .any(|allowed| allowed == "*" || allowed == origin)
    }

    pub fn is_preflight(req: &Request<Body>) -> bool {
        req.method() == Method::OPTIONS
            && req.headers().contains_key(ORIGIN)
            && req.headers().contains_key(ACCESS_CONTROL_REQUEST_METHOD)
    }

    pub fn preflight(&self, req: &Request<Body>) -> Response<Body> {
        let origin = req.headers().get(ORIGIN).cloned();
        let allowed = origin
            .as_ref()
            .and_then(|o| o.to_str().ok())
            .map(|o| self.is_allowed(o))
            .unwrap_or(false);

        let (status, body) = if allowed {
            (StatusCode::OK, "OK")
        } else {
            tracing::debug!(?origin, "rejecting CORS preflight");
            (StatusCode::BAD_REQUEST, "Disallowed CORS origin")
        };

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        let headers = response.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE));
        headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        headers.append(VARY, HeaderValue::from_static("Origin"));
        if let Some(requested) = req.headers().get(ACCESS_CONTROL_REQUEST_HEADERS) {
            headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
        }
        if !allowed {
            return response;
        }
        self.apply(origin.as_ref(), &mut response);
        response
    }

    /// Add the allow headers to a normal response when `origin` is permitted.
    pub fn apply(&self, origin: Option<&HeaderValue>, response: &mut Response<Body>) {
        let Some(origin) = origin else {
            return;
        };
        let permitted = origin.to_str().map(|o| self.is_allowed(o)).unwrap_or(false);
        if !permitted {
            return;
        }

        let headers = response.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        if !headers.get_all(VARY).iter().any(|v| v == "Origin") {
            headers.append(VARY, HeaderValue::from_static("Origin"));
        }
    }
}
