// src/server/routes.rs
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::{Body, Method, Response, StatusCode};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Root,
    Health,
}

impl Route {
    /// Resolve `path` against routes mounted under `prefix`.
    pub fn resolve(prefix: &str, path: &str) -> Option<Route> {
        let rest = path.strip_prefix(prefix)?;
        match rest {
            "" | "/" => Some(Route::Root),
            "/health" => Some(Route::Health),
            _ => None,
        }
    }

    /// Metric label, independent of the mount prefix.
    pub fn label(route: Option<Route>) -> &'static str {
        match route {
            Some(Route::Root) => "/",
            Some(Route::Health) => "/health",
            None => "unmatched",
        }
    }
}

pub fn dispatch(route: Option<Route>, method: &Method, message: &str) -> Response<Body> {
    let Some(route) = route else {
        return json_response(StatusCode::NOT_FOUND, &json!({"detail": "Not Found"}));
    };

    if method != Method::GET && method != Method::HEAD {
        let mut response = json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &json!({"detail": "Method Not Allowed"}),
        );
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
        return response;
    }

    let body = match route {
        Route::Root => json!({"message": message}),
        Route::Health => json!({"status": "ok"}),
    };

    let mut response = json_response(StatusCode::OK, &body);
    if method == Method::HEAD {
        *response.body_mut() = Body::empty();
    }
    response
}

fn json_response(status: StatusCode, body: &Value) -> Response<Body> {
    let mut response = Response::new(Body::from(body.to_string()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
