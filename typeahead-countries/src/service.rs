// typeahead-countries/src/service.rs
//
// Request routing for the country endpoint.
// Every response is JSON and carries permissive CORS headers, errors included.

use crate::dataset;
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE, HeaderValue,
};
use hyper::{Method, Request, Response, StatusCode};
use serde::Serialize;
use std::convert::Infallible;

pub const COUNTRIES_PATH: &str = "/api/countries";

const INTERNAL_ERROR_BODY: &[u8] = br#"{"error":"Internal error"}"#;

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// hyper entry point. Never fails; faults become a 500 response.
pub async fn handle<B>(req: Request<B>) -> Result<Response<Full<Bytes>>, Infallible> {
    let response = route(req.method(), req.uri().path(), req.uri().query());
    tracing::debug!(
        "{} {} -> {}",
        req.method(),
        req.uri(),
        response.status().as_u16()
    );
    Ok(response)
}

/// Pure routing, separated from hyper's body types for tests.
pub fn route(method: &Method, path: &str, query: Option<&str>) -> Response<Full<Bytes>> {
    if path != COUNTRIES_PATH {
        return json_response(StatusCode::NOT_FOUND, &ErrorBody { error: "Not found" });
    }

    match *method {
        Method::GET => {
            let q = query.and_then(q_param);
            let names = dataset::search(q.as_deref());
            json_response(StatusCode::OK, &names)
        }
        Method::OPTIONS => {
            let mut resp = Response::new(Full::new(Bytes::new()));
            *resp.status_mut() = StatusCode::NO_CONTENT;
            with_cors(resp)
        }
        _ => json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &ErrorBody {
                error: "Method not allowed",
            },
        ),
    }
}

/// Decoded value of the first `q` parameter.
fn q_param(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "q")
        .map(|(_, value)| value.into_owned())
}

fn json_response<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            let mut resp = Response::new(Full::new(Bytes::from(bytes)));
            *resp.status_mut() = status;
            resp.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            with_cors(resp)
        }
        Err(e) => {
            tracing::error!("Failed to encode response: {}", e);
            internal_error()
        }
    }
}

pub fn internal_error() -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::from_static(INTERNAL_ERROR_BODY)));
    *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    with_cors(resp)
}

fn with_cors(mut resp: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    let headers = resp.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    resp
}
