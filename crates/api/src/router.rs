//! HTTP surface of the server: health check, the `/api/v1` tree and the
//! middleware around them.
//!
//! [`build_app_router`] is shared by `main.rs` and the integration tests so
//! both run the same stack.

use std::time::Duration;

use axum::extract::Request;
use axum::http::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode, Uri};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Query parameter that carries the access token for socket clients.
const TOKEN_PARAM: &str = "access_token";

/// Build the application [`Router`].
///
/// Layers, outermost first: CORS, request id, tracing, request id echo,
/// timeout, panic recovery. The timeout only bounds the upgrade handshake of
/// a socket route; the streaming that follows runs outside it.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::new(REQUEST_ID))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(REQUEST_ID, MakeRequestUuid))
        .layer(build_cors_layer(config))
        .with_state(state)
}

/// Span for one request. The URI is logged through [`loggable_uri`] so
/// socket tokens never reach the logs.
fn request_span(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get(&REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %loggable_uri(request.uri()),
        request_id,
    )
}

/// Path and query of `uri` with the value of `access_token` masked.
pub fn loggable_uri(uri: &Uri) -> String {
    let Some(query) = uri.query() else {
        return uri.path().to_string();
    };
    let masked: Vec<&str> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((TOKEN_PARAM, _)) => "access_token=[redacted]",
            _ => pair,
        })
        .collect();
    format!("{}?{}", uri.path(), masked.join("&"))
}

/// CORS for the browser client.
///
/// `Content-Disposition` is exposed so artifact downloads can use the
/// server's filename. Panics at startup if a configured origin is invalid.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([CONTENT_DISPOSITION, REQUEST_ID])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_masked_in_logged_uri() {
        let uri: Uri = "/api/v1/ws/chat/4?access_token=eyJhbGc.secret&x=1"
            .parse()
            .unwrap();
        assert_eq!(
            loggable_uri(&uri),
            "/api/v1/ws/chat/4?access_token=[redacted]&x=1"
        );
    }

    #[test]
    fn other_queries_are_logged_verbatim() {
        let plain: Uri = "/api/v1/chats".parse().unwrap();
        assert_eq!(loggable_uri(&plain), "/api/v1/chats");

        let query: Uri = "/api/v1/chats?archived=true&my_access_token=1".parse().unwrap();
        assert_eq!(
            loggable_uri(&query),
            "/api/v1/chats?archived=true&my_access_token=1"
        );
    }
}
