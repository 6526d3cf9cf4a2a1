pub mod auth;
pub mod health;
pub mod messages;

use crate::state::AppState;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config().client_url);
    Router::new()
        .merge(health::routes())
        .merge(messages::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(client_url: &str) -> CorsLayer {
    let Ok(origin) = HeaderValue::from_str(client_url) else {
        warn!(%client_url, "client url is not a valid origin; CORS disabled");
        return CorsLayer::new();
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}
