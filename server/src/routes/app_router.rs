use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::{request_tracing, ServerState};

use super::handlers::{auth, emails, replies};

pub struct AppRouter;

impl AppRouter {
    pub fn create(state: ServerState, allowed_origins: &[String]) -> Router {
        let origins = allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin {}", origin);
                    None
                }
            })
            .collect::<Vec<_>>();

        let cors_layer = CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true);

        Router::new()
            .route("/", get(|| async { "Inbox reply server" }))
            .route("/auth/generate-url", post(auth::handler_generate_url))
            .route("/auth/exchange-token", post(auth::handler_exchange_token))
            .nest(
                "/emails",
                Router::new()
                    .route("/ingest", get(emails::ingest))
                    .route("/message", get(emails::get_message))
                    .route("/file", get(emails::get_file))
                    .route("/generate-replies", get(emails::generate_replies))
                    .route("/generate-replies/:job_id", get(emails::get_reply_job)),
            )
            .route("/replies", get(replies::get_all))
            .layer(request_tracing::trace_with_request_id_layer())
            .layer(cors_layer)
            .with_state(state)
            .fallback(handler_404)
    }
}

pub async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Route does not exist")
}
