use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use super::{social, tabs, users};
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Identity
        .route("/users", post(users::register))
        .route("/sessions", post(users::login))
        .route("/sessions", delete(users::logout))
        .route("/account", get(users::get_account))
        .route("/account", patch(users::update_account))
        .route("/account", delete(users::delete_account))
        // Tabs
        .route("/tabs", get(tabs::list_tabs))
        .route("/tabs", post(tabs::create_tab))
        .route("/tabs/{id}", get(tabs::get_tab))
        .route("/tabs/{id}", put(tabs::update_tab))
        .route("/tabs/{id}", delete(tabs::delete_tab))
        // Social graph
        .route("/users/{id}", get(social::user_profile))
        .route("/users/{id}/follow", post(social::toggle_follow))
        .route("/users/{id}/followers", get(social::list_followers))
        .route("/users/{id}/following", get(social::list_following))
        .route("/tabs/{id}/favorite", post(social::toggle_favorite))
        .route("/favorites", get(social::list_favorites))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        // Legacy mobile API, kept at its original path
        .route("/api/tabs", get(tabs::legacy_list_tabs))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
