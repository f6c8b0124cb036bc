use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{products, users};
use crate::middleware::authenticate;
use crate::state::AppState;

/// Assemble the full route table over a prepared [`AppState`].
///
/// Lives in the library so tests can stand the router up in-process with a
/// substitute [`crate::media::AssetStore`].
pub fn app(state: AppState, body_limit: usize) -> Router {
    let protected = Router::new()
        .route("/products/create", post(products::create))
        .route("/logout", post(users::logout))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            authenticate,
        ));

    Router::new()
        .route("/health", get(health))
        // Product routes
        .route("/get-all", get(products::get_all))
        .route("/get-one/:id", get(products::get_one))
        .route("/update/:id", put(products::update))
        .route("/delete/:id", delete(products::delete))
        // User routes
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/users/get-one/:id", get(users::get_one))
        .route("/users/update/:id", put(users::update))
        .merge(protected)
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
