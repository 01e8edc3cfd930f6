use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::api::state::AppState;

use super::handlers;
use super::middleware::v1_auth_middleware;

pub fn v1_router(state: AppState) -> Router<AppState> {
    let conversations = Router::new()
        .route("/", post(handlers::conversation::create_conversation))
        .route(
            "/{conversationId}/messages",
            get(handlers::conversation::list_messages).post(handlers::conversation::send_message),
        );

    let personas = Router::new()
        .route("/", get(handlers::persona::list_personas))
        .route("/{personaId}", get(handlers::persona::get_persona));

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .route("/search", post(handlers::search::search))
        .nest("/conversations", conversations)
        .nest("/personas", personas)
        .merge(super::openapi::redoc_router());

    let protected_routes = Router::new()
        .route("/admin/index", get(handlers::admin::index_stats))
        .route("/admin/index:rebuild", post(handlers::admin::rebuild_index))
        .route_layer(middleware::from_fn_with_state(state, v1_auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
