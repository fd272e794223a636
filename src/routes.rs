// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{attempt, auth, quiz, result},
    state::AppState,
    utils::jwt::{auth_middleware, optional_auth_middleware},
};

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Assembles the main application router.
///
/// * Quiz browsing and attempt navigation are public.
/// * Creating quizzes, submitting attempts and reading results need a bearer token.
/// * Applies global middleware (Trace, CORS) and injects the shared state.
pub fn create_router(state: AppState) -> Router {
    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);
    let optional_auth = middleware::from_fn_with_state(state.clone(), optional_auth_middleware);

    let auth_routes = Router::new().route("/me", get(auth::me).route_layer(optional_auth.clone()));

    let quiz_routes = Router::new()
        .route(
            "/",
            get(quiz::list_quizzes).merge(post(quiz::create_quiz).route_layer(require_auth.clone())),
        )
        .route("/{id}", get(quiz::get_quiz))
        .route(
            "/{id}/attempts",
            post(attempt::start_attempt).route_layer(optional_auth),
        )
        .route(
            "/{id}/results/latest",
            get(result::get_latest_result).route_layer(require_auth.clone()),
        );

    let attempt_routes = Router::new()
        .route(
            "/{id}",
            get(attempt::get_attempt).delete(attempt::discard_attempt),
        )
        .route("/{id}/answer", put(attempt::select_answer))
        .route("/{id}/next", post(attempt::go_next))
        .route("/{id}/previous", post(attempt::go_previous))
        .route("/{id}/position", put(attempt::set_position))
        .route(
            "/{id}/submit",
            post(attempt::submit_attempt).route_layer(require_auth),
        );

    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/api/health", get(auth::health))
        .nest("/api/auth", auth_routes)
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/attempts", attempt_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
