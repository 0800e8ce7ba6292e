//! Route table for the credential endpoints.

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

use super::handlers;
use super::middleware::require_session;

/// Public credential endpoints plus the gated profile route. Path and field
/// names are the wire contract the tracking frontend already speaks.
pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/perfil", get(handlers::profile))
        .route_layer(from_fn_with_state(state, require_session));

    Router::new()
        .route("/usuario", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/recuperar-password", post(handlers::request_recovery))
        .route("/restablecer-password/:token", post(handlers::reset_password))
        .merge(protected)
}
