//! Bearer-token gate for protected routes.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::AppError;
use crate::AppState;

use super::token;

/// Verify the `Authorization` credential and stash the claims in the request
/// extensions for handlers. A missing credential and a bad one fail differently
/// on purpose: 401 for the first, 403 for the second.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Unauthenticated)?;

    let bearer = header.strip_prefix("Bearer ").ok_or(AppError::Forbidden)?;
    let claims = token::verify_session(&state.keys, bearer).map_err(|_| AppError::Forbidden)?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
