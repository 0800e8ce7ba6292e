//! HTTP handlers for the credential endpoints. Thin: validate the body, hand
//! off to the service, shape the response.

use std::future::Future;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::models::user::{
    AuthResponse, CreateUser, LoginPayload, RecoveryRequest, ResetPayload, User,
};
use crate::validation;
use crate::AppState;

use super::token::SessionClaims;

/// Run a credential flow to completion even if the client goes away. Axum drops
/// the handler future on disconnect; the spawned task keeps running, so a flow
/// either happens with all its effects or not at all.
async fn run_detached<T, F>(flow: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(flow).await.map_err(AppError::from)?
}

/// `POST /usuario`
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CreateUser>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    validation::validate_new_user(&payload)?;
    run_detached(async move { state.auth.register(payload).await }).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Registro creado exitosamente" })),
    ))
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    validation::validate_login(&payload)?;
    let (token, usuario) =
        run_detached(async move { state.auth.login(&payload.email, &payload.password).await })
            .await?;
    Ok(Json(AuthResponse {
        message: "Login exitoso",
        token,
        usuario,
    }))
}

/// `POST /recuperar-password`
pub async fn request_recovery(
    State(state): State<AppState>,
    Json(payload): Json<RecoveryRequest>,
) -> Result<Json<Value>, AppError> {
    validation::validate_email(&payload.email)?;
    run_detached(async move { state.auth.request_recovery(&payload.email).await }).await?;
    Ok(Json(
        json!({ "message": "Correo enviado. Revisa tu bandeja de entrada." }),
    ))
}

/// `POST /restablecer-password/:token`
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPayload>,
) -> Result<Json<Value>, AppError> {
    validation::validate_password(&payload.new_password)?;
    run_detached(async move { state.auth.reset_password(&token, &payload.new_password).await })
        .await?;
    Ok(Json(
        json!({ "message": "Contraseña actualizada correctamente" }),
    ))
}

/// `GET /perfil`. Runs behind the session gate; claims arrive via extensions.
pub async fn profile(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<Json<User>, AppError> {
    let user = run_detached(async move { state.auth.profile(claims.sub).await }).await?;
    Ok(Json(user))
}
