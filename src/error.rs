use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::notify::NotifyError;
use crate::store::StoreError;
use crate::validation::ValidationError;

/// Every failure a request can surface, one variant per client-visible outcome.
///
/// The `Display` string of a variant is exactly the message the client receives;
/// internal causes stay in the logs.
#[derive(Debug, Error)]
pub enum AppError {
    /// Protected route hit without a credential.
    #[error("Acceso denegado, token requerido")]
    Unauthenticated,

    /// Credential was presented but the session token did not verify.
    #[error("Token inválido")]
    Forbidden,

    /// Login rejected. Unknown email and wrong password both land here.
    #[error("Credenciales incorrectas")]
    Unauthorized,

    #[error("{0}")]
    NotFound(&'static str),

    /// Unique-field collision, in practice a duplicate registration email.
    #[error("El correo ya está registrado")]
    Conflict,

    /// Reset-token redemption failure. All causes collapse into this variant so
    /// the response reveals nothing about accounts or prior redemptions.
    #[error("Token inválido o expirado")]
    InvalidToken,

    #[error("No se pudo enviar el correo")]
    Delivery(#[source] NotifyError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Error en el servidor")]
    Internal(#[source] InternalError),
}

/// Causes the client never sees in detail.
#[derive(Debug, Error)]
pub enum InternalError {
    #[error(transparent)]
    Store(StoreError),
    #[error("password hashing failed: {0}")]
    PasswordHash(argon2::password_hash::Error),
    #[error("token encoding failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("stored row did not match the user model: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("credential task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::InvalidToken | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Delivery(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(inner: StoreError) -> Self {
        match inner {
            StoreError::Conflict(_) => AppError::Conflict,
            other => AppError::Internal(InternalError::Store(other)),
        }
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(inner: argon2::password_hash::Error) -> Self {
        AppError::Internal(InternalError::PasswordHash(inner))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(inner: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(InternalError::Jwt(inner))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(inner: serde_json::Error) -> Self {
        AppError::Internal(InternalError::Decode(inner))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(inner: tokio::task::JoinError) -> Self {
        AppError::Internal(InternalError::Join(inner))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Internal(cause) => {
                tracing::error!(error = %cause, "request failed");
            }
            AppError::Delivery(cause) => {
                tracing::error!(error = %cause, "recovery mail was not delivered");
            }
            _ => {}
        }

        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(AppError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::NotFound("Usuario no encontrado").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn login_failure_message_is_generic() {
        // One message for unknown email and wrong password alike.
        assert_eq!(AppError::Unauthorized.to_string(), "Credenciales incorrectas");
    }

    #[test]
    fn store_conflict_becomes_conflict() {
        let err = AppError::from(StoreError::Conflict("usuario".into()));
        assert!(matches!(err, AppError::Conflict));
    }

    #[test]
    fn other_store_errors_stay_internal() {
        let err = AppError::from(StoreError::UnknownTable("usuarios".into()));
        assert!(matches!(err, AppError::Internal(InternalError::Store(_))));
        assert_eq!(err.to_string(), "Error en el servidor");
    }
}
