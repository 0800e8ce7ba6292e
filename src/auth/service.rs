//! Credential lifecycle orchestration: registration, login, recovery and
//! redemption over the resource store and the notifier.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::error::AppError;
use crate::models::user::{CreateUser, User, PASSENGER_ROLE, SHARED_VEHICLE};
use crate::notify::Notifier;
use crate::store::{tables, Record, ResourceStore};

use super::password;
use super::token::{self, TokenKeys};

pub struct AuthService {
    store: Arc<dyn ResourceStore>,
    notifier: Arc<dyn Notifier>,
    keys: TokenKeys,
    reset_link_base: String,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn ResourceStore>,
        notifier: Arc<dyn Notifier>,
        keys: TokenKeys,
        reset_link_base: String,
    ) -> Self {
        Self {
            store,
            notifier,
            keys,
            reset_link_base,
        }
    }

    /// Create an account. The stored record carries the hash, never the
    /// plaintext. Passenger accounts are pinned to the shared fleet vehicle
    /// whatever vehicle the request names.
    pub async fn register(&self, new_user: CreateUser) -> Result<i64, AppError> {
        let hashed = password::hash(&new_user.password)?;
        let id_vehiculo = if new_user.id_tipo == PASSENGER_ROLE {
            Some(SHARED_VEHICLE)
        } else {
            new_user.id_vehiculo
        };

        let mut record = Record::new();
        record.insert("nombre".into(), Value::from(new_user.nombre));
        record.insert("ap_pat".into(), nullable(new_user.ap_pat));
        record.insert("ap_mat".into(), nullable(new_user.ap_mat));
        record.insert("email".into(), Value::from(new_user.email));
        record.insert("password".into(), Value::from(hashed));
        record.insert("n_tel".into(), nullable(new_user.n_tel));
        record.insert("id_tipo".into(), Value::from(new_user.id_tipo));
        record.insert(
            "id_vehiculo".into(),
            id_vehiculo.map(Value::from).unwrap_or(Value::Null),
        );

        let id = self.store.insert(tables::USUARIO, &record).await?;
        tracing::info!(user = id, "account registered");
        Ok(id)
    }

    /// Verify the credential and mint a session. Unknown email and wrong
    /// password are indistinguishable from outside: same error, same cost.
    pub async fn login(&self, email: &str, plain: &str) -> Result<(String, User), AppError> {
        let found = self
            .store
            .find_by_field(tables::USUARIO, "email", &Value::from(email))
            .await?;
        let Some(record) = found else {
            password::verify_dummy(plain);
            return Err(AppError::Unauthorized);
        };

        let user = decode_user(record)?;
        if !password::verify(plain, &user.password) {
            return Err(AppError::Unauthorized);
        }

        let session = token::issue_session(&self.keys, &user)?;
        tracing::info!(user = user.id_u, "session issued");
        Ok((session, user))
    }

    /// Mint a reset token and mail the recovery link. An unknown address is
    /// reported as such; a delivery failure is its own error.
    pub async fn request_recovery(&self, email: &str) -> Result<(), AppError> {
        let found = self
            .store
            .find_by_field(tables::USUARIO, "email", &Value::from(email))
            .await?;
        let Some(record) = found else {
            return Err(AppError::NotFound("Correo no registrado"));
        };
        let user = decode_user(record)?;

        let reset = token::issue_reset(&self.keys, user.id_u)?;
        let link = format!("{}/{}", self.reset_link_base, reset);
        let body = format!(
            "<p>Para restablecer tu contraseña, haz clic en el siguiente enlace:</p>\
             <a href=\"{link}\">Restablecer contraseña</a>\
             <p>Este enlace expirará en 1 hora.</p>"
        );

        self.notifier
            .send(&user.email, "Recuperación de contraseña", &body)
            .await
            .map_err(AppError::Delivery)?;
        tracing::info!(user = user.id_u, "recovery mail sent");
        Ok(())
    }

    /// Redeem a reset token and overwrite the credential. Every failure
    /// collapses into [`AppError::InvalidToken`], so redemption reveals nothing
    /// about accounts or earlier redemptions.
    pub async fn reset_password(&self, reset: &str, new_password: &str) -> Result<(), AppError> {
        let claims = token::verify_reset(&self.keys, reset).map_err(|_| AppError::InvalidToken)?;

        let found = self.store.find_by_id(tables::USUARIO, claims.sub).await?;
        let Some(record) = found else {
            return Err(AppError::InvalidToken);
        };
        let user = decode_user(record)?;

        // A token minted at or before the last credential overwrite is spent.
        if user
            .password_changed_at
            .is_some_and(|changed| claims.iat <= changed)
        {
            return Err(AppError::InvalidToken);
        }

        let hashed = password::hash(new_password)?;
        let mut changes = Record::new();
        changes.insert("password".into(), Value::from(hashed));
        changes.insert(
            "password_changed_at".into(),
            Value::from(Utc::now().timestamp()),
        );

        let affected = self
            .store
            .update(tables::USUARIO, claims.sub, &changes)
            .await?;
        if affected == 0 {
            return Err(AppError::InvalidToken);
        }
        tracing::info!(user = claims.sub, "credential overwritten via recovery");
        Ok(())
    }

    pub async fn profile(&self, user_id: i64) -> Result<User, AppError> {
        let found = self.store.find_by_id(tables::USUARIO, user_id).await?;
        let Some(record) = found else {
            return Err(AppError::NotFound("Usuario no encontrado"));
        };
        decode_user(record)
    }
}

fn decode_user(record: Record) -> Result<User, AppError> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

fn nullable(value: Option<String>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}
