//! Request body validation for the credential endpoints.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::models::user::{CreateUser, LoginPayload};

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;
/// RFC 5321 ceiling for a mail address.
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_NAME_LENGTH: usize = 100;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email regex must compile")
});

/// Rejected input. The `Display` string is the client-facing message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Correo electrónico inválido")]
    InvalidEmail,
    #[error("{0}")]
    InvalidPassword(String),
    #[error("El campo {0} es obligatorio")]
    MissingField(&'static str),
    #[error("El campo {0} es demasiado largo")]
    TooLong(&'static str),
    #[error("Tipo de usuario inválido")]
    InvalidRole,
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH || !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "La contraseña debe tener al menos {MIN_PASSWORD_LENGTH} caracteres"
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "La contraseña no puede exceder {MAX_PASSWORD_LENGTH} caracteres"
        )));
    }
    Ok(())
}

fn require(name: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(name));
    }
    if value.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong(name));
    }
    Ok(())
}

pub fn validate_new_user(payload: &CreateUser) -> Result<(), ValidationError> {
    require("nombre", &payload.nombre)?;
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    if payload.id_tipo < 1 {
        return Err(ValidationError::InvalidRole);
    }
    Ok(())
}

/// Login only checks shape; whether the credential matches is the service's call.
pub fn validate_login(payload: &LoginPayload) -> Result<(), ValidationError> {
    validate_email(&payload.email)?;
    if payload.password.is_empty() {
        return Err(ValidationError::MissingField("password"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_addresses() {
        for email in [
            "chofer@rastreo.mx",
            "ana.luisa+rutas@example.com",
            "u123@sub.dominio.org",
        ] {
            assert!(validate_email(email).is_ok(), "rejected {email}");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in ["", "sin-arroba", "@falta.local", "user@", "user@dominio", "a b@c.mx"] {
            assert!(validate_email(email).is_err(), "accepted {email:?}");
        }
    }

    #[test]
    fn rejects_oversized_addresses() {
        let email = format!("{}@example.com", "a".repeat(MAX_EMAIL_LENGTH));
        assert_eq!(validate_email(&email), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn password_length_bounds() {
        assert!(validate_password("corta").is_err());
        assert!(validate_password("suficiente").is_ok());
        assert!(validate_password(&"x".repeat(MAX_PASSWORD_LENGTH)).is_ok());
        assert!(validate_password(&"x".repeat(MAX_PASSWORD_LENGTH + 1)).is_err());
    }

    #[test]
    fn blank_name_is_missing() {
        assert_eq!(require("nombre", "   "), Err(ValidationError::MissingField("nombre")));
    }
}
