//! Runtime configuration, read once at startup and carried explicitly.

use std::env;
use std::net::SocketAddr;

use thiserror::Error;

/// Signing secret inherited from the first deployment. Only honored under
/// `APP_ENV=development`; anywhere else a missing `JWT_SECRET` aborts startup.
pub const DEV_FALLBACK_SECRET: &str = "clave_por_defecto";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET is not set; refusing to start outside development mode")]
    MissingSecret,
    #[error("{0} is not set")]
    MissingVar(&'static str),
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    /// Origin allowed through CORS, the tracking frontend.
    pub frontend_origin: String,
    pub auth: AuthConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// True only under `APP_ENV=development`.
    pub development: bool,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub user: String,
    pub password: String,
    pub from: String,
    /// Frontend URL the reset token gets appended to, no trailing slash.
    pub reset_link_base: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any name-to-value source. Tests feed maps through here so they
    /// never touch process-wide environment state.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let development = matches!(get("APP_ENV").as_deref(), Some("development"));

        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ if development => {
                tracing::warn!(
                    "JWT_SECRET is not set, falling back to the development secret; \
                     tokens signed with it are forgeable"
                );
                DEV_FALLBACK_SECRET.to_string()
            }
            _ => return Err(ConfigError::MissingSecret),
        };

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let database_url = get("DATABASE_URL").ok_or(ConfigError::MissingVar("DATABASE_URL"))?;
        let frontend_origin =
            get("FRONTEND_ORIGIN").unwrap_or_else(|| DEFAULT_FRONTEND_ORIGIN.to_string());

        let user = required_mail_var(&get, development, "EMAIL_USER")?;
        let password = required_mail_var(&get, development, "EMAIL_PASS")?;
        let from = get("MAIL_FROM").unwrap_or_else(|| user.clone());
        let smtp_host = get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());
        let reset_link_base = get("RESET_LINK_BASE")
            .unwrap_or_else(|| format!("{frontend_origin}/restablecer-password"));

        Ok(Self {
            bind_addr,
            database_url,
            frontend_origin,
            auth: AuthConfig {
                jwt_secret,
                development,
            },
            mail: MailConfig {
                smtp_host,
                user,
                password,
                from,
                reset_link_base,
            },
        })
    }
}

/// Mail credentials must be present in production; development runs get an empty
/// placeholder so the process can start without a mail account.
fn required_mail_var(
    get: &impl Fn(&str) -> Option<String>,
    development: bool,
    name: &'static str,
) -> Result<String, ConfigError> {
    match get(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ if development => {
            tracing::warn!("{name} is not set; recovery mail cannot be delivered");
            Ok(String::new())
        }
        _ => Err(ConfigError::MissingVar(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |name| map.get(name).map(|v| v.to_string())
    }

    #[test]
    fn missing_secret_fails_outside_development() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite://rastreo.db"),
            ("EMAIL_USER", "noreply@rastreo.mx"),
            ("EMAIL_PASS", "s3cret"),
        ]));
        assert!(matches!(result, Err(ConfigError::MissingSecret)));
    }

    #[test]
    fn development_mode_falls_back_to_the_default_secret() {
        let config = Config::from_lookup(lookup(&[
            ("APP_ENV", "development"),
            ("DATABASE_URL", "sqlite::memory:"),
        ]))
        .unwrap();
        assert_eq!(config.auth.jwt_secret, DEV_FALLBACK_SECRET);
        assert!(config.auth.development);
        assert_eq!(config.mail.user, "");
    }

    #[test]
    fn explicit_values_win_over_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "super-secreto"),
            ("DATABASE_URL", "sqlite://rastreo.db"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("FRONTEND_ORIGIN", "https://rastreo.mx"),
            ("EMAIL_USER", "noreply@rastreo.mx"),
            ("EMAIL_PASS", "s3cret"),
            ("MAIL_FROM", "Rastreo <noreply@rastreo.mx>"),
            ("SMTP_HOST", "smtp.rastreo.mx"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.frontend_origin, "https://rastreo.mx");
        assert_eq!(config.mail.from, "Rastreo <noreply@rastreo.mx>");
        assert_eq!(config.mail.smtp_host, "smtp.rastreo.mx");
        assert_eq!(
            config.mail.reset_link_base,
            "https://rastreo.mx/restablecer-password"
        );
        assert!(!config.auth.development);
    }

    #[test]
    fn bad_bind_addr_is_rejected() {
        let result = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "super-secreto"),
            ("DATABASE_URL", "sqlite://rastreo.db"),
            ("EMAIL_USER", "noreply@rastreo.mx"),
            ("EMAIL_PASS", "s3cret"),
            ("BIND_ADDR", "not-an-address"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { name: "BIND_ADDR", .. })
        ));
    }
}
