use serde::{Deserialize, Serialize};

/// Role whose holders ride the shared fleet vehicle instead of owning one.
pub const PASSENGER_ROLE: i64 = 2;
/// Sentinel vehicle assigned to passenger accounts at registration.
pub const SHARED_VEHICLE: i64 = 1;

/// Row of the `usuario` table.
///
/// `password` holds the PHC hash. It deserializes from store records but is
/// skipped on serialization, so no response body can carry it. Keep insert and
/// update paths building their own records; a serialized `User` is missing the
/// hash on purpose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id_u: i64,
    pub nombre: String,
    #[serde(default)]
    pub ap_pat: Option<String>,
    #[serde(default)]
    pub ap_mat: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub n_tel: Option<String>,
    pub id_tipo: i64,
    #[serde(default)]
    pub id_vehiculo: Option<i64>,
    /// Unix seconds of the last credential overwrite, `None` until the first
    /// one. Reset tokens minted before this instant are spent.
    #[serde(default, skip_serializing)]
    pub password_changed_at: Option<i64>,
}

/// Registration body. The plaintext password lives only here and in the hasher.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub nombre: String,
    #[serde(default)]
    pub ap_pat: Option<String>,
    #[serde(default)]
    pub ap_mat: Option<String>,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub n_tel: Option<String>,
    pub id_tipo: i64,
    #[serde(default)]
    pub id_vehiculo: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RecoveryRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPayload {
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub token: String,
    pub usuario: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_user_never_carries_the_hash() {
        let user = User {
            id_u: 1,
            nombre: "Ana".into(),
            ap_pat: Some("Luisa".into()),
            ap_mat: None,
            email: "ana@rastreo.mx".into(),
            password: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".into(),
            n_tel: None,
            id_tipo: 2,
            id_vehiculo: Some(1),
            password_changed_at: Some(1_700_000_000),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password").is_none());
        assert!(value.get("password_changed_at").is_none());
        assert_eq!(value["email"], "ana@rastreo.mx");
    }

    #[test]
    fn reset_payload_uses_camel_case() {
        let payload: ResetPayload =
            serde_json::from_str(r#"{"newPassword": "otra-clave-123"}"#).unwrap();
        assert_eq!(payload.new_password, "otra-clave-123");
    }
}
