//! Credential and session lifecycle: hashing, purpose-separated tokens, the
//! bearer gate and the flows tying them to the `usuario` table.

pub mod handlers;
pub mod middleware;
pub mod password;
pub mod routes;
pub mod service;
pub mod token;

pub use service::AuthService;
pub use token::{SessionClaims, TokenKeys};
