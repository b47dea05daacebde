//! Custom Axum extractors.

pub mod json;
pub mod user_auth;

pub use json::{ApiPath, JsonBody};
pub use user_auth::AuthUser;
