use serde::{Deserialize, Serialize};

/// Claims carried by a signed access credential.
///
/// `sub` is the user's [`crate::domain::User::serial_id`] as a string; `student_id` is
/// denormalized onto the token so the auth gate never needs a record-store round trip
/// to bind the caller's identity into the request context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub student_id: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// The identity bound into a request by the auth gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub serial_id: i64,
    pub student_id: String,
    pub jti: String,
    pub exp: i64,
}
