//! Bearer-token authentication, independent of the HTTP framework that
//! invokes it.

use std::sync::Arc;

use crate::domain::AuthenticatedUser;
use crate::error::{ReservationError, Result};

use super::blacklist::Blacklist;
use super::token_service::TokenService;

#[derive(Clone)]
pub struct AuthGate {
    tokens: TokenService,
    blacklist: Blacklist,
}

impl AuthGate {
    pub fn new(tokens: TokenService, blacklist: Arc<Blacklist>) -> Self {
        Self {
            tokens,
            blacklist: (*blacklist).clone(),
        }
    }

    /// Resolve a bearer token into an authenticated identity.
    ///
    /// Order matters: a blacklist hit must short-circuit *before* signature
    /// verification so a revoked-but-still-well-formed token never reaches
    /// the (slightly more expensive) cryptographic check.
    pub async fn authenticate(&self, bearer_token: &str) -> Result<AuthenticatedUser> {
        if let Some(jti) = TokenService::extract_identifier(bearer_token) {
            if self.blacklist.contains_jti(&jti).await? {
                return Err(ReservationError::CredentialInvalid);
            }
        }

        let claims = self.tokens.verify(bearer_token)?;

        let serial_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| ReservationError::CredentialInvalid)?;

        Ok(AuthenticatedUser {
            serial_id,
            student_id: claims.student_id,
            jti: claims.jti,
            exp: claims.exp,
        })
    }
}
