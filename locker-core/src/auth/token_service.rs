//! Access credential issuance and verification
//!
//! Access credentials are stateless, short-lived JWTs signed with a single
//! symmetric secret under a fixed algorithm (HS256). Verification is strict:
//! wrong algorithm, issuer, audience, or an expired token all collapse to
//! [`ReservationError::CredentialInvalid`] so callers can't distinguish
//! *why* a token was rejected.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::AccessClaims;
use crate::error::{ReservationError, Result};

#[derive(Clone)]
pub struct TokenService {
    secret: Zeroizing<Vec<u8>>,
    issuer: String,
    audience: String,
    access_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: impl Into<Vec<u8>>, issuer: String, audience: String, access_ttl: Duration) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
            issuer,
            audience,
            access_ttl,
        }
    }

    /// Issue a signed access credential for `(user_serial, student_id)`.
    /// Fails only if signing itself fails, which in practice means a
    /// misconfigured (empty) signing key.
    pub fn issue(&self, user_serial: i64, student_id: &str) -> Result<String> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user_serial.to_string(),
            student_id: student_id.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let header = Header::new(Algorithm::HS256);
        encode(&header, &claims, &EncodingKey::from_secret(&self.secret))
            .map_err(|e| ReservationError::Internal(format!("failed to sign access token: {e}")))
    }

    /// Verify signature, algorithm, issuer, audience, and expiry. Any failure
    /// surfaces as the single opaque `CredentialInvalid` error.
    pub fn verify(&self, token: &str) -> Result<AccessClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256];
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        decode::<AccessClaims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map(|data| data.claims)
            .map_err(|_| ReservationError::CredentialInvalid)
    }

    /// Extract the `jti` claim without a full signature check, so the auth
    /// gate can consult the blacklist before doing the expensive verify.
    pub fn extract_identifier(token: &str) -> Option<String> {
        Self::extract_unverified_claims(token).map(|claims| claims.jti)
    }

    /// Decode claims without checking the signature or expiry. Used only to
    /// read `jti`/`exp` off a token whose trustworthiness is established some
    /// other way (it was already verified once, or it's about to be
    /// superseded and we only need to bound a blacklist tombstone's TTL).
    pub fn extract_unverified_claims(token: &str) -> Option<AccessClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        decode::<AccessClaims>(token, &DecodingKey::from_secret(b""), &validation)
            .ok()
            .map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(
            b"unit-test-secret".to_vec(),
            "locker-service".to_string(),
            "locker-clients".to_string(),
            Duration::minutes(10),
        )
    }

    #[test]
    fn round_trips_a_valid_token() {
        let svc = service();
        let token = svc.issue(123456789012, "2024320000").unwrap();
        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, "123456789012");
        assert_eq!(claims.student_id, "2024320000");
    }

    #[test]
    fn rejects_expired_token() {
        let svc = TokenService::new(
            b"unit-test-secret".to_vec(),
            "locker-service".to_string(),
            "locker-clients".to_string(),
            Duration::seconds(-1),
        );
        let token = svc.issue(1, "2024320000").unwrap();
        assert!(matches!(svc.verify(&token), Err(ReservationError::CredentialInvalid)));
    }

    #[test]
    fn rejects_wrong_audience() {
        let svc = service();
        let token = svc.issue(1, "2024320000").unwrap();
        let other = TokenService::new(
            b"unit-test-secret".to_vec(),
            "locker-service".to_string(),
            "someone-else".to_string(),
            Duration::minutes(10),
        );
        assert!(matches!(other.verify(&token), Err(ReservationError::CredentialInvalid)));
    }

    #[test]
    fn rejects_tampered_signature() {
        let svc = service();
        let token = svc.issue(1, "2024320000").unwrap();
        let tampered = format!("{token}x");
        assert!(matches!(svc.verify(&tampered), Err(ReservationError::CredentialInvalid)));
    }

    #[test]
    fn extracts_jti_without_verifying_signature() {
        let svc = service();
        let token = svc.issue(1, "2024320000").unwrap();
        let claims = svc.verify(&token).unwrap();
        let jti = TokenService::extract_identifier(&token).unwrap();
        assert_eq!(jti, claims.jti);
    }
}
