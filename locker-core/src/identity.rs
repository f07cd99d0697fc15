//! Deterministic user serial derivation and input validation for the
//! login-or-register entry point

use sha2::{Digest, Sha256};

use crate::error::{ReservationError, Result};

const SERIAL_SALT: &str = "ku_info";
const SERIAL_MODULUS: u64 = 1_000_000_000_000; // 10^12

/// Trimmed, validated identity fields ready for the conditional insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityInput {
    pub student_id: String,
    pub name: String,
    pub phone_number: String,
}

impl IdentityInput {
    pub fn validate(student_id: &str, name: &str, phone_number: &str) -> Result<Self> {
        let student_id = student_id.trim().to_string();
        let name = name.trim().to_string();
        let phone_number = phone_number.trim().to_string();

        if student_id.len() != 10 || !student_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ReservationError::Validation(
                "student_id must be exactly 10 decimal digits".to_string(),
            ));
        }

        let phone_len = phone_number.chars().count();
        if !(10..=15).contains(&phone_len) || !phone_number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ReservationError::Validation(
                "phone_number must be 10-15 decimal digits".to_string(),
            ));
        }

        let name_len = name.chars().count();
        if !(2..=20).contains(&name_len) {
            return Err(ReservationError::Validation(
                "name must be 2-20 code points".to_string(),
            ));
        }

        Ok(Self {
            student_id,
            name,
            phone_number,
        })
    }

    /// `truncate12(sha256(student_id || name || phone || "ku_info"))`: take the
    /// leading 8 bytes of the digest as a big-endian u64 and reduce mod 10^12.
    pub fn derive_serial(&self) -> i64 {
        let mut hasher = Sha256::new();
        hasher.update(self.student_id.as_bytes());
        hasher.update(self.name.as_bytes());
        hasher.update(self.phone_number.as_bytes());
        hasher.update(SERIAL_SALT.as_bytes());
        let digest = hasher.finalize();

        let mut leading = [0u8; 8];
        leading.copy_from_slice(&digest[..8]);
        let value = u64::from_be_bytes(leading);
        (value % SERIAL_MODULUS) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_a_stable_12_digit_serial() {
        let input = IdentityInput::validate("2024320000", "홍길동", "01012345678").unwrap();
        let serial = input.derive_serial();
        assert!((0..1_000_000_000_000).contains(&serial));

        // Same triple always derives the same serial.
        let again = IdentityInput::validate("2024320000", "홍길동", "01012345678").unwrap();
        assert_eq!(serial, again.derive_serial());
    }

    #[test]
    fn different_triples_derive_different_serials() {
        let a = IdentityInput::validate("2024320000", "홍길동", "01012345678").unwrap();
        let b = IdentityInput::validate("2024320001", "홍길동", "01012345678").unwrap();
        assert_ne!(a.derive_serial(), b.derive_serial());
    }

    #[test]
    fn trims_whitespace_before_validating() {
        let input = IdentityInput::validate("  2024320000 ", " 홍길동 ", " 01012345678 ").unwrap();
        assert_eq!(input.student_id, "2024320000");
        assert_eq!(input.name, "홍길동");
    }

    #[test]
    fn rejects_bad_student_id() {
        assert!(IdentityInput::validate("202432000", "홍길동", "01012345678").is_err());
        assert!(IdentityInput::validate("202432000a", "홍길동", "01012345678").is_err());
    }

    #[test]
    fn rejects_bad_phone_number() {
        assert!(IdentityInput::validate("2024320000", "홍길동", "123").is_err());
        assert!(IdentityInput::validate("2024320000", "홍길동", "0101234567a").is_err());
    }

    #[test]
    fn rejects_bad_name_length() {
        assert!(IdentityInput::validate("2024320000", "a", "01012345678").is_err());
        assert!(IdentityInput::validate("2024320000", &"a".repeat(21), "01012345678").is_err());
    }
}
