//! Credential checks guarding the service.
//!
//! Every check is a pure function of its inputs and the credentials loaded at
//! startup. Comparisons go through [`subtle::ConstantTimeEq`] so their timing
//! does not depend on where the inputs first differ.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::{config::AkkiConfig, error::AkkiError};

type HmacSha256 = Hmac<Sha256>;

struct Credentials {
    username: String,
    password: String,
    api_key: String,
    secret_key: String,
}

/// Validates basic auth pairs, API keys and message signatures
#[derive(Clone)]
pub struct AuthGate {
    creds: Arc<Credentials>,
}

impl AuthGate {
    pub fn new(config: &AkkiConfig) -> Self {
        Self {
            creds: Arc::new(Credentials {
                username: config.username.to_owned(),
                password: config.password.to_owned(),
                api_key: config.api_key.to_owned(),
                secret_key: config.secret_key.to_owned(),
            }),
        }
    }

    /// Both halves are always compared, even when the username is wrong
    pub fn validate_basic_auth(&self, user: &str, password: &str) -> Result<(), AkkiError> {
        let user_ok = user.as_bytes().ct_eq(self.creds.username.as_bytes());
        let password_ok = password.as_bytes().ct_eq(self.creds.password.as_bytes());
        if bool::from(user_ok & password_ok) {
            Ok(())
        } else {
            Err(AkkiError::AuthChallenge)
        }
    }

    /// A missing key is compared as the empty string
    pub fn validate_api_key(&self, provided: Option<&[u8]>) -> Result<(), AkkiError> {
        let provided = provided.unwrap_or_default();
        if bool::from(provided.ct_eq(self.creds.api_key.as_bytes())) {
            Ok(())
        } else {
            Err(AkkiError::Forbidden)
        }
    }

    /// Checks `hash` against the signature of `message` under the server key
    pub fn verify(&self, message: &str, hash: &str) -> Result<(), AkkiError> {
        verify_integrity(message, hash, &self.creds.secret_key)
    }
}

/// Lowercase hex HMAC-SHA256 of `message` keyed with `secret_key`
pub fn sign(message: &str, secret_key: &str) -> Result<String, AkkiError> {
    let mut mac =
        HmacSha256::new_from_slice(secret_key.as_bytes()).map_err(|_| AkkiError::HmacKey)?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Empty inputs are rejected as bad input before any signature is computed.
/// The comparison is byte-for-byte, so upper-case hex does not match.
pub fn verify_integrity(message: &str, hash: &str, secret_key: &str) -> Result<(), AkkiError> {
    if message.is_empty() || hash.is_empty() {
        return Err(AkkiError::BadInput {
            msg: "`message` and `hash` are required",
        });
    }
    let computed = sign(message, secret_key)?;
    if bool::from(hash.as_bytes().ct_eq(computed.as_bytes())) {
        Ok(())
    } else {
        Err(AkkiError::IntegrityMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "s3cret";

    fn gate() -> AuthGate {
        AuthGate {
            creds: Arc::new(Credentials {
                username: "alice".into(),
                password: "wonderland".into(),
                api_key: "apikey".into(),
                secret_key: SECRET.into(),
            }),
        }
    }

    /// Flips the last hex digit while keeping the length
    fn flip_last(hash: &str) -> String {
        let mut chars: Vec<char> = hash.chars().collect();
        let last = chars.last_mut().unwrap();
        *last = if *last == '0' { '1' } else { '0' };
        chars.into_iter().collect()
    }

    #[test]
    fn sign_matches_rfc4231_case_2() {
        assert_eq!(
            sign("what do ya want for nothing?", "Jefe").unwrap(),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn sign_is_lowercase_hex() {
        let hash = sign("Hello", SECRET).unwrap();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn correct_signature_is_accepted() {
        let long = "x".repeat(10_000);
        for message in ["Hello", "a", "multi\nline ✓ unicode", long.as_str()] {
            for key in [SECRET, "", "another key"] {
                assert!(verify_integrity(message, &sign(message, key).unwrap(), key).is_ok());
            }
        }
    }

    #[test]
    fn near_miss_is_rejected() {
        let hash = sign("Hello", SECRET).unwrap();
        let flipped = flip_last(&hash);
        assert_eq!(flipped.len(), hash.len());
        assert!(matches!(
            verify_integrity("Hello", &flipped, SECRET),
            Err(AkkiError::IntegrityMismatch)
        ));
        assert!(matches!(
            verify_integrity("Hello", &hash.to_uppercase(), SECRET),
            Err(AkkiError::IntegrityMismatch)
        ));
        assert!(matches!(
            verify_integrity("Hello", &hash[..63], SECRET),
            Err(AkkiError::IntegrityMismatch)
        ));
        assert!(matches!(
            verify_integrity("Hello!", &hash, SECRET),
            Err(AkkiError::IntegrityMismatch)
        ));
        assert!(matches!(
            verify_integrity("Hello", &hash, "wrong key"),
            Err(AkkiError::IntegrityMismatch)
        ));
    }

    #[test]
    fn empty_fields_are_bad_input() {
        let hash = sign("Hello", SECRET).unwrap();
        assert!(matches!(
            verify_integrity("Hello", "", SECRET),
            Err(AkkiError::BadInput { .. })
        ));
        assert!(matches!(
            verify_integrity("", &hash, SECRET),
            Err(AkkiError::BadInput { .. })
        ));
        // even the genuine signature of the empty string is refused
        assert!(matches!(
            verify_integrity("", &sign("", SECRET).unwrap(), SECRET),
            Err(AkkiError::BadInput { .. })
        ));
    }

    #[test]
    fn basic_auth_requires_both_halves() {
        let gate = gate();
        assert!(gate.validate_basic_auth("alice", "wonderland").is_ok());
        for (user, password) in [
            ("alice", "wrong"),
            ("bob", "wonderland"),
            ("", ""),
            ("alice", ""),
            ("alicE", "wonderland"),
        ] {
            assert!(matches!(
                gate.validate_basic_auth(user, password),
                Err(AkkiError::AuthChallenge)
            ));
        }
    }

    #[test]
    fn missing_api_key_equals_empty_key() {
        let gate = gate();
        assert!(gate.validate_api_key(Some(b"apikey".as_slice())).is_ok());
        assert!(matches!(
            gate.validate_api_key(None),
            Err(AkkiError::Forbidden)
        ));
        assert!(matches!(
            gate.validate_api_key(Some(b"".as_slice())),
            Err(AkkiError::Forbidden)
        ));
        assert!(matches!(
            gate.validate_api_key(Some(b"apikeY".as_slice())),
            Err(AkkiError::Forbidden)
        ));
    }

    #[test]
    fn gate_verify_uses_configured_secret() {
        let gate = gate();
        assert!(gate.verify("Hello", &sign("Hello", SECRET).unwrap()).is_ok());
        assert!(matches!(
            gate.verify("Hello", &sign("Hello", "other").unwrap()),
            Err(AkkiError::IntegrityMismatch)
        ));
    }
}
