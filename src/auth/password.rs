use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::error;

pub const MIN_PASSWORD_LEN: usize = 8;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    // Verified against when the username is unknown so both failure paths cost the same.
    static ref DUMMY_HASH: Option<String> = hash_password("burnmeter-dummy-password").ok();
}

/// Outcome of checking a password against a stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    Valid,
    /// Matched an unsalted SHA-256 digest; the caller should rehash.
    ValidLegacy,
    Invalid,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Sign-up password policy. Returns the first rule the password breaks.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!("Password must be at least {MIN_PASSWORD_LEN} characters"));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err("Password must contain at least one uppercase letter".into());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".into());
    }
    Ok(())
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

fn is_legacy_digest(stored: &str) -> bool {
    stored.len() == 64 && stored.bytes().all(|b| b.is_ascii_hexdigit())
}

fn legacy_digest(plain: &str) -> String {
    hex::encode(Sha256::digest(plain.as_bytes()))
}

/// Check `plain` against either an Argon2 PHC string or a legacy SHA-256 hex digest.
pub fn check_password(plain: &str, stored: &str) -> anyhow::Result<PasswordCheck> {
    if is_legacy_digest(stored) {
        let matches = legacy_digest(plain).eq_ignore_ascii_case(stored);
        return Ok(if matches {
            PasswordCheck::ValidLegacy
        } else {
            PasswordCheck::Invalid
        });
    }
    Ok(if verify_password(plain, stored)? {
        PasswordCheck::Valid
    } else {
        PasswordCheck::Invalid
    })
}

/// Spend one verification on a throwaway hash.
pub fn burn_verification(plain: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(plain, hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("Passw0rdX").unwrap();
        let b = hash_password("Passw0rdX").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn legacy_sha256_digest_is_recognised() {
        let stored = legacy_digest("Legacy123");
        assert_eq!(stored.len(), 64);
        assert_eq!(check_password("Legacy123", &stored).unwrap(), PasswordCheck::ValidLegacy);
        assert_eq!(check_password("legacy123", &stored).unwrap(), PasswordCheck::Invalid);
    }

    #[test]
    fn argon2_hash_checks_as_current() {
        let stored = hash_password("Modern123").unwrap();
        assert_eq!(check_password("Modern123", &stored).unwrap(), PasswordCheck::Valid);
        assert_eq!(check_password("Modern124", &stored).unwrap(), PasswordCheck::Invalid);
    }

    #[test]
    fn password_policy_messages() {
        assert_eq!(
            validate_password("Sh0rt").unwrap_err(),
            "Password must be at least 8 characters"
        );
        assert_eq!(
            validate_password("alllower1").unwrap_err(),
            "Password must contain at least one uppercase letter"
        );
        assert_eq!(
            validate_password("NoDigitsHere").unwrap_err(),
            "Password must contain at least one digit"
        );
        assert!(validate_password("Balanced1").is_ok());
    }

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("sam@example.com"));
        assert!(!is_valid_email("sam@example"));
        assert!(!is_valid_email("sam example@x.io"));
        assert!(!is_valid_email(""));
    }
}
