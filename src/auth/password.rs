// src/auth/password.rs

use bcrypt::{hash, verify};
use regex::Regex;
use std::sync::LazyLock;

use super::AuthError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex")
});

const PASSWORD_SPECIALS: &str = "@$!%*#?&";
pub const MIN_PASSWORD_LEN: usize = 8;

pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    Ok(hash(password, cost)?)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    Ok(verify(password, hash)?)
}

pub fn validate_email(email: &str) -> Result<(), AuthError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(AuthError::InvalidEmail)
    }
}

/// At least 8 characters drawn from letters, digits and `@$!%*#?&`, with at
/// least one of each class.
pub fn validate_password_strength(password: &str) -> Result<(), AuthError> {
    let weak = |msg: &str| Err(AuthError::WeakPassword(msg.to_string()));

    if password.chars().count() < MIN_PASSWORD_LEN {
        return weak("Password must be at least 8 characters");
    }

    let allowed = |c: char| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c);
    if !password.chars().all(allowed) {
        return weak("Password may only contain letters, digits and @$!%*#?&");
    }

    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if !(has_letter && has_digit && has_special) {
        return weak("Password must contain a letter, a digit and a special character");
    }

    Ok(())
}
