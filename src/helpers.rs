//! Display sanitization and password hashing.
//!
//! [`sanitize`] is for values that will be rendered back to users; it plays no
//! part in SQL safety, which comes entirely from parameter binding.

use std::sync::LazyLock;

use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::{Params, Pbkdf2};
use rand::RngCore;
use regex::Regex;

use crate::error::DataAccessError;

/// PBKDF2-SHA256 rounds used by [`hash_password`].
pub const DEFAULT_PASSWORD_COST: u32 = 100_000;

const SALT_LEN: usize = 16;

static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    // comments first, then anything tag-shaped
    Regex::new(r"(?s)<!--.*?-->|</?[A-Za-z!?][^>]*>").expect("markup pattern is valid")
});

/// Strip tags and escape `& < > " '` for safe re-display.
#[must_use]
pub fn sanitize(input: &str) -> String {
    let stripped = MARKUP.replace_all(input.trim(), "");
    let mut out = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Salted PBKDF2-SHA256 hash with [`DEFAULT_PASSWORD_COST`] rounds.
///
/// # Errors
/// Returns `DataAccessError::PasswordHash` if hashing fails.
pub fn hash_password(plain: &str) -> Result<String, DataAccessError> {
    hash_password_with_cost(plain, DEFAULT_PASSWORD_COST)
}

/// Salted PBKDF2-SHA256 hash with an explicit round count.
///
/// The output is a PHC string (`$pbkdf2-sha256$i=<rounds>,l=32$<salt>$<hash>`)
/// carrying algorithm, cost and salt, so [`verify_password`] needs nothing else.
///
/// # Errors
/// Returns `DataAccessError::PasswordHash` if `rounds` is zero or hashing fails.
pub fn hash_password_with_cost(plain: &str, rounds: u32) -> Result<String, DataAccessError> {
    if rounds == 0 {
        return Err(DataAccessError::PasswordHash(
            "password cost must be at least one round".into(),
        ));
    }
    let mut salt_bytes = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)?;

    let params = Params {
        rounds,
        output_length: 32,
    };
    let hash = Pbkdf2.hash_password_customized(plain.as_bytes(), None, None, params, &salt)?;
    Ok(hash.to_string())
}

/// Check `plain` against a hash from [`hash_password`]. Comparison is constant-time.
///
/// A malformed hash verifies as `false`.
#[must_use]
pub fn verify_password(plain: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Pbkdf2.verify_password(plain.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}
