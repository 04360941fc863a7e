/// Password hashing and password policy
///
/// Passwords are hashed with Argon2id and stored in PHC string format, which
/// embeds the algorithm, parameters and a random salt. Verification reads the
/// parameters back from the stored hash, so cost settings can change without
/// invalidating existing accounts.
///
/// # Security
///
/// - **Algorithm**: Argon2id (hybrid of Argon2i and Argon2d)
/// - **Memory**: 64 MB (65536 KB) by default
/// - **Iterations**: 3 passes by default
/// - **Parallelism**: 4 lanes by default
/// - **Output**: 32-byte hash
///
/// # Example
///
/// ```
/// use taskdesk_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Passw0rd")?;
///
/// assert!(verify_password("Passw0rd", &hash)?);
/// assert!(!verify_password("wrong", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};
use serde::{Deserialize, Serialize};

/// Minimum password length in characters
pub const PASSWORD_MIN_LEN: usize = 8;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Argon2id cost parameters used when hashing new passwords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashingParams {
    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of passes
    pub iterations: u32,

    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashingParams {
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl HashingParams {
    /// Cheap parameters for tests; never use in production
    pub fn insecure_fast() -> Self {
        Self {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Hashes a password using Argon2id with the default parameters
///
/// Returns a PHC string such as `$argon2id$v=19$m=65536,t=3,p=4$<salt>$<hash>`.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_password_with(password, &HashingParams::default())
}

/// Hashes a password using Argon2id with explicit parameters
///
/// A fresh 16-byte salt is drawn from the OS RNG for every call.
pub fn hash_password_with(password: &str, params: &HashingParams) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let argon_params = ParamsBuilder::new()
        .m_cost(params.memory_kib)
        .t_cost(params.iterations)
        .p_cost(params.parallelism)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, argon_params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored hash
///
/// Comparison is constant-time. Returns `Ok(false)` on mismatch and an error
/// only if the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Validates the password composition policy
///
/// A password is accepted iff it has at least 8 characters and contains an
/// ASCII uppercase letter, an ASCII lowercase letter and an ASCII digit.
/// Other characters count towards the length only.
///
/// # Example
///
/// ```
/// use taskdesk_shared::auth::password::validate_password_strength;
///
/// assert!(validate_password_strength("Passw0rd").is_ok());
/// assert!(validate_password_strength("password").is_err());
/// ```
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required.".to_string());
    }

    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(format!(
            "Password must be at least {} characters long.",
            PASSWORD_MIN_LEN
        ));
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter.".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase letter.".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one number.".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_default_params() {
        let hash = hash_password("test_password_123").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_hash_password_with_custom_params() {
        let hash = hash_password_with("Passw0rd", &HashingParams::insecure_fast()).unwrap();

        assert!(hash.contains("m=1024"));
        assert!(hash.contains("t=1"));
        assert!(hash.contains("p=1"));
        assert!(verify_password("Passw0rd", &hash).unwrap());
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let params = HashingParams::insecure_fast();
        let hash1 = hash_password_with("same_password", &params).unwrap();
        let hash2 = hash_password_with("same_password", &params).unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct_and_incorrect() {
        let hash = hash_password_with("correct_password", &HashingParams::insecure_fast()).unwrap();

        assert!(verify_password("correct_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("password", "invalid_hash").is_err());
        assert!(verify_password("password", "$argon2id$invalid").is_err());
    }

    #[test]
    fn test_unicode_password_roundtrip() {
        let params = HashingParams::insecure_fast();
        for password in ["with spaces", "unicode-密码-パスワード", "Sp3cial!@#$%"] {
            let hash = hash_password_with(password, &params).unwrap();
            assert!(verify_password(password, &hash).unwrap(), "{}", password);
        }
    }

    #[test]
    fn test_validate_password_strength_valid() {
        for password in ["Passw0rd", "MyP@ssw0rd!", "abcDEF12", "Zz9zzzzzzzzz"] {
            assert!(
                validate_password_strength(password).is_ok(),
                "Password '{}' should be valid",
                password
            );
        }
    }

    #[test]
    fn test_special_character_not_required() {
        assert!(validate_password_strength("NoSpecial123").is_ok());
    }

    #[test]
    fn test_validate_password_strength_failures() {
        let cases = [
            ("", "required"),
            ("Sh0rt", "at least 8 characters"),
            ("lowercase1", "uppercase letter"),
            ("UPPERCASE1", "lowercase letter"),
            ("NoDigitsHere", "number"),
        ];

        for (password, expected) in cases {
            let err = validate_password_strength(password).unwrap_err();
            assert!(err.contains(expected), "{:?}: {}", password, err);
        }
    }

    #[test]
    fn test_policy_matches_definition() {
        // accepted iff len >= 8 and [A-Z] and [a-z] and [0-9]
        let samples = [
            "Aa1", "Aa1aaaaa", "aa1aaaaa", "AA1AAAAA", "Aaaaaaaa", "Aa1aaaa", "Passw0rd", "pASSW0RD",
            "ÀàЯя1234", "ÄÖÜäöü12", "Passwor\u{0661}", "Pässwörd1", "ÄÖÜaaaa1",
        ];

        for password in samples {
            let expected = password.chars().count() >= 8
                && password.chars().any(|c| c.is_ascii_uppercase())
                && password.chars().any(|c| c.is_ascii_lowercase())
                && password.chars().any(|c| c.is_ascii_digit());

            assert_eq!(
                validate_password_strength(password).is_ok(),
                expected,
                "{}",
                password
            );
        }
    }

    #[test]
    fn test_non_ascii_letters_do_not_satisfy_case_rules() {
        let err = validate_password_strength("ÄÖÜäöü12").unwrap_err();
        assert!(err.contains("uppercase letter"), "{}", err);

        let err = validate_password_strength("ABCDÄÖÜ12").unwrap_err();
        assert!(err.contains("lowercase letter"), "{}", err);

        assert!(validate_password_strength("Pässwörd1").is_ok());
    }

    #[test]
    fn test_only_ascii_digits_count_as_numbers() {
        let err = validate_password_strength("Passwor\u{0661}").unwrap_err();
        assert!(err.contains("number"), "{}", err);
    }
}
