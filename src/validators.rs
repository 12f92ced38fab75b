/// Input validators - run before any I/O or hashing happens
///
/// Email and name checks are plain predicates; the password check reports
/// the specific rule that failed so the caller can show an actionable message.

use regex::Regex;
use lazy_static::lazy_static;

use crate::error::PasswordPolicyError;

pub const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
pub const MAX_NAME_LENGTH: usize = 64;
pub const MIN_PASSWORD_LENGTH: usize = 5;
// bcrypt only looks at the first 72 bytes
pub const MAX_PASSWORD_BYTES: usize = 72;

lazy_static! {
    // local-part "@" domain "." tld
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();

    // Latin and Cyrillic letters only
    static ref NAME_REGEX: Regex = Regex::new(r"^[A-Za-zА-Яа-яЁё]+$").unwrap();
}

/// Checks the address shape. Case is preserved; emails are compared as-is.
pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && email.len() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(email)
}

/// Non-empty, letters only.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().count() <= MAX_NAME_LENGTH && NAME_REGEX.is_match(name)
}

/// Validates password strength
///
/// Requirements, checked in this order:
/// - at least `MIN_PASSWORD_LENGTH` characters
/// - at most `MAX_PASSWORD_BYTES` bytes
/// - one uppercase, one lowercase, one digit, one symbol
///
/// # Errors
/// Returns the first rule the password breaks
pub fn validate_password(password: &str) -> Result<(), PasswordPolicyError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooShort(MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(PasswordPolicyError::TooLong(MAX_PASSWORD_BYTES));
    }

    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(PasswordPolicyError::MissingUppercase);
    }

    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(PasswordPolicyError::MissingLowercase);
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordPolicyError::MissingDigit);
    }

    if !password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
        return Err(PasswordPolicyError::MissingSymbol);
    }

    Ok(())
}
