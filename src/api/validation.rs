//! Input validation for the auth endpoints.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Loose email shape check: something@something.tld, no whitespace.
    /// Deliverability is not our problem; obviously-broken input is.
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if email.len() > 254 {
        return Err("Email is too long".to_string());
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err("Email is not a valid address".to_string());
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.org").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@x.com").is_err());
        assert!(validate_email("spaces in@x.com").is_err());
        assert!(validate_email("missing-tld@host").is_err());
        assert!(validate_email(&format!("{}@x.com", "a".repeat(260))).is_err());
    }

    #[test]
    fn test_name_and_password_required() {
        assert!(validate_name("Alice").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_password("p1").is_ok());
        assert!(validate_password("").is_err());
    }
}
