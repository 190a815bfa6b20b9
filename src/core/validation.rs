use crate::config::*;
use crate::core::errors::StoreError;
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Regex should compile")
    })
}

fn username_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("Regex should compile"))
}

fn invalid(msg: &str) -> StoreError {
    StoreError::Validation(msg.to_string())
}

pub fn validate_email(email: &str) -> Result<(), StoreError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(invalid("Email is required"));
    }
    if !email_regex().is_match(email) {
        return Err(invalid("Please enter a valid email address"));
    }
    Ok(())
}

/// At least eight characters with one letter and one digit.
pub fn validate_password(password: &str) -> Result<(), StoreError> {
    if password.is_empty() {
        return Err(invalid("Password is required"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(invalid("Password must be at least 8 characters"));
    }
    if !password.chars().any(|c| c.is_alphabetic()) || !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid("Password must contain a letter and a number"));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), StoreError> {
    let len = username.chars().count();
    if username.is_empty() {
        return Err(invalid("Username is required"));
    }
    if len < MIN_USERNAME_LENGTH || len > MAX_USERNAME_LENGTH {
        return Err(invalid("Username must be 3-30 characters"));
    }
    if !username_regex().is_match(username) {
        return Err(invalid("Username may only contain letters, numbers and underscores"));
    }
    Ok(())
}

pub fn validate_length(field: &str, value: &str, max: usize) -> Result<(), StoreError> {
    if value.chars().count() > max {
        return Err(StoreError::Validation(format!(
            "{} is too long (max {} characters)",
            field, max
        )));
    }
    Ok(())
}

pub fn validate_required(field: &str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation(format!("{} is required", field)));
    }
    Ok(())
}
