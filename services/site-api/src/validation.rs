//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::models::NewContact;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_SUBJECT_LEN: usize = 200;
pub const MAX_MESSAGE_LEN: usize = 1000;
pub const MAX_EMAIL_LEN: usize = 254;

/// Validate a required free-text field, counting characters rather than bytes
fn validate_text(label: &str, value: &str, max_len: usize) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{} is required", label));
    }

    if value.chars().count() > max_len {
        return Err(format!("{} must be at most {} characters long", label, max_len));
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > MAX_EMAIL_LEN {
        return Err(format!("Email must be at most {} characters long", MAX_EMAIL_LEN));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email address".to_string());
    }

    Ok(())
}

/// Trim and lowercase a contact submission, then check every field
pub fn normalize_contact(mut contact: NewContact) -> Result<NewContact, String> {
    contact.name = contact.name.trim().to_string();
    contact.email = contact.email.trim().to_lowercase();
    contact.subject = contact.subject.trim().to_string();
    contact.message = contact.message.trim().to_string();
    contact.user_agent = trimmed_optional(contact.user_agent);
    contact.ip_address = trimmed_optional(contact.ip_address);

    validate_text("Name", &contact.name, MAX_NAME_LEN)?;
    validate_email(&contact.email)?;
    validate_text("Subject", &contact.subject, MAX_SUBJECT_LEN)?;
    validate_text("Message", &contact.message, MAX_MESSAGE_LEN)?;

    Ok(contact)
}

fn trimmed_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate the shape of a login request
pub fn validate_login(username: &str, password: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    Ok(())
}
