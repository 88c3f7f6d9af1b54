// 📐 Form Validation - registration, login and deletion inputs
// Collects every failing rule rather than stopping at the first one.

use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const DELETE_CONFIRMATION: &str = "DELETE";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        FieldError {
            field,
            message: message.into(),
        }
    }
}

pub type ValidationResult = Result<(), Vec<FieldError>>;

fn finish(errors: Vec<FieldError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn require(errors: &mut Vec<FieldError>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "Required field is empty"));
    }
}

/// `local@domain.tld` with no whitespace and a dot in the domain
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2 && !host.starts_with('.'),
        None => false,
    }
}

/// Every password rule the input breaks, in a fixed order
pub fn password_rule_failures(password: &str) -> Vec<&'static str> {
    let mut failures = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        failures.push("at least 8 characters");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        failures.push("an uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        failures.push("a lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        failures.push("a number");
    }
    if !password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
        failures.push("a special character");
    }
    failures
}

pub fn validate_email(errors: &mut Vec<FieldError>, email: &str) {
    if email.trim().is_empty() {
        errors.push(FieldError::new("email", "Required field is empty"));
    } else if !is_valid_email(email) {
        errors.push(FieldError::new("email", "Enter a valid email address"));
    }
}

pub fn validate_password(errors: &mut Vec<FieldError>, password: &str) {
    let failures = password_rule_failures(password);
    if !failures.is_empty() {
        errors.push(FieldError::new(
            "password",
            format!("Password must contain {}", failures.join(", ")),
        ));
    }
}

pub fn validate_registration(
    name: &str,
    company: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> ValidationResult {
    let mut errors = Vec::new();
    require(&mut errors, "name", name);
    require(&mut errors, "company", company);
    validate_email(&mut errors, email);
    validate_password(&mut errors, password);
    if password != confirm_password {
        errors.push(FieldError::new("confirm_password", "Passwords do not match"));
    }
    finish(errors)
}

pub fn validate_login(email: &str, password: &str) -> ValidationResult {
    let mut errors = Vec::new();
    validate_email(&mut errors, email);
    require(&mut errors, "password", password);
    finish(errors)
}

pub fn validate_deletion_confirmation(confirmation: &str) -> ValidationResult {
    if confirmation.trim() == DELETE_CONFIRMATION {
        Ok(())
    } else {
        Err(vec![FieldError::new(
            "confirmation",
            format!("Type {} to confirm", DELETE_CONFIRMATION),
        )])
    }
}
