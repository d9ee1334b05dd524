//! Field validation and input sanitization for registration and login.
//!
//! Every free-text input passes through [`sanitize`] before field rules run.
//! Validation never fails hard: malformed input always comes back as a list
//! of `{field, message}` errors.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::FieldError;

/// Reserved names rejected on exact (case-insensitive) match.
const USERNAME_BLACKLIST: &[&str] = &[
    "admin",
    "administrator",
    "root",
    "user",
    "system",
    "guest",
    "test",
    "demo",
    "support",
    "help",
    "api",
    "www",
    "mail",
    "email",
    "ftp",
    "ssh",
    "login",
    "signin",
    "signup",
    "register",
    "auth",
    "authentication",
    "password",
    "passwd",
    "null",
    "undefined",
    "moderator",
    "mod",
    "operator",
    "staff",
    "superuser",
    "su",
    "sudo",
    "postmaster",
    "webmaster",
    "hostmaster",
    "abuse",
    "security",
    "info",
    "service",
    "daemon",
    "bin",
    "sys",
    "config",
    "settings",
    "account",
    "profile",
    "dashboard",
    "home",
    "index",
    "main",
    "default",
    "public",
    "private",
    "server",
    "client",
    "database",
    "db",
    "noreply",
    "no-reply",
    "donotreply",
    "contact",
    "sales",
    "billing",
];

/// Substrings that make any username unavailable, whatever surrounds them.
const USERNAME_FORBIDDEN_SUBSTRINGS: &[&str] = &["admin", "root", "system"];

/// Weak passwords rejected on exact (case-insensitive) match.
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "123456",
    "123456789",
    "12345678",
    "1234567890",
    "qwerty",
    "qwerty123",
    "qwertyuiop",
    "abc123",
    "password1",
    "password123",
    "admin123",
    "letmein",
    "welcome",
    "monkey",
    "dragon",
    "princess",
    "login",
    "starwars",
    "master",
    "shadow",
    "iloveyou",
    "superman",
    "batman",
    "trustno1",
    "hello",
    "freedom",
    "whatever",
    "secret",
    "summer",
    "123123",
    "mustang",
    "hunter",
    "cookie",
    "thunder",
    "internet",
    "computer",
    "michael",
    "jordan",
    "harley",
    "ginger",
];

/// Keyboard/alphabet/digit runs (and their reverses) rejected as substrings.
const SEQUENTIAL_PATTERNS: &[&str] = &[
    "123456789",
    "987654321",
    "abcdefghij",
    "zyxwvutsrq",
    "qwertyuiop",
    "poiuytrewq",
    "asdfghjkl",
    "lkjhgfdsa",
];

const MAX_INPUT_LEN: usize = 1000;

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
    static ref USERNAME_EDGE_SEPARATOR_RE: Regex = Regex::new(r"^[_-]|[_-]$").unwrap();
    static ref USERNAME_DOUBLE_SEPARATOR_RE: Regex = Regex::new(r"[_-]{2}").unwrap();
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-zA-Z0-9.-]{1,64}@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    static ref SCRIPT_TAG_RE: Regex = Regex::new(r"(?is)<script\b.*?</script>").unwrap();
}

/// Registration fields after sanitization and normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRegistration {
    /// Lowercase form, used for storage and uniqueness.
    pub username: String,
    /// Original-case form, shown back to the user.
    pub display_name: String,
    /// Lowercased email.
    pub email: String,
    pub password: String,
}

/// Login fields after sanitization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLogin {
    pub identifier: String,
    pub password: String,
}

/// Strip script tags and angle brackets, cap the length. Runs before any
/// field-specific rule.
pub fn sanitize(input: &str) -> String {
    let stripped = SCRIPT_TAG_RE.replace_all(input, "");
    stripped
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .take(MAX_INPUT_LEN)
        .collect()
}

fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.len() < 3 || username.len() > 30 {
        return Err("Username must be 3-30 characters long");
    }
    if !USERNAME_RE.is_match(username) {
        return Err("Username can only contain letters, numbers, hyphens, and underscores");
    }
    if USERNAME_EDGE_SEPARATOR_RE.is_match(username) {
        return Err("Username cannot start or end with special characters");
    }
    if USERNAME_DOUBLE_SEPARATOR_RE.is_match(username) {
        return Err("Username cannot contain consecutive special characters");
    }
    let lower = username.to_lowercase();
    if USERNAME_BLACKLIST.contains(&lower.as_str()) {
        return Err("This username is not available");
    }
    if USERNAME_FORBIDDEN_SUBSTRINGS
        .iter()
        .any(|s| lower.contains(s))
    {
        return Err("This username is not available");
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<String, &'static str> {
    if email.is_empty() {
        return Err("Email address is required");
    }
    if email.len() > 320 {
        return Err("Email address must not exceed 320 characters");
    }
    if !EMAIL_RE.is_match(email) || email.contains("..") {
        return Err("Please enter a valid email address");
    }
    // The regex guarantees exactly the shape local@domain; reject dotted edges.
    let (local, domain) = email.split_once('@').ok_or("Please enter a valid email address")?;
    if local.len() > 64
        || local.starts_with('.')
        || local.ends_with('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err("Please enter a valid email address");
    }
    Ok(email.to_lowercase())
}

fn validate_password(password: &str, username: &str, email: &str) -> Result<(), &'static str> {
    // Character count, not byte count: multibyte input must not slip under
    // the minimum or get bounced off the maximum.
    let length = password.chars().count();
    if length < 8 || length > 128 {
        return Err("Password must be 8-128 characters long");
    }
    let lower = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lower.as_str()) {
        return Err("This password is too common");
    }
    if !username.is_empty() && lower == username.to_lowercase() {
        return Err("Password cannot be the same as your username");
    }
    if let Some((local, _)) = email.split_once('@') {
        if lower == local.to_lowercase() {
            return Err("Password cannot be the same as your email");
        }
    }
    if SEQUENTIAL_PATTERNS.iter().any(|p| lower.contains(p)) {
        return Err("Password cannot contain sequential characters");
    }
    Ok(())
}

/// Validate raw registration fields. On success the fields come back
/// normalized: lowercase username/email plus the original-case display name.
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
) -> Result<NormalizedRegistration, Vec<FieldError>> {
    let username = sanitize(username).trim().to_string();
    let email = sanitize(email).trim().to_string();
    let password = sanitize(password);

    let mut errors = Vec::new();
    if let Err(message) = validate_username(&username) {
        errors.push(FieldError::new("username", message));
    }
    let normalized_email = match validate_email(&email) {
        Ok(normalized) => normalized,
        Err(message) => {
            errors.push(FieldError::new("email", message));
            String::new()
        }
    };
    if let Err(message) = validate_password(&password, &username, &email) {
        errors.push(FieldError::new("password", message));
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NormalizedRegistration {
        username: username.to_lowercase(),
        display_name: username,
        email: normalized_email,
        password,
    })
}

/// Validate raw login fields. The identifier keeps its case here; the
/// identity resolver lowercases it with the same rule used at write time.
pub fn validate_login(identifier: &str, password: &str) -> Result<NormalizedLogin, Vec<FieldError>> {
    let identifier = sanitize(identifier).trim().to_string();
    let password = sanitize(password);

    let mut errors = Vec::new();
    if identifier.is_empty() {
        errors.push(FieldError::new("identifier", "Username or email is required"));
    } else if identifier.len() > 320 {
        errors.push(FieldError::new("identifier", "Input too long"));
    } else if identifier.contains(['<', '>', '&']) {
        errors.push(FieldError::new("identifier", "Invalid characters in input"));
    }
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NormalizedLogin {
        identifier,
        password,
    })
}
