use once_cell::sync::Lazy;
use regex::Regex;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 6;

static HANDLE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

/// Input state for the two authentication forms. The fields are kept
/// separate so switching modes never leaks one form's input into the other.
#[derive(Default)]
pub struct AuthScreen {
    pub mode: AuthMode,
    pub login_email: String,
    pub login_password: String,
    pub register_email: String,
    pub register_username: String,
    pub register_password: String,
}

impl AuthScreen {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Client-side registration checks. A failure here means no request is made.
/// Login submits as-is; the server is the only judge of credentials.
pub fn validate_registration(username: &str, password: &str) -> Result<(), String> {
    if !HANDLE_CHARS.is_match(username) {
        return Err("Username may only contain letters, digits and _ . -".to_string());
    }
    if !HANDLE_CHARS.is_match(password) {
        return Err("Password may only contain letters, digits and _ . -".to_string());
    }
    if username.len() < USERNAME_MIN_LEN || username.len() > USERNAME_MAX_LEN {
        return Err("Username must be 3 to 50 characters".to_string());
    }
    if password.len() < PASSWORD_MIN_LEN {
        return Err("Password must be at least 6 characters".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_full_allowed_charset() {
        assert!(validate_registration("User_0.9-x", "p.a-s_s1").is_ok());
    }

    #[test]
    fn test_rejects_username_outside_charset() {
        assert!(validate_registration("anna smith", "secret1").is_err());
        assert!(validate_registration("анна", "secret1").is_err());
        assert!(validate_registration("user!", "secret1").is_err());
    }

    #[test]
    fn test_rejects_password_outside_charset() {
        assert!(validate_registration("anna", "pass word").is_err());
        assert!(validate_registration("anna", "пароль123").is_err());
    }

    #[test]
    fn test_username_length_bounds() {
        assert!(validate_registration("ab", "secret1").is_err());
        assert!(validate_registration("abc", "secret1").is_ok());
        assert!(validate_registration(&"a".repeat(50), "secret1").is_ok());
        assert!(validate_registration(&"a".repeat(51), "secret1").is_err());
    }

    #[test]
    fn test_password_minimum_length() {
        assert!(validate_registration("anna", "12345").is_err());
        assert!(validate_registration("anna", "123456").is_ok());
    }

    #[test]
    fn test_empty_fields_rejected() {
        assert!(validate_registration("", "secret1").is_err());
        assert!(validate_registration("anna", "").is_err());
    }
}
