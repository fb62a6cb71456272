//! Account field validation - usernames, passwords, emails

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// Maximum length for usernames and name fields
const MAX_NAME_LEN: usize = 150;

/// Minimum password length
const MIN_PASSWORD_LEN: usize = 8;

/// Letters, digits and `@.+-_` (unicode letters allowed)
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("invalid username regex"));

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex"));

/// Validated username
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Create a username.
    ///
    /// # Example
    /// ```
    /// use yatube_server::models::Username;
    ///
    /// assert!(Username::new("User1").is_ok());
    /// assert!(Username::new("leo.tolstoy@mail").is_ok());
    /// assert!(Username::new("no spaces").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "username" });
        }

        if trimmed.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "username",
                max: MAX_NAME_LEN,
            });
        }

        if !USERNAME_RE.is_match(trimmed) {
            return Err(ValidationError::InvalidFormat {
                field: "username",
                reason: "may contain only letters, numbers, and @/./+/-/_ characters",
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Plaintext password that passed the signup rules
#[derive(Clone, PartialEq, Eq)]
pub struct NewPassword(String);

impl NewPassword {
    /// Both entries must match and be at least 8 characters long.
    pub fn new(password1: &str, password2: &str) -> Result<Self, ValidationError> {
        if password1.is_empty() {
            return Err(ValidationError::Empty { field: "password1" });
        }

        if password2.is_empty() {
            return Err(ValidationError::Empty { field: "password2" });
        }

        if password1 != password2 {
            return Err(ValidationError::Mismatch {
                field: "password2",
                other: "password1",
            });
        }

        if password1.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::TooShort {
                field: "password2",
                min: MIN_PASSWORD_LEN,
            });
        }

        Ok(Self(password1.to_owned()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for NewPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NewPassword(***)")
    }
}

/// Optional email: empty is allowed, anything else must look like an address.
pub fn validate_email(s: &str) -> Result<String, ValidationError> {
    let trimmed = s.trim();
    if trimmed.is_empty() || EMAIL_RE.is_match(trimmed) {
        Ok(trimmed.to_owned())
    } else {
        Err(ValidationError::InvalidFormat {
            field: "email",
            reason: "enter a valid email address",
        })
    }
}

/// Optional first/last name, at most 150 characters.
pub fn validate_name(field: &'static str, s: &str) -> Result<String, ValidationError> {
    let trimmed = s.trim();
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_NAME_LEN,
        });
    }
    Ok(trimmed.to_owned())
}
