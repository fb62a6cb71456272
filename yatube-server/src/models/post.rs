//! Post text validation and display

use super::ValidationError;

/// Number of characters a post or comment shows in listings and logs
pub const PREVIEW_LEN: usize = 15;

/// Validated post body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostText(String);

impl PostText {
    /// Create post text.
    ///
    /// # Rules
    /// - Surrounding whitespace is stripped
    /// - Must be non-empty afterwards
    ///
    /// # Example
    /// ```
    /// use yatube_server::models::PostText;
    ///
    /// assert!(PostText::new("Hello").is_ok());
    /// assert!(PostText::new("  \n ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "text" });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PostText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// First [`PREVIEW_LEN`] characters of `text`, on a char boundary.
pub fn preview(text: &str) -> &str {
    match text.char_indices().nth(PREVIEW_LEN) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_requires_text() {
        assert_eq!(PostText::new("  body \n").unwrap().as_str(), "body");
        assert!(matches!(
            PostText::new("").unwrap_err(),
            ValidationError::Empty { field: "text" }
        ));
    }

    #[test]
    fn preview_is_fifteen_chars() {
        assert_eq!(preview("Test post"), "Test post");
        assert_eq!(preview("Test text for user1 group1"), "Test text for u");
        // multi-byte characters must not be split
        assert_eq!(preview("Текст поста для проверки"), "Текст поста для");
    }
}
