/// Business logic layer for comment-service
///
/// - `UserService`: account creation and lookup
/// - `PostService`: post creation and lookup
/// - `CommentService`: comments and replies
/// - `ReactionService`: likes and dislikes on posts and comments
///
/// Ranked listings live in `crate::ranking`.
use crate::error::{AppError, Result};

pub mod comments;
pub mod posts;
pub mod reactions;
pub mod users;

pub use comments::CommentService;
pub use posts::PostService;
pub use reactions::ReactionService;
pub use users::UserService;

/// Reject text that is empty once surrounding whitespace is removed, or that
/// contains NUL, which PostgreSQL `TEXT` columns cannot store.
pub(crate) fn require_text(field: &str, value: &str, blank_message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{}: {}", field, blank_message)));
    }
    if value.contains('\0') {
        return Err(AppError::Validation(format!(
            "{}: must not contain NUL characters",
            field
        )));
    }
    Ok(())
}

/// Unwrap a field already checked by `validator`'s `required` rule.
pub(crate) fn required<T>(value: Option<T>, message: &str) -> Result<T> {
    value.ok_or_else(|| AppError::Validation(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert!(require_text("content", "  \n\t", "cannot be blank").is_err());
        assert!(require_text("content", " hi ", "cannot be blank").is_ok());
    }

    #[test]
    fn nul_characters_are_rejected() {
        match require_text("content", "a\0b", "cannot be blank") {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "content: must not contain NUL characters")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(require_text("content", "\0", "cannot be blank").is_err());
        assert!(require_text("content", "a\\0b", "cannot be blank").is_ok());
    }
}
