//! # Validation Module
//!
//! Input validation for cash counter operations.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum)                                        │
//! │  └── Type validation (JSON deserialization, path/query parsing)        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE + Totalizer                                      │
//! │  ├── identity and notes limits                                         │
//! │  ├── pagination bounds                                                 │
//! │  └── denomination counts (see denomination.rs)                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE(date)                                                      │
//! │  └── CHECK constraints on status                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::validation::{validate_staff_id, validate_notes};
//!
//! assert_eq!(validate_staff_id("opened_by", "  cashier-7 ").unwrap(), "cashier-7");
//! assert_eq!(validate_notes("notes", Some("   ".to_string())).unwrap(), None);
//! ```

use crate::error::ValidationError;
use crate::{MAX_NOTES_LEN, MAX_STAFF_ID_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a staff identity reference and returns it trimmed.
///
/// ## Rules
/// - Must not be blank
/// - At most [`MAX_STAFF_ID_LEN`] characters
pub fn validate_staff_id(field: &str, staff_id: &str) -> ValidationResult<String> {
    let staff_id = staff_id.trim();

    if staff_id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if staff_id.chars().count() > MAX_STAFF_ID_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_STAFF_ID_LEN,
        });
    }

    Ok(staff_id.to_string())
}

/// Normalizes an optional free-text note.
///
/// Blank notes become `None` so the record never stores whitespace.
///
/// ## Example
/// ```rust
/// use till_core::validation::validate_notes;
///
/// assert_eq!(
///     validate_notes("closing_notes", Some(" short by a coin ".to_string())).unwrap(),
///     Some("short by a coin".to_string())
/// );
/// assert!(validate_notes("closing_notes", Some("x".repeat(501))).is_err());
/// ```
pub fn validate_notes(field: &str, notes: Option<String>) -> ValidationResult<Option<String>> {
    let Some(notes) = notes else {
        return Ok(None);
    };

    let trimmed = notes.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.chars().count() > MAX_NOTES_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NOTES_LEN,
        });
    }

    Ok(Some(trimmed.to_string()))
}

/// Ensures a credential was actually supplied. Passwords are not trimmed.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Resolves history paging parameters.
///
/// ## Rules
/// - `limit` defaults to `default_limit`, must be in `1..=max_limit`
/// - `offset` defaults to 0, must not be negative
///
/// ## Example
/// ```rust
/// use till_core::validation::validate_pagination;
///
/// assert_eq!(validate_pagination(None, None, 30, 100).unwrap(), (30, 0));
/// assert!(validate_pagination(Some(0), None, 30, 100).is_err());
/// assert!(validate_pagination(Some(10), Some(-1), 30, 100).is_err());
/// ```
pub fn validate_pagination(
    limit: Option<i64>,
    offset: Option<i64>,
    default_limit: i64,
    max_limit: i64,
) -> ValidationResult<(i64, i64)> {
    let limit = limit.unwrap_or(default_limit.min(max_limit));
    if !(1..=max_limit).contains(&limit) {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: max_limit,
        });
    }

    let offset = offset.unwrap_or(0);
    if offset < 0 {
        return Err(ValidationError::OutOfRange {
            field: "offset".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok((limit, offset))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_staff_id() {
        assert_eq!(validate_staff_id("closed_by", "cashier-1").unwrap(), "cashier-1");
        assert_eq!(validate_staff_id("closed_by", "  owner ").unwrap(), "owner");

        assert!(validate_staff_id("closed_by", "").is_err());
        assert!(validate_staff_id("closed_by", "   ").is_err());
        assert!(validate_staff_id("closed_by", &"a".repeat(MAX_STAFF_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_notes() {
        assert_eq!(validate_notes("notes", None).unwrap(), None);
        assert_eq!(validate_notes("notes", Some(String::new())).unwrap(), None);
        assert_eq!(
            validate_notes("notes", Some("till jammed".to_string())).unwrap(),
            Some("till jammed".to_string())
        );
        assert!(validate_notes("notes", Some("n".repeat(MAX_NOTES_LEN))).is_ok());
        assert!(validate_notes("notes", Some("n".repeat(MAX_NOTES_LEN + 1))).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("hunter2").is_ok());
        assert!(validate_password(" ").is_ok());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validate_pagination() {
        assert_eq!(validate_pagination(None, None, 30, 100).unwrap(), (30, 0));
        assert_eq!(validate_pagination(Some(100), Some(40), 30, 100).unwrap(), (100, 40));
        assert_eq!(validate_pagination(None, None, 30, 10).unwrap(), (10, 0));

        assert!(validate_pagination(Some(0), None, 30, 100).is_err());
        assert!(validate_pagination(Some(-5), None, 30, 100).is_err());
        assert!(validate_pagination(Some(101), None, 30, 100).is_err());
        assert!(validate_pagination(None, Some(-1), 30, 100).is_err());
    }
}
