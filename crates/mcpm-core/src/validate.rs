//! Name validation for templates and profiles.

use crate::error::{Result, StoreError};

/// Maximum name length, counted in characters.
pub const MAX_NAME_LEN: usize = 50;

/// Names that collide with CLI subcommands.
pub const RESERVED_NAMES: &[&str] = &[
    "help", "version", "list", "server", "apply", "save", "create", "delete", "rename", "add",
    "remove", "show",
];

/// Validate a user supplied identifier.
///
/// `label` names the resource in error messages ("Template", "Profile").
pub fn validate_name(name: &str, label: &str) -> Result<()> {
    if name.is_empty() {
        return Err(StoreError::EmptyName {
            label: label.to_string(),
        });
    }

    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(StoreError::TooLong {
            label: label.to_string(),
            name: name.to_string(),
            len,
            max: MAX_NAME_LEN,
        });
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(StoreError::InvalidCharacters {
            label: label.to_string(),
            name: name.to_string(),
        });
    }

    if RESERVED_NAMES.contains(&name) {
        return Err(StoreError::ReservedWord {
            label: label.to_string(),
            name: name.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn kind_of(name: &str) -> Option<ErrorKind> {
        validate_name(name, "Template").err().map(|e| e.kind())
    }

    #[test]
    fn accepts_plain_names() {
        let longest = "x".repeat(MAX_NAME_LEN);
        for name in ["github", "my-server_2", "A", longest.as_str(), "lists"] {
            assert!(validate_name(name, "Template").is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(kind_of(""), Some(ErrorKind::EmptyName));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert_eq!(kind_of(&"a".repeat(51)), Some(ErrorKind::TooLong));
        // 50 multi-byte chars: too long is not the complaint, the charset is.
        assert_eq!(kind_of(&"é".repeat(50)), Some(ErrorKind::InvalidCharacters));
        assert_eq!(kind_of(&"é".repeat(51)), Some(ErrorKind::TooLong));
    }

    #[test]
    fn rejects_invalid_characters() {
        for name in ["has space", "dot.name", "slash/name", "colon:x", "ünï"] {
            assert_eq!(kind_of(name), Some(ErrorKind::InvalidCharacters), "{name}");
        }
    }

    #[test]
    fn rejects_reserved_words() {
        for name in RESERVED_NAMES {
            assert_eq!(kind_of(name), Some(ErrorKind::ReservedWord), "{name}");
        }
    }

    #[test]
    fn reserved_words_are_case_sensitive() {
        assert!(validate_name("Help", "Profile").is_ok());
    }

    #[test]
    fn error_message_carries_label() {
        let err = validate_name("", "Profile").unwrap_err();
        assert_eq!(err.to_string(), "Profile name cannot be empty");
    }
}
