/// Input validation for everything crossing the HTTP boundary
use arrayvec::ArrayString;
use nickgate_db::NICKNAME_MAX_CHARS;
use thiserror::Error;

/// Game player name - max 16 characters, stored inline (no heap allocation).
pub type PlayerName = ArrayString<16>;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Player name cannot be empty")]
    PlayerNameEmpty,

    #[error("Player name too long (max 16 characters, got {0})")]
    PlayerNameTooLong(usize),

    #[error("Player name contains invalid characters (only alphanumeric and underscore allowed)")]
    PlayerNameInvalidChars,

    #[error("Nickname cannot be empty")]
    NicknameEmpty,

    #[error("Nickname too long (max {NICKNAME_MAX_CHARS} characters, got {0})")]
    NicknameTooLong(usize),
}

/// Validates a claimed in-game player name
///
/// Rules:
/// - Cannot be empty
/// - Only ASCII alphanumeric characters and underscores
/// - Max 16 characters
pub fn validate_player_name(name: &str) -> Result<PlayerName, ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::PlayerNameEmpty);
    }

    // Charset first: once the name is ASCII-only, bytes and characters agree
    // and the length check below is exact.
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::PlayerNameInvalidChars);
    }

    if name.len() > 16 {
        return Err(ValidationError::PlayerNameTooLong(name.len()));
    }

    PlayerName::try_from(name).map_err(|_| ValidationError::PlayerNameTooLong(name.len()))
}

/// Validates a group nickname
///
/// Rules:
/// - Cannot be empty
/// - Max 48 characters (the table column is CHAR(48))
pub fn validate_nickname(nickname: &str) -> Result<(), ValidationError> {
    if nickname.is_empty() {
        return Err(ValidationError::NicknameEmpty);
    }

    let chars = nickname.chars().count();
    if chars > NICKNAME_MAX_CHARS {
        return Err(ValidationError::NicknameTooLong(chars));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_player_names() {
        assert!(validate_player_name("Steve").is_ok());
        assert!(validate_player_name("Player_123").is_ok());
        assert!(validate_player_name("a").is_ok());
        assert!(validate_player_name("1234567890123456").is_ok()); // exactly 16 chars
    }

    #[test]
    fn test_empty_player_name() {
        assert_eq!(
            validate_player_name(""),
            Err(ValidationError::PlayerNameEmpty)
        );
    }

    #[test]
    fn test_player_name_too_long() {
        let long_name = "12345678901234567"; // 17 characters
        assert_eq!(
            validate_player_name(long_name),
            Err(ValidationError::PlayerNameTooLong(17))
        );
    }

    #[test]
    fn test_player_name_invalid_chars() {
        assert_eq!(
            validate_player_name("Player-123"),
            Err(ValidationError::PlayerNameInvalidChars)
        );
        assert_eq!(
            validate_player_name("Player 123"),
            Err(ValidationError::PlayerNameInvalidChars)
        );
    }

    #[test]
    fn test_player_name_rejects_non_ascii() {
        // Non-ASCII letters are an invalid charset, not a length problem,
        // even though they widen the byte count
        assert_eq!(
            validate_player_name("Stévé_etc_etc_16"),
            Err(ValidationError::PlayerNameInvalidChars)
        );
    }

    #[test]
    fn test_valid_nicknames() {
        assert!(validate_nickname("Steve").is_ok());
        assert!(validate_nickname("Steve | builds stuff").is_ok());
        assert!(validate_nickname(&"x".repeat(48)).is_ok());
    }

    #[test]
    fn test_empty_nickname() {
        assert_eq!(validate_nickname(""), Err(ValidationError::NicknameEmpty));
    }

    #[test]
    fn test_nickname_too_long() {
        let long = "x".repeat(49);
        assert_eq!(
            validate_nickname(&long),
            Err(ValidationError::NicknameTooLong(49))
        );
    }

    #[test]
    fn test_nickname_length_counts_chars_not_bytes() {
        // 48 multibyte characters are still within the limit
        let nickname = "游".repeat(48);
        assert!(validate_nickname(&nickname).is_ok());
    }
}
