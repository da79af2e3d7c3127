//! Player nickname validation and normalization.
//!
//! Applied to the display name carried by join events before it ever reaches
//! game state. Rejections fall back to a generated guest name.

/// Nickname length bounds (measured in characters, after trimming).
pub const MIN_LENGTH: usize = 2;
pub const MAX_LENGTH: usize = 20;

/// Reserved words a nickname may not contain (case-insensitive).
/// "slime" and "arena" stay allowed - guest names use them.
const BANNED_WORDS: &[&str] = &[
    "admin",
    "moderator",
    "mod",
    "support",
    "official",
    "bot",
    "system",
    "dev",
    "staff",
    "gm",
    "gamemaster",
];

/// Why a nickname was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NicknameError {
    #[error("nickname_too_short (min: {MIN_LENGTH})")]
    TooShort,
    #[error("nickname_too_long (max: {MAX_LENGTH})")]
    TooLong,
    #[error("nickname_invalid_characters")]
    InvalidCharacters,
    #[error("nickname_contains_banned_word")]
    BannedWord,
    #[error("nickname_multiple_spaces")]
    MultipleSpaces,
}

/// Latin and Cyrillic letters, digits, space, hyphen, underscore.
fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || ('А'..='я').contains(&c)
        || c == 'Ё'
        || c == 'ё'
        || c == ' '
        || c == '_'
        || c == '-'
}

/// Validate a nickname, reporting the first failed rule.
pub fn validate(nickname: &str) -> Result<(), NicknameError> {
    let trimmed = nickname.trim();

    let len = trimmed.chars().count();
    if len < MIN_LENGTH {
        return Err(NicknameError::TooShort);
    }
    if len > MAX_LENGTH {
        return Err(NicknameError::TooLong);
    }

    if !trimmed.chars().all(is_allowed_char) {
        return Err(NicknameError::InvalidCharacters);
    }

    let lower = trimmed.to_lowercase();
    if BANNED_WORDS.iter().any(|word| lower.contains(word)) {
        return Err(NicknameError::BannedWord);
    }

    if trimmed.contains("  ") {
        return Err(NicknameError::MultipleSpaces);
    }

    Ok(())
}

/// Convenience predicate over [`validate`].
pub fn is_valid(nickname: &str) -> bool {
    validate(nickname).is_ok()
}

/// Trim and collapse internal whitespace runs to a single space.
pub fn normalize(nickname: &str) -> String {
    nickname.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize, then validate. Returns the normalized name on success.
pub fn validate_and_normalize(nickname: &str) -> Result<String, NicknameError> {
    let normalized = normalize(nickname);
    validate(&normalized)?;
    Ok(normalized)
}
