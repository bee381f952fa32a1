use crate::error::ConfessionError;

pub const MIN_CONFESSION_LENGTH: usize = 10;
pub const MAX_CONFESSION_LENGTH: usize = 2000;

/// Length is counted in characters; surrounding whitespace doesn't count
/// towards the minimum.
pub fn validate_confession_text(text: &str) -> Result<(), ConfessionError> {
    if text.chars().count() > MAX_CONFESSION_LENGTH {
        return Err(ConfessionError::TooLong {
            max: MAX_CONFESSION_LENGTH,
        });
    }

    if text.trim().chars().count() < MIN_CONFESSION_LENGTH {
        return Err(ConfessionError::TooShort {
            min: MIN_CONFESSION_LENGTH,
        });
    }

    Ok(())
}
