//! Lenient parsing of user-typed run parameters.
//!
//! Bad input never fails a run: it is replaced by a default and logged.

use tracing::warn;

pub const DEFAULT_DISK_COUNT: u32 = 3;
pub const DEFAULT_MOVE_DELAY: f64 = 1.0;

/// Disk count from free text, falling back to [`DEFAULT_DISK_COUNT`].
pub fn parse_disk_count(text: &str) -> u32 {
    match text.trim().parse::<u32>() {
        Ok(count) => count,
        Err(err) => {
            warn!(input = text, %err, fallback = DEFAULT_DISK_COUNT, "invalid disk count");
            DEFAULT_DISK_COUNT
        }
    }
}

/// Move delay in seconds from free text, falling back to
/// [`DEFAULT_MOVE_DELAY`] for anything that is not a positive finite number.
pub fn parse_move_delay(text: &str) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(delay) if delay.is_finite() && delay > 0.0 => delay,
        _ => {
            warn!(input = text, fallback = DEFAULT_MOVE_DELAY, "invalid move delay");
            DEFAULT_MOVE_DELAY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disk_count_accepts_integers() {
        assert_eq!(parse_disk_count("5"), 5);
        assert_eq!(parse_disk_count(" 0 "), 0);
    }

    #[test]
    fn disk_count_falls_back() {
        for text in ["", "three", "-1", "2.5"] {
            assert_eq!(parse_disk_count(text), DEFAULT_DISK_COUNT, "{text:?}");
        }
    }

    #[test]
    fn move_delay_accepts_positive_reals() {
        assert_eq!(parse_move_delay("0.25"), 0.25);
        assert_eq!(parse_move_delay("2"), 2.0);
    }

    #[test]
    fn move_delay_falls_back() {
        for text in ["", "fast", "0", "-1.5", "NaN", "inf"] {
            assert_eq!(parse_move_delay(text), DEFAULT_MOVE_DELAY, "{text:?}");
        }
    }
}
