//! String helpers for the booking pages.

use unicode_segmentation::UnicodeSegmentation;

use crate::Error;

/// Upper-case the first character of each space separated word.
///
/// Words are split on single spaces, so runs of spaces are preserved.
pub fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut graphemes = word.graphemes(true);
            match graphemes.next() {
                Some(first) => first.to_uppercase() + graphemes.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Convert an "HH:MM:SS" duration, as used for appointment lengths, into minutes.
///
/// Seconds contribute a fraction of a minute, e.g. "00:01:30" is 1.5 minutes.
///
/// # Errors
/// Returns [Error::InvalidDuration] if `duration` does not have exactly three
/// numeric components.
pub fn duration_to_minutes(duration: &str) -> Result<f64, Error> {
    let invalid = || Error::InvalidDuration(duration.to_owned());

    let components = duration
        .split(':')
        .map(|component| component.trim().parse::<u32>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;

    let [hours, minutes, seconds] = components.as_slice() else {
        return Err(invalid());
    };

    Ok(f64::from(*hours) * 60.0 + f64::from(*minutes) + f64::from(*seconds) / 60.0)
}

/// Count the user perceived characters in `text`.
pub(crate) fn grapheme_count(text: &str) -> usize {
    text.graphemes(true).count()
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::{capitalize_words, duration_to_minutes, grapheme_count};

    #[test]
    fn capitalizes_each_word() {
        assert_eq!(capitalize_words("thirty minute meeting"), "Thirty Minute Meeting");
    }

    #[test]
    fn keeps_the_rest_of_each_word() {
        assert_eq!(capitalize_words("one-on-one with ALEX"), "One-on-one With ALEX");
    }

    #[test]
    fn preserves_repeated_spaces() {
        assert_eq!(capitalize_words("  quick  sync"), "  Quick  Sync");
    }

    #[test]
    fn capitalizes_non_ascii_words() {
        assert_eq!(capitalize_words("émile über"), "Émile Über");
    }

    #[test]
    fn capitalizes_empty_string() {
        assert_eq!(capitalize_words(""), "");
    }

    #[test]
    fn converts_whole_minutes() {
        assert_eq!(duration_to_minutes("01:30:00"), Ok(90.0));
        assert_eq!(duration_to_minutes("00:15:00"), Ok(15.0));
    }

    #[test]
    fn converts_seconds_to_fractions() {
        assert_eq!(duration_to_minutes("00:01:30"), Ok(1.5));
    }

    #[test]
    fn rejects_malformed_durations() {
        for duration in ["", "01:30", "01:30:00:00", "aa:bb:cc", "-1:00:00"] {
            assert_eq!(
                duration_to_minutes(duration),
                Err(Error::InvalidDuration(duration.to_owned())),
                "converting {duration:?}"
            );
        }
    }

    #[test]
    fn counts_graphemes_not_bytes() {
        assert_eq!(grapheme_count("Zoë"), 3);
        assert_eq!(grapheme_count("e\u{301}"), 1);
    }
}
