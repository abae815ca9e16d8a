//! Email body cleaning.

use regex::Regex;

/// Cleaned bodies under this many characters are discarded entirely;
/// the store query applies the same floor to raw bodies.
pub const MIN_BODY_CHARS: usize = 50;

/// Cleaning rules applied in order. Each sign-off marker removes
/// everything from the marker to the end of the text; the final rule
/// collapses runs of blank lines to a single blank line.
static CLEAN_RULES: &[(&str, &str)] = &[
    (r"(?s)\n--\s*\n.*", ""),
    (r"(?s)\nSent from my .*", ""),
    (r"(?s)\nBest regards.*", ""),
    (r"(?s)\nThanks,.*", ""),
    (r"\n\n+", "\n\n"),
];

/// Strips signature blocks and normalizes whitespace in email bodies.
///
/// Compiles the rule table once; `clean` is a pure function of its input.
pub struct TextCleaner {
    rules: Vec<(Regex, &'static str)>,
}

impl TextCleaner {
    pub fn new() -> Self {
        let rules = CLEAN_RULES
            .iter()
            .filter_map(|(pattern, replacement)| {
                Regex::new(pattern).ok().map(|re| (re, *replacement))
            })
            .collect();
        Self { rules }
    }

    /// Clean a raw body for training.
    ///
    /// Returns the empty string when the remainder is under
    /// [`MIN_BODY_CHARS`] characters; otherwise the result is always at
    /// least that long. Idempotent.
    pub fn clean(&self, text: &str) -> String {
        let mut text = text.to_string();
        for (re, replacement) in &self.rules {
            text = re.replace_all(&text, *replacement).into_owned();
        }
        let text = text.trim();
        if text.chars().count() < MIN_BODY_CHARS {
            return String::new();
        }
        text.to_string()
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(text: &str) -> String {
        TextCleaner::new().clean(text)
    }

    const LONG_BODY: &str = "Hi team,\n\nThe deployment finished this morning and all the dashboards look healthy so far. I will keep an eye on the error rates over the weekend.";

    #[test]
    fn test_clean_keeps_plain_body() {
        assert_eq!(clean(LONG_BODY), LONG_BODY);
    }

    #[test]
    fn test_clean_strips_signature_delimiter() {
        let text = format!("{LONG_BODY}\n--\nJane Doe\nVP of Something");
        let cleaned = clean(&text);
        assert_eq!(cleaned, LONG_BODY);
        assert!(!cleaned.contains("Jane Doe"));
    }

    #[test]
    fn test_clean_strips_sent_from_device() {
        let text = format!("{LONG_BODY}\nSent from my iPhone\nstray trailing line");
        let cleaned = clean(&text);
        assert_eq!(cleaned, LONG_BODY);
        assert!(!cleaned.contains("stray trailing line"));
    }

    #[test]
    fn test_clean_strips_best_regards_onward() {
        let text = format!("{LONG_BODY}\nBest regards,\nJohn\n555-0100");
        assert_eq!(clean(&text), LONG_BODY);
    }

    #[test]
    fn test_clean_strips_thanks_onward() {
        let text = format!("{LONG_BODY}\nThanks,\nJohn");
        assert_eq!(clean(&text), LONG_BODY);
    }

    #[test]
    fn test_clean_collapses_blank_lines() {
        let text = "First paragraph of a sufficiently long email body here.\n\n\n\nSecond paragraph with more detail to stay over the floor.";
        let cleaned = clean(text);
        assert!(cleaned.contains("here.\n\nSecond"));
        assert!(!cleaned.contains("\n\n\n"));
    }

    #[test]
    fn test_clean_discards_short_remainder() {
        // 28 chars of content once the sign-off is stripped
        assert_eq!(clean("Hi,\n\nBest regards,\nJohn"), "");
    }

    #[test]
    fn test_clean_length_floor_boundary() {
        let at_floor = "x".repeat(MIN_BODY_CHARS);
        let under_floor = "x".repeat(MIN_BODY_CHARS - 1);
        assert_eq!(clean(&at_floor), at_floor);
        assert_eq!(clean(&under_floor), "");
    }

    #[test]
    fn test_clean_empty_input() {
        assert_eq!(clean(""), "");
    }

    #[test]
    fn test_clean_idempotent() {
        let samples = [
            LONG_BODY.to_string(),
            format!("{LONG_BODY}\n--\nsig"),
            format!("{LONG_BODY}\n\n\n\nTrailing paragraph after a run of blanks.\nBest regards,\nJo"),
            "too short".to_string(),
            String::new(),
        ];
        let cleaner = TextCleaner::new();
        for sample in &samples {
            let once = cleaner.clean(sample);
            assert_eq!(cleaner.clean(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_clean_never_returns_short_nonempty_text() {
        let samples = [
            "short",
            "Hi,\n\nThanks,\nJohn",
            "A body that is long enough to keep because it clears the fifty character floor easily.",
        ];
        let cleaner = TextCleaner::new();
        for sample in samples {
            let cleaned = cleaner.clean(sample);
            assert!(
                cleaned.is_empty() || cleaned.chars().count() >= MIN_BODY_CHARS,
                "cleaned text under the floor: {cleaned:?}"
            );
        }
    }
}
