use crate::models::SentimentLabel;

pub const POSITIVE_WORDS: &[&str] = &[
    "happy", "good", "great", "awesome", "love", "excited", "wonderful",
];

pub const NEGATIVE_WORDS: &[&str] = &[
    "sad", "bad", "angry", "hate", "terrible", "awful", "scared", "worried",
];

pub fn normalize_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

pub fn classify(text: &str) -> SentimentLabel {
    let lower = text.to_lowercase();

    // Negative keywords win when both polarities match.
    if contains_any(&lower, NEGATIVE_WORDS) {
        return SentimentLabel::Negative;
    }

    if contains_any(&lower, POSITIVE_WORDS) {
        return SentimentLabel::Positive;
    }

    SentimentLabel::Neutral
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("HAPPY"), SentimentLabel::Positive);
        assert_eq!(classify("happy"), SentimentLabel::Positive);
        assert_eq!(classify("I am SO Excited"), SentimentLabel::Positive);
    }

    #[test]
    fn negative_takes_priority() {
        assert_eq!(classify("happy but scared"), SentimentLabel::Negative);
        assert_eq!(
            classify("school was great until the awful test"),
            SentimentLabel::Negative
        );
    }

    #[test]
    fn empty_input_is_neutral() {
        assert_eq!(classify(""), SentimentLabel::Neutral);
    }

    #[test]
    fn unmatched_text_is_neutral() {
        assert_eq!(classify("we watched clouds today"), SentimentLabel::Neutral);
    }

    #[test]
    fn keywords_match_as_substrings() {
        assert_eq!(classify("unhappy"), SentimentLabel::Positive);
        assert_eq!(classify("I am saddened"), SentimentLabel::Negative);
    }

    #[test]
    fn normalizes_whitespace() {
        assert_eq!(normalize_text("  so   much\tspace  "), "so much space");
    }
}
