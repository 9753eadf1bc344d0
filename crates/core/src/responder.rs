use crate::models::SentimentLabel;

pub const GREETING: &str = "Hi there! I'm your SafeNest friend. How are you feeling today? 😊";

const POSITIVE_REPLIES: [&str; 3] = [
    "That's wonderful to hear! Keep up the positive energy! ⭐",
    "I'm so glad you're feeling good! What made your day special? 🌟",
    "Your positivity is amazing! Want to share what's making you happy? 😊",
];

const NEGATIVE_REPLIES: [&str; 3] = [
    "I'm sorry you're feeling this way. Remember, it's okay to have difficult feelings. Would you like to talk about it? 💙",
    "Thank you for sharing with me. You're brave for expressing your feelings. How can I help? 🤗",
    "I hear you, and your feelings are valid. Sometimes talking helps - I'm here to listen. 💚",
];

const NEUTRAL_REPLIES: [&str; 3] = [
    "Thanks for sharing! Is there anything specific on your mind today? 🤔",
    "I'm here to chat whenever you need. What would you like to talk about? 💭",
    "How has your day been so far? I'd love to hear about it! 🌸",
];

/// Source of selection indices for reply picking. Implementations must
/// return a value strictly below `bound`.
pub trait IndexSource {
    fn next_index(&mut self, bound: usize) -> usize;
}

pub fn candidates(label: SentimentLabel) -> &'static [&'static str] {
    match label {
        SentimentLabel::Positive => &POSITIVE_REPLIES,
        SentimentLabel::Negative => &NEGATIVE_REPLIES,
        SentimentLabel::Neutral => &NEUTRAL_REPLIES,
    }
}

pub fn select_reply(label: SentimentLabel, source: &mut dyn IndexSource) -> &'static str {
    let pool = candidates(label);
    pool[source.next_index(pool.len())]
}
