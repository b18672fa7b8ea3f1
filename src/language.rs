//! Bag-of-words English detection.
//!
//! The service accepts both English and Kinyarwanda input. Instead of a
//! language-identification model we check what fraction of the input tokens
//! belong to a fixed set of very common English words; Kinyarwanda shares
//! essentially none of them.

/// Common English function words. Matching is done on lowercased whole tokens.
const COMMON_ENGLISH_WORDS: &[&str] = &[
    "a", "about", "after", "all", "am", "an", "and", "are", "as", "at", "be", "but", "by", "can",
    "do", "feel", "feeling", "for", "from", "get", "had", "has", "have", "he", "how", "hurts",
    "i", "in", "is", "it", "me", "my", "no", "not", "of", "on", "or", "pain", "she", "since",
    "so", "that", "the", "they", "this", "to", "very", "was", "we", "what", "when", "with",
    "you", "your",
];

/// Fraction of known-English tokens above which input is classified English.
const ENGLISH_RATIO_THRESHOLD: f64 = 0.4;

/// Classify text as English or not.
///
/// Empty input (no word tokens at all) defaults to English so the pipeline
/// skips translation rather than guessing.
pub fn is_english(text: &str) -> bool {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return true;
    }

    let matches = tokens
        .iter()
        .filter(|t| COMMON_ENGLISH_WORDS.contains(t))
        .count();

    matches as f64 / tokens.len() as f64 > ENGLISH_RATIO_THRESHOLD
}
