//! Tokenisation helpers shared by the validator, fallback and prompt builder.

use std::collections::HashSet;

/// Shortest token counted as a meaningful word.
pub const MIN_MEANINGFUL_CHARS: usize = 4;

/// Longest token counted as a meaningful word. Longer tokens are usually hashes or ids.
pub const MAX_MEANINGFUL_CHARS: usize = 24;

const STOP_WORDS: &[&str] = &[
    "able", "about", "above", "after", "again", "against", "also", "anyone", "anything",
    "around", "because", "been", "before", "being", "below", "between", "both", "cannot",
    "could", "does", "doing", "done", "down", "during", "each", "either", "else", "even",
    "ever", "every", "from", "further", "getting", "give", "going", "gone", "good", "have",
    "having", "hello", "help", "here", "into", "just", "know", "like", "looking", "made",
    "make", "many", "might", "more", "most", "much", "must", "need", "needs", "never", "once",
    "only", "other", "ours", "over", "please", "really", "same", "should", "since", "some",
    "someone", "something", "still", "such", "sure", "than", "thank", "thanks", "that",
    "their", "theirs", "them", "then", "there", "these", "they", "thing", "things", "think",
    "this", "those", "though", "through", "under", "until", "upon", "using", "very", "want",
    "wants", "well", "were", "what", "whatever", "when", "where", "whether", "which", "while",
    "with", "within", "without", "would", "your", "yours",
];

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.binary_search(&word).is_ok()
}

/// Letters, digits and combining diacritical marks. Lower-casing can emit a combining
/// mark (`İ` becomes `i` + U+0307), which must stay inside its word.
#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Distinct meaningful words in first-appearance order, lower-cased.
///
/// The text is lower-cased before it is split, so re-tokenising any returned word yields
/// the same word.
pub fn meaningful_words(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut seen = HashSet::new();
    lower
        .split(|c: char| !is_word_char(c))
        .filter(|token| {
            let len = token.chars().count();
            (MIN_MEANINGFUL_CHARS..=MAX_MEANINGFUL_CHARS).contains(&len)
        })
        .filter(|word| !is_stop_word(word))
        .filter(|word| seen.insert(*word))
        .map(str::to_string)
        .collect()
}

/// Number of distinct meaningful words of `topic` that also occur in `candidate`.
pub fn topic_overlap(candidate: &str, topic: &str) -> usize {
    let candidate_words: HashSet<String> = meaningful_words(candidate).into_iter().collect();
    meaningful_words(topic)
        .iter()
        .filter(|word| candidate_words.contains(*word))
        .count()
}

#[inline]
fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Counts non-empty segments between runs of `.`, `!` and `?`.
pub fn count_sentences(text: &str) -> usize {
    text.split(is_terminator)
        .filter(|segment| !segment.trim().is_empty())
        .count()
}

/// Splits `text` into sentences, each keeping its terminator run.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !is_terminator(c) {
            continue;
        }
        let mut end = idx + c.len_utf8();
        while let Some(&(next_idx, next)) = chars.peek() {
            if !is_terminator(next) {
                break;
            }
            end = next_idx + next.len_utf8();
            chars.next();
        }
        let sentence = text[start..end].trim();
        if sentence.chars().any(char::is_alphanumeric) {
            sentences.push(sentence);
        }
        start = end;
    }

    let tail = text[start..].trim();
    if tail.chars().any(char::is_alphanumeric) {
        sentences.push(tail);
    }
    sentences
}

/// Strips markdown emphasis and headings, surrounding quotes, and collapses whitespace.
pub fn sanitize(raw: &str) -> String {
    let without_headings: Vec<&str> = raw
        .lines()
        .map(|line| line.trim_start().trim_start_matches('#').trim_start())
        .collect();

    let joined = without_headings
        .join(" ")
        .replace("**", "")
        .replace("__", "")
        .replace('*', "");

    let collapsed = joined.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '\u{201c}' | '\u{201d}'))
        .trim()
        .to_string()
}
