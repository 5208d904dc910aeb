//! Deterministic comment synthesis used when generation cannot produce an acceptable one.
//!
//! Keywords are the topic's meaningful words ordered by length (longest first, ties by first
//! appearance). The text is one marker sentence naming the keywords, followed by fixed
//! advice sentences until the length and sentence minimums are met. Nothing in the output
//! depends on anything but the topic and the rules.

use super::rules::QualityRules;
use super::text::meaningful_words;

/// Keywords named in the fallback when the overlap minimum does not ask for more.
const BASE_KEYWORDS: usize = 3;

const FILLERS: &[&str] = &[
    "Start with the {k} details you already listed, since they narrow the search faster than rebuilding everything from scratch.",
    "Compare one working setup against the failing one and change a single variable at a time until the difference shows up.",
    "Keep short notes of each attempt so you can roll back cleanly if a change makes things worse.",
    "If an error message appears along the way, paste the exact output here so others can match it against known causes.",
];

/// Topic words ranked for the fallback: longest first, ties by first appearance.
fn ranked_words(topic: &str) -> Vec<String> {
    let mut words: Vec<(usize, String)> = meaningful_words(topic).into_iter().enumerate().collect();
    words.sort_by(|(ia, a), (ib, b)| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then(ia.cmp(ib))
    });
    words.into_iter().map(|(_, w)| w).collect()
}

/// Picks the fallback keywords for `topic`.
pub fn fallback_keywords(topic: &str, count: usize) -> Vec<String> {
    let mut words = ranked_words(topic);
    words.truncate(count);
    words
}

fn join_keywords(keywords: &[String]) -> String {
    match keywords {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

fn plain_opener(marker: &str) -> String {
    format!(
        "{marker} can help here by tracing where the problem starts and showing which step actually changes the result."
    )
}

fn keyword_opener(marker: &str, keywords: &[String]) -> String {
    format!(
        "{marker} can help with the {} side of this by tracing how each part behaves and showing which step actually changes the result.",
        join_keywords(keywords)
    )
}

/// Builds the marker sentence, adding ranked keywords one at a time and keeping only those
/// whose sentence stays free of forbidden phrases.
fn opener(topic: &str, rules: &QualityRules) -> (String, Option<String>) {
    let marker = rules.required_marker.as_str();
    let wanted = BASE_KEYWORDS.max(rules.min_topic_overlap);

    let mut keywords: Vec<String> = Vec::with_capacity(wanted);
    let mut sentence = plain_opener(marker);

    for word in ranked_words(topic) {
        if keywords.len() == wanted {
            break;
        }
        if rules.forbidden_phrase_in(&word).is_some() {
            continue;
        }
        keywords.push(word);
        let candidate = keyword_opener(marker, &keywords);
        if rules.forbidden_phrase_in(&candidate).is_some() {
            keywords.pop();
        } else {
            sentence = candidate;
        }
    }

    (sentence, keywords.into_iter().next())
}

/// Builds a comment from the topic's own words that satisfies `rules` for any topic whose
/// rules passed configuration validation.
///
/// Topic words that are, or combine into, a forbidden phrase are left out.
pub fn synthesize_fallback(topic: &str, rules: &QualityRules) -> String {
    let (first, focus) = opener(topic, rules);
    let focus = focus.as_deref().unwrap_or("specific");

    let mut text = first;
    let mut sentences = 1;
    let mut len = text.chars().count();

    for template in FILLERS {
        let needs_more = len < rules.min_chars || sentences < rules.min_sentences;
        if !needs_more || sentences >= rules.max_sentences {
            break;
        }

        let sentence = template.replace("{k}", focus);
        let added = sentence.chars().count() + 1;
        if len + added > rules.max_chars {
            break;
        }

        let candidate = format!("{text} {sentence}");
        if rules.forbidden_phrase_in(&candidate).is_some() {
            continue;
        }
        text = candidate;
        len += added;
        sentences += 1;
    }

    text
}
