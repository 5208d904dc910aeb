//! What a post is asking for, so the reply can answer in kind.
//!
//! Detection is phrase based and checked in a fixed order: asking for experience, sharing
//! experience, comparing options, then anything else.

use std::fmt;

const ASK_EXPERIENCE: &[&str] = &[
    "has anyone tried",
    "anyone tried",
    "has anyone used",
    "anyone used",
    "anyone else",
];

const SHARE_EXPERIENCE: &[&str] = &[
    "i have been trying",
    "i've been trying",
    "i have been using",
    "i've been using",
];

const COMPARISON_WORDS: &[&str] = &["vs", "versus"];

/// Phrases showing the author already reports what they did.
const OWN_ATTEMPTS: &[&str] = &["i have", "i've", "i tried", "already tried", "tried"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// The author asks whether others have tried something.
    AskExperience,
    /// The author reports their own experience.
    ShareExperience,
    /// The author weighs options against each other.
    Comparison,
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::AskExperience => "ask_experience",
            Intent::ShareExperience => "share_experience",
            Intent::Comparison => "comparison",
            Intent::General => "general",
        }
    }

    /// Task line shaping the reply to this intent.
    pub fn guidance(&self, marker: &str) -> String {
        match self {
            Intent::AskExperience => format!(
                "The author asks about other people's results: answer with a concrete observation about using {marker} on this kind of problem, not a general description."
            ),
            Intent::ShareExperience => format!(
                "The author is sharing their own experience: build on what they report and add one thing {marker} would change in that workflow."
            ),
            Intent::Comparison => format!(
                "The author is comparing options: look past raw benchmarks and say where {marker} fits in the workflow being compared."
            ),
            Intent::General => format!(
                "Add one specific technical point about how {marker} fits this problem."
            ),
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn words(lower: &str) -> impl Iterator<Item = &str> {
    lower
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
}

/// Classifies a post.
pub fn detect_intent(text: &str) -> Intent {
    let lower = text.to_lowercase();

    if ASK_EXPERIENCE.iter().any(|p| lower.contains(p)) {
        return Intent::AskExperience;
    }
    if SHARE_EXPERIENCE.iter().any(|p| lower.contains(p)) {
        return Intent::ShareExperience;
    }
    if words(&lower).any(|w| w.starts_with("compar") || COMPARISON_WORDS.contains(&w)) {
        return Intent::Comparison;
    }
    Intent::General
}

/// Returns `true` when the post already says what the author tried, so the reply must not
/// ask about it again.
pub fn reports_own_attempts(text: &str) -> bool {
    let lower = text.to_lowercase();
    OWN_ATTEMPTS.iter().any(|phrase| {
        if phrase.contains(' ') {
            lower.contains(phrase)
        } else {
            words(&lower).any(|w| w == *phrase)
        }
    })
}
