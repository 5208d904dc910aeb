//! Structural and content rules a comment must satisfy.

use std::collections::HashSet;
use std::fmt;

use super::text::{count_sentences, meaningful_words, topic_overlap};
use crate::constants::{
    DEFAULT_FORBIDDEN_PHRASES, DEFAULT_MAX_CHARS, DEFAULT_MAX_SENTENCES, DEFAULT_MIN_CHARS,
    DEFAULT_MIN_SENTENCES, DEFAULT_MIN_TOPIC_OVERLAP, DEFAULT_REQUIRED_MARKER,
};

/// Thresholds applied at every validation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityRules {
    pub min_chars: usize,
    pub max_chars: usize,
    pub min_sentences: usize,
    pub max_sentences: usize,
    /// Must appear in every comment, matched case-insensitively.
    pub required_marker: String,
    /// Lower-cased on construction; matched as case-insensitive substrings.
    pub forbidden_phrases: Vec<String>,
    pub min_topic_overlap: usize,
}

impl Default for QualityRules {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
            max_chars: DEFAULT_MAX_CHARS,
            min_sentences: DEFAULT_MIN_SENTENCES,
            max_sentences: DEFAULT_MAX_SENTENCES,
            required_marker: DEFAULT_REQUIRED_MARKER.to_string(),
            forbidden_phrases: DEFAULT_FORBIDDEN_PHRASES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            min_topic_overlap: DEFAULT_MIN_TOPIC_OVERLAP,
        }
    }
}

/// Rule family, in the order corrective instructions are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleCategory {
    Length,
    Sentences,
    Marker,
    Boilerplate,
    Specificity,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Length => "length",
            RuleCategory::Sentences => "sentences",
            RuleCategory::Marker => "marker",
            RuleCategory::Boilerplate => "boilerplate",
            RuleCategory::Specificity => "specificity",
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    TooShort { chars: usize, min: usize },
    TooLong { chars: usize, max: usize },
    TooFewSentences { count: usize, min: usize },
    TooManySentences { count: usize, max: usize },
    MissingMarker { marker: String },
    ForbiddenPhrase { phrase: String },
    InsufficientOverlap { shared: usize, required: usize },
}

impl RuleViolation {
    pub fn category(&self) -> RuleCategory {
        match self {
            RuleViolation::TooShort { .. } | RuleViolation::TooLong { .. } => RuleCategory::Length,
            RuleViolation::TooFewSentences { .. } | RuleViolation::TooManySentences { .. } => {
                RuleCategory::Sentences
            }
            RuleViolation::MissingMarker { .. } => RuleCategory::Marker,
            RuleViolation::ForbiddenPhrase { .. } => RuleCategory::Boilerplate,
            RuleViolation::InsufficientOverlap { .. } => RuleCategory::Specificity,
        }
    }
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleViolation::TooShort { chars, min } => write!(f, "too short ({chars} < {min} chars)"),
            RuleViolation::TooLong { chars, max } => write!(f, "too long ({chars} > {max} chars)"),
            RuleViolation::TooFewSentences { count, min } => {
                write!(f, "too few sentences ({count} < {min})")
            }
            RuleViolation::TooManySentences { count, max } => {
                write!(f, "too many sentences ({count} > {max})")
            }
            RuleViolation::MissingMarker { marker } => write!(f, "missing marker '{marker}'"),
            RuleViolation::ForbiddenPhrase { phrase } => write!(f, "forbidden phrase '{phrase}'"),
            RuleViolation::InsufficientOverlap { shared, required } => {
                write!(f, "only {shared} topic word(s) reused, {required} required")
            }
        }
    }
}

/// Outcome of validating one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationVerdict {
    pub accepted: bool,
    /// In rule order: length, sentences, marker, boilerplate, specificity.
    pub violations: Vec<RuleViolation>,
}

impl ValidationVerdict {
    fn from_violations(violations: Vec<RuleViolation>) -> Self {
        Self {
            accepted: violations.is_empty(),
            violations,
        }
    }

    /// Distinct failed categories in fixed order.
    pub fn categories(&self) -> Vec<RuleCategory> {
        let mut categories: Vec<RuleCategory> =
            self.violations.iter().map(RuleViolation::category).collect();
        categories.sort();
        categories.dedup();
        categories
    }

    pub fn violation_names(&self) -> Vec<&'static str> {
        self.categories().iter().map(RuleCategory::as_str).collect()
    }
}

impl QualityRules {
    /// Returns a copy with forbidden phrases lower-cased, trimmed and de-duplicated.
    pub fn normalized(mut self) -> Self {
        let mut seen = HashSet::new();
        self.forbidden_phrases = self
            .forbidden_phrases
            .iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty() && seen.insert(p.clone()))
            .collect();
        self.required_marker = self.required_marker.trim().to_string();
        self
    }

    /// First forbidden phrase contained in `text`, if any.
    pub fn forbidden_phrase_in(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.forbidden_phrases
            .iter()
            .map(String::as_str)
            .find(|phrase| lower.contains(&phrase.to_lowercase()))
    }

    /// Meaningful topic words a comment may repeat: those containing a forbidden phrase
    /// are excluded.
    pub fn usable_topic_words(&self, topic: &str) -> Vec<String> {
        meaningful_words(topic)
            .into_iter()
            .filter(|word| self.forbidden_phrase_in(word).is_none())
            .collect()
    }

    /// Overlap actually required for `topic`: a topic with fewer usable words than the
    /// configured minimum only has to be matched on the words it has.
    pub fn effective_overlap(&self, topic: &str) -> usize {
        self.min_topic_overlap
            .min(self.usable_topic_words(topic).len())
    }

    /// Checks `text` against every rule. `topic` is the title and body the comment answers.
    pub fn validate(&self, text: &str, topic: &str) -> ValidationVerdict {
        let mut violations = Vec::new();
        let lower = text.to_lowercase();

        let chars = text.chars().count();
        if chars < self.min_chars {
            violations.push(RuleViolation::TooShort {
                chars,
                min: self.min_chars,
            });
        } else if chars > self.max_chars {
            violations.push(RuleViolation::TooLong {
                chars,
                max: self.max_chars,
            });
        }

        let count = count_sentences(text);
        if count < self.min_sentences {
            violations.push(RuleViolation::TooFewSentences {
                count,
                min: self.min_sentences,
            });
        } else if count > self.max_sentences {
            violations.push(RuleViolation::TooManySentences {
                count,
                max: self.max_sentences,
            });
        }

        if !lower.contains(&self.required_marker.to_lowercase()) {
            violations.push(RuleViolation::MissingMarker {
                marker: self.required_marker.clone(),
            });
        }

        for phrase in &self.forbidden_phrases {
            if lower.contains(&phrase.to_lowercase()) {
                violations.push(RuleViolation::ForbiddenPhrase {
                    phrase: phrase.clone(),
                });
            }
        }

        let required = self.effective_overlap(topic);
        let shared = topic_overlap(text, topic);
        if shared < required {
            violations.push(RuleViolation::InsufficientOverlap { shared, required });
        }

        ValidationVerdict::from_violations(violations)
    }
}
