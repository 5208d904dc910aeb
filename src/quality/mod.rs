//! Quality gate for generated comments.
//!
//! [`QualityRules::validate`] checks length, sentence count, the required marker, forbidden
//! boilerplate and topic overlap. [`CommentController`] drives at most two generation
//! attempts through those rules and falls back to [`synthesize_fallback`] otherwise.

pub mod controller;
pub mod fallback;
pub mod rules;
pub mod text;


pub use controller::{
    Comment, CommentController, CommentOrigin, FallbackReason, GenerationAttempt, MAX_ATTEMPTS,
};
pub use fallback::{fallback_keywords, synthesize_fallback};
pub use rules::{QualityRules, RuleCategory, RuleViolation, ValidationVerdict};
pub use text::{count_sentences, meaningful_words, sanitize, topic_overlap};
