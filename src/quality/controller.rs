//! The quality gate: generate, validate, regenerate once, else fall back.
//!
//! ```text
//! Init -> Generating(1) -> Validating(1) -> Accept
//!                                        -> Generating(2, corrected) -> Validating(2) -> Accept
//!                                                                                     -> Fallback
//! Generating(n) -> Fallback   when the whole model chain fails
//! ```

use tracing::{debug, info, warn};

use super::fallback::synthesize_fallback;
use super::rules::{QualityRules, RuleViolation, ValidationVerdict};
use super::text::sanitize;
use crate::generation::{
    GenerationBackend, GenerationClient, GenerationError, Prompt, PromptBuilder, PromptContext,
    Topic,
};
use crate::retry::Sleeper;

/// Generation attempts before falling back.
pub const MAX_ATTEMPTS: u32 = 2;

/// One generation attempt and its verdict. Logged, then dropped.
#[derive(Debug, Clone)]
pub struct GenerationAttempt {
    pub number: u32,
    pub model: String,
    pub prompt: Prompt,
    pub raw_output: String,
    pub verdict: ValidationVerdict,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// The model chain failed on the given attempt.
    GenerationFailed { attempt: u32, error: GenerationError },
    /// Every attempt produced text that broke a rule; these are the last attempt's violations.
    ValidationFailed { violations: Vec<RuleViolation> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommentOrigin {
    Generated { attempt: u32, model: String },
    Fallback { reason: FallbackReason },
}

/// A comment that satisfies the quality rules.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
    pub origin: CommentOrigin,
}

impl Comment {
    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, CommentOrigin::Fallback { .. })
    }
}

enum GateState {
    Init,
    Generating { attempt: u32, prompt: Prompt },
    Validating { attempt: u32, prompt: Prompt, model: String, raw: String },
    Accept(Comment),
    Fallback(FallbackReason),
}

pub struct CommentController<B, S> {
    generator: GenerationClient<B, S>,
    prompts: PromptBuilder,
    rules: QualityRules,
}

impl<B: GenerationBackend, S: Sleeper> CommentController<B, S> {
    pub fn new(generator: GenerationClient<B, S>, prompts: PromptBuilder) -> Self {
        let rules = prompts.rules().clone();
        Self {
            generator,
            prompts,
            rules,
        }
    }

    pub fn rules(&self) -> &QualityRules {
        &self.rules
    }

    pub fn generator(&self) -> &GenerationClient<B, S> {
        &self.generator
    }

    /// Returns a rule-compliant comment. Never fails.
    pub async fn produce_comment(
        &self,
        topic: &Topic,
        context: &PromptContext,
        chain: &[String],
    ) -> Comment {
        let topic_text = topic.text();
        let mut state = GateState::Init;

        loop {
            state = match state {
                GateState::Init => GateState::Generating {
                    attempt: 1,
                    prompt: self.prompts.build(topic, context),
                },

                GateState::Generating { attempt, prompt } => {
                    debug!(attempt, prompt_chars = prompt.len(), "Generating comment");
                    match self.generator.generate(&prompt, chain).await {
                        Ok(output) => GateState::Validating {
                            attempt,
                            prompt,
                            model: output.model,
                            raw: output.text,
                        },
                        Err(error) => {
                            warn!(attempt, error = %error, "Generation failed, using fallback");
                            GateState::Fallback(FallbackReason::GenerationFailed { attempt, error })
                        }
                    }
                }

                GateState::Validating {
                    attempt,
                    prompt,
                    model,
                    raw,
                } => {
                    let text = sanitize(&raw);
                    let record = GenerationAttempt {
                        number: attempt,
                        model,
                        verdict: self.rules.validate(&text, &topic_text),
                        prompt,
                        raw_output: raw,
                    };
                    self.next_after_validation(record, text, topic)
                }

                GateState::Accept(comment) => return comment,

                GateState::Fallback(reason) => {
                    let text = synthesize_fallback(&topic_text, &self.rules);
                    info!(chars = text.chars().count(), "Returning fallback comment");
                    return Comment {
                        text,
                        origin: CommentOrigin::Fallback { reason },
                    };
                }
            };
        }
    }

    fn next_after_validation(&self, record: GenerationAttempt, text: String, topic: &Topic) -> GateState {
        if record.verdict.accepted {
            info!(
                attempt = record.number,
                model = %record.model,
                chars = text.chars().count(),
                "Comment accepted"
            );
            return GateState::Accept(Comment {
                text,
                origin: CommentOrigin::Generated {
                    attempt: record.number,
                    model: record.model,
                },
            });
        }

        warn!(
            attempt = record.number,
            model = %record.model,
            raw_chars = record.raw_output.chars().count(),
            violations = ?record.verdict.violation_names(),
            "Comment rejected"
        );

        if record.number < MAX_ATTEMPTS {
            let categories = record.verdict.categories();
            GateState::Generating {
                attempt: record.number + 1,
                prompt: self.prompts.strengthen(&record.prompt, &categories, topic),
            }
        } else {
            GateState::Fallback(FallbackReason::ValidationFailed {
                violations: record.verdict.violations,
            })
        }
    }
}

impl<B, S> std::fmt::Debug for CommentController<B, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentController")
            .field("generator", &self.generator)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}
