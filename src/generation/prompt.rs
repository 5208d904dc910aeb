//! Prompt construction for comment generation.

use crate::constants::{DEFAULT_MAX_TEXT_CHARS, MAX_CONTEXT_CHARS, MAX_STYLE_CHARS};
use super::intent::{detect_intent, reports_own_attempts};
use crate::embedding::truncate_at_word_boundary;
use crate::quality::text::{meaningful_words, split_sentences};
use crate::quality::{QualityRules, RuleCategory};

/// Longest question kept as a key point.
const MAX_QUESTION_CHARS: usize = 200;

const PROBLEM_INDICATORS: &[&str] = &[
    "error", "issue", "problem", "trouble", "stuck", "fail", "broken", "crash", "bug", "can't",
    "cannot", "doesn't", "won't",
];

const TECH_TERMS: &[&str] = &[
    "android", "api", "aws", "bash", "c++", "docker", "git", "github", "go", "java",
    "javascript", "kubernetes", "linux", "macos", "node", "npm", "postgres", "python", "react",
    "rust", "sql", "typescript", "vscode", "windows",
];

/// The discussion post a comment answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub title: String,
    pub body: String,
}

impl Topic {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Title and body as one text, the form used for retrieval and overlap checks.
    pub fn text(&self) -> String {
        format!("{}\n\n{}", self.title.trim(), self.body.trim())
            .trim()
            .to_string()
    }
}

/// Reference material placed in the prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptContext {
    /// Documentation-style snippets.
    pub snippets: Vec<String>,
    /// Example comments whose tone the model should follow.
    pub style_examples: Vec<String>,
}

impl PromptContext {
    pub fn new(snippets: Vec<String>) -> Self {
        Self {
            snippets,
            style_examples: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty() && self.style_examples.is_empty()
    }
}

impl From<Vec<String>> for PromptContext {
    fn from(snippets: Vec<String>) -> Self {
        Self::new(snippets)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn len(&self) -> usize {
        self.system.len() + self.user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.system.is_empty() && self.user.is_empty()
    }
}

/// Key facts pulled from a topic body.
pub fn extract_key_points(body: &str) -> Vec<String> {
    let sentences = split_sentences(body);
    let mut points = Vec::new();

    if let Some(question) = sentences.iter().find(|s| s.ends_with('?')) {
        points.push(format!(
            "Question: {}",
            truncate_at_word_boundary(question, MAX_QUESTION_CHARS)
        ));
    }

    if let Some(problem) = sentences.iter().find(|s| {
        let lower = s.to_lowercase();
        PROBLEM_INDICATORS.iter().any(|p| lower.contains(p))
    }) && !points.iter().any(|p| p.ends_with(*problem))
    {
        points.push(format!(
            "Problem: {}",
            truncate_at_word_boundary(problem, MAX_QUESTION_CHARS)
        ));
    }

    let lower = body.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '(' | ')' | '.' | '!' | '?'))
        .filter(|t| !t.is_empty())
        .collect();
    let techs: Vec<&str> = TECH_TERMS
        .iter()
        .copied()
        .filter(|term| tokens.contains(term))
        .collect();
    if !techs.is_empty() {
        points.push(format!("Technologies: {}", techs.join(", ")));
    }

    if points.is_empty()
        && let Some(first) = sentences.first()
    {
        points.push(truncate_at_word_boundary(first, MAX_QUESTION_CHARS).to_string());
    }

    points
}

/// Joins snippets with blank lines and caps the result at `max_chars`.
fn joined_capped(parts: &[String], max_chars: usize) -> String {
    let joined = parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    truncate_at_word_boundary(&joined, max_chars).to_string()
}

/// Builds first-attempt and corrective prompts from one rule set.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    rules: QualityRules,
    max_body_chars: usize,
}

impl PromptBuilder {
    pub fn new(rules: QualityRules, max_body_chars: usize) -> Self {
        Self {
            rules,
            max_body_chars,
        }
    }

    pub fn rules(&self) -> &QualityRules {
        &self.rules
    }

    fn system(&self) -> String {
        let r = &self.rules;
        let mut system = format!(
            "You write short replies to developer discussion threads.\n\
             Rules:\n\
             - Address the concrete problem described in the topic and reuse its own terms.\n\
             - Mention {marker} by name and say how it helps with this specific problem.\n\
             - Write {min_s} to {max_s} sentences, {min_c} to {max_c} characters in total.\n\
             - Plain technical tone: no emojis, no marketing language, no markdown, no greetings.",
            marker = r.required_marker,
            min_s = r.min_sentences,
            max_s = r.max_sentences,
            min_c = r.min_chars,
            max_c = r.max_chars,
        );
        if !r.forbidden_phrases.is_empty() {
            system.push_str("\n- Never use these phrases: ");
            system.push_str(
                &r.forbidden_phrases
                    .iter()
                    .map(|p| format!("\"{p}\""))
                    .collect::<Vec<_>>()
                    .join(", "),
            );
            system.push('.');
        }
        system
    }

    /// First-attempt prompt.
    pub fn build(&self, topic: &Topic, context: &PromptContext) -> Prompt {
        let body = truncate_at_word_boundary(topic.body.trim(), self.max_body_chars);

        let mut user = format!("TOPIC\nTitle: {}\nBody: {}\n", topic.title.trim(), body);

        let points = extract_key_points(body);
        if !points.is_empty() {
            user.push_str("Key points:\n");
            for point in &points {
                user.push_str("- ");
                user.push_str(point);
                user.push('\n');
            }
        }

        let reference = joined_capped(&context.snippets, MAX_CONTEXT_CHARS);
        if !reference.is_empty() {
            user.push_str("\nREFERENCE CONTEXT\n");
            user.push_str(&reference);
            user.push('\n');
        }

        let style = joined_capped(&context.style_examples, MAX_STYLE_CHARS);
        if !style.is_empty() {
            user.push_str("\nSTYLE EXAMPLES\n");
            user.push_str(&style);
            user.push('\n');
        }

        let marker = self.rules.required_marker.as_str();
        let post = topic.text();
        let intent = detect_intent(&post);
        user.push_str(&format!(
            "\nTASK\nWrite one reply to this topic. Explain how {marker} helps with the exact problem above and give one concrete next step.\n{}",
            intent.guidance(marker)
        ));
        if reports_own_attempts(&post) {
            user.push_str(
                "\nDo not ask whether they have tried something the post already says they did.",
            );
        }

        Prompt {
            system: self.system(),
            user,
        }
    }

    /// Corrective line for one failed rule category.
    pub fn corrective_instruction(&self, category: RuleCategory, topic: &Topic) -> String {
        let r = &self.rules;
        match category {
            RuleCategory::Length => format!(
                "Your previous reply had the wrong length. Keep it between {} and {} characters.",
                r.min_chars, r.max_chars
            ),
            RuleCategory::Sentences => format!(
                "Your previous reply had the wrong number of sentences. Use {} to {} complete sentences.",
                r.min_sentences, r.max_sentences
            ),
            RuleCategory::Marker => format!(
                "Your previous reply did not mention {}. Name it explicitly and say what it does for this problem.",
                r.required_marker
            ),
            RuleCategory::Boilerplate => {
                "Your previous reply used generic filler. Open directly with the technical point and avoid every listed phrase."
                    .to_string()
            }
            RuleCategory::Specificity => {
                let words = meaningful_words(&topic.text());
                let terms: Vec<&str> = words.iter().take(5).map(String::as_str).collect();
                if terms.is_empty() {
                    "BE MORE SPECIFIC: reference the concrete problem from the topic.".to_string()
                } else {
                    format!(
                        "BE MORE SPECIFIC: reference the concrete problem from the topic and reuse its exact terms ({}).",
                        terms.join(", ")
                    )
                }
            }
        }
    }

    /// The first prompt plus one corrective line per failed category, in category order.
    pub fn strengthen(&self, prompt: &Prompt, failed: &[RuleCategory], topic: &Topic) -> Prompt {
        let mut categories = failed.to_vec();
        categories.sort();
        categories.dedup();

        let mut user = prompt.user.clone();
        if !categories.is_empty() {
            user.push_str("\n\nCORRECTIONS");
            for category in categories {
                user.push_str("\n- ");
                user.push_str(&self.corrective_instruction(category, topic));
            }
        }

        Prompt {
            system: prompt.system.clone(),
            user,
        }
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(QualityRules::default(), DEFAULT_MAX_TEXT_CHARS)
    }
}
