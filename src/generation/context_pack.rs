//! Built-in product snippets used as reference context when retrieval finds nothing.

/// Snippets returned for one topic at most.
pub const MAX_PACK_SNIPPETS: usize = 3;

struct PackEntry {
    id: &'static str,
    keywords: &'static [&'static str],
    /// `{marker}` is replaced with the configured product marker.
    text: &'static str,
}

const PACK: &[PackEntry] = &[
    PackEntry {
        id: "debugging",
        keywords: &["debug", "error", "crash", "exception", "stack", "trace", "boot", "fail", "broken", "bug"],
        text: "{marker} can read the failing code path together with logs and stack traces, then point at the step where state first diverges from what you expect.",
    },
    PackEntry {
        id: "testing",
        keywords: &["test", "tests", "testing", "coverage", "flaky", "assert", "regression"],
        text: "{marker} can draft focused tests around a reported failure and reproduce it before any fix is attempted.",
    },
    PackEntry {
        id: "refactoring",
        keywords: &["refactor", "refactoring", "cleanup", "legacy", "rename", "duplicate", "structure"],
        text: "{marker} can propose refactorings in small steps and check each one against the existing behaviour.",
    },
    PackEntry {
        id: "documentation",
        keywords: &["docs", "document", "documentation", "readme", "comment", "explain"],
        text: "{marker} can summarise what a module does and keep its documentation in line with the code.",
    },
    PackEntry {
        id: "automation",
        keywords: &["automate", "automation", "script", "pipeline", "deploy", "workflow", "install", "setup"],
        text: "{marker} can turn a repeated manual sequence into a script and explain each command it runs.",
    },
    PackEntry {
        id: "analysis",
        keywords: &["performance", "slow", "memory", "leak", "profile", "analysis", "analyze", "bottleneck"],
        text: "{marker} can walk through the relevant code and measurements to narrow down where time or memory goes.",
    },
    PackEntry {
        id: "context",
        keywords: &["project", "codebase", "context", "files", "repository", "repo"],
        text: "{marker} keeps the surrounding project context in view, so suggestions fit the code that already exists instead of a generic example.",
    },
];

const DEFAULT_ENTRY: &str = "context";

/// Returns the ids and texts of pack entries matching `topic`, in pack order.
///
/// Always returns at least one snippet; the general `context` entry is used when nothing
/// matches.
pub fn select_snippets(topic: &str, marker: &str) -> Vec<(&'static str, String)> {
    let tokens: Vec<String> = topic
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect();

    let mut selected: Vec<&PackEntry> = PACK
        .iter()
        .filter(|entry| {
            entry
                .keywords
                .iter()
                .any(|kw| tokens.iter().any(|t| t == kw || (kw.len() >= 4 && t.starts_with(kw))))
        })
        .take(MAX_PACK_SNIPPETS)
        .collect();

    if selected.is_empty() {
        selected.extend(PACK.iter().filter(|entry| entry.id == DEFAULT_ENTRY));
    }

    selected
        .into_iter()
        .map(|entry| (entry.id, entry.text.replace("{marker}", marker)))
        .collect()
}

/// Snippet texts only.
pub fn context_pack(topic: &str, marker: &str) -> Vec<String> {
    select_snippets(topic, marker)
        .into_iter()
        .map(|(_, text)| text)
        .collect()
}
