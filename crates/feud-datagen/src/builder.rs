use std::collections::HashSet;

use crate::model::{Answer, Question};

/// Maximum answers kept per question.
pub const MAX_ANSWERS: usize = 10;

/// Stripped from both ends of a completion, along with whitespace.
const TRIM_CHARS: &[char] = &[
    ' ', '.', ',', ';', ':', '!', '?', '-', '(', ')', '[', ']', '{', '}', '"', '\'', '‘', '’', '“',
    '”',
];

/// Turn raw suggestions for `query` into a ranked question.
///
/// The first `query.chars().count()` characters of each suggestion are dropped
/// regardless of what they are, so suggestions are expected to start with the query.
/// Empty and case-insensitively repeated completions are skipped. The caller decides
/// whether the question has enough answers to keep.
pub fn build_question(query: &str, suggestions: &[String]) -> Question {
    let prefix_len = query.chars().count();
    let mut answers = Vec::new();
    let mut seen = HashSet::new();

    for suggestion in suggestions {
        let remainder: String = suggestion.chars().skip(prefix_len).collect();
        let completion = clean_completion(&remainder);
        if completion.is_empty() || !seen.insert(completion.to_lowercase()) {
            continue;
        }
        answers.push(Answer {
            text: completion.to_string(),
            rank: answers.len() as u32 + 1,
        });
    }
    answers.truncate(MAX_ANSWERS);

    Question {
        question: query.to_string(),
        answers,
    }
}

fn clean_completion(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || TRIM_CHARS.contains(&c))
}
