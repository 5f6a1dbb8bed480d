use serde::{Deserialize, Serialize};

/// One completion the player has to guess, e.g. "hawaiana" for "pizza".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Completion text with the query prefix and surrounding punctuation removed
    pub text: String,
    /// 1-based position in acceptance order
    pub rank: u32,
}

/// A seed query and its ranked completions, as written to the category files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub answers: Vec<Answer>,
}

/// A named group of seed queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedCategory {
    pub name: String,
    pub queries: Vec<String>,
}

/// Categories in the order they appear in the seed file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedData {
    pub categories: Vec<SeedCategory>,
}

impl SeedData {
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn query_count(&self) -> usize {
        self.categories.iter().map(|c| c.queries.len()).sum()
    }
}
