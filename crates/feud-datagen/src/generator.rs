/// Batch driver: walks the seed categories, turns each query into a question, and
/// writes one data file per category.
///
/// Strictly sequential. All pacing goes through the client's `Pacing`, so the
/// same clock and random source govern request spacing and the longer breaks.
use std::path::PathBuf;

use rand::Rng;
use tracing::{info, warn};

use feud_common::pacing::{DelayRange, Pacer};
use feud_common::suggest::SuggestClient;
use feud_common::transport::SuggestTransport;

use crate::builder::build_question;
use crate::config::{CategoryScope, Config};
use crate::model::{Question, SeedCategory, SeedData};
use crate::store;

/// Fewer raw suggestions than this and the query is not worth building.
pub const MIN_SUGGESTIONS: usize = 4;
/// A question needs at least this many answers after cleaning.
pub const MIN_ANSWERS: usize = 4;
/// Take an extended break whenever the request count hits a multiple of this.
pub const EXTENDED_BREAK_EVERY: u64 = 5;
pub const EXTENDED_BREAK: DelayRange = DelayRange::from_secs(15, 25);
pub const CATEGORY_BREAK: DelayRange = DelayRange::from_secs(30, 60);

/// Outcome of one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryReport {
    pub name: String,
    pub queries: usize,
    pub successful: usize,
    /// Path written, `None` when no question survived or the write failed.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub categories: Vec<CategoryReport>,
    /// Categories left untouched because of [`CategoryScope::First`].
    pub skipped: Vec<String>,
    pub total_requests: u64,
}

impl RunSummary {
    pub fn files_written(&self) -> usize {
        self.categories.iter().filter(|c| c.output.is_some()).count()
    }
}

pub struct Generator<T, P, R> {
    config: Config,
    client: SuggestClient<T, P, R>,
}

impl<T: SuggestTransport, P: Pacer, R: Rng> Generator<T, P, R> {
    pub fn new(config: Config, client: SuggestClient<T, P, R>) -> Self {
        Self { config, client }
    }

    pub fn client(&self) -> &SuggestClient<T, P, R> {
        &self.client
    }

    pub async fn run(&mut self, seeds: &SeedData) -> RunSummary {
        let selected = match self.config.scope {
            CategoryScope::All => seeds.categories.len(),
            CategoryScope::First => seeds.categories.len().min(1),
        };
        let (active, rest) = seeds.categories.split_at(selected);

        let skipped: Vec<String> = rest.iter().map(|c| c.name.clone()).collect();
        if !skipped.is_empty() {
            warn!(
                skipped = ?skipped,
                "category scope is \"first\": only the first category will be processed \
                 (set FEUD_CATEGORY_SCOPE=all to process every category)"
            );
        }

        let mut reports = Vec::with_capacity(active.len());
        for (i, category) in active.iter().enumerate() {
            reports.push(self.process_category(category).await);

            if i + 1 < active.len() {
                let pause = self.client.pacing_mut().pause(CATEGORY_BREAK).await;
                info!(
                    pause_secs = pause.as_secs_f64(),
                    "took break before next category"
                );
            }
        }

        let summary = RunSummary {
            categories: reports,
            skipped,
            total_requests: self.client.request_count(),
        };
        info!(
            categories = summary.categories.len(),
            files = summary.files_written(),
            total_requests = summary.total_requests,
            "data generation completed"
        );
        summary
    }

    async fn process_category(&mut self, category: &SeedCategory) -> CategoryReport {
        info!(
            category = %category.name,
            queries = category.queries.len(),
            "processing category"
        );

        let mut questions = Vec::new();
        for (i, query) in category.queries.iter().enumerate() {
            info!(
                category = %category.name,
                position = i + 1,
                of = category.queries.len(),
                query = %query,
                "processing query"
            );
            if let Some(question) = self.process_query(query).await {
                questions.push(question);
            }

            let requests = self.client.request_count();
            if requests > 0 && requests % EXTENDED_BREAK_EVERY == 0 {
                let pause = self.client.pacing_mut().pause(EXTENDED_BREAK).await;
                info!(
                    requests,
                    pause_secs = pause.as_secs_f64(),
                    "took extended break"
                );
            }
        }

        let successful = questions.len();
        let output = if questions.is_empty() {
            warn!(category = %category.name, "no questions generated for category");
            None
        } else {
            match store::write_category(&self.config.data_dir, &category.name, &questions) {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(category = %category.name, error = %e, "failed to save category");
                    None
                }
            }
        };

        info!(
            category = %category.name,
            successful,
            queries = category.queries.len(),
            "category completed"
        );
        CategoryReport {
            name: category.name.clone(),
            queries: category.queries.len(),
            successful,
            output,
        }
    }

    async fn process_query(&mut self, query: &str) -> Option<Question> {
        let suggestions = self
            .client
            .get_suggestions(query, self.config.target_count)
            .await;
        if suggestions.len() < MIN_SUGGESTIONS {
            warn!(
                query,
                suggestions = suggestions.len(),
                "not enough suggestions found"
            );
            return None;
        }

        let question = build_question(query, &suggestions);
        if question.answers.len() < MIN_ANSWERS {
            warn!(
                query,
                answers = question.answers.len(),
                "insufficient valid answers"
            );
            return None;
        }

        info!(query, answers = question.answers.len(), "created question");
        Some(question)
    }
}
