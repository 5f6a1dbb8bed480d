/// Autocomplete client: paced, retried fetches plus the alphabet expansion sweep.
///
/// Every failure path degrades to "fewer suggestions". Callers never see an error
/// from [`SuggestClient::fetch`] or [`SuggestClient::get_suggestions`].
use std::collections::HashSet;
use std::str::FromStr;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::Rng;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::CommonError;
use crate::pacing::{DelayRange, Pacer, Pacing, TokioPacer};
use crate::transport::{HttpTransport, SuggestTransport};

pub const DEFAULT_BASE_URL: &str = "http://suggestqueries.google.com/complete/search";

/// Outbound user agents, rotated per attempt.
pub const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
];

/// Suffixes appended to a query during the expansion sweep, in order.
pub const EXPANSION_SUFFIXES: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// An expansion result may be at most this many characters longer than the query.
pub const MAX_EXTRA_CHARS: usize = 50;

#[derive(Clone, Debug)]
pub struct SuggestConfig {
    pub base_url: String,
    /// Value of the `client` query parameter; selects the JSON response flavour.
    pub client_id: String,
    /// Interface language (`hl`).
    pub language: String,
    /// Geographic locale (`gl`).
    pub country: String,
    pub timeout: Duration,
    /// Total attempts per fetch, not additional retries.
    pub max_retries: u32,
    /// Minimum spacing between consecutive fetches.
    pub request_gap: DelayRange,
    /// Pause after each expansion query.
    pub expansion_pause: DelayRange,
    /// Multiplied by the 1-based attempt number after a 429.
    pub rate_limit_backoff: Duration,
    /// Multiplied by the 1-based attempt number after a transport error.
    pub transport_backoff: Duration,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: "firefox".to_string(),
            language: "es".to_string(),
            country: "es".to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 3,
            request_gap: DelayRange::from_millis(1_500, 3_000),
            expansion_pause: DelayRange::from_secs(1, 2),
            rate_limit_backoff: Duration::from_secs(10),
            transport_backoff: Duration::from_secs(3),
        }
    }
}

impl SuggestConfig {
    /// Load overrides from environment variables; anything unset keeps its default.
    ///
    /// - `FEUD_SUGGEST_URL`, `FEUD_SUGGEST_CLIENT`, `FEUD_LANGUAGE`, `FEUD_COUNTRY`
    /// - `FEUD_MAX_RETRIES` (at least 1), `FEUD_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, CommonError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("FEUD_SUGGEST_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(client_id) = std::env::var("FEUD_SUGGEST_CLIENT") {
            config.client_id = client_id;
        }
        if let Ok(language) = std::env::var("FEUD_LANGUAGE") {
            config.language = language;
        }
        if let Ok(country) = std::env::var("FEUD_COUNTRY") {
            config.country = country;
        }
        if let Some(retries) = env_parse::<u32>("FEUD_MAX_RETRIES")? {
            if retries == 0 {
                return Err(CommonError::Config(
                    "FEUD_MAX_RETRIES must be at least 1".to_string(),
                ));
            }
            config.max_retries = retries;
        }
        if let Some(secs) = env_parse::<u64>("FEUD_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

/// Parse an optional environment variable, rejecting values that do not parse.
pub fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>, CommonError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| CommonError::Config(format!("{name} has an invalid value: {raw:?}"))),
        Err(_) => Ok(None),
    }
}

pub struct SuggestClient<T, P, R> {
    config: SuggestConfig,
    transport: T,
    pacing: Pacing<P, R>,
    request_count: u64,
    last_request: Option<Instant>,
}

impl SuggestClient<HttpTransport, TokioPacer, StdRng> {
    /// Production client: reqwest transport, tokio clock, OS-seeded jitter.
    pub fn from_config(config: SuggestConfig) -> Result<Self, CommonError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(config, transport, Pacing::system()))
    }
}

impl<T: SuggestTransport, P: Pacer, R: Rng> SuggestClient<T, P, R> {
    pub fn new(config: SuggestConfig, transport: T, pacing: Pacing<P, R>) -> Self {
        Self {
            config,
            transport,
            pacing,
            request_count: 0,
            last_request: None,
        }
    }

    pub fn config(&self) -> &SuggestConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn pacing(&self) -> &Pacing<P, R> {
        &self.pacing
    }

    pub fn pacing_mut(&mut self) -> &mut Pacing<P, R> {
        &mut self.pacing
    }

    /// Number of attempts that reached the transport, retries included.
    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    /// Fetch suggestions for one query string.
    ///
    /// Returns the suggestions lower-cased and trimmed, without the query itself and
    /// without duplicates. Any failure yields an empty list.
    pub async fn fetch(&mut self, query: &str) -> Vec<String> {
        self.wait_for_request_gap().await;

        let query_lower = query.to_lowercase();
        for attempt in 0..self.config.max_retries {
            let user_agent = USER_AGENTS[self.pacing.pick(USER_AGENTS.len())];
            self.last_request = Some(self.pacing.now());
            self.request_count += 1;

            let outcome = self.transport.fetch_raw(query, user_agent).await;
            match outcome {
                Ok(resp) if resp.status == StatusCode::OK => {
                    match parse_suggestions(&resp.body, &query_lower) {
                        Ok(Some(suggestions)) => return suggestions,
                        Ok(None) => {
                            warn!(query, attempt, "response body is not a JSON array");
                        }
                        Err(e) => {
                            warn!(query, error = %e, "JSON decode error");
                            return Vec::new();
                        }
                    }
                }
                Ok(resp) if resp.status == StatusCode::TOO_MANY_REQUESTS => {
                    let wait = self.config.rate_limit_backoff * (attempt + 1);
                    warn!(
                        query,
                        attempt,
                        wait_secs = wait.as_secs(),
                        "rate limited, backing off"
                    );
                    self.pacing.sleep(wait).await;
                }
                Ok(resp) => {
                    warn!(query, attempt, status = %resp.status, "unexpected HTTP status");
                }
                Err(e) => {
                    warn!(query, attempt, error = %e, "request error");
                    if attempt + 1 < self.config.max_retries {
                        let wait = self.config.transport_backoff * (attempt + 1);
                        self.pacing.sleep(wait).await;
                    }
                }
            }
        }

        Vec::new()
    }

    /// Collect up to `target_count` suggestions for `query`.
    ///
    /// The bare query is fetched first. If that falls short, `"<query> a"` through
    /// `"<query> 9"` are tried in order until enough suggestions that still start
    /// with the query have been gathered. Results keep their acceptance order.
    pub async fn get_suggestions(&mut self, query: &str, target_count: usize) -> Vec<String> {
        let query_lower = query.to_lowercase();
        let query_len = query.chars().count();
        let mut accepted = OrderedSet::default();

        let original = self.fetch(query).await;
        let original_count = original.len();
        for suggestion in original {
            if suggestion != query_lower {
                accepted.insert(suggestion);
            }
        }
        info!(query, suggestions = original_count, "bare query fetched");

        if accepted.len() >= target_count {
            return accepted.into_truncated(target_count);
        }

        for suffix in EXPANSION_SUFFIXES.chars() {
            if accepted.len() >= target_count {
                break;
            }

            let expanded = format!("{query} {suffix}");
            debug!(query = %expanded, "trying expanded query");

            let mut added = 0usize;
            for suggestion in self.fetch(&expanded).await {
                let lower = suggestion.to_lowercase();
                let extra = suggestion.chars().count().saturating_sub(query_len);
                if lower.starts_with(&query_lower)
                    && lower != query_lower
                    && extra <= MAX_EXTRA_CHARS
                    && accepted.insert(suggestion)
                {
                    added += 1;
                }
            }
            if added > 0 {
                debug!(
                    query = %expanded,
                    added,
                    total = accepted.len(),
                    "expansion added suggestions"
                );
            }

            self.pacing.pause(self.config.expansion_pause).await;
        }

        let result = accepted.into_truncated(target_count);
        info!(query, suggestions = result.len(), "suggestions collected");
        result
    }

    async fn wait_for_request_gap(&mut self) {
        let gap = self.pacing.jitter(self.config.request_gap);
        let Some(last) = self.last_request else {
            return;
        };
        let elapsed = self.pacing.now().saturating_duration_since(last);
        if elapsed < gap {
            self.pacing.sleep(gap - elapsed).await;
        }
    }
}

/// Interpret a 200 body as `[query, [suggestion, ...], ...]`.
///
/// `Ok(None)` means the body does not even look like a JSON array.
fn parse_suggestions(
    body: &str,
    query_lower: &str,
) -> Result<Option<Vec<String>>, serde_json::Error> {
    let body = body.trim();
    if !(body.starts_with('[') && body.ends_with(']')) {
        return Ok(None);
    }

    let data: Value = serde_json::from_str(body)?;
    let Some(items) = data.get(1).and_then(Value::as_array) else {
        return Ok(Some(Vec::new()));
    };

    let mut suggestions = OrderedSet::default();
    for item in items.iter().filter_map(Value::as_str) {
        let clean = item.trim().to_lowercase();
        if !clean.is_empty() && clean != query_lower {
            suggestions.insert(clean);
        }
    }
    Ok(Some(suggestions.into_vec()))
}

/// Insertion-ordered set of strings.
#[derive(Default)]
struct OrderedSet {
    items: Vec<String>,
    seen: HashSet<String>,
}

impl OrderedSet {
    /// Returns `true` if the value was not present.
    fn insert(&mut self, value: String) -> bool {
        if self.seen.contains(&value) {
            return false;
        }
        self.seen.insert(value.clone());
        self.items.push(value);
        true
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn into_vec(self) -> Vec<String> {
        self.items
    }

    fn into_truncated(mut self, limit: usize) -> Vec<String> {
        self.items.truncate(limit);
        self.items
    }
}
