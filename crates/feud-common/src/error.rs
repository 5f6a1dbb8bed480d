/// Error types shared by the data generator crates.
///
/// The suggestion client never surfaces these to its callers; they describe a single
/// failed attempt and are logged before the client degrades to an empty result.
/// Application-specific errors wrap `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream unreachable: {0}")]
    Unreachable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
