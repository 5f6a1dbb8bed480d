use std::path::PathBuf;

use feud_common::error::CommonError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("config error: {0}")]
    Config(String),

    #[error("failed to load seed data from {}: {message}", path.display())]
    SeedLoad { path: PathBuf, message: String },

    #[error("invalid category name: {0:?}")]
    InvalidCategory(String),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize questions: {0}")]
    Serialize(#[from] serde_json::Error),
}
