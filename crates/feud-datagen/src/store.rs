use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::AppError;
use crate::model::Question;

/// File stem reserved for the seed input.
pub const SEED_FILE_STEM: &str = "seed";

/// Path of the data file for `category`, or an error if the name could escape
/// `dir` or clobber the seed file.
pub fn category_path(dir: &Path, category: &str) -> Result<PathBuf, AppError> {
    let invalid = category.is_empty()
        || category == "."
        || category == ".."
        || category == SEED_FILE_STEM
        || category.contains(['/', '\\', '\0']);
    if invalid {
        return Err(AppError::InvalidCategory(category.to_string()));
    }
    Ok(dir.join(format!("{category}.json")))
}

/// Write `questions` as a pretty-printed JSON array to `<dir>/<category>.json`,
/// replacing any previous file.
pub fn write_category(
    dir: &Path,
    category: &str,
    questions: &[Question],
) -> Result<PathBuf, AppError> {
    let path = category_path(dir, category)?;
    let json = serde_json::to_string_pretty(questions)?;
    std::fs::write(&path, json).map_err(|source| AppError::Write {
        path: path.clone(),
        source,
    })?;
    info!(
        category,
        questions = questions.len(),
        path = %path.display(),
        "saved category data"
    );
    Ok(path)
}
