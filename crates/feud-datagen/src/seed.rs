use std::path::Path;

use serde_json::Value;

use crate::error::AppError;
use crate::model::{SeedCategory, SeedData};

/// Read `seed.json`: an object mapping category names to arrays of query strings.
pub fn load_seed_data(path: &Path) -> Result<SeedData, AppError> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::SeedLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_seed_data(&content).map_err(|message| AppError::SeedLoad {
        path: path.to_path_buf(),
        message,
    })
}

/// Category order follows key order in the document.
pub fn parse_seed_data(content: &str) -> Result<SeedData, String> {
    let value: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
    let Value::Object(map) = value else {
        return Err("top level must be an object of category -> queries".to_string());
    };

    let mut categories = Vec::with_capacity(map.len());
    for (name, queries) in map {
        let queries: Vec<String> = serde_json::from_value(queries)
            .map_err(|e| format!("category {name:?} must be an array of strings: {e}"))?;
        categories.push(SeedCategory { name, queries });
    }

    Ok(SeedData { categories })
}
