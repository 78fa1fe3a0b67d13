//! Problem records and the startup catalogue loader.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// An immutable challenge record.
///
/// `solution` is the exact output a correct submission must produce
/// (trailing whitespace ignored at comparison time). It never goes out
/// on the wire — clients only ever see `description` and `starter_code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub description: String,
    #[serde(rename = "starterCode")]
    pub starter_code: String,
    pub solution: String,
}

/// The on-disk catalogue shape: `{"problems": [...]}`.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    problems: Vec<Problem>,
}

/// Errors that can occur while loading the catalogue.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Reading the catalogue file failed.
    #[error("failed to read catalogue: {0}")]
    Io(#[from] std::io::Error),

    /// The catalogue contents are not valid JSON of the expected shape.
    #[error("failed to parse catalogue: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parses a catalogue from a JSON string.
pub fn from_json_str(contents: &str) -> Result<Vec<Problem>, CatalogError> {
    let file: CatalogFile = serde_json::from_str(contents)?;
    Ok(file.problems)
}

/// Loads the catalogue from disk. Called once at process start.
///
/// A missing or malformed file is downgraded to an empty catalogue with
/// a warning: the server starts either way, it just never serves a
/// problem (and submissions never succeed).
pub fn load(path: &Path) -> Vec<Problem> {
    let result = std::fs::read_to_string(path)
        .map_err(CatalogError::from)
        .and_then(|contents| from_json_str(&contents));

    match result {
        Ok(problems) => {
            tracing::info!(
                path = %path.display(),
                count = problems.len(),
                "problem catalogue loaded"
            );
            problems
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "problem catalogue unavailable, starting with none"
            );
            Vec::new()
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
