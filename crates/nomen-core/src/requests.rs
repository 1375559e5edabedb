//! Requested term lists
//!
//! A terms file is read as headerless CSV. The first field of each record is
//! trimmed and kept when non-empty; the remaining fields are ignored.

use crate::errors::NomenError;
use std::path::Path;
use tokio::fs;

pub fn sanitize_terms<I, S>(terms: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    terms
        .into_iter()
        .map(|term| term.as_ref().trim().to_string())
        .filter(|term| !term.is_empty())
        .collect()
}

pub fn parse_terms(content: &str) -> Result<Vec<String>, NomenError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut first_fields = Vec::new();
    for record in reader.records() {
        let record = record
            .map_err(|e| NomenError::ConfigError(format!("Failed to parse terms file: {}", e)))?;
        if let Some(field) = record.get(0) {
            first_fields.push(field.to_string());
        }
    }
    Ok(sanitize_terms(first_fields))
}

pub async fn load_terms_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>, NomenError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).await.map_err(|e| {
        NomenError::ConfigError(format!(
            "Failed to read terms file {}: {}",
            path.display(),
            e
        ))
    })?;

    let terms = parse_terms(&content)?;
    log::info!("Loaded {} requested terms from {}", terms.len(), path.display());
    Ok(terms)
}
