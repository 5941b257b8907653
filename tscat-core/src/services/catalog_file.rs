use std::fs;
use std::path::Path;

use crate::error::{CoreError, Result};
use crate::model::catalog::Catalog;
use crate::model::config::ParseOptions;
use crate::parsers::ts::{self, Parsed};
use crate::services::{atomic, encoding, rebuild};

pub fn load(path: &Path, opts: &ParseOptions) -> Result<Parsed> {
    let bytes = fs::read(path).map_err(|e| CoreError::io(path, e))?;
    let decoded = encoding::decode(&bytes)?;

    let parsed = ts::parse(&decoded.text, opts)?;

    tracing::info!(
        path = %path.display(),
        encoding = decoded.encoding,
        contexts = parsed.catalog.contexts.len(),
        messages = parsed.catalog.message_count(),
        warnings = parsed.warnings.len(),
        "catalog loaded"
    );

    Ok(parsed)
}

/// Saves in canonical form, always UTF-8 without BOM.
pub fn save(path: &Path, catalog: &Catalog) -> Result<()> {
    let text = rebuild::rebuild(catalog);
    atomic::write_atomic(path, text.as_bytes())?;

    tracing::info!(path = %path.display(), messages = catalog.message_count(), "catalog saved");
    Ok(())
}
