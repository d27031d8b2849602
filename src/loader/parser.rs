//! YAML parser for source definitions
//!
//! Parses and validates source YAML files.

use crate::error::{Error, Result, ResultExt};
use crate::http::RequestShape;
use crate::loader::types::{PaginationDefinition, SourceDefinition};
use crate::merge::MergeStrategy;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load a source definition from a YAML file
///
/// # Examples
///
/// ```ignore
/// let source = load_source("./sources/issues.yaml")?;
/// let mut pager = source.into_pager::<serde_json::Value>()?;
/// ```
pub fn load_source(path: impl AsRef<Path>) -> Result<SourceDefinition> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read source file '{}'", path.display()))?;

    debug!("Loaded source definition from {}", path.display());
    load_source_from_str(&content)
}

/// Load a source definition from a YAML string
pub fn load_source_from_str(yaml: &str) -> Result<SourceDefinition> {
    let def: SourceDefinition = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse source YAML: {e}")))?;

    validate_source(&def)?;
    Ok(def)
}

/// Validate a source definition
fn validate_source(def: &SourceDefinition) -> Result<()> {
    if def.name.is_empty() {
        return Err(Error::config("Source name cannot be empty"));
    }

    if def.url.is_empty() {
        return Err(Error::missing_field("url"));
    }
    url::Url::parse(&def.url)?;

    if let RequestShape::GraphQl { query, .. } = &def.request {
        if query.trim().is_empty() {
            return Err(Error::config(format!(
                "Source '{}' has an empty GraphQL query",
                def.name
            )));
        }
    }

    if def.pagination.limit() == 0 {
        return Err(Error::config(format!(
            "Source '{}' pagination limit must be greater than zero",
            def.name
        )));
    }

    // Offsets count held items; replacing them would refetch one page forever
    if matches!(def.pagination, PaginationDefinition::Offset { .. })
        && def.merge == MergeStrategy::Replace
    {
        return Err(Error::config(format!(
            "Source '{}' uses offset pagination, which cannot be combined with merge: replace",
            def.name
        )));
    }

    if def.response.items_path.is_empty() {
        return Err(Error::missing_field("response.items_path"));
    }

    Ok(())
}
