//! Data validation utilities.

use std::path::Path;

use crate::load::load_catalog_data;
use crate::{ToolError, ToolResult};

/// Validate a catalog file and return its object count.
///
/// Unlike loading, this collects every integrity problem instead of
/// stopping at the first.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, if it names an
/// unknown object, or if the catalog fails validation.
pub fn validate_catalog_file(path: &Path) -> ToolResult<usize> {
    let catalog = load_catalog_data(path)?.build()?;
    let problems = catalog.validate();
    if !problems.is_empty() {
        return Err(ToolError::InvalidCatalog {
            path: path.display().to_string(),
            problems,
        });
    }
    Ok(catalog.len())
}
