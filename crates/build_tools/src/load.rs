//! Reading catalog and build order files.

use std::path::Path;

use build_core::build::BuildOrder;
use build_core::catalog::Catalog;
use build_core::data::{BuildOrderData, CatalogData};

use crate::{ToolError, ToolResult};

fn read(path: &Path) -> ToolResult<String> {
    std::fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Parse a catalog file without resolving it.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_catalog_data(path: &Path) -> ToolResult<CatalogData> {
    let text = read(path)?;
    Ok(CatalogData::from_ron(&text, &path.display().to_string())?)
}

/// Load and validate a catalog file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or resolved, or if
/// the catalog fails validation.
pub fn load_catalog(path: &Path) -> ToolResult<Catalog> {
    let catalog = load_catalog_data(path)?.resolve()?;
    tracing::info!("Loaded catalog '{}' with {} objects", path.display(), catalog.len());
    Ok(catalog)
}

/// Load a build order file against `catalog`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if it names
/// objects the catalog does not hold.
pub fn load_build_order(path: &Path, catalog: &Catalog) -> ToolResult<BuildOrder> {
    let text = read(path)?;
    let order = BuildOrderData::from_ron(&text, &path.display().to_string())?.resolve(catalog)?;
    tracing::info!("Loaded build order '{}' with {} jobs", path.display(), order.jobs().len());
    Ok(order)
}
