//! Serialized forms of the catalog and of build orders.
//!
//! Objects and jobs refer to each other by name here; resolving turns
//! the names into [`ObjectId`](crate::catalog::ObjectId)s and
//! [`JobId`](crate::job::JobId)s.
//!
//! **Note:** This module contains no IO. It parses RON text handed to it;
//! reading files is left to the caller.

mod build_data;
mod catalog_data;

pub use build_data::{ActionData, BuildOrderData, DependencyData, JobData};
pub use catalog_data::{CatalogData, KindData, ObjectData};

use crate::error::{BuildError, Result};

/// Deserialize RON text, naming `origin` in errors.
pub fn from_ron<T: serde::de::DeserializeOwned>(text: &str, origin: &str) -> Result<T> {
    ron::from_str(text).map_err(|err| BuildError::DataParse {
        path: origin.to_string(),
        message: err.to_string(),
    })
}
