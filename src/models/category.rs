//! Product category resource.

use serde::{Deserialize, Serialize};

use crate::errors::SyncError;
use crate::resource::{FieldKind, FieldSpec, ResourceConfig, UpdateMethod};

use super::Record;

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub category_name: String,
}

impl Category {
    /// Typed view of an opaque record, for the presentation layer.
    pub fn from_record(record: &Record) -> Result<Self, SyncError> {
        Ok(serde_json::from_value(record.clone().into_value())?)
    }

    /// Descriptor for the categories screen.
    pub fn resource() -> ResourceConfig {
        ResourceConfig {
            name: "categories",
            list_path: "categories",
            create_path: "categories",
            update_method: UpdateMethod::Patch,
            update_path: "categories/{id}",
            delete_path: "categories/{id}",
            fields: vec![FieldSpec::new("category_name", FieldKind::Text).required()],
            files: vec![],
        }
    }
}
