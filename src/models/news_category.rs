//! News category resource.
//!
//! Same shape as product categories but served under its own path family with
//! verb-style update/delete endpoints.

use serde::{Deserialize, Serialize};

use crate::errors::SyncError;
use crate::resource::{FieldKind, FieldSpec, ResourceConfig, UpdateMethod};

use super::Record;

/// A category news items are filed under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsCategory {
    #[serde(rename = "_id")]
    pub id: String,
    pub category_name: String,
}

impl NewsCategory {
    /// Typed view of an opaque record, for the presentation layer.
    pub fn from_record(record: &Record) -> Result<Self, SyncError> {
        Ok(serde_json::from_value(record.clone().into_value())?)
    }

    /// Descriptor for the news-categories screen.
    pub fn resource() -> ResourceConfig {
        ResourceConfig {
            name: "news-categories",
            list_path: "news-category",
            create_path: "news-category/create",
            update_method: UpdateMethod::Put,
            update_path: "news-category/update/{id}",
            delete_path: "news-category/delete/{id}",
            fields: vec![FieldSpec::new("category_name", FieldKind::Text).required()],
            files: vec![],
        }
    }
}
