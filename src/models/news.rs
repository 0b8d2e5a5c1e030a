//! News item resource.

use serde::{Deserialize, Serialize};

use crate::errors::SyncError;
use crate::resource::{FieldKind, FieldSpec, FileFieldSpec, ResourceConfig, UpdateMethod};

use super::Record;

/// A published news item. Image paths are relative to the asset host and
/// display-only on the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub descriptions: String,
    pub date: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl NewsItem {
    /// Typed view of an opaque record, for the presentation layer.
    pub fn from_record(record: &Record) -> Result<Self, SyncError> {
        Ok(serde_json::from_value(record.clone().into_value())?)
    }

    /// Descriptor for the news screen.
    pub fn resource() -> ResourceConfig {
        ResourceConfig {
            name: "news",
            list_path: "news",
            create_path: "news/create",
            update_method: UpdateMethod::Patch,
            update_path: "news/{id}",
            delete_path: "news/{id}",
            fields: vec![
                FieldSpec::new("title", FieldKind::Text).required(),
                FieldSpec::new("descriptions", FieldKind::LongText).required(),
                FieldSpec::new("date", FieldKind::Date).required(),
            ],
            files: vec![FileFieldSpec::new("images", 6).required_on_create()],
        }
    }
}
