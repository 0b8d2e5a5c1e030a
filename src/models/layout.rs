//! Landing page layout section resource.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::SyncError;
use crate::resource::{FieldKind, FieldSpec, FileFieldSpec, ResourceConfig, UpdateMethod};

use super::Record;

/// A configurable section of the public landing page.
///
/// The legacy API wraps some scalar fields in single-element arrays; the view
/// accepts both encodings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutSection {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "sectionTheme", deserialize_with = "scalar_or_first")]
    pub section_theme: String,
    #[serde(deserialize_with = "scalar_or_first")]
    pub title: String,
    #[serde(deserialize_with = "scalar_or_first")]
    pub description: String,
    pub layout_text_position: String,
    pub layout_images_position: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Accept `"x"` or the legacy `["x"]` encoding.
fn scalar_or_first<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Array(items) => items
            .into_iter()
            .next()
            .and_then(|v| v.as_str().map(str::to_string))
            .ok_or_else(|| serde::de::Error::custom("expected a non-empty string array")),
        _ => Err(serde::de::Error::custom("expected a string")),
    }
}

impl LayoutSection {
    /// Typed view of an opaque record, for the presentation layer.
    pub fn from_record(record: &Record) -> Result<Self, SyncError> {
        Ok(serde_json::from_value(record.clone().into_value())?)
    }

    /// Descriptor for the layouts screen.
    pub fn resource() -> ResourceConfig {
        ResourceConfig {
            name: "layouts",
            list_path: "layout",
            create_path: "layout/create",
            update_method: UpdateMethod::Put,
            update_path: "layout/{id}",
            delete_path: "layout/{id}",
            fields: vec![
                FieldSpec::new("sectionTheme", FieldKind::Text)
                    .required()
                    .default_value(Value::String("lemarc1".to_string())),
                FieldSpec::new("title", FieldKind::Text).required(),
                FieldSpec::new("description", FieldKind::LongText).required(),
                FieldSpec::new("layout_text_position", FieldKind::Choice(&["left", "right"]))
                    .required()
                    .default_value(Value::String("left".to_string())),
                FieldSpec::new(
                    "layout_images_position",
                    FieldKind::Choice(&["left", "right"]),
                )
                .required()
                .default_value(Value::String("right".to_string())),
            ],
            files: vec![FileFieldSpec::new("images", 6).required_on_create()],
        }
    }
}
