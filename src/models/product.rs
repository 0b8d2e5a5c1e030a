//! Product resource, the widest screen in the console.

use serde::{Deserialize, Serialize};

use crate::errors::SyncError;
use crate::resource::{FieldKind, FieldSpec, FileFieldSpec, ResourceConfig, UpdateMethod};

use super::Record;

/// A catalog product. `category` holds the id of a `Category` record chosen
/// on the categories screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub discount_price: Option<f64>,
    #[serde(default)]
    pub promotion: bool,
    #[serde(default)]
    pub ruler: Option<String>,
    #[serde(default)]
    pub oils_type: Option<String>,
    #[serde(default)]
    pub fidbek: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub product_info_pdf: Option<String>,
}

impl Product {
    /// Typed view of an opaque record, for the presentation layer.
    pub fn from_record(record: &Record) -> Result<Self, SyncError> {
        Ok(serde_json::from_value(record.clone().into_value())?)
    }

    /// Descriptor for the products screen.
    pub fn resource() -> ResourceConfig {
        ResourceConfig {
            name: "products",
            list_path: "products",
            create_path: "products/create",
            update_method: UpdateMethod::Put,
            update_path: "products/{id}",
            delete_path: "products/{id}",
            fields: vec![
                FieldSpec::new("name", FieldKind::Text).required(),
                FieldSpec::new("description", FieldKind::LongText).required(),
                FieldSpec::new("price", FieldKind::Number).required(),
                FieldSpec::new("category", FieldKind::Text).required(),
                FieldSpec::new("stock", FieldKind::Number).required(),
                FieldSpec::new("rating", FieldKind::Number).required(),
                FieldSpec::new("volume", FieldKind::Text).required(),
                FieldSpec::new("discount_price", FieldKind::Number),
                FieldSpec::new("promotion", FieldKind::Flag),
                FieldSpec::new("ruler", FieldKind::Text).required(),
                FieldSpec::new("oils_type", FieldKind::Text),
                FieldSpec::new("fidbek", FieldKind::Text),
            ],
            files: vec![
                FileFieldSpec::new("images", 6).required_on_create(),
                FileFieldSpec::new("product_info_pdf", 1).required_on_create(),
            ],
        }
    }
}
