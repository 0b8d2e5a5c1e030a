//! Resource descriptors.
//!
//! One `ResourceConfig` per admin screen replaces the per-screen copies of
//! fetch/form/submit logic: paths, HTTP semantics, scalar field specs and
//! file slots are data, the engine is shared.

use serde_json::Value;

/// HTTP method used for record updates; varies by resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMethod {
    Put,
    Patch,
}

impl UpdateMethod {
    pub fn as_http(&self) -> reqwest::Method {
        match self {
            UpdateMethod::Put => reqwest::Method::PUT,
            UpdateMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

/// Kind of a scalar draft field, used for validation and defaulting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Single-line text
    Text,
    /// Multi-line text
    LongText,
    /// Calendar date, `YYYY-MM-DD` on the wire
    Date,
    /// Integer or decimal number
    Number,
    /// Boolean toggle
    Flag,
    /// One of a fixed set of options
    Choice(&'static [&'static str]),
}

/// Specification of one scalar draft field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Value,
}

impl FieldSpec {
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        let default = match kind {
            FieldKind::Flag => Value::Bool(false),
            _ => Value::String(String::new()),
        };
        Self {
            name,
            kind,
            required: false,
            default,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = value;
        self
    }
}

/// Specification of one group of file slots sharing a wire field name.
#[derive(Debug, Clone)]
pub struct FileFieldSpec {
    /// Multipart field name understood by the API
    pub field: &'static str,
    /// Number of slots the form exposes for this group
    pub slots: usize,
    /// Whether at least one slot must be staged when creating a record
    pub required_on_create: bool,
}

impl FileFieldSpec {
    pub fn new(field: &'static str, slots: usize) -> Self {
        Self {
            field,
            slots,
            required_on_create: false,
        }
    }

    pub fn required_on_create(mut self) -> Self {
        self.required_on_create = true;
        self
    }
}

/// Full descriptor for one resource type.
///
/// Paths are relative to the configured API base; `{id}` in the update and
/// delete templates is substituted with the record identifier.
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    pub name: &'static str,
    pub list_path: &'static str,
    pub create_path: &'static str,
    pub update_method: UpdateMethod,
    pub update_path: &'static str,
    pub delete_path: &'static str,
    pub fields: Vec<FieldSpec>,
    pub files: Vec<FileFieldSpec>,
}

impl ResourceConfig {
    /// Resolve the update path for a record.
    pub fn update_path_for(&self, id: &str) -> String {
        self.update_path.replace("{id}", id)
    }

    /// Resolve the delete path for a record.
    pub fn delete_path_for(&self, id: &str) -> String {
        self.delete_path.replace("{id}", id)
    }

    /// Look up a scalar field spec by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether this resource carries file slots (selects multipart encoding).
    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    /// Total number of file slots across all groups.
    pub fn total_slots(&self) -> usize {
        self.files.iter().map(|f| f.slots).sum()
    }
}
