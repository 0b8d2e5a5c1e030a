//! Request shaping for the submission pipeline.
//!
//! Pure half of the pipeline: validate a form session against its resource
//! descriptor and encode it into a transport-ready plan. No network here;
//! `client::ApiClient::execute` carries a plan to the wire.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::errors::SyncError;
use crate::resource::{FieldKind, ResourceConfig};
use crate::session::{FormSession, OpenForm, SessionMode};

/// Wire payload of one create/update request.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Multipart(Vec<Part>),
}

/// One multipart part, kept as inspectable data until the transport builds
/// the actual form.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

/// A fully shaped request: method, path relative to the API base, payload.
#[derive(Debug, Clone)]
pub struct SubmitPlan {
    pub method: reqwest::Method,
    pub path: String,
    pub payload: Payload,
    pub mode: SessionMode,
}

/// Validate the open form against the resource descriptor.
///
/// Checks run locally, before any network contact: required scalar fields are
/// non-empty, values match their field kind, and on create every required
/// file group has at least one staged slot. The first failure is reported at
/// field level.
pub fn validate(session: &FormSession, cfg: &ResourceConfig) -> Result<(), SyncError> {
    let form = open_form(session)?;

    for spec in &cfg.fields {
        let value = form.draft().get(spec.name).unwrap_or(&Value::Null);

        if is_empty(value) {
            if spec.required {
                return Err(SyncError::validation(
                    spec.name,
                    format!("{} is required", spec.name),
                ));
            }
            continue;
        }

        check_kind(spec.name, &spec.kind, value)?;
    }

    if form.mode() == &SessionMode::Create {
        let mut offset = 0;
        for group in &cfg.files {
            let staged = form
                .slots()
                .get(offset..offset + group.slots)
                .unwrap_or_default()
                .iter()
                .filter(|s| s.is_staged())
                .count();
            if group.required_on_create && staged == 0 {
                return Err(SyncError::validation(
                    group.field,
                    format!("at least one {} file is required", group.field),
                ));
            }
            offset += group.slots;
        }
    }

    Ok(())
}

/// Encode the open form into a `SubmitPlan`, validating first.
///
/// JSON when the resource has no file slots, multipart otherwise. Multipart
/// parts carry the scalar fields in descriptor order followed by the staged
/// files in slot order; unstaged slots are omitted entirely.
pub fn encode(session: &FormSession, cfg: &ResourceConfig) -> Result<SubmitPlan, SyncError> {
    validate(session, cfg)?;
    let form = open_form(session)?;

    let payload = if cfg.has_files() {
        Payload::Multipart(multipart_parts(form, cfg))
    } else {
        Payload::Json(json_body(form, cfg))
    };

    let (method, path) = match form.mode() {
        SessionMode::Create => (reqwest::Method::POST, cfg.create_path.to_string()),
        SessionMode::Edit { id } => (cfg.update_method.as_http(), cfg.update_path_for(id)),
    };

    Ok(SubmitPlan {
        method,
        path,
        payload,
        mode: form.mode().clone(),
    })
}

fn open_form<'a>(session: &'a FormSession) -> Result<&'a OpenForm, SyncError> {
    session
        .form()
        .ok_or_else(|| SyncError::BadRequest("form session is not open".to_string()))
}

fn json_body(form: &OpenForm, cfg: &ResourceConfig) -> Value {
    let mut body = Map::new();
    for spec in &cfg.fields {
        let value = form.draft().get(spec.name).cloned().unwrap_or(Value::Null);
        body.insert(spec.name.to_string(), value);
    }
    Value::Object(body)
}

fn multipart_parts(form: &OpenForm, cfg: &ResourceConfig) -> Vec<Part> {
    let mut parts = Vec::new();

    for spec in &cfg.fields {
        let value = form.draft().get(spec.name).unwrap_or(&Value::Null);
        parts.push(Part::Text {
            name: spec.name.to_string(),
            value: text_value(value),
        });
    }

    for slot in form.slots() {
        if let Some(attachment) = slot.staged() {
            parts.push(Part::File {
                name: slot.field().to_string(),
                file_name: attachment.file.file_name.clone(),
                content_type: attachment.file.content_type.clone(),
                bytes: attachment.file.bytes.clone(),
            });
        }
    }

    parts
}

/// Stringify a draft value the way a browser form would.
fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn check_kind(field: &str, kind: &FieldKind, value: &Value) -> Result<(), SyncError> {
    match kind {
        FieldKind::Text | FieldKind::LongText => match value {
            Value::String(_) | Value::Number(_) => Ok(()),
            _ => Err(SyncError::validation(
                field,
                format!("{} must be text", field),
            )),
        },
        FieldKind::Date => {
            let parsed = value
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
            match parsed {
                Some(_) => Ok(()),
                None => Err(SyncError::validation(
                    field,
                    format!("{} must be a date in YYYY-MM-DD format", field),
                )),
            }
        }
        FieldKind::Number => {
            let numeric = match value {
                Value::Number(_) => true,
                Value::String(s) => s.trim().parse::<f64>().is_ok(),
                _ => false,
            };
            if numeric {
                Ok(())
            } else {
                Err(SyncError::validation(
                    field,
                    format!("{} must be a number", field),
                ))
            }
        }
        FieldKind::Flag => match value {
            Value::Bool(_) => Ok(()),
            _ => Err(SyncError::validation(
                field,
                format!("{} must be a boolean", field),
            )),
        },
        FieldKind::Choice(options) => {
            let valid = value.as_str().map(|s| options.contains(&s)).unwrap_or(false);
            if valid {
                Ok(())
            } else {
                Err(SyncError::validation(
                    field,
                    format!("{} must be one of: {}", field, options.join(", ")),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, LayoutSection, NewsItem, Record};
    use crate::resource::UpdateMethod;
    use crate::session::StagedFile;
    use serde_json::json;

    fn staged(name: &str) -> StagedFile {
        StagedFile::new(name, "image/png", vec![0xAA])
    }

    #[test]
    fn test_json_encoding_for_fileless_resource() {
        let cfg = Category::resource();
        let mut session = FormSession::new();
        session.open_create(&cfg);
        session.set_field("category_name", json!("Lubricants")).unwrap();

        let plan = encode(&session, &cfg).unwrap();
        assert_eq!(plan.method, reqwest::Method::POST);
        assert_eq!(plan.path, "categories");
        assert_eq!(plan.payload, Payload::Json(json!({"category_name": "Lubricants"})));
    }

    #[test]
    fn test_edit_mode_uses_update_method_and_path() {
        let cfg = Category::resource();
        let record =
            Record::from_value(json!({"_id": "c1", "category_name": "Lubricants"})).unwrap();

        let mut session = FormSession::new();
        session.open_edit(&cfg, &record).unwrap();
        session.set_field("category_name", json!("Greases")).unwrap();

        let plan = encode(&session, &cfg).unwrap();
        assert_eq!(cfg.update_method, UpdateMethod::Patch);
        assert_eq!(plan.method, reqwest::Method::PATCH);
        assert_eq!(plan.path, "categories/c1");
    }

    #[test]
    fn test_multipart_scalar_order_then_files() {
        let cfg = NewsItem::resource();
        let mut session = FormSession::new();
        session.open_create(&cfg);
        session.set_field("title", json!("Opening")).unwrap();
        session.set_field("descriptions", json!("New store")).unwrap();
        session.set_field("date", json!("2024-11-02")).unwrap();
        session.stage_attachment(1, staged("b.png")).unwrap();
        session.stage_attachment(0, staged("a.png")).unwrap();

        let plan = encode(&session, &cfg).unwrap();
        let Payload::Multipart(parts) = plan.payload else {
            panic!("expected multipart");
        };

        let names: Vec<&str> = parts
            .iter()
            .map(|p| match p {
                Part::Text { name, .. } => name.as_str(),
                Part::File { name, .. } => name.as_str(),
            })
            .collect();
        assert_eq!(names, vec!["title", "descriptions", "date", "images", "images"]);

        // Slot order, not staging order.
        let file_names: Vec<&str> = parts
            .iter()
            .filter_map(|p| match p {
                Part::File { file_name, .. } => Some(file_name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(file_names, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_edit_with_untouched_attachments_sends_no_file_part() {
        let cfg = NewsItem::resource();
        let record = Record::from_value(json!({
            "_id": "n1",
            "title": "Opening",
            "descriptions": "New store",
            "date": "2024-11-02",
            "images": ["/uploads/news/a.png"]
        }))
        .unwrap();

        let mut session = FormSession::new();
        session.open_edit(&cfg, &record).unwrap();

        let plan = encode(&session, &cfg).unwrap();
        let Payload::Multipart(parts) = plan.payload else {
            panic!("expected multipart");
        };
        assert!(parts.iter().all(|p| matches!(p, Part::Text { .. })));
    }

    #[test]
    fn test_required_field_missing() {
        let cfg = Category::resource();
        let mut session = FormSession::new();
        session.open_create(&cfg);

        let err = encode(&session, &cfg).unwrap_err();
        assert_eq!(err.field(), Some("category_name"));
    }

    #[test]
    fn test_required_attachment_missing_on_create() {
        let cfg = NewsItem::resource();
        let mut session = FormSession::new();
        session.open_create(&cfg);
        session.set_field("title", json!("Opening")).unwrap();
        session.set_field("descriptions", json!("New store")).unwrap();
        session.set_field("date", json!("2024-11-02")).unwrap();

        let err = validate(&session, &cfg).unwrap_err();
        assert_eq!(err.field(), Some("images"));
    }

    #[test]
    fn test_attachment_not_required_on_edit() {
        let cfg = NewsItem::resource();
        let record = Record::from_value(json!({
            "_id": "n1",
            "title": "Opening",
            "descriptions": "New store",
            "date": "2024-11-02"
        }))
        .unwrap();

        let mut session = FormSession::new();
        session.open_edit(&cfg, &record).unwrap();
        assert!(validate(&session, &cfg).is_ok());
    }

    #[test]
    fn test_date_validation() {
        let cfg = NewsItem::resource();
        let mut session = FormSession::new();
        session.open_create(&cfg);
        session.set_field("title", json!("Opening")).unwrap();
        session.set_field("descriptions", json!("New store")).unwrap();
        session.set_field("date", json!("02.11.2024")).unwrap();
        session.stage_attachment(0, staged("a.png")).unwrap();

        let err = validate(&session, &cfg).unwrap_err();
        assert_eq!(err.field(), Some("date"));
    }

    #[test]
    fn test_choice_validation() {
        let cfg = LayoutSection::resource();
        let mut session = FormSession::new();
        session.open_create(&cfg);
        session.set_field("title", json!("Hero")).unwrap();
        session.set_field("description", json!("Banner")).unwrap();
        session.set_field("layout_text_position", json!("center")).unwrap();
        session.stage_attachment(0, staged("a.png")).unwrap();

        let err = validate(&session, &cfg).unwrap_err();
        assert_eq!(err.field(), Some("layout_text_position"));
    }

    #[test]
    fn test_number_accepts_form_style_strings() {
        assert!(check_kind("price", &FieldKind::Number, &json!("29.90")).is_ok());
        assert!(check_kind("price", &FieldKind::Number, &json!(29.9)).is_ok());
        assert!(check_kind("price", &FieldKind::Number, &json!("cheap")).is_err());
    }

    #[test]
    fn test_optional_empty_fields_skip_kind_checks() {
        let cfg = crate::models::Product::resource();
        let mut session = FormSession::new();
        session.open_create(&cfg);
        for (field, value) in [
            ("name", json!("Oil")),
            ("description", json!("Synthetic")),
            ("price", json!("29.9")),
            ("category", json!("c1")),
            ("stock", json!("5")),
            ("rating", json!("4.5")),
            ("volume", json!("4L")),
            ("ruler", json!("Lemarc")),
        ] {
            session.set_field(field, value).unwrap();
        }
        session.stage_attachment(0, staged("a.png")).unwrap();
        session
            .stage_attachment(6, StagedFile::new("info.pdf", "application/pdf", vec![1]))
            .unwrap();

        // discount_price, oils_type, fidbek left at their empty defaults.
        assert!(validate(&session, &cfg).is_ok());
    }

    #[test]
    fn test_closed_session_cannot_encode() {
        let cfg = Category::resource();
        let session = FormSession::new();
        assert!(matches!(
            encode(&session, &cfg),
            Err(SyncError::BadRequest(_))
        ));
    }
}
