//! Form session: the transient draft of one record being created or edited.
//!
//! A session is closed or holds exactly one open form. The open form carries
//! the scalar draft, the staged attachments and the session mode. Staged
//! attachments own a preview handle minted by the session's registry; the
//! handle is revoked exactly once, when the attachment is replaced, cleared,
//! or the form closes.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, Weak};

use serde_json::Value;
use uuid::Uuid;

use crate::errors::SyncError;
use crate::models::Record;
use crate::resource::ResourceConfig;

/// Scalar draft fields, keyed by field name.
pub type Draft = BTreeMap<String, Value>;

/// Whether the session targets creation or editing of an existing record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    Create,
    Edit { id: String },
}

/// A binary file chosen by the operator, pending upload.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl StagedFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, deriving the content type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, SyncError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SyncError::BadRequest(format!("cannot read {}: {}", path.display(), e)))?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("attachment")
            .to_string();

        let content_type = content_type_for(&file_name).to_string();

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name.rsplit('.').next().unwrap_or("");
    match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Registry of live preview handles, observable so leak-freedom is testable.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: Mutex<HashSet<Uuid>>,
}

impl PreviewRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn mint(self: &Arc<Self>, file_name: &str) -> PreviewRef {
        let id = Uuid::new_v4();
        self.live.lock().unwrap().insert(id);
        PreviewRef {
            id,
            url: format!("preview://{}/{}", id, file_name),
            registry: Arc::downgrade(self),
        }
    }

    fn revoke(&self, id: Uuid) {
        self.live.lock().unwrap().remove(&id);
    }

    /// Number of preview handles not yet revoked.
    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    pub fn is_live(&self, preview: &PreviewRef) -> bool {
        self.live.lock().unwrap().contains(&preview.id)
    }
}

/// A local-only, revocable display handle for a staged attachment.
///
/// Never transmitted to the server. Revocation is tied to ownership: dropping
/// the handle (attachment replaced or session closed) releases it.
pub struct PreviewRef {
    id: Uuid,
    url: String,
    registry: Weak<PreviewRegistry>,
}

impl PreviewRef {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewRef {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.revoke(self.id);
        }
    }
}

impl fmt::Debug for PreviewRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewRef").field("url", &self.url).finish()
    }
}

/// A staged attachment: the pending upload plus its preview handle.
#[derive(Debug)]
pub struct Attachment {
    pub file: StagedFile,
    pub preview: PreviewRef,
}

/// One attachment slot of the open form.
#[derive(Debug)]
pub struct Slot {
    field: String,
    staged: Option<Attachment>,
}

impl Slot {
    /// Wire field name this slot uploads under.
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn staged(&self) -> Option<&Attachment> {
        self.staged.as_ref()
    }

    pub fn is_staged(&self) -> bool {
        self.staged.is_some()
    }
}

/// The open state of a session: mode, draft and slots.
#[derive(Debug)]
pub struct OpenForm {
    mode: SessionMode,
    draft: Draft,
    slots: Vec<Slot>,
}

impl OpenForm {
    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }
}

/// Create/edit form lifecycle for one screen.
#[derive(Debug, Default)]
pub struct FormSession {
    previews: Arc<PreviewRegistry>,
    form: Option<OpenForm>,
}

impl FormSession {
    pub fn new() -> Self {
        Self {
            previews: PreviewRegistry::new(),
            form: None,
        }
    }

    /// Open/closed state, exposed as plain data for the presentation layer.
    pub fn is_open(&self) -> bool {
        self.form.is_some()
    }

    pub fn form(&self) -> Option<&OpenForm> {
        self.form.as_ref()
    }

    pub fn mode(&self) -> Option<&SessionMode> {
        self.form.as_ref().map(OpenForm::mode)
    }

    /// The registry minting this session's preview handles.
    pub fn previews(&self) -> &Arc<PreviewRegistry> {
        &self.previews
    }

    /// Open the form in create mode: field defaults, empty slots.
    ///
    /// Reopening an already open form discards the previous draft first.
    pub fn open_create(&mut self, cfg: &ResourceConfig) {
        self.form = Some(OpenForm {
            mode: SessionMode::Create,
            draft: default_draft(cfg),
            slots: empty_slots(cfg),
        });
    }

    /// Open the form in edit mode, seeding the draft from the record.
    ///
    /// Attachments always start empty: server-held files are display-only and
    /// must be restaged explicitly for an edit to replace them.
    pub fn open_edit(&mut self, cfg: &ResourceConfig, record: &Record) -> Result<(), SyncError> {
        let id = record.id().ok_or_else(|| {
            SyncError::BadRequest("cannot edit a record without an identifier".to_string())
        })?;

        let mut draft = default_draft(cfg);
        for spec in &cfg.fields {
            if let Some(value) = record.get(spec.name) {
                if let Some(seed) = seed_value(value) {
                    draft.insert(spec.name.to_string(), seed);
                }
            }
        }

        self.form = Some(OpenForm {
            mode: SessionMode::Edit { id: id.to_string() },
            draft,
            slots: empty_slots(cfg),
        });
        Ok(())
    }

    /// Set exactly one draft field. No side effects on other fields.
    pub fn set_field(&mut self, name: &str, value: Value) -> Result<(), SyncError> {
        let form = self.open_form_mut()?;
        if !form.draft.contains_key(name) {
            return Err(SyncError::BadRequest(format!(
                "unknown draft field: {}",
                name
            )));
        }
        form.draft.insert(name.to_string(), value);
        Ok(())
    }

    /// Stage a file into a slot, replacing any previous attachment there.
    ///
    /// The replaced attachment's preview handle is revoked as it is dropped.
    pub fn stage_attachment(
        &mut self,
        slot_index: usize,
        file: StagedFile,
    ) -> Result<&PreviewRef, SyncError> {
        let previews = self.previews.clone();
        let form = self.open_form_mut()?;
        let slot = form.slots.get_mut(slot_index).ok_or_else(|| {
            SyncError::BadRequest(format!("no attachment slot at index {}", slot_index))
        })?;

        let preview = previews.mint(&file.file_name);
        let attachment = slot.staged.insert(Attachment { file, preview });
        Ok(&attachment.preview)
    }

    /// Unstage a slot, revoking its preview handle. No-op if already empty.
    pub fn clear_attachment(&mut self, slot_index: usize) -> Result<(), SyncError> {
        let form = self.open_form_mut()?;
        let slot = form.slots.get_mut(slot_index).ok_or_else(|| {
            SyncError::BadRequest(format!("no attachment slot at index {}", slot_index))
        })?;
        slot.staged = None;
        Ok(())
    }

    /// Discard the draft and all staged attachments. Idempotent.
    ///
    /// Dropping the attachments revokes every preview handle this form still
    /// holds, exactly once each.
    pub fn close(&mut self) {
        self.form = None;
    }

    fn open_form_mut(&mut self) -> Result<&mut OpenForm, SyncError> {
        self.form
            .as_mut()
            .ok_or_else(|| SyncError::BadRequest("form session is not open".to_string()))
    }
}

fn default_draft(cfg: &ResourceConfig) -> Draft {
    cfg.fields
        .iter()
        .map(|f| (f.name.to_string(), f.default.clone()))
        .collect()
}

fn empty_slots(cfg: &ResourceConfig) -> Vec<Slot> {
    let mut slots = Vec::with_capacity(cfg.total_slots());
    for group in &cfg.files {
        for _ in 0..group.slots {
            slots.push(Slot {
                field: group.field.to_string(),
                staged: None,
            });
        }
    }
    slots
}

/// Seed a draft field from a record value. Scalars pass through; the legacy
/// single-element-array encoding is unwrapped; structured values are skipped.
fn seed_value(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Some(value.clone()),
        Value::Array(items) => items.first().and_then(seed_value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, NewsItem, Product};
    use serde_json::json;

    fn staged(name: &str) -> StagedFile {
        StagedFile::new(name, "image/png", vec![1, 2, 3])
    }

    #[test]
    fn test_open_create_uses_defaults() {
        let cfg = crate::models::LayoutSection::resource();
        let mut session = FormSession::new();
        session.open_create(&cfg);

        let form = session.form().unwrap();
        assert_eq!(form.mode(), &SessionMode::Create);
        assert_eq!(form.draft().get("sectionTheme"), Some(&json!("lemarc1")));
        assert_eq!(form.draft().get("layout_text_position"), Some(&json!("left")));
        assert_eq!(form.slots().len(), 6);
        assert!(form.slots().iter().all(|s| !s.is_staged()));
    }

    #[test]
    fn test_open_edit_seeds_scalars_not_attachments() {
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

        let form = session.form().unwrap();
        assert_eq!(form.mode(), &SessionMode::Edit { id: "n1".to_string() });
        assert_eq!(form.draft().get("title"), Some(&json!("Opening")));
        // Server-held images are never pre-staged.
        assert!(form.slots().iter().all(|s| !s.is_staged()));
    }

    #[test]
    fn test_open_edit_unwraps_legacy_arrays() {
        let cfg = crate::models::LayoutSection::resource();
        let record = Record::from_value(json!({
            "_id": "l1",
            "sectionTheme": ["lemarc1"],
            "title": ["Hero"],
            "description": ["Banner"],
            "layout_text_position": "left",
            "layout_images_position": "right"
        }))
        .unwrap();

        let mut session = FormSession::new();
        session.open_edit(&cfg, &record).unwrap();
        assert_eq!(session.form().unwrap().draft().get("title"), Some(&json!("Hero")));
    }

    #[test]
    fn test_open_edit_rejects_unpersisted_record() {
        let cfg = Category::resource();
        let record = Record::from_value(json!({"category_name": "draft"})).unwrap();
        let mut session = FormSession::new();
        assert!(session.open_edit(&cfg, &record).is_err());
        assert!(!session.is_open());
    }

    #[test]
    fn test_set_field_rejects_unknown_and_closed() {
        let cfg = Category::resource();
        let mut session = FormSession::new();

        assert!(session.set_field("category_name", json!("x")).is_err());

        session.open_create(&cfg);
        session.set_field("category_name", json!("Lubricants")).unwrap();
        assert!(session.set_field("nope", json!("x")).is_err());
        assert_eq!(
            session.form().unwrap().draft().get("category_name"),
            Some(&json!("Lubricants"))
        );
    }

    #[test]
    fn test_stage_replaces_and_revokes_previous_preview() {
        let cfg = NewsItem::resource();
        let mut session = FormSession::new();
        session.open_create(&cfg);

        session.stage_attachment(0, staged("a.png")).unwrap();
        assert_eq!(session.previews().live_count(), 1);

        // Restaging the same slot revokes the old handle.
        session.stage_attachment(0, staged("b.png")).unwrap();
        assert_eq!(session.previews().live_count(), 1);

        let form = session.form().unwrap();
        assert_eq!(form.slots()[0].staged().unwrap().file.file_name, "b.png");
    }

    #[test]
    fn test_close_revokes_all_previews() {
        let cfg = Product::resource();
        let mut session = FormSession::new();
        session.open_create(&cfg);

        session.stage_attachment(0, staged("a.png")).unwrap();
        session.stage_attachment(1, staged("b.png")).unwrap();
        session
            .stage_attachment(6, StagedFile::new("info.pdf", "application/pdf", vec![9]))
            .unwrap();
        assert_eq!(session.previews().live_count(), 3);

        session.close();
        assert!(!session.is_open());
        assert_eq!(session.previews().live_count(), 0);

        // Idempotent.
        session.close();
        assert_eq!(session.previews().live_count(), 0);
    }

    #[test]
    fn test_clear_attachment_revokes() {
        let cfg = NewsItem::resource();
        let mut session = FormSession::new();
        session.open_create(&cfg);

        session.stage_attachment(2, staged("a.png")).unwrap();
        session.clear_attachment(2).unwrap();
        assert_eq!(session.previews().live_count(), 0);
        assert!(!session.form().unwrap().slots()[2].is_staged());
    }

    #[test]
    fn test_stage_out_of_range_slot() {
        let cfg = Category::resource();
        let mut session = FormSession::new();
        session.open_create(&cfg);
        assert!(session.stage_attachment(0, staged("a.png")).is_err());
    }

    #[test]
    fn test_reopen_discards_previous_previews() {
        let cfg = NewsItem::resource();
        let mut session = FormSession::new();
        session.open_create(&cfg);
        session.stage_attachment(0, staged("a.png")).unwrap();

        session.open_create(&cfg);
        assert_eq!(session.previews().live_count(), 0);
    }

    #[test]
    fn test_content_type_guessing() {
        assert_eq!(content_type_for("photo.JPG"), "image/jpeg");
        assert_eq!(content_type_for("doc.pdf"), "application/pdf");
        assert_eq!(content_type_for("mystery.bin"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_staged_file_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.png");
        std::fs::write(&path, b"fake-png").unwrap();

        let file = StagedFile::from_path(&path).await.unwrap();
        assert_eq!(file.file_name, "cover.png");
        assert_eq!(file.content_type, "image/png");
        assert_eq!(file.bytes, b"fake-png");

        let missing = StagedFile::from_path(&dir.path().join("nope.png")).await;
        assert!(missing.is_err());
    }
}
