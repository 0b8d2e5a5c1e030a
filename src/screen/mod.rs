//! The per-screen engine.
//!
//! One `Screen` owns a resource descriptor, the shared API client, the
//! record collection and the form session, and drives the submission
//! pipeline across them. Screens share no state with each other.

use serde_json::Value;

use crate::client::ApiClient;
use crate::errors::SyncError;
use crate::resource::ResourceConfig;
use crate::session::{FormSession, PreviewRef, SessionMode, StagedFile};
use crate::store::ResourceStore;
use crate::submit;

/// Outcome of a submit attempt that did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The server accepted the record and the store was reconciled.
    Saved,
    /// A submission from this session is already in flight; this call was a
    /// no-op. Prevents duplicate creates from repeated submit attempts.
    InFlight,
}

/// Engine instance for one admin screen.
#[derive(Debug)]
pub struct Screen {
    config: ResourceConfig,
    client: ApiClient,
    store: ResourceStore,
    session: FormSession,
    submitting: bool,
}

impl Screen {
    pub fn new(client: ApiClient, config: ResourceConfig) -> Self {
        Self {
            config,
            client,
            store: ResourceStore::new(),
            session: FormSession::new(),
            submitting: false,
        }
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Fetch the full collection and replace the store's contents.
    ///
    /// On failure the collection keeps its last known state (empty on first
    /// load); only the loading flag is cleared. No retry.
    pub async fn load(&mut self) -> Result<(), SyncError> {
        self.store.set_loading(true);
        let result = self.client.fetch_list(&self.config).await;
        self.store.set_loading(false);

        let records = result?;
        tracing::debug!("Loaded {} {} records", records.len(), self.config.name);
        self.store.replace_all(records);
        Ok(())
    }

    /// Open the form session in create mode.
    pub fn open_create(&mut self) {
        self.session.open_create(&self.config);
    }

    /// Open the form session in edit mode for a record held in the store.
    pub fn open_edit(&mut self, id: &str) -> Result<(), SyncError> {
        let record = self.store.get(id).cloned().ok_or_else(|| {
            tracing::warn!("Edit target {} not in the {} store", id, self.config.name);
            SyncError::Stale(format!("record {} is no longer available locally", id))
        })?;
        self.session.open_edit(&self.config, &record)
    }

    pub fn set_field(&mut self, name: &str, value: Value) -> Result<(), SyncError> {
        self.session.set_field(name, value)
    }

    pub fn stage_attachment(
        &mut self,
        slot_index: usize,
        file: StagedFile,
    ) -> Result<&PreviewRef, SyncError> {
        self.session.stage_attachment(slot_index, file)
    }

    pub fn clear_attachment(&mut self, slot_index: usize) -> Result<(), SyncError> {
        self.session.clear_attachment(slot_index)
    }

    /// Close the form, discarding the draft and staged attachments.
    ///
    /// Also disarms the in-flight guard left behind by an abandoned submit:
    /// the closed session can no longer receive that submit's result, so a
    /// fresh form may start over.
    pub fn close_form(&mut self) {
        self.session.close();
        self.submitting = false;
    }

    /// Run the submission pipeline for the open form.
    ///
    /// Validates and encodes locally, issues exactly one request, then
    /// reconciles the authoritative server record into the store and closes
    /// the session. On any error the store and the session are left as they
    /// were, so the operator can correct and resubmit.
    ///
    /// If a previous submit from this session was abandoned mid-flight its
    /// request may still reach the server; until the form is closed, further
    /// calls return `SubmitOutcome::InFlight` instead of risking a duplicate.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, SyncError> {
        if self.submitting {
            tracing::warn!("{} submission already in flight, ignoring", self.config.name);
            return Ok(SubmitOutcome::InFlight);
        }

        let plan = submit::encode(&self.session, &self.config)?;

        self.submitting = true;
        let result = self.client.execute(&plan).await;
        self.submitting = false;

        let record = result?;

        match &plan.mode {
            SessionMode::Create => {
                self.store.apply_create(record);
            }
            SessionMode::Edit { id } => {
                if !self.store.apply_update(record) {
                    tracing::warn!("Updated record {} vanished from the local collection", id);
                }
            }
        }

        self.session.close();
        Ok(SubmitOutcome::Saved)
    }

    /// Delete one record: single request, then drop it from the store.
    ///
    /// On failure the collection is untouched and the error is surfaced.
    pub async fn delete(&mut self, id: &str) -> Result<(), SyncError> {
        self.client.delete(&self.config, id).await?;
        self.store.apply_delete(id);
        Ok(())
    }
}
