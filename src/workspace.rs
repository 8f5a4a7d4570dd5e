//! Coordinates the profile store, the AI gateway and the document editor
//!
//! Every AI-backed step computes its result first and only then touches
//! stored state, so a failed call leaves the base profile, the session and
//! the history exactly as they were.

use crate::ai::AiGateway;
use crate::editor::{read_text, DocumentEditor, FieldPath};
use crate::error::{FastCvError, Result};
use crate::profile::storage::KeyValueStorage;
use crate::profile::store::ProfileStore;
use crate::profile::types::{CVRecord, ResumeProfile, Session, View};
use log::{info, warn};

pub struct Workspace<S: KeyValueStorage, G: AiGateway> {
    store: ProfileStore<S>,
    gateway: G,
    base: Option<ResumeProfile>,
    session: Option<Session>,
}

impl<S: KeyValueStorage, G: AiGateway> Workspace<S, G> {
    pub fn open(store: ProfileStore<S>, gateway: G) -> Result<Self> {
        let base = store.load_profile()?;
        let session = match store.load_session()? {
            Some(session) => Some(session),
            None => base.clone().map(Session::new),
        };
        Ok(Self {
            store,
            gateway,
            base,
            session,
        })
    }

    pub fn store(&self) -> &ProfileStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ProfileStore<S> {
        &mut self.store
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn base_profile(&self) -> Option<&ResumeProfile> {
        self.base.as_ref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The working document
    pub fn active(&self) -> Result<&ResumeProfile> {
        self.session
            .as_ref()
            .map(|session| &session.profile)
            .ok_or(FastCvError::NoProfile)
    }

    pub fn target_job(&self) -> &str {
        self.session
            .as_ref()
            .map(|session| session.target_job.as_str())
            .unwrap_or("")
    }

    /// Turn pasted or uploaded career details into the base profile
    pub async fn extract_profile(&mut self, raw_text: &str) -> Result<&ResumeProfile> {
        if raw_text.trim().is_empty() {
            return Err(FastCvError::InvalidInput("Please paste some details first.".into()));
        }
        let profile = self.gateway.extract_profile(raw_text).await?;
        info!(
            "Extracted profile for {} ({} roles, {} skills)",
            profile.display_name(),
            profile.role_count(),
            profile.skill_count()
        );
        self.replace_base(profile)
    }

    /// Use an already structured profile as the base, without an AI call
    pub fn import_profile(&mut self, profile: ResumeProfile) -> Result<&ResumeProfile> {
        self.replace_base(profile)
    }

    /// Tailor the base profile for `target_job` and make it the active document
    pub async fn tailor(&mut self, target_job: &str) -> Result<CVRecord> {
        let target_job = required_job(target_job, "Please enter a job title.")?;
        let base = self.base.clone().ok_or(FastCvError::NoProfile)?;

        let tailored = self.gateway.tailor_profile(&base, &target_job).await?;
        let label = target_job.clone();
        self.commit_recorded(
            Session {
                profile: tailored,
                target_job,
                view: View::Resume,
            },
            &label,
        )
    }

    /// Write a cover letter for the active document. Falls back to the
    /// session's target job when `target_job` is not given.
    pub async fn cover_letter(&mut self, target_job: Option<&str>) -> Result<CVRecord> {
        let job = target_job.unwrap_or_else(|| self.target_job()).to_string();
        let target_job = required_job(&job, "Please enter a job title to generate a cover letter.")?;
        let mut profile = self.active()?.clone();

        let letter = self.gateway.write_cover_letter(&profile, &target_job).await?;
        DocumentEditor::new(&mut profile).set_cover_letter(&letter);

        let label = format!("{} (w/ Letter)", target_job);
        self.commit_recorded(
            Session {
                profile,
                target_job,
                view: View::CoverLetter,
            },
            &label,
        )
    }

    /// Ask the AI to rewrite one field of the active document in place
    pub async fn rewrite(&mut self, path: &FieldPath, instruction: &str) -> Result<String> {
        let fragment = read_text(self.active()?, path)?;
        if fragment.trim().is_empty() {
            return Err(FastCvError::InvalidInput(format!("{} is empty, nothing to rewrite", path)));
        }

        let target_job = Some(self.target_job()).filter(|job| !job.trim().is_empty());
        let rewritten = self
            .gateway
            .rewrite_fragment(&fragment, instruction, target_job)
            .await?;

        let mut session = self.session.clone().ok_or(FastCvError::NoProfile)?;
        DocumentEditor::new(&mut session.profile).set_text(path, &rewritten)?;
        self.commit_session(session)?;
        info!("Rewrote {}", path);
        Ok(rewritten)
    }

    /// Apply an editor operation to the active document; on error nothing
    /// is changed
    pub fn edit<R>(&mut self, op: impl FnOnce(&mut DocumentEditor<'_>) -> Result<R>) -> Result<R> {
        let mut session = self.session.clone().ok_or(FastCvError::NoProfile)?;
        let result = op(&mut DocumentEditor::new(&mut session.profile))?;
        self.commit_session(session)?;
        Ok(result)
    }

    /// Explicitly snapshot the active document into the history
    pub fn save_snapshot(&mut self, label: Option<&str>) -> Result<CVRecord> {
        let profile = self.active()?.clone();
        let label = match label.map(str::trim).filter(|l| !l.is_empty()) {
            Some(label) => label.to_string(),
            None if !self.target_job().trim().is_empty() => format!("{} (Edited)", self.target_job().trim()),
            None => "Manual Save".to_string(),
        };
        self.store.add_record(&label, &profile)
    }

    /// Make a history record the active document
    pub fn load_record(&mut self, id: &str) -> Result<&Session> {
        let record = self.store.get_record(id)?;
        info!("Loaded record {} ('{}')", record.id, record.target_job);
        self.commit_session(Session::new(record.profile))?;
        self.session.as_ref().ok_or(FastCvError::NoProfile)
    }

    /// Make the active document the new base profile for future tailoring
    pub fn promote_active(&mut self) -> Result<()> {
        let mut profile = self.active()?.clone();
        profile.cover_letter = None;
        self.store.save_profile(&profile)?;
        self.base = Some(profile);
        Ok(())
    }

    pub fn set_view(&mut self, view: View) -> Result<()> {
        let mut session = self.session.clone().ok_or(FastCvError::NoProfile)?;
        session.view = view;
        self.commit_session(session)
    }

    pub fn set_target_job(&mut self, target_job: &str) -> Result<()> {
        let mut session = self.session.clone().ok_or(FastCvError::NoProfile)?;
        session.target_job = target_job.trim().to_string();
        self.commit_session(session)
    }

    /// Forget the base profile and working document; history is kept
    pub fn reset(&mut self) -> Result<()> {
        self.store.clear_profile()?;
        self.store.clear_session()?;
        self.base = None;
        self.session = None;
        info!("Base profile and session cleared");
        Ok(())
    }

    fn replace_base(&mut self, profile: ResumeProfile) -> Result<&ResumeProfile> {
        self.store.save_profile(&profile)?;
        self.commit_session(Session::new(profile.clone()))?;
        Ok(&*self.base.insert(profile))
    }

    fn commit_session(&mut self, session: Session) -> Result<()> {
        self.store.save_session(&session)?;
        self.session = Some(session);
        Ok(())
    }

    /// Make `session` current and record its document in the history. If
    /// the record cannot be written the previous session is put back.
    fn commit_recorded(&mut self, session: Session, label: &str) -> Result<CVRecord> {
        let previous = self.session.clone();
        self.commit_session(session)?;

        let result = match self.session.as_ref() {
            Some(current) => self.store.add_record(label, &current.profile),
            None => Err(FastCvError::NoProfile),
        };
        if let Err(e) = &result {
            warn!("Could not record '{}' in history ({}), restoring the previous document", label, e);
            let restored = match &previous {
                Some(session) => self.store.save_session(session),
                None => self.store.clear_session(),
            };
            if let Err(restore_error) = restored {
                warn!("Failed to restore the previous session: {}", restore_error);
            }
            self.session = previous;
        }
        result
    }
}

fn required_job(target_job: &str, message: &str) -> Result<String> {
    let job = target_job.trim();
    if job.is_empty() {
        return Err(FastCvError::InvalidInput(message.to_string()));
    }
    Ok(job.to_string())
}
