//! Composer sessions: the transient state of one compose dialog

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::binding::{bind_template, BindingEdit, BindingError, TemplateBindings};
use super::payload::{compose, ComposeTarget, ComposedRequest};
use super::preview::{render_preview, TemplatePreview};
use super::validation::ValidationError;
use crate::metrics::{ComposerMetrics, SessionMetrics};
use crate::template::{TemplateError, TemplateStore};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Composer session not found: {0}")]
    NotFound(Uuid),

    #[error("Too many open composer sessions (limit {0})")]
    CapacityExceeded(usize),

    #[error("No template selected")]
    NoTemplateSelected,

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// State of one open compose dialog
#[derive(Debug, Clone, Serialize)]
pub struct ComposerSession {
    pub id: Uuid,
    pub target: ComposeTarget,
    pub template_id: Option<String>,
    pub bindings: Option<TemplateBindings>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ComposerSession {
    fn new(target: ComposeTarget) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            target,
            template_id: None,
            bindings: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn reset(&mut self) {
        self.template_id = None;
        self.bindings = None;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Open composer sessions, each owned by one dialog
pub struct SessionStore {
    sessions: DashMap<Uuid, ComposerSession>,
    templates: Arc<TemplateStore>,
    /// Reserved slots; counted separately so concurrent opens cannot overshoot
    open_slots: AtomicUsize,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(templates: Arc<TemplateStore>, max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            templates,
            open_slots: AtomicUsize::new(0),
            max_sessions,
        }
    }

    /// Open a new session with nothing selected
    pub fn open(&self, target: ComposeTarget) -> SessionResult<ComposerSession> {
        if !self.reserve_slot() {
            tracing::warn!(limit = self.max_sessions, "Composer session limit reached");
            return Err(SessionError::CapacityExceeded(self.max_sessions));
        }

        let session = ComposerSession::new(target);
        self.sessions.insert(session.id, session.clone());
        SessionMetrics::set_active(self.sessions.len());

        tracing::debug!(session_id = %session.id, target = session.target.label(), "Composer session opened");
        Ok(session)
    }

    fn reserve_slot(&self) -> bool {
        loop {
            let current = self.open_slots.load(Ordering::Acquire);
            if current >= self.max_sessions {
                return false;
            }

            if self
                .open_slots
                .compare_exchange_weak(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return true;
            }
        }
    }

    fn release_slots(&self, n: usize) {
        if n > 0 {
            self.open_slots.fetch_sub(n, Ordering::AcqRel);
        }
    }

    pub fn get(&self, id: Uuid) -> SessionResult<ComposerSession> {
        self.sessions
            .get(&id)
            .map(|s| s.clone())
            .ok_or(SessionError::NotFound(id))
    }

    /// Close a session, discarding whatever was entered
    pub fn close(&self, id: Uuid) -> SessionResult<()> {
        self.sessions
            .remove(&id)
            .ok_or(SessionError::NotFound(id))?;
        self.release_slots(1);
        SessionMetrics::set_active(self.sessions.len());
        Ok(())
    }

    /// Replace where the message will be sent
    pub fn set_target(&self, id: Uuid, target: ComposeTarget) -> SessionResult<ComposerSession> {
        let mut session = self.sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        session.target = target;
        session.touch();
        Ok(session.clone())
    }

    /// Select a template, resetting all bindings to its defaults
    pub fn select_template(&self, id: Uuid, template_id: &str) -> SessionResult<ComposerSession> {
        let template = self.templates.get(template_id)?;
        let mut session = self.sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;

        session.bindings = Some(bind_template(&template));
        session.template_id = Some(template.id);
        session.touch();
        ComposerMetrics::record_selection();

        tracing::debug!(session_id = %id, template_id = %template_id, "Template selected");
        Ok(session.clone())
    }

    /// Apply edits all-or-nothing
    pub fn apply_edits(&self, id: Uuid, edits: Vec<BindingEdit>) -> SessionResult<ComposerSession> {
        let mut session = self.sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;

        let mut bindings = session
            .bindings
            .clone()
            .ok_or(SessionError::NoTemplateSelected)?;
        for edit in edits {
            bindings.apply(edit)?;
        }

        session.bindings = Some(bindings);
        session.touch();
        Ok(session.clone())
    }

    /// Preview the session's current state
    pub fn preview(&self, id: Uuid) -> SessionResult<TemplatePreview> {
        let session = self.get(id)?;
        let template_id = session
            .template_id
            .as_deref()
            .ok_or(SessionError::NoTemplateSelected)?;
        let template = self.templates.get(template_id)?;

        ComposerMetrics::record_preview();
        Ok(render_preview(&template, session.bindings.as_ref()))
    }

    /// Validate and compose the message.
    ///
    /// On success the session is reset to empty; on failure everything the
    /// user entered is kept for correction.
    pub fn submit(&self, id: Uuid) -> SessionResult<ComposedRequest> {
        let mut session = self.sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;

        // A template deleted from the catalogue counts as no selection
        let template = session
            .template_id
            .as_deref()
            .and_then(|tid| self.templates.get(tid).ok());

        let (Some(template), Some(bindings)) = (template, session.bindings.as_ref()) else {
            ComposerMetrics::record_validation_failure(ValidationError::NoTemplate.code());
            return Err(ValidationError::NoTemplate.into());
        };

        let request = match compose(&template, bindings, &session.target) {
            Ok(request) => request,
            Err(e) => {
                ComposerMetrics::record_validation_failure(e.code());
                tracing::debug!(session_id = %id, code = e.code(), "Submission rejected");
                return Err(e.into());
            }
        };

        ComposerMetrics::record_composed(session.target.label());
        session.reset();

        tracing::info!(
            session_id = %id,
            template_id = %template.id,
            target = session.target.label(),
            path = %request.path,
            "Template message composed"
        );
        Ok(request)
    }

    /// Close sessions idle since before `now - max_idle`
    pub fn expire_idle(&self, max_idle: Duration) -> usize {
        self.expire_before(Utc::now() - max_idle)
    }

    pub fn expire_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut expired = 0;
        self.sessions.retain(|_, s| {
            let keep = s.updated_at >= cutoff;
            if !keep {
                expired += 1;
            }
            keep
        });
        self.release_slots(expired);

        if expired > 0 {
            SessionMetrics::record_expired(expired);
            SessionMetrics::set_active(self.sessions.len());
        }
        expired
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }
}
