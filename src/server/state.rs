use std::sync::Arc;
use std::time::Instant;

use crate::composer::SessionStore;
use crate::config::Settings;
use crate::template::{create_template_store, TemplateStore};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub template_store: Arc<TemplateStore>,
    pub sessions: Arc<SessionStore>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let template_store = create_template_store();
        let sessions = Arc::new(SessionStore::new(
            template_store.clone(),
            settings.sessions.max_sessions,
        ));

        Self {
            settings: Arc::new(settings),
            template_store,
            sessions,
            started_at: Instant::now(),
        }
    }
}
