use crate::core::tracker::Tracker;
use crate::server::auth::SessionStore;
use std::sync::Arc;

/// Shared by every handler; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<Tracker>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(tracker: Arc<Tracker>, sessions: SessionStore) -> Self {
        Self {
            tracker,
            sessions: Arc::new(sessions),
        }
    }
}
