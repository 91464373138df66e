use std::sync::Arc;

use dashmap::DashMap;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::ai::AiConfig;
use crate::config::GameSettings;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::services::session::GameSession;

/// A session behind its single mutation lock.
pub type SessionHandle = Arc<Mutex<GameSession>>;

/// Every live table in the process.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<Uuid, SessionHandle>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn create(&self, settings: GameSettings, ai_config: AiConfig) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(GameSession::new(id, settings, ai_config)));
        self.sessions.insert(id, Arc::clone(&handle));
        info!(game_id = %id, "Session created");
        (id, handle)
    }

    pub fn get(&self, id: Uuid) -> Result<SessionHandle, AppError> {
        self.sessions
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| {
                AppError::not_found(ErrorCode::GameNotFound, format!("Game {id} not found"))
            })
    }

    pub fn remove(&self, id: Uuid) -> bool {
        self.sessions.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }

    /// Drop sessions untouched for longer than `max_idle`. Sessions that are
    /// locked right now are busy, not idle, and are skipped.
    pub fn prune_idle(&self, max_idle: Duration) -> Vec<Uuid> {
        let now = OffsetDateTime::now_utc();
        let stale: Vec<Uuid> = self
            .sessions
            .iter()
            .filter_map(|entry| {
                let session = entry.value().try_lock().ok()?;
                (now - session.last_activity > max_idle).then_some(*entry.key())
            })
            .collect();
        for id in &stale {
            self.sessions.remove(id);
        }
        if !stale.is_empty() {
            info!(pruned = stale.len(), remaining = self.sessions.len(), "Pruned idle sessions");
        }
        stale
    }
}
