//! The session manager: one lock per game, shared map of live games

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::board::{Move, MoveRequest};
use crate::error::{Error, Result};
use crate::storage::SnapshotStore;
use crate::transport::MoveBroadcaster;

use super::session::{GameSession, GameStatus, SessionView};

/// Result of a committed move, as handed to callers and broadcast listeners
#[derive(Debug, Clone, Serialize)]
pub struct MoveOutcome {
    pub session_id: String,
    pub played: Move,
    pub fen: String,
    pub status: GameStatus,
}

/// Owns every live session. Each session sits behind its own mutex, so
/// mutations on one game are serialized while distinct games proceed in
/// parallel. Persistence and broadcast happen after a mutation commits and
/// never roll it back.
pub struct SessionManager {
    sessions: Mutex<HashMap<String, Arc<Mutex<GameSession>>>>,
    store: Option<Arc<dyn SnapshotStore>>,
    broadcaster: Option<Arc<dyn MoveBroadcaster>>,
}

impl SessionManager {
    pub fn new() -> SessionManager {
        SessionManager {
            sessions: Mutex::new(HashMap::new()),
            store: None,
            broadcaster: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SnapshotStore>) -> SessionManager {
        self.store = Some(store);
        self
    }

    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn MoveBroadcaster>) -> SessionManager {
        self.broadcaster = Some(broadcaster);
        self
    }

    /// Creates a session for two players and persists its initial snapshot
    pub fn create_session(&self, white_player: &str, black_player: &str) -> Result<SessionView> {
        let mut sessions = self.sessions.lock().unwrap();
        let mut session = GameSession::new(white_player, black_player);
        while sessions.contains_key(session.id()) {
            session = GameSession::new(white_player, black_player);
        }
        let view = session.view();
        self.persist(&session);
        sessions.insert(session.id().to_string(), Arc::new(Mutex::new(session)));
        Ok(view)
    }

    fn session_arc(&self, session_id: &str) -> Result<Arc<Mutex<GameSession>>> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| Error::UnknownSession(session_id.to_string()))
    }

    /// Validates that `player_id` may move right now, then applies the move.
    /// The per-session lock is held across validation, application,
    /// persistence and broadcast, so concurrent submissions on one game
    /// cannot interleave.
    pub fn submit_move(
        &self,
        session_id: &str,
        player_id: &str,
        request: MoveRequest,
    ) -> Result<MoveOutcome> {
        let arc = self.session_arc(session_id)?;
        let mut session = arc.lock().unwrap();

        if session.status().is_terminal() {
            return Err(Error::GameAlreadyOver);
        }
        let color = session.player_color(player_id).ok_or(Error::WrongTurn)?;
        if color != session.board().side_to_move() {
            return Err(Error::WrongTurn);
        }

        let played = session.try_move(&request)?;
        let outcome = MoveOutcome {
            session_id: session_id.to_string(),
            played,
            fen: session.board().to_fen(),
            status: session.status(),
        };

        self.persist(&session);
        if let Some(broadcaster) = &self.broadcaster {
            broadcaster.broadcast(session_id, &played, &outcome.fen);
        }

        Ok(outcome)
    }

    pub fn resign(&self, session_id: &str, player_id: &str) -> Result<GameStatus> {
        let arc = self.session_arc(session_id)?;
        let mut session = arc.lock().unwrap();

        let color = session.player_color(player_id).ok_or(Error::WrongTurn)?;
        let status = session.resign(color)?;
        self.persist(&session);
        Ok(status)
    }

    /// Legal moves for the side to move in `session_id`
    pub fn legal_moves(&self, session_id: &str) -> Result<Vec<Move>> {
        let arc = self.session_arc(session_id)?;
        let session = arc.lock().unwrap();
        Ok(session.legal_moves())
    }

    pub fn session(&self, session_id: &str) -> Result<SessionView> {
        let arc = self.session_arc(session_id)?;
        let session = arc.lock().unwrap();
        Ok(session.view())
    }

    pub fn list_sessions(&self) -> Vec<SessionView> {
        let sessions = self.sessions.lock().unwrap();
        let mut views: Vec<SessionView> = sessions
            .values()
            .map(|arc| arc.lock().unwrap().view())
            .collect();
        views.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        views
    }

    /// Rehydrates a stored session into the live map
    pub fn restore(&self, session_id: &str) -> Result<SessionView> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| Error::UnknownSession(session_id.to_string()))?;
        let snapshot = store
            .load(session_id)?
            .ok_or_else(|| Error::UnknownSession(session_id.to_string()))?;
        let session = GameSession::from_snapshot(&snapshot)?;
        let view = session.view();
        self.sessions
            .lock()
            .unwrap()
            .insert(session_id.to_string(), Arc::new(Mutex::new(session)));
        Ok(view)
    }

    /// Disconnect-timeout sweep. In-progress sessions idle longer than
    /// `max_idle_secs` are resigned on behalf of the side to move; terminal
    /// sessions are dropped from the live map (their snapshots remain in the
    /// store). Returns the ids that were touched.
    pub fn prune_idle(&self, max_idle_secs: u64) -> Vec<String> {
        let cutoff = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            .saturating_sub(max_idle_secs);

        let mut touched = Vec::new();
        let mut sessions = self.sessions.lock().unwrap();
        sessions.retain(|id, arc| {
            let mut session = arc.lock().unwrap();
            if session.status().is_terminal() {
                touched.push(id.clone());
                return false;
            }
            if session.updated_at() <= cutoff {
                let loser = session.board().side_to_move();
                session.set_status(GameStatus::Resigned(loser));
                self.persist(&session);
                touched.push(id.clone());
                return false;
            }
            true
        });
        touched
    }

    fn persist(&self, session: &GameSession) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&session.snapshot()) {
                eprintln!("Warning: failed to persist session {}: {}", session.id(), e);
            }
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
