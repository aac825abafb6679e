//! Transport boundary: broadcasting committed moves to viewers
//!
//! The core is transport-agnostic; a push channel, a websocket hub or a
//! poller can all sit behind [`MoveBroadcaster`]. Broadcast is
//! fire-and-forget: implementations own their retry and failure handling,
//! and a broadcast failure never rolls back the move.

use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use std::sync::Mutex;

use crate::board::Move;

/// A committed move as seen by broadcast listeners
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveEvent {
    pub session_id: String,
    #[serde(rename = "move")]
    pub mv: Move,
    pub fen: String,
}

pub trait MoveBroadcaster: Send + Sync {
    fn broadcast(&self, session_id: &str, mv: &Move, fen: &str);
}

/// Discards every event. Default when no transport is wired up
pub struct NullBroadcaster;

impl MoveBroadcaster for NullBroadcaster {
    fn broadcast(&self, _session_id: &str, _mv: &Move, _fen: &str) {}
}

/// Fans events into an mpsc channel, for tests and polling consumers
pub struct ChannelBroadcaster {
    tx: Mutex<mpsc::Sender<MoveEvent>>,
}

impl ChannelBroadcaster {
    pub fn new() -> (ChannelBroadcaster, mpsc::Receiver<MoveEvent>) {
        let (tx, rx) = mpsc::channel();
        (ChannelBroadcaster { tx: Mutex::new(tx) }, rx)
    }
}

impl MoveBroadcaster for ChannelBroadcaster {
    fn broadcast(&self, session_id: &str, mv: &Move, fen: &str) {
        let event = MoveEvent {
            session_id: session_id.to_string(),
            mv: *mv,
            fen: fen.to_string(),
        };
        if self.tx.lock().unwrap().send(event).is_err() {
            eprintln!("Warning: dropped move broadcast for {}", session_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen;
    use crate::Board;

    #[test]
    fn test_channel_broadcaster_delivers_events() {
        let (broadcaster, events) = ChannelBroadcaster::new();
        let board = Board::starting();
        let mv = movegen::legal_moves(&board)[0];

        broadcaster.broadcast("abc123", &mv, &board.to_fen());
        let event = events.recv().unwrap();
        assert_eq!(event.session_id, "abc123");
        assert_eq!(event.mv, mv);

        // event JSON round-trips, with the move under a "move" key
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"move\""));
        let back: MoveEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.mv, event.mv);
    }
}
