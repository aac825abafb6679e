//! Storage models

use serde::{Deserialize, Serialize};

/// Everything needed to rebuild a session: players, the current FEN, the
/// full move history in UCI text, and the status label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub session_id: String,
    pub white_player: String,
    pub black_player: String,
    pub fen: String,
    pub history: Vec<String>,
    pub status: String,
    pub updated_at: u64,
}
