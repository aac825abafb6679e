//! Chess Game Core Library
//!
//! A complete rules engine (board state, legal move generation, draw and
//! mate detection) plus game session management. Persistence and transport
//! are boundary traits; see [`storage`] and [`transport`].

pub mod board;
pub mod error;
pub mod game;
pub mod movegen;
pub mod storage;
pub mod transport;

pub use board::{Board, CastlingRights, Color, Move, MoveRequest, Piece, PieceKind, Square};
pub use error::{Error, Result};
pub use game::{GameSession, GameStatus, MoveOutcome, SessionManager, SessionView};
pub use storage::{GameSnapshot, MemoryStore, SnapshotStore, SqliteStore};
pub use transport::{ChannelBroadcaster, MoveBroadcaster, MoveEvent, NullBroadcaster};

/// Basic position information
#[derive(Debug)]
pub struct PositionInfo {
    pub piece_count: u32,
    pub legal_move_count: u32,
    pub side_to_move: Color,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
}

/// Analyzes a chess position
pub fn analyze_position(board: &Board) -> PositionInfo {
    let legal_move_count = movegen::legal_moves(board).len() as u32;
    let is_check = board.is_in_check(board.side_to_move());

    PositionInfo {
        piece_count: board.piece_count(),
        legal_move_count,
        side_to_move: board.side_to_move(),
        is_check,
        is_checkmate: legal_move_count == 0 && is_check,
        is_stalemate: legal_move_count == 0 && !is_check,
    }
}

/// Creates the standard starting position
pub fn starting_position() -> Board {
    Board::starting()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_starting_position() {
        let info = analyze_position(&starting_position());
        assert_eq!(info.piece_count, 32);
        assert_eq!(info.legal_move_count, 20);
        assert_eq!(info.side_to_move, Color::White);
        assert!(!info.is_check);
        assert!(!info.is_checkmate);
        assert!(!info.is_stalemate);
    }

    #[test]
    fn test_analyze_mated_position() {
        // fool's mate final position
        let board = Board::from_fen(
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        )
        .unwrap();
        let info = analyze_position(&board);
        assert!(info.is_check);
        assert!(info.is_checkmate);
        assert_eq!(info.legal_move_count, 0);
    }
}
