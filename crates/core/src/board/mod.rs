//! Board state and move primitives

mod fen;
pub(crate) mod state;
mod types;

pub use fen::STARTING_FEN;
pub use state::Board;
pub use types::{CastlingRights, Color, Move, MoveRequest, Piece, PieceKind, Square};
