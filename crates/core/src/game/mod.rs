//! Game sessions and the session manager

mod manager;
mod session;

pub use manager::{MoveOutcome, SessionManager};
pub use session::{GameSession, GameStatus, SessionView};
