//! Move generation: pseudo-legal geometry and the legality filter

mod legal;
mod pseudo;

pub use legal::{legal_from, legal_moves, perft};
pub use pseudo::{pseudo_legal_all, pseudo_legal_moves};
