//! Random self-play demo

use chess_game_core::{GameSession, MoveRequest};
use rand::seq::IndexedRandom;

fn main() {
    let max_plies: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(200);

    let mut session = GameSession::new("white", "black");
    println!("Session: {}\n", session.id());

    let mut rng = rand::rng();
    for ply in 1..=max_plies {
        let moves = session.legal_moves();
        let Some(mv) = moves.choose(&mut rng).copied() else {
            break;
        };

        match session.try_move(&MoveRequest::from(mv)) {
            Ok(played) => println!("{:3}. {}", ply, played),
            Err(e) => {
                eprintln!("Unexpected rejection of {}: {}", mv, e);
                std::process::exit(1);
            }
        }

        if session.status().is_terminal() {
            break;
        }
    }

    println!("\nFinal position: {}", session.board().to_fen());
    println!("Status: {}", session.status().as_str());
    println!("Moves played: {}", session.history().len());
}
