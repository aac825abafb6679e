//! Legality filter: pseudo-legal moves that leave the own king safe

use crate::board::{Board, Move, Square};

use super::pseudo::{pseudo_legal_all, pseudo_legal_moves};

/// All legal moves for the side to move, in rank-major, file-minor scan
/// order of the origin square
pub fn legal_moves(board: &Board) -> Vec<Move> {
    pseudo_legal_all(board)
        .into_iter()
        .filter(|mv| keeps_king_safe(board, mv))
        .collect()
}

/// Legal moves for the piece on `from`
pub fn legal_from(board: &Board, from: Square) -> Vec<Move> {
    pseudo_legal_moves(board, from)
        .into_iter()
        .filter(|mv| keeps_king_safe(board, mv))
        .collect()
}

fn keeps_king_safe(board: &Board, mv: &Move) -> bool {
    match board.apply_move(mv) {
        Ok(next) => !next.is_in_check(board.side_to_move()),
        Err(_) => false,
    }
}

/// Counts leaf nodes of the legal move tree to `depth`. Test harness for
/// generator correctness
pub fn perft(board: &Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0;
    for mv in legal_moves(board) {
        if let Ok(next) = board.apply_move(&mv) {
            nodes += perft(&next, depth - 1);
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Color;

    #[test]
    fn test_starting_position_has_twenty_moves() {
        let board = Board::starting();
        assert_eq!(legal_moves(&board).len(), 20);
    }

    #[test]
    fn test_perft_from_start() {
        let board = Board::starting();
        assert_eq!(perft(&board, 1), 20);
        assert_eq!(perft(&board, 2), 400);
        assert_eq!(perft(&board, 3), 8902);
    }

    #[test]
    fn test_perft_complex_middlegame() {
        // the classic castling/en-passant/promotion stress position
        let board = Board::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        assert_eq!(perft(&board, 1), 48);
        assert_eq!(perft(&board, 2), 2039);
    }

    #[test]
    fn test_pinned_piece_cannot_move() {
        // the e-file knight is pinned against the white king by a rook
        let board = Board::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        let knight_moves = legal_from(&board, "e2".parse().unwrap());
        assert!(knight_moves.is_empty());
        assert!(!legal_moves(&board).is_empty());
    }

    #[test]
    fn test_checked_king_must_resolve_check() {
        let board = Board::from_fen("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1").unwrap();
        let moves = legal_moves(&board);
        assert!(!moves.is_empty());
        for mv in &moves {
            let next = board.apply_move(mv).unwrap();
            assert!(!next.is_in_check(Color::White));
        }
    }

    #[test]
    fn test_legal_moves_preserve_piece_count() {
        let positions = [
            Board::starting().to_fen(),
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1".to_string(),
            "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 3".to_string(),
            "8/P6k/8/8/8/8/8/K7 w - - 0 1".to_string(),
        ];
        for fen in positions {
            let board = Board::from_fen(&fen).unwrap();
            let before = board.piece_count();
            for mv in legal_moves(&board) {
                let after = board.apply_move(&mv).unwrap().piece_count();
                if mv.is_capture {
                    assert_eq!(after, before - 1, "{} in {}", mv, fen);
                } else {
                    assert_eq!(after, before, "{} in {}", mv, fen);
                }
            }
        }
    }
}
