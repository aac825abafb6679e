//! Pseudo-legal move generation
//!
//! Per-piece geometry only: a pseudo-legal move may still leave the mover's
//! own king attacked. Castling is the exception, since its not-through-check
//! conditions are part of the move's geometry.

use crate::board::state::{square_at, BISHOP_DIRS, KING_OFFSETS, KNIGHT_OFFSETS, ROOK_DIRS};
use crate::board::{Board, Color, Move, Piece, PieceKind, Square};

/// Pseudo-legal moves for the piece on `from`, empty when the square does
/// not hold a piece of the side to move
pub fn pseudo_legal_moves(board: &Board, from: Square) -> Vec<Move> {
    let Some(piece) = board.piece_at(from) else {
        return Vec::new();
    };
    if piece.color != board.side_to_move() {
        return Vec::new();
    }

    let mut out = Vec::new();
    match piece.kind {
        PieceKind::Pawn => pawn_moves(board, from, piece.color, &mut out),
        PieceKind::Knight => step_moves(board, from, piece.color, &KNIGHT_OFFSETS, &mut out),
        PieceKind::Bishop => slide_moves(board, from, piece.color, &BISHOP_DIRS, &mut out),
        PieceKind::Rook => slide_moves(board, from, piece.color, &ROOK_DIRS, &mut out),
        PieceKind::Queen => {
            slide_moves(board, from, piece.color, &ROOK_DIRS, &mut out);
            slide_moves(board, from, piece.color, &BISHOP_DIRS, &mut out);
        }
        PieceKind::King => {
            step_moves(board, from, piece.color, &KING_OFFSETS, &mut out);
            castle_moves(board, from, piece.color, &mut out);
        }
    }
    out
}

/// All pseudo-legal moves for the side to move, scanned rank-major,
/// file-minor for a reproducible order
pub fn pseudo_legal_all(board: &Board) -> Vec<Move> {
    let mut out = Vec::new();
    for index in 0..64u8 {
        out.extend(pseudo_legal_moves(board, Square::from_index(index)));
    }
    out
}

fn quiet(from: Square, to: Square) -> Move {
    Move {
        from,
        to,
        promotion: None,
        is_capture: false,
        is_castle: false,
        is_en_passant: false,
    }
}

fn capture(from: Square, to: Square) -> Move {
    Move {
        is_capture: true,
        ..quiet(from, to)
    }
}

fn step_moves(board: &Board, from: Square, color: Color, offsets: &[(i8, i8)], out: &mut Vec<Move>) {
    for &(df, dr) in offsets {
        let Some(to) = square_at(from.file() as i8 + df, from.rank() as i8 + dr) else {
            continue;
        };
        match board.piece_at(to) {
            None => out.push(quiet(from, to)),
            Some(p) if p.color != color => out.push(capture(from, to)),
            Some(_) => {}
        }
    }
}

fn slide_moves(board: &Board, from: Square, color: Color, dirs: &[(i8, i8)], out: &mut Vec<Move>) {
    for &(df, dr) in dirs {
        let mut cf = from.file() as i8 + df;
        let mut cr = from.rank() as i8 + dr;
        while let Some(to) = square_at(cf, cr) {
            match board.piece_at(to) {
                None => out.push(quiet(from, to)),
                Some(p) => {
                    if p.color != color {
                        out.push(capture(from, to));
                    }
                    break;
                }
            }
            cf += df;
            cr += dr;
        }
    }
}

fn pawn_moves(board: &Board, from: Square, color: Color, out: &mut Vec<Move>) {
    let dir: i8 = match color {
        Color::White => 1,
        Color::Black => -1,
    };
    let start_rank: u8 = match color {
        Color::White => 1,
        Color::Black => 6,
    };

    if let Some(one) = square_at(from.file() as i8, from.rank() as i8 + dir) {
        if board.piece_at(one).is_none() {
            push_pawn(out, from, one, false);
            if from.rank() == start_rank {
                if let Some(two) = square_at(from.file() as i8, from.rank() as i8 + 2 * dir) {
                    if board.piece_at(two).is_none() {
                        out.push(quiet(from, two));
                    }
                }
            }
        }
    }

    for df in [-1i8, 1] {
        let Some(to) = square_at(from.file() as i8 + df, from.rank() as i8 + dir) else {
            continue;
        };
        match board.piece_at(to) {
            Some(p) if p.color != color => push_pawn(out, from, to, true),
            None if board.en_passant() == Some(to) => out.push(Move {
                is_en_passant: true,
                ..capture(from, to)
            }),
            _ => {}
        }
    }
}

/// Pushes a pawn move, fanning out to the four promotion kinds on the last
/// rank
fn push_pawn(out: &mut Vec<Move>, from: Square, to: Square, is_capture: bool) {
    if to.rank() == 0 || to.rank() == 7 {
        for kind in [
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Rook,
            PieceKind::Queen,
        ] {
            out.push(Move {
                promotion: Some(kind),
                is_capture,
                ..quiet(from, to)
            });
        }
    } else {
        out.push(Move {
            is_capture,
            ..quiet(from, to)
        });
    }
}

fn castle_moves(board: &Board, from: Square, color: Color, out: &mut Vec<Move>) {
    let rank: u8 = match color {
        Color::White => 0,
        Color::Black => 7,
    };
    if from != Square::from_coords(4, rank) {
        return;
    }
    if board.is_in_check(color) {
        return;
    }

    let enemy = color.opposite();
    let rook = Piece {
        kind: PieceKind::Rook,
        color,
    };
    let (kingside, queenside) = match color {
        Color::White => (
            board.castling().white_kingside,
            board.castling().white_queenside,
        ),
        Color::Black => (
            board.castling().black_kingside,
            board.castling().black_queenside,
        ),
    };

    if kingside
        && board.piece_at(Square::from_coords(5, rank)).is_none()
        && board.piece_at(Square::from_coords(6, rank)).is_none()
        && board.piece_at(Square::from_coords(7, rank)) == Some(rook)
        && !board.is_square_attacked(Square::from_coords(5, rank), enemy)
        && !board.is_square_attacked(Square::from_coords(6, rank), enemy)
    {
        out.push(Move {
            is_castle: true,
            ..quiet(from, Square::from_coords(6, rank))
        });
    }

    if queenside
        && board.piece_at(Square::from_coords(1, rank)).is_none()
        && board.piece_at(Square::from_coords(2, rank)).is_none()
        && board.piece_at(Square::from_coords(3, rank)).is_none()
        && board.piece_at(Square::from_coords(0, rank)) == Some(rook)
        && !board.is_square_attacked(Square::from_coords(3, rank), enemy)
        && !board.is_square_attacked(Square::from_coords(2, rank), enemy)
    {
        out.push(Move {
            is_castle: true,
            ..quiet(from, Square::from_coords(2, rank))
        });
    }
}
