//! Board state: an immutable-per-move position value

use crate::error::{Error, Result};

use super::types::{CastlingRights, Color, Move, Piece, PieceKind, Square};

pub(crate) const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (-1, 2),
    (-2, 1),
    (1, -2),
    (2, -1),
    (-1, -2),
    (-2, -1),
];

pub(crate) const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

pub(crate) const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

pub(crate) const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Returns the square at (file, rank) if both are on the board
pub(crate) fn square_at(file: i8, rank: i8) -> Option<Square> {
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some(Square::from_coords(file as u8, rank as u8))
    } else {
        None
    }
}

/// A full chess position. Applying a move never mutates in place; it yields
/// a new `Board`, so historical positions stay safely readable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub(crate) squares: [Option<Piece>; 64],
    pub(crate) side_to_move: Color,
    pub(crate) castling: CastlingRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
}

impl Board {
    /// The standard starting position
    pub fn starting() -> Board {
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut squares = [None; 64];
        for (file, kind) in back_rank.into_iter().enumerate() {
            squares[file] = Some(Piece {
                kind,
                color: Color::White,
            });
            squares[8 + file] = Some(Piece {
                kind: PieceKind::Pawn,
                color: Color::White,
            });
            squares[48 + file] = Some(Piece {
                kind: PieceKind::Pawn,
                color: Color::Black,
            });
            squares[56 + file] = Some(Piece {
                kind,
                color: Color::Black,
            });
        }

        Board {
            squares,
            side_to_move: Color::White,
            castling: CastlingRights::all(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn piece_count(&self) -> u32 {
        self.squares.iter().filter(|s| s.is_some()).count() as u32
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        (0..64u8).map(Square::from_index).find(|&sq| {
            self.piece_at(sq)
                == Some(Piece {
                    kind: PieceKind::King,
                    color,
                })
        })
    }

    /// True when any piece of `by` attacks `square`
    pub fn is_square_attacked(&self, square: Square, by: Color) -> bool {
        let f = square.file() as i8;
        let r = square.rank() as i8;

        // pawns attack one rank toward the enemy
        let pawn_rank = match by {
            Color::White => r - 1,
            Color::Black => r + 1,
        };
        for df in [-1i8, 1] {
            if let Some(sq) = square_at(f + df, pawn_rank) {
                if self.piece_at(sq)
                    == Some(Piece {
                        kind: PieceKind::Pawn,
                        color: by,
                    })
                {
                    return true;
                }
            }
        }

        for (df, dr) in KNIGHT_OFFSETS {
            if let Some(sq) = square_at(f + df, r + dr) {
                if self.piece_at(sq)
                    == Some(Piece {
                        kind: PieceKind::Knight,
                        color: by,
                    })
                {
                    return true;
                }
            }
        }

        for (df, dr) in KING_OFFSETS {
            if let Some(sq) = square_at(f + df, r + dr) {
                if self.piece_at(sq)
                    == Some(Piece {
                        kind: PieceKind::King,
                        color: by,
                    })
                {
                    return true;
                }
            }
        }

        if self.ray_hits(f, r, by, &ROOK_DIRS, PieceKind::Rook) {
            return true;
        }
        if self.ray_hits(f, r, by, &BISHOP_DIRS, PieceKind::Bishop) {
            return true;
        }

        false
    }

    /// Walks each direction until blocked; attacked if the first piece found
    /// is a `slider` (or queen) of color `by`
    fn ray_hits(&self, f: i8, r: i8, by: Color, dirs: &[(i8, i8)], slider: PieceKind) -> bool {
        for &(df, dr) in dirs {
            let mut cf = f + df;
            let mut cr = r + dr;
            while let Some(sq) = square_at(cf, cr) {
                if let Some(piece) = self.piece_at(sq) {
                    if piece.color == by && (piece.kind == slider || piece.kind == PieceKind::Queen)
                    {
                        return true;
                    }
                    break;
                }
                cf += df;
                cr += dr;
            }
        }
        false
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        match self.king_square(color) {
            Some(king) => self.is_square_attacked(king, color.opposite()),
            None => false,
        }
    }

    /// Applies a generator-produced move, yielding the successor position.
    ///
    /// Pure transformation: `self` is left untouched. Fails with
    /// `InvalidMove` when `from` does not hold a piece of the side to move.
    /// Geometry beyond that is trusted; legality filtering happens in
    /// `movegen::legal_moves`.
    pub fn apply_move(&self, mv: &Move) -> Result<Board> {
        let piece = self
            .piece_at(mv.from)
            .ok_or_else(|| Error::InvalidMove(format!("no piece on {}", mv.from)))?;
        if piece.color != self.side_to_move {
            return Err(Error::InvalidMove(format!(
                "piece on {} belongs to {}",
                mv.from, piece.color
            )));
        }

        let mover = piece.color;
        let mut next = self.clone();

        let mut captured = next.squares[mv.to.index()];
        next.squares[mv.from.index()] = None;

        if mv.is_en_passant {
            // the captured pawn sits beside the destination, on the from-rank
            let cap_sq = Square::from_coords(mv.to.file(), mv.from.rank());
            captured = next.squares[cap_sq.index()];
            next.squares[cap_sq.index()] = None;
        }

        let placed = match mv.promotion {
            Some(kind) => Piece { kind, color: mover },
            None => piece,
        };
        next.squares[mv.to.index()] = Some(placed);

        if mv.is_castle {
            let rank = mv.from.rank();
            let (rook_from, rook_to) = if mv.to.file() == 6 {
                (Square::from_coords(7, rank), Square::from_coords(5, rank))
            } else {
                (Square::from_coords(0, rank), Square::from_coords(3, rank))
            };
            let rook = next.squares[rook_from.index()];
            next.squares[rook_from.index()] = None;
            next.squares[rook_to.index()] = rook;
        }

        if piece.kind == PieceKind::King {
            match mover {
                Color::White => {
                    next.castling.white_kingside = false;
                    next.castling.white_queenside = false;
                }
                Color::Black => {
                    next.castling.black_kingside = false;
                    next.castling.black_queenside = false;
                }
            }
        }
        // a rook leaving its corner, or anything landing on one, kills that right
        for sq in [mv.from, mv.to] {
            match (sq.file(), sq.rank()) {
                (0, 0) => next.castling.white_queenside = false,
                (7, 0) => next.castling.white_kingside = false,
                (0, 7) => next.castling.black_queenside = false,
                (7, 7) => next.castling.black_kingside = false,
                _ => {}
            }
        }

        next.en_passant = if piece.kind == PieceKind::Pawn
            && (mv.from.rank() as i8 - mv.to.rank() as i8).abs() == 2
        {
            Some(Square::from_coords(
                mv.from.file(),
                (mv.from.rank() + mv.to.rank()) / 2,
            ))
        } else {
            None
        };

        if captured.is_some() || piece.kind == PieceKind::Pawn {
            next.halfmove_clock = 0;
        } else {
            next.halfmove_clock += 1;
        }
        if mover == Color::Black {
            next.fullmove_number += 1;
        }
        next.side_to_move = mover.opposite();

        Ok(next)
    }

    /// The (board, side to move, castling, en passant) tuple used for the
    /// threefold-repetition rule: the first four FEN fields.
    pub fn repetition_key(&self) -> String {
        let fen = self.to_fen();
        fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn uci(s: &str) -> Move {
        let req = crate::board::MoveRequest::from_uci(s).unwrap();
        Move {
            from: req.from,
            to: req.to,
            promotion: req.promotion,
            is_capture: false,
            is_castle: false,
            is_en_passant: false,
        }
    }

    #[test]
    fn test_starting_position_layout() {
        let board = Board::starting();
        assert_eq!(board.piece_count(), 32);
        assert_eq!(board.side_to_move(), Color::White);
        assert_eq!(board.king_square(Color::White), Some(sq("e1")));
        assert_eq!(board.king_square(Color::Black), Some(sq("e8")));
        assert_eq!(
            board.piece_at(sq("d1")),
            Some(Piece {
                kind: PieceKind::Queen,
                color: Color::White,
            })
        );
        assert!(board.castling().any());
    }

    #[test]
    fn test_apply_move_is_pure() {
        let board = Board::starting();
        let next = board.apply_move(&uci("e2e4")).unwrap();
        assert_eq!(board.piece_at(sq("e2")).map(|p| p.kind), Some(PieceKind::Pawn));
        assert_eq!(next.piece_at(sq("e2")), None);
        assert_eq!(next.piece_at(sq("e4")).map(|p| p.kind), Some(PieceKind::Pawn));
        assert_eq!(next.side_to_move(), Color::Black);
        assert_eq!(next.en_passant(), Some(sq("e3")));
        assert_eq!(next.halfmove_clock(), 0);
        assert_eq!(next.fullmove_number(), 1);
    }

    #[test]
    fn test_apply_move_rejects_empty_or_enemy_square() {
        let board = Board::starting();
        assert!(matches!(
            board.apply_move(&uci("e4e5")),
            Err(Error::InvalidMove(_))
        ));
        assert!(matches!(
            board.apply_move(&uci("e7e5")),
            Err(Error::InvalidMove(_))
        ));
    }

    #[test]
    fn test_queen_raid_gives_no_check() {
        // 1.e4 e5 2.Qh5 attacks f7 but the black king is not in check
        let mut board = Board::starting();
        for m in ["e2e4", "e7e5", "d1h5"] {
            board = board.apply_move(&uci(m)).unwrap();
        }
        assert!(!board.is_in_check(Color::Black));
        assert!(board.is_square_attacked(sq("f7"), Color::White));
        assert!(!movegen::legal_moves(&board).is_empty());
    }

    #[test]
    fn test_scholars_mate_is_check() {
        let mut board = Board::starting();
        for m in ["e2e4", "e7e5", "d1h5", "b8c6", "f1c4", "g8f6", "h5f7"] {
            let legal = movegen::legal_moves(&board);
            let mv = legal
                .iter()
                .find(|c| c.to_string() == m)
                .copied()
                .unwrap_or_else(|| panic!("{} not legal", m));
            board = board.apply_move(&mv).unwrap();
        }
        assert!(board.is_in_check(Color::Black));
        assert!(movegen::legal_moves(&board).is_empty());
    }

    #[test]
    fn test_halfmove_clock_bookkeeping() {
        let mut board = Board::starting();
        board = board.apply_move(&uci("g1f3")).unwrap();
        assert_eq!(board.halfmove_clock(), 1);
        board = board.apply_move(&uci("g8f6")).unwrap();
        assert_eq!(board.halfmove_clock(), 2);
        assert_eq!(board.fullmove_number(), 2);
        board = board.apply_move(&uci("d2d4")).unwrap();
        assert_eq!(board.halfmove_clock(), 0);
    }

    #[test]
    fn test_castling_rights_revoked_on_king_and_rook_moves() {
        let board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();

        let after_king = board.apply_move(&uci("e1e2")).unwrap();
        assert!(!after_king.castling().white_kingside);
        assert!(!after_king.castling().white_queenside);
        assert!(after_king.castling().black_kingside);

        let after_rook = board.apply_move(&uci("h1h4")).unwrap();
        assert!(!after_rook.castling().white_kingside);
        assert!(after_rook.castling().white_queenside);

        // capturing a rook on its home square revokes the victim's right
        let capture_board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let mut raid = uci("a1a8");
        raid.is_capture = true;
        let after_capture = capture_board.apply_move(&raid).unwrap();
        assert!(!after_capture.castling().black_queenside);
        assert!(!after_capture.castling().white_queenside);
        assert!(after_capture.castling().black_kingside);
    }

    #[test]
    fn test_repetition_key_ignores_clocks() {
        let a = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let b = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 37 90").unwrap();
        assert_eq!(a.repetition_key(), b.repetition_key());
    }
}
