//! Piece, square and move value types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Side of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six piece kinds, modeled as plain data rather than per-piece types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Lowercase letter used in FEN and UCI promotion suffixes
    pub fn to_char(&self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_char(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

/// A colored piece. Immutable value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    /// FEN letter: uppercase for White, lowercase for Black
    pub fn to_char(&self) -> char {
        let c = self.kind.to_char();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub fn from_char(c: char) -> Option<Piece> {
        let kind = PieceKind::from_char(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece { kind, color })
    }
}

/// A board coordinate, stored rank-major (`rank * 8 + file`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub fn from_index(index: u8) -> Square {
        debug_assert!(index < 64);
        Square(index)
    }

    pub fn from_coords(file: u8, rank: u8) -> Square {
        debug_assert!(file < 8 && rank < 8);
        Square(rank * 8 + file)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }

    pub fn file(&self) -> u8 {
        self.0 % 8
    }

    pub fn rank(&self) -> u8 {
        self.0 / 8
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, self.rank() + 1)
    }
}

impl FromStr for Square {
    type Err = Error;

    fn from_str(s: &str) -> Result<Square> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(Error::InvalidMove(format!("bad square: {}", s)));
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if file >= 8 || rank >= 8 {
            return Err(Error::InvalidMove(format!("bad square: {}", s)));
        }
        Ok(Square::from_coords(file, rank))
    }
}

impl Serialize for Square {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Square, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Castling availability, one flag per color and side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub fn all() -> CastlingRights {
        CastlingRights {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    pub fn none() -> CastlingRights {
        CastlingRights {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    pub fn any(&self) -> bool {
        self.white_kingside || self.white_queenside || self.black_kingside || self.black_queenside
    }
}

/// A fully-resolved move as produced by the generator.
///
/// The capture/castle/en-passant flags are set by the generator, never by
/// clients; submitted moves arrive as [`MoveRequest`] and are matched against
/// the generated legal set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
    pub is_capture: bool,
    pub is_castle: bool,
    pub is_en_passant: bool,
}

impl fmt::Display for Move {
    /// UCI text form, e.g. `e2e4` or `e7e8q`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.to_char())?;
        }
        Ok(())
    }
}

/// What a client submits: source, destination and an optional promotion kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl MoveRequest {
    /// Parses UCI move text (`e2e4`, `e7e8q`)
    pub fn from_uci(s: &str) -> Result<MoveRequest> {
        let s = s.trim();
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return Err(Error::InvalidMove(format!("bad move text: {}", s)));
        }
        let from: Square = s[0..2].parse()?;
        let to: Square = s[2..4].parse()?;
        let promotion = match s.as_bytes().get(4) {
            None => None,
            Some(&c) => Some(
                PieceKind::from_char(c as char)
                    .ok_or_else(|| Error::InvalidMove(format!("bad promotion in: {}", s)))?,
            ),
        };
        Ok(MoveRequest {
            from,
            to,
            promotion,
        })
    }
}

impl From<Move> for MoveRequest {
    fn from(mv: Move) -> MoveRequest {
        MoveRequest {
            from: mv.from,
            to: mv.to,
            promotion: mv.promotion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_text_round_trip() {
        for index in 0..64u8 {
            let sq = Square::from_index(index);
            let parsed: Square = sq.to_string().parse().unwrap();
            assert_eq!(parsed, sq);
        }
        assert_eq!("e4".parse::<Square>().unwrap(), Square::from_coords(4, 3));
        assert!("i9".parse::<Square>().is_err());
        assert!("e44".parse::<Square>().is_err());
    }

    #[test]
    fn test_piece_chars() {
        let wn = Piece {
            kind: PieceKind::Knight,
            color: Color::White,
        };
        assert_eq!(wn.to_char(), 'N');
        assert_eq!(Piece::from_char('N'), Some(wn));
        assert_eq!(
            Piece::from_char('q'),
            Some(Piece {
                kind: PieceKind::Queen,
                color: Color::Black,
            })
        );
        assert_eq!(Piece::from_char('x'), None);
    }

    #[test]
    fn test_move_request_from_uci() {
        let req = MoveRequest::from_uci("e2e4").unwrap();
        assert_eq!(req.from, "e2".parse().unwrap());
        assert_eq!(req.to, "e4".parse().unwrap());
        assert_eq!(req.promotion, None);

        let promo = MoveRequest::from_uci("e7e8q").unwrap();
        assert_eq!(promo.promotion, Some(PieceKind::Queen));

        assert!(MoveRequest::from_uci("e2").is_err());
        assert!(MoveRequest::from_uci("e2e4x").is_err());
    }

    #[test]
    fn test_move_request_rejects_non_ascii_text() {
        // "♔4" is four bytes, so it must fail as invalid rather than
        // panic on a mid-character slice
        assert!(matches!(
            MoveRequest::from_uci("\u{2654}4"),
            Err(Error::InvalidMove(_))
        ));
        assert!(matches!(
            MoveRequest::from_uci("e2é4"),
            Err(Error::InvalidMove(_))
        ));
    }

    #[test]
    fn test_move_json_round_trip() {
        let mv = Move {
            from: "e7".parse().unwrap(),
            to: "e8".parse().unwrap(),
            promotion: Some(PieceKind::Queen),
            is_capture: false,
            is_castle: false,
            is_en_passant: false,
        };
        let json = serde_json::to_string(&mv).unwrap();
        let back: Move = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mv);
        assert_eq!(mv.to_string(), "e7e8q");
    }
}
