//! FEN encoding of board state
//!
//! FEN is the position interchange format throughout this crate: snapshots
//! store it, the web API returns it, and `Board`'s serde implementation
//! delegates to it. All six fields round-trip exactly.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::state::Board;
use super::types::{CastlingRights, Color, Piece, Square};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Board {
    pub fn to_fen(&self) -> String {
        let mut out = String::new();

        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                match self.piece_at(Square::from_coords(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        out.push(' ');
        if self.castling.any() {
            if self.castling.white_kingside {
                out.push('K');
            }
            if self.castling.white_queenside {
                out.push('Q');
            }
            if self.castling.black_kingside {
                out.push('k');
            }
            if self.castling.black_queenside {
                out.push('q');
            }
        } else {
            out.push('-');
        }

        match self.en_passant {
            Some(sq) => out.push_str(&format!(" {}", sq)),
            None => out.push_str(" -"),
        }

        out.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        out
    }

    pub fn from_fen(fen: &str) -> Result<Board> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(Error::Fen(format!(
                "expected 6 fields, got {}",
                fields.len()
            )));
        }

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(Error::Fen(format!("expected 8 ranks, got {}", ranks.len())));
        }

        let mut squares = [None; 64];
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as u8;
                    if file > 8 {
                        return Err(Error::Fen(format!("rank overflow: {}", rank_str)));
                    }
                } else {
                    let piece = Piece::from_char(c)
                        .ok_or_else(|| Error::Fen(format!("bad piece char: {}", c)))?;
                    if file >= 8 {
                        return Err(Error::Fen(format!("rank overflow: {}", rank_str)));
                    }
                    squares[Square::from_coords(file, rank).index()] = Some(piece);
                    file += 1;
                }
            }
            if file != 8 {
                return Err(Error::Fen(format!("short rank: {}", rank_str)));
            }
        }

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(Error::Fen(format!("bad side to move: {}", other))),
        };

        let mut castling = CastlingRights::none();
        if fields[2] != "-" {
            for c in fields[2].chars() {
                match c {
                    'K' => castling.white_kingside = true,
                    'Q' => castling.white_queenside = true,
                    'k' => castling.black_kingside = true,
                    'q' => castling.black_queenside = true,
                    other => return Err(Error::Fen(format!("bad castling flag: {}", other))),
                }
            }
        }

        let en_passant = if fields[3] == "-" {
            None
        } else {
            Some(
                fields[3]
                    .parse::<Square>()
                    .map_err(|_| Error::Fen(format!("bad en passant square: {}", fields[3])))?,
            )
        };

        let halfmove_clock = fields[4]
            .parse::<u32>()
            .map_err(|_| Error::Fen(format!("bad halfmove clock: {}", fields[4])))?;
        let fullmove_number = fields[5]
            .parse::<u32>()
            .map_err(|_| Error::Fen(format!("bad fullmove number: {}", fields[5])))?;

        Ok(Board {
            squares,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_fen())
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Board, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Board::from_fen(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_fen_round_trip() {
        let board = Board::starting();
        assert_eq!(board.to_fen(), STARTING_FEN);
        assert_eq!(Board::from_fen(STARTING_FEN).unwrap(), board);
    }

    #[test]
    fn test_fen_round_trip_with_en_passant_and_partial_castling() {
        let fen = "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq c6 0 2";
        let board = Board::from_fen(fen).unwrap();
        assert_eq!(board.to_fen(), fen);

        let fen2 = "r3k2r/8/8/8/8/8/8/R3K2R b Kq - 12 40";
        let board2 = Board::from_fen(fen2).unwrap();
        assert!(board2.castling().white_kingside);
        assert!(!board2.castling().white_queenside);
        assert!(!board2.castling().black_kingside);
        assert!(board2.castling().black_queenside);
        assert_eq!(board2.to_fen(), fen2);
    }

    #[test]
    fn test_fen_rejects_malformed_input() {
        assert!(Board::from_fen("").is_err());
        assert!(Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1").is_err());
        assert!(Board::from_fen(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1"
        )
        .is_err());
        assert!(Board::from_fen(
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        )
        .is_err());
        // a long digit run must error out instead of wrapping the file counter
        let digits = "9".repeat(30);
        let fen = format!(
            "{}/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            digits
        );
        assert!(Board::from_fen(&fen).is_err());
    }

    #[test]
    fn test_board_serde_round_trip() {
        let board = Board::from_fen("r3k2r/8/8/3Pp3/8/8/8/R3K2R w KQkq e6 0 25").unwrap();
        let json = serde_json::to_string(&board).unwrap();
        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);
    }
}
