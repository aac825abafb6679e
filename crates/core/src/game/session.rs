//! A single game: board ownership, move validation and status tracking

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::board::{Board, Color, Move, MoveRequest};
use crate::error::{Error, Result};
use crate::movegen;
use crate::storage::GameSnapshot;

/// Where a game stands. Terminal variants carry the losing color: the side
/// that was checkmated, or the side that resigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Checkmate(Color),
    Stalemate,
    Draw,
    Resigned(Color),
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    /// The winning color, where the status has one
    pub fn winner(&self) -> Option<Color> {
        match self {
            GameStatus::Checkmate(loser) | GameStatus::Resigned(loser) => Some(loser.opposite()),
            _ => None,
        }
    }

    /// Stable label used for the storage status column
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::InProgress => "in_progress",
            GameStatus::Checkmate(Color::White) => "checkmate_white",
            GameStatus::Checkmate(Color::Black) => "checkmate_black",
            GameStatus::Stalemate => "stalemate",
            GameStatus::Draw => "draw",
            GameStatus::Resigned(Color::White) => "resigned_white",
            GameStatus::Resigned(Color::Black) => "resigned_black",
        }
    }

    pub fn parse(s: &str) -> Option<GameStatus> {
        match s {
            "in_progress" => Some(GameStatus::InProgress),
            "checkmate_white" => Some(GameStatus::Checkmate(Color::White)),
            "checkmate_black" => Some(GameStatus::Checkmate(Color::Black)),
            "stalemate" => Some(GameStatus::Stalemate),
            "draw" => Some(GameStatus::Draw),
            "resigned_white" => Some(GameStatus::Resigned(Color::White)),
            "resigned_black" => Some(GameStatus::Resigned(Color::Black)),
            _ => None,
        }
    }
}

/// Read-only projection of a session for callers outside the core
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: String,
    pub white_player: String,
    pub black_player: String,
    pub fen: String,
    pub status: GameStatus,
    pub history: Vec<String>,
    pub updated_at: u64,
}

/// One game between two players. Exclusively owns its board and history;
/// every validated move swaps in a fresh board value.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: String,
    white_player: String,
    black_player: String,
    board: Board,
    history: Vec<Move>,
    repetitions: HashMap<String, u32>,
    status: GameStatus,
    created_at: u64,
    updated_at: u64,
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn random_id() -> String {
    rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}

impl GameSession {
    pub fn new(white_player: &str, black_player: &str) -> GameSession {
        Self::from_board(Board::starting(), white_player, black_player)
    }

    /// Starts a session from an arbitrary position
    pub fn from_board(board: Board, white_player: &str, black_player: &str) -> GameSession {
        Self::build(random_id(), board, white_player, black_player)
    }

    pub(crate) fn with_id(id: &str, white_player: &str, black_player: &str) -> GameSession {
        Self::build(id.to_string(), Board::starting(), white_player, black_player)
    }

    fn build(id: String, board: Board, white_player: &str, black_player: &str) -> GameSession {
        let mut repetitions = HashMap::new();
        repetitions.insert(board.repetition_key(), 1);
        let status = compute_status(&board, 1);
        let created = now();
        GameSession {
            id,
            white_player: white_player.to_string(),
            black_player: black_player.to_string(),
            board,
            history: Vec::new(),
            repetitions,
            status,
            created_at: created,
            updated_at: created,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn white_player(&self) -> &str {
        &self.white_player
    }

    pub fn black_player(&self) -> &str {
        &self.black_player
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn updated_at(&self) -> u64 {
        self.updated_at
    }

    /// The color `player_id` plays, if they are in this game
    pub fn player_color(&self, player_id: &str) -> Option<Color> {
        if player_id == self.white_player {
            Some(Color::White)
        } else if player_id == self.black_player {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        movegen::legal_moves(&self.board)
    }

    /// Validates and applies a submitted move.
    ///
    /// The request is matched against the generated legal move set on its
    /// (from, to, promotion) triple; flags come from the generator. Returns
    /// the move as played. Nothing is mutated on any failure.
    pub fn try_move(&mut self, request: &MoveRequest) -> Result<Move> {
        if self.status.is_terminal() {
            return Err(Error::GameAlreadyOver);
        }

        let piece = self
            .board
            .piece_at(request.from)
            .ok_or_else(|| Error::InvalidMove(format!("no piece on {}", request.from)))?;
        if piece.color != self.board.side_to_move() {
            return Err(Error::InvalidMove(format!(
                "piece on {} belongs to {}",
                request.from, piece.color
            )));
        }

        let legal = movegen::legal_moves(&self.board);
        let mv = match legal.iter().find(|m| {
            m.from == request.from && m.to == request.to && m.promotion == request.promotion
        }) {
            Some(mv) => *mv,
            None => {
                // same from/to with a different promotion field is a
                // malformed request, not an illegal move
                if legal
                    .iter()
                    .any(|m| m.from == request.from && m.to == request.to)
                {
                    return Err(Error::InvalidMove(format!(
                        "promotion mismatch for {}{}",
                        request.from, request.to
                    )));
                }
                return Err(Error::IllegalMove);
            }
        };

        let next = self.board.apply_move(&mv)?;

        // from here on nothing can fail; commit
        if next.halfmove_clock() == 0 {
            // an irreversible move; earlier positions can never recur
            self.repetitions.clear();
        }
        let count = {
            let entry = self.repetitions.entry(next.repetition_key()).or_insert(0);
            *entry += 1;
            *entry
        };

        self.status = compute_status(&next, count);
        self.board = next;
        self.history.push(mv);
        self.updated_at = now();

        Ok(mv)
    }

    /// `color` gives up; the game ends immediately
    pub fn resign(&mut self, color: Color) -> Result<GameStatus> {
        if self.status.is_terminal() {
            return Err(Error::GameAlreadyOver);
        }
        self.status = GameStatus::Resigned(color);
        self.updated_at = now();
        Ok(self.status)
    }

    pub(crate) fn set_status(&mut self, status: GameStatus) {
        self.status = status;
        self.updated_at = now();
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id.clone(),
            white_player: self.white_player.clone(),
            black_player: self.black_player.clone(),
            fen: self.board.to_fen(),
            status: self.status,
            history: self.history.iter().map(|m| m.to_string()).collect(),
            updated_at: self.updated_at,
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            session_id: self.id.clone(),
            white_player: self.white_player.clone(),
            black_player: self.black_player.clone(),
            fen: self.board.to_fen(),
            history: self.history.iter().map(|m| m.to_string()).collect(),
            status: self.status.as_str().to_string(),
            updated_at: self.updated_at,
        }
    }

    /// Rebuilds a session by replaying a snapshot's move history
    pub fn from_snapshot(snapshot: &GameSnapshot) -> Result<GameSession> {
        let mut session = GameSession::with_id(
            &snapshot.session_id,
            &snapshot.white_player,
            &snapshot.black_player,
        );
        for uci in &snapshot.history {
            let request = MoveRequest::from_uci(uci)?;
            session.try_move(&request)?;
        }
        if session.board.to_fen() != snapshot.fen {
            eprintln!(
                "Warning: replayed position for {} does not match stored FEN",
                snapshot.session_id
            );
        }
        // the store is authoritative for resignations and agreed draws
        if let Some(status) = GameStatus::parse(&snapshot.status) {
            session.status = status;
        }
        session.updated_at = snapshot.updated_at;
        Ok(session)
    }
}

fn compute_status(board: &Board, repetition_count: u32) -> GameStatus {
    let to_move = board.side_to_move();
    if movegen::legal_moves(board).is_empty() {
        return if board.is_in_check(to_move) {
            GameStatus::Checkmate(to_move)
        } else {
            GameStatus::Stalemate
        };
    }
    if board.halfmove_clock() >= 100 || repetition_count >= 3 {
        return GameStatus::Draw;
    }
    GameStatus::InProgress
}
