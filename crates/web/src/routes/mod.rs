use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use chess_game_core::{Error, Move, MoveBroadcaster, MoveRequest};

use crate::AppState;

/// Logs committed moves; the push channel of the demo deployment
pub struct TracingBroadcaster;

impl MoveBroadcaster for TracingBroadcaster {
    fn broadcast(&self, session_id: &str, mv: &Move, fen: &str) {
        tracing::info!(session = session_id, played = %mv, fen = fen, "move committed");
    }
}

#[derive(Serialize)]
pub struct Summary {
    pub service: &'static str,
    pub active_games: usize,
}

#[derive(Serialize)]
pub struct GameRow {
    pub id: String,
    pub white: String,
    pub black: String,
    pub status: String,
    pub moves: usize,
    pub updated: String,
}

#[derive(Deserialize)]
pub struct CreateGameForm {
    pub white: String,
    pub black: String,
}

#[derive(Deserialize)]
pub struct MoveForm {
    pub player: String,
    pub uci: String,
}

#[derive(Deserialize)]
pub struct ResignForm {
    pub player: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

fn error_response(err: Error) -> Response {
    let (status, code) = match &err {
        Error::UnknownSession(_) => (StatusCode::NOT_FOUND, "unknown_session"),
        Error::InvalidMove(_) => (StatusCode::BAD_REQUEST, "invalid_move"),
        Error::IllegalMove => (StatusCode::CONFLICT, "illegal_move"),
        Error::WrongTurn => (StatusCode::CONFLICT, "wrong_turn"),
        Error::GameAlreadyOver => (StatusCode::CONFLICT, "game_already_over"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
    };
    (
        status,
        Json(ErrorBody {
            error: code,
            message: err.to_string(),
        }),
    )
        .into_response()
}

pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let active_games = state.manager.list_sessions().len();
    Json(Summary {
        service: "chess-game",
        active_games,
    })
}

pub async fn games_list(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let games: Vec<GameRow> = state
        .manager
        .list_sessions()
        .into_iter()
        .map(|view| {
            let updated = chrono::DateTime::from_timestamp(view.updated_at as i64, 0)
                .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default();

            GameRow {
                id: view.id,
                white: view.white_player,
                black: view.black_player,
                status: view.status.as_str().to_string(),
                moves: view.history.len(),
                updated,
            }
        })
        .collect();

    Json(games)
}

pub async fn create_game(
    State(state): State<Arc<AppState>>,
    Json(form): Json<CreateGameForm>,
) -> Response {
    let white = form.white.trim();
    let black = form.black.trim();
    if white.is_empty() || black.is_empty() {
        return error_response(Error::InvalidMove("both player names are required".into()));
    }

    match state.manager.create_session(white, black) {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn game_state(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.manager.session(&id) {
        Ok(view) => Json(view).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn legal_moves(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.manager.legal_moves(&id) {
        Ok(moves) => {
            let uci: Vec<String> = moves.iter().map(|m| m.to_string()).collect();
            Json(uci).into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn submit_move(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(form): Json<MoveForm>,
) -> Response {
    let request = match MoveRequest::from_uci(&form.uci) {
        Ok(request) => request,
        Err(e) => return error_response(e),
    };

    match state.manager.submit_move(&id, &form.player, request) {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Serialize)]
pub struct ResignResponse {
    pub id: String,
    pub status: String,
}

pub async fn resign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(form): Json<ResignForm>,
) -> Response {
    match state.manager.resign(&id, &form.player) {
        Ok(status) => Json(ResignResponse {
            id,
            status: status.as_str().to_string(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn health() -> &'static str {
    "OK"
}
