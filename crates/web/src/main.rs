use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use chess_game_core::{SessionManager, SqliteStore};

mod routes;

pub struct AppState {
    pub manager: SessionManager,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let store = SqliteStore::open("chess_games.db").expect("Failed to open database");
    let manager = SessionManager::new()
        .with_store(Arc::new(store))
        .with_broadcaster(Arc::new(routes::TracingBroadcaster));

    let state = Arc::new(AppState { manager });

    let app = Router::new()
        .route("/", get(routes::index))
        .route("/games", get(routes::games_list).post(routes::create_game))
        .route("/games/:id", get(routes::game_state))
        .route(
            "/games/:id/moves",
            get(routes::legal_moves).post(routes::submit_move),
        )
        .route("/games/:id/resign", post(routes::resign))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000")
        .await
        .unwrap();

    println!("Server running at http://localhost:3000");

    axum::serve(listener, app).await.unwrap();
}
