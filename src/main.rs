use std::env;
use std::sync::Arc;

use axum::{
    Router,
    extract::Extension,
    routing::{delete, get, post},
};
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::cors::CorsLayer;
use tracing::info;

mod dto;
mod error;
mod routes;
mod services;
#[cfg(test)]
mod test_support;

use routes::{leagues, players, points, users};
use services::rooms::DraftRooms;
use services::store::DraftStore;
use services::websocket;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let db_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://./data/playoffpush.db".to_string());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await
        .expect("Could not connect to SQLite");

    sqlx::raw_sql(include_str!("../data/schema.sql"))
        .execute(&pool)
        .await
        .expect("Could not apply schema");

    info!("Connected to sqlite database.");

    let store = DraftStore::new(pool.clone());
    let rooms = Arc::new(DraftRooms::new());

    let app = Router::new()
        .route("/users", post(users::create_user))
        .route("/login", post(users::login_user))
        .route("/userleagues", get(users::get_user_leagues))
        .route("/players", get(players::get_players))
        .route("/players/{id}/points", get(points::get_player_points))
        .route("/leagues", post(leagues::create_league))
        .route("/leagues/join", post(leagues::join_league))
        .route("/leagues/{id}", delete(leagues::delete_league))
        .route("/leagues/{id}/members", get(leagues::get_members))
        .route("/leagues/{id}/status", post(leagues::set_status))
        .route("/leagues/{id}/scores", get(points::get_league_scores))
        .route("/points", post(points::upsert_points))
        .route("/ws", get(websocket::websocket_handler))
        .layer(Extension(pool))
        .layer(Extension(store))
        .layer(Extension(rooms))
        .layer(CorsLayer::permissive());

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("Could not bind listener");
    info!("Started server on port {port}.");
    axum::serve(listener, app).await.expect("Server failed");
}
