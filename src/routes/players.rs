use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::dto::player_dto::DraftablePlayer;

/**
 * GET request to get the full draftable player catalog.
 */
pub async fn get_players(Extension(pool): Extension<SqlitePool>) -> impl IntoResponse {
    info!("Fetching draftable players.");

    let players_result = sqlx::query_as::<_, DraftablePlayer>("SELECT * FROM DraftablePlayer")
        .fetch_all(&pool)
        .await;

    match players_result {
        Ok(players) => (StatusCode::OK, Json(players)),
        Err(e) => {
            error!("DB query error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Vec::<DraftablePlayer>::new()),
            )
        }
    }
}
