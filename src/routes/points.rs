use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::dto::points_dto::{PlayerPoints, PlayerPointsView, TeamScore, UpsertPoints};
use crate::error::AppError;

/**
 * POST request to record one playoff round's points for a player. Rounds are
 * upserted independently as results come in.
 */
pub async fn upsert_points(
    Extension(pool): Extension<SqlitePool>,
    Json(payload): Json<UpsertPoints>,
) -> Result<impl IntoResponse, AppError> {
    let exists: Option<(i64,)> =
        sqlx::query_as("SELECT playerid FROM DraftablePlayer WHERE playerid = ?")
            .bind(payload.playerid)
            .fetch_optional(&pool)
            .await?;
    if exists.is_none() {
        return Err(AppError::NotFound(format!(
            "player {} is not in the catalog",
            payload.playerid
        )));
    }

    // Round names map to fixed column identifiers, never client text.
    let column = payload.round.column();
    let sql = format!(
        "INSERT INTO PlayerPoints (playerid, year, {column}) VALUES (?, ?, ?) \
         ON CONFLICT(playerid, year) DO UPDATE SET {column} = excluded.{column}"
    );
    sqlx::query(&sql)
        .bind(payload.playerid)
        .bind(payload.year)
        .bind(payload.points)
        .execute(&pool)
        .await?;

    info!(
        "Recorded {} points for player {} ({} {:?}).",
        payload.points, payload.playerid, payload.year, payload.round
    );
    Ok((StatusCode::OK, "Points were recorded.".to_string()))
}

/**
 * GET request for one player's per-round scores, with totals computed at
 * read time.
 */
pub async fn get_player_points(
    Extension(pool): Extension<SqlitePool>,
    Path(playerid): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exists: Option<(i64,)> =
        sqlx::query_as("SELECT playerid FROM DraftablePlayer WHERE playerid = ?")
            .bind(playerid)
            .fetch_optional(&pool)
            .await?;
    if exists.is_none() {
        return Err(AppError::NotFound(format!(
            "player {playerid} is not in the catalog"
        )));
    }

    let rows = sqlx::query_as::<_, PlayerPoints>(
        "SELECT playerid, year, wildcard, divisional, championship, superbowl \
         FROM PlayerPoints WHERE playerid = ? ORDER BY year",
    )
    .bind(playerid)
    .fetch_all(&pool)
    .await?;

    let views: Vec<PlayerPointsView> = rows.into_iter().map(PlayerPointsView::from).collect();
    Ok((StatusCode::OK, Json(views)))
}

#[derive(Debug, Deserialize)]
pub struct ScoresQuery {
    pub year: Option<i64>,
}

/**
 * GET request for a league's standings: each member's total over their
 * drafted players, missing rounds counting as zero.
 */
pub async fn get_league_scores(
    Extension(pool): Extension<SqlitePool>,
    Path(leagueid): Path<i64>,
    Query(query): Query<ScoresQuery>,
) -> Result<impl IntoResponse, AppError> {
    let scores = league_scores(&pool, leagueid, query.year).await?;
    Ok((StatusCode::OK, Json(scores)))
}

pub(crate) async fn league_scores(
    pool: &SqlitePool,
    leagueid: i64,
    year: Option<i64>,
) -> Result<Vec<TeamScore>, AppError> {
    let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM LeagueInformation WHERE id = ?")
        .bind(leagueid)
        .fetch_optional(pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound(format!("league {leagueid} does not exist")));
    }

    let scores = sqlx::query_as::<_, TeamScore>(
        "SELECT lu.userid AS userid, lu.teamname AS teamname, \
                COALESCE(SUM(COALESCE(pp.wildcard, 0) + COALESCE(pp.divisional, 0) + \
                             COALESCE(pp.championship, 0) + COALESCE(pp.superbowl, 0)), 0) AS total \
         FROM LeagueUser lu \
         LEFT JOIN UserTeam ut ON ut.leagueid = lu.leagueid AND ut.userid = lu.userid \
         LEFT JOIN PlayerPoints pp ON pp.playerid = ut.playerid AND (? IS NULL OR pp.year = ?) \
         WHERE lu.leagueid = ? \
         GROUP BY lu.userid, lu.teamname \
         ORDER BY total DESC",
    )
    .bind(year)
    .bind(year)
    .bind(leagueid)
    .fetch_all(pool)
    .await?;

    Ok(scores)
}
