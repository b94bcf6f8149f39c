use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use tracing::info;

use crate::dto::league_dto::{CreateLeague, JoinLeague, League, LeagueStatus, SetStatus};
use crate::error::{AppError, is_unique_violation};
use crate::services::auth_user::AuthUser;
use crate::services::store::DraftStore;

/**
 * POST request to create a new league. The creator still joins through
 * /leagues/join to pick a team name and draft position.
 */
pub async fn create_league(
    Extension(pool): Extension<SqlitePool>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<CreateLeague>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("league name must not be empty".to_string()));
    }

    let result =
        sqlx::query("INSERT INTO LeagueInformation (name, status, password) VALUES (?, ?, ?)")
            .bind(&payload.name)
            .bind(LeagueStatus::PreDraft.as_str())
            .bind(&payload.password)
            .execute(&pool)
            .await?;

    info!("User \"{}\" created league \"{}\".", claims.sub, payload.name);
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "id": result.last_insert_rowid() })),
    ))
}

/**
 * POST request to join a league with its shared password.
 */
pub async fn join_league(
    Extension(pool): Extension<SqlitePool>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<JoinLeague>,
) -> Result<impl IntoResponse, AppError> {
    let league = sqlx::query_as::<_, League>("SELECT * FROM LeagueInformation WHERE id = ?")
        .bind(payload.leagueid)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("league {} does not exist", payload.leagueid))
        })?;

    if league.password != payload.password {
        return Err(AppError::Validation("incorrect league password".to_string()));
    }

    // Membership is frozen once the draft starts.
    if LeagueStatus::parse(&league.status) != Some(LeagueStatus::PreDraft) {
        return Err(AppError::Conflict(format!(
            "league {} is no longer accepting members (status: {})",
            league.id, league.status
        )));
    }

    if payload.draftposition < 1 {
        return Err(AppError::Validation(
            "draft position must be 1 or greater".to_string(),
        ));
    }

    let result = sqlx::query(
        "INSERT INTO LeagueUser (leagueid, userid, draftposition, teamname) VALUES (?, ?, ?, ?)",
    )
    .bind(payload.leagueid)
    .bind(claims.uid)
    .bind(payload.draftposition)
    .bind(&payload.teamname)
    .execute(&pool)
    .await;

    match result {
        Ok(_) => {
            info!(
                "User \"{}\" joined league {} at draft position {}.",
                claims.sub, payload.leagueid, payload.draftposition
            );
            Ok((StatusCode::OK, format!("Joined league {}.", payload.leagueid)))
        }
        Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(format!(
            "draft position {} is taken or you already joined league {}",
            payload.draftposition, payload.leagueid
        ))),
        Err(e) => Err(e.into()),
    }
}

/**
 * GET request for a league's membership, ordered by draft position.
 */
pub async fn get_members(
    Extension(store): Extension<DraftStore>,
    Path(leagueid): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    // Surface a 404 for an unknown league rather than an empty list.
    store.get_league_status(leagueid).await?;
    let members = store.get_membership(leagueid).await?;
    Ok((StatusCode::OK, Json(members)))
}

/**
 * POST request to move a league through its draft lifecycle.
 * Pre-Draft -> Drafting -> Complete, no backward edges.
 */
pub async fn set_status(
    Extension(store): Extension<DraftStore>,
    AuthUser(claims): AuthUser,
    Path(leagueid): Path<i64>,
    Json(payload): Json<SetStatus>,
) -> Result<impl IntoResponse, AppError> {
    let next = LeagueStatus::parse(&payload.status).ok_or_else(|| {
        AppError::Validation(format!("unknown league status \"{}\"", payload.status))
    })?;

    let current = store.get_league_status(leagueid).await?;
    if !current.can_transition_to(next) {
        return Err(AppError::Conflict(format!(
            "league {} cannot move from {} to {}",
            leagueid,
            current.as_str(),
            next.as_str()
        )));
    }

    store.set_league_status(leagueid, next).await?;
    info!(
        "User \"{}\" set league {} status to {}.",
        claims.sub,
        leagueid,
        next.as_str()
    );
    Ok((StatusCode::OK, format!("League is now {}.", next.as_str())))
}

/**
 * DELETE request to remove a league along with its memberships and picks.
 */
pub async fn delete_league(
    Extension(pool): Extension<SqlitePool>,
    AuthUser(claims): AuthUser,
    Path(leagueid): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query("DELETE FROM UserTeam WHERE leagueid = ?")
        .bind(leagueid)
        .execute(&pool)
        .await?;
    sqlx::query("DELETE FROM LeagueUser WHERE leagueid = ?")
        .bind(leagueid)
        .execute(&pool)
        .await?;
    let result = sqlx::query("DELETE FROM LeagueInformation WHERE id = ?")
        .bind(leagueid)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("league {leagueid} was not found")));
    }

    info!("User \"{}\" deleted league {}.", claims.sub, leagueid);
    Ok((StatusCode::OK, "League was successfully removed.".to_string()))
}
