use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::dto::claims_dto::Claims;
use crate::dto::league_dto::LeagueSummary;
use crate::dto::user_dto::{CreateUser, LoginUser, User};
use crate::error::AppError;
use crate::services::auth_user::{AuthUser, jwt_secret};

pub async fn create_user(
    Extension(pool): Extension<SqlitePool>,
    Json(payload): Json<CreateUser>,
) -> Result<impl IntoResponse, AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::Validation("username must not be empty".to_string()));
    }

    /* First check if the user with that user name already exists */
    let existing = sqlx::query_as::<_, User>("SELECT * FROM Users WHERE username = ?")
        .bind(&payload.username)
        .fetch_optional(&pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "username \"{}\" already exists",
            payload.username
        )));
    }

    let result = sqlx::query("INSERT INTO Users (name, username, password) VALUES (?, ?, ?)")
        .bind(&payload.name)
        .bind(&payload.username)
        .bind(&payload.password)
        .execute(&pool)
        .await?;

    info!("Created user \"{}\".", payload.username);
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "id": result.last_insert_rowid() })),
    ))
}

/* POST to login the user */
pub async fn login_user(
    Extension(pool): Extension<SqlitePool>,
    Json(payload): Json<LoginUser>,
) -> impl IntoResponse {
    let user_result = sqlx::query_as::<_, User>("SELECT * FROM Users WHERE username = ?")
        .bind(&payload.username)
        .fetch_optional(&pool)
        .await;

    match user_result {
        Ok(Some(user)) => {
            // Passwords are stored as-is; hashing is out of scope here.
            if payload.password == user.password {
                let claims = Claims {
                    sub: user.username.clone(),
                    uid: user.id,
                    exp: (Utc::now() + chrono::Duration::hours(24)).timestamp() as usize,
                };

                match encode(
                    &Header::default(),
                    &claims,
                    &EncodingKey::from_secret(jwt_secret().as_ref()),
                ) {
                    Ok(token) => (StatusCode::OK, Json(token)),
                    Err(e) => {
                        error!("Token encoding failed: {:?}", e);
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json("Could not issue a token.".to_string()),
                        )
                    }
                }
            } else {
                (
                    StatusCode::UNAUTHORIZED,
                    Json("Incorrect username or password.".to_string()),
                )
            }
        }
        Ok(None) => (StatusCode::NOT_FOUND, Json("User was not found.".to_string())),
        Err(e) => {
            error!("There was an error with the database {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("There was a database issue.".to_string()),
            )
        }
    }
}

/**
 * GET the leagues the logged-in user belongs to.
 */
pub async fn get_user_leagues(
    Extension(pool): Extension<SqlitePool>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let leagues = sqlx::query_as::<_, LeagueSummary>(
        "SELECT li.id AS id, li.name AS name, li.status AS status \
         FROM LeagueInformation li \
         JOIN LeagueUser lu ON li.id = lu.leagueid \
         WHERE lu.userid = ?",
    )
    .bind(claims.uid)
    .fetch_all(&pool)
    .await?;

    Ok((StatusCode::OK, Json(leagues)))
}
