use sqlx::SqlitePool;

use crate::dto::draft_dto::Pick;
use crate::dto::league_dto::{LeagueStatus, Membership};
use crate::dto::player_dto::DraftablePlayer;
use crate::error::{AppError, is_unique_violation};

/// Data access used by the draft coordinator. Wraps the shared pool so the
/// coordinator can be driven against an in-memory database in tests.
#[derive(Clone)]
pub struct DraftStore {
    pool: SqlitePool,
}

impl DraftStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_league_status(&self, leagueid: i64) -> Result<LeagueStatus, AppError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT status FROM LeagueInformation WHERE id = ?")
                .bind(leagueid)
                .fetch_optional(&self.pool)
                .await?;

        let (status,) =
            row.ok_or_else(|| AppError::NotFound(format!("league {leagueid} does not exist")))?;
        LeagueStatus::parse(&status).ok_or_else(|| {
            AppError::Validation(format!("league {leagueid} has unknown status \"{status}\""))
        })
    }

    pub async fn set_league_status(
        &self,
        leagueid: i64,
        status: LeagueStatus,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE LeagueInformation SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(leagueid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// League membership ordered by draft position.
    pub async fn get_membership(&self, leagueid: i64) -> Result<Vec<Membership>, AppError> {
        let members = sqlx::query_as::<_, Membership>(
            "SELECT userid, draftposition, teamname FROM LeagueUser \
             WHERE leagueid = ? ORDER BY draftposition",
        )
        .bind(leagueid)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    pub async fn get_player(&self, playerid: i64) -> Result<Option<DraftablePlayer>, AppError> {
        let player = sqlx::query_as::<_, DraftablePlayer>(
            "SELECT playerid, name, position, team FROM DraftablePlayer WHERE playerid = ?",
        )
        .bind(playerid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(player)
    }

    /// Picks recorded so far for a league, ordered by pick slot.
    pub async fn get_picks(&self, leagueid: i64) -> Result<Vec<Pick>, AppError> {
        let picks = sqlx::query_as::<_, Pick>(
            "SELECT userid, playerid, draftpick FROM UserTeam \
             WHERE leagueid = ? ORDER BY draftpick",
        )
        .bind(leagueid)
        .fetch_all(&self.pool)
        .await?;
        Ok(picks)
    }

    /// Inserts a pick row. UNIQUE(leagueid, playerid) and
    /// UNIQUE(leagueid, draftpick) back up the coordinator's checks, so a
    /// racing duplicate surfaces here as a Conflict.
    pub async fn insert_pick(
        &self,
        leagueid: i64,
        userid: i64,
        playerid: i64,
        draftpick: i64,
    ) -> Result<i64, AppError> {
        let result = sqlx::query(
            "INSERT INTO UserTeam (leagueid, userid, playerid, draftpick) VALUES (?, ?, ?, ?)",
        )
        .bind(leagueid)
        .bind(userid)
        .bind(playerid)
        .bind(draftpick)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(format!(
                "player {playerid} or pick slot {draftpick} is already drafted in league {leagueid}"
            ))),
            Err(e) => Err(e.into()),
        }
    }
}
