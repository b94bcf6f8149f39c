use std::time::Duration;

use tokio::time::timeout;
use tracing::info;

use crate::dto::draft_dto::{DraftPlayer, Pick};
use crate::dto::league_dto::{LeagueStatus, Membership};
use crate::error::AppError;
use crate::services::rooms::DraftRooms;
use crate::services::store::DraftStore;

/// Picks each member makes before a draft is complete (QB, RB, WR, TE, K,
/// DEF).
pub const ROSTER_SIZE: i64 = 6;

/// Upper bound on waiting for a league's turn plus the validation reads.
/// Scoped to that league's serialization only; other leagues keep drafting.
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

/// The member on the clock for `pick_number` (1-based) under snake order:
/// odd rounds run up the draft positions, even rounds back down.
pub fn on_the_clock(members: &[Membership], pick_number: i64) -> Option<&Membership> {
    if members.is_empty() || pick_number < 1 {
        return None;
    }
    let n = members.len() as i64;
    let round = (pick_number - 1) / n;
    let offset = (pick_number - 1) % n;
    let idx = if round % 2 == 0 { offset } else { n - 1 - offset };
    members.get(idx as usize)
}

/// Validates and persists one pick submission.
///
/// Runs under the league's pick lock so two near-simultaneous submissions
/// resolve one at a time against the persisted pick state; the loser is
/// rejected instead of double-drafting a player or a slot. Turn legality is
/// recomputed here from membership order and pick count, never trusted from
/// the client.
pub async fn submit_pick(
    store: &DraftStore,
    rooms: &DraftRooms,
    pick: &DraftPlayer,
) -> Result<Pick, AppError> {
    let lock = rooms.pick_lock(pick.leagueid).await;

    let result = async {
        // The timeout covers waiting for the league's turn and the validation
        // reads. Once validated, the write path runs to completion: a cancelled
        // submission must never persist a pick and then skip the completion
        // bookkeeping (or report a timeout for a pick that landed).
        let (guard, members) = timeout(SUBMIT_TIMEOUT, async {
            let guard = lock.lock().await;
            let members = validate(store, pick).await?;
            Ok::<_, AppError>((guard, members))
        })
        .await
        .map_err(|_| AppError::Timeout)??;

        let accepted = persist(store, pick, &members).await;
        drop(guard);
        accepted
    }
    .await;

    drop(lock);
    // If this submission created the room and nobody ever joined it, give it
    // back to the registry.
    rooms.leave(pick.leagueid).await;
    result
}

async fn validate(store: &DraftStore, pick: &DraftPlayer) -> Result<Vec<Membership>, AppError> {
    let status = store.get_league_status(pick.leagueid).await?;
    if status != LeagueStatus::Drafting {
        return Err(AppError::Conflict(format!(
            "league {} is not drafting (status: {})",
            pick.leagueid,
            status.as_str()
        )));
    }

    let members = store.get_membership(pick.leagueid).await?;
    if !members.iter().any(|m| m.userid == pick.userid) {
        return Err(AppError::NotFound(format!(
            "user {} is not a member of league {}",
            pick.userid, pick.leagueid
        )));
    }

    if store.get_player(pick.playerid).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "player {} is not in the catalog",
            pick.playerid
        )));
    }

    let picks = store.get_picks(pick.leagueid).await?;
    if picks.iter().any(|p| p.playerid == pick.playerid) {
        return Err(AppError::Conflict(format!(
            "player {} is already drafted in league {}",
            pick.playerid, pick.leagueid
        )));
    }
    if picks.iter().any(|p| p.draftpick == pick.draftpick) {
        return Err(AppError::Conflict(format!(
            "pick slot {} is already taken",
            pick.draftpick
        )));
    }

    // Slots are contiguous from 1, so the only acceptable slot is the next one.
    let expected = picks.len() as i64 + 1;
    if pick.draftpick != expected {
        return Err(AppError::Conflict(format!(
            "pick slot {} is out of sequence, the draft is on slot {expected}",
            pick.draftpick
        )));
    }

    let member = on_the_clock(&members, expected).ok_or_else(|| {
        AppError::Validation(format!("league {} has no members", pick.leagueid))
    })?;
    if member.userid != pick.userid {
        return Err(AppError::Conflict(format!(
            "it is not user {}'s turn, user {} is on the clock",
            pick.userid, member.userid
        )));
    }

    Ok(members)
}

async fn persist(
    store: &DraftStore,
    pick: &DraftPlayer,
    members: &[Membership],
) -> Result<Pick, AppError> {
    store
        .insert_pick(pick.leagueid, pick.userid, pick.playerid, pick.draftpick)
        .await?;
    info!(
        "league {}: user {} drafted player {} at pick {}",
        pick.leagueid, pick.userid, pick.playerid, pick.draftpick
    );

    if pick.draftpick >= members.len() as i64 * ROSTER_SIZE {
        store
            .set_league_status(pick.leagueid, LeagueStatus::Complete)
            .await?;
        info!("league {}: draft complete", pick.leagueid);
    }

    Ok(Pick {
        userid: pick.userid,
        playerid: pick.playerid,
        draftpick: pick.draftpick,
    })
}
