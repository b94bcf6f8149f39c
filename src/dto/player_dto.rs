use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Catalog entry for a draftable NFL player. Immutable reference data.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct DraftablePlayer {
    pub playerid: i64,
    pub name: String,
    pub position: String,
    pub team: String,
}
