use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-round playoff scores for one player in one season. Rounds are upserted
/// independently; a round that has not happened yet stays NULL and counts as
/// zero in totals.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct PlayerPoints {
    pub playerid: i64,
    pub year: i64,
    pub wildcard: Option<i64>,
    pub divisional: Option<i64>,
    pub championship: Option<i64>,
    pub superbowl: Option<i64>,
}

impl PlayerPoints {
    pub fn total(&self) -> i64 {
        self.wildcard.unwrap_or(0)
            + self.divisional.unwrap_or(0)
            + self.championship.unwrap_or(0)
            + self.superbowl.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayoffRound {
    Wildcard,
    Divisional,
    Championship,
    Superbowl,
}

impl PlayoffRound {
    /// Column of PlayerPoints this round writes to.
    pub fn column(self) -> &'static str {
        match self {
            PlayoffRound::Wildcard => "wildcard",
            PlayoffRound::Divisional => "divisional",
            PlayoffRound::Championship => "championship",
            PlayoffRound::Superbowl => "superbowl",
        }
    }
}

/// Read-side view of a points row with the derived total attached.
#[derive(Debug, Serialize)]
pub struct PlayerPointsView {
    #[serde(flatten)]
    pub points: PlayerPoints,
    pub total: i64,
}

impl From<PlayerPoints> for PlayerPointsView {
    fn from(points: PlayerPoints) -> Self {
        let total = points.total();
        Self { points, total }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpsertPoints {
    pub playerid: i64,
    pub year: i64,
    pub round: PlayoffRound,
    pub points: i64,
}

/// One member's score line for a league, summed over their drafted players.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct TeamScore {
    pub userid: i64,
    pub teamname: String,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::PlayerPoints;

    #[test]
    fn total_treats_missing_rounds_as_zero() {
        let points = PlayerPoints {
            playerid: 500,
            year: 2025,
            wildcard: Some(12),
            divisional: None,
            championship: Some(7),
            superbowl: None,
        };
        assert_eq!(points.total(), 19);
    }
}
