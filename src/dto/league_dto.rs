use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Draft lifecycle of a league. Stored as text in LeagueInformation.status;
/// Pre-Draft -> Drafting -> Complete, with Complete terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeagueStatus {
    #[serde(rename = "Pre-Draft")]
    PreDraft,
    Drafting,
    Complete,
}

impl LeagueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LeagueStatus::PreDraft => "Pre-Draft",
            LeagueStatus::Drafting => "Drafting",
            LeagueStatus::Complete => "Complete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pre-Draft" => Some(LeagueStatus::PreDraft),
            "Drafting" => Some(LeagueStatus::Drafting),
            "Complete" => Some(LeagueStatus::Complete),
            _ => None,
        }
    }

    pub fn can_transition_to(self, next: LeagueStatus) -> bool {
        matches!(
            (self, next),
            (LeagueStatus::PreDraft, LeagueStatus::Drafting)
                | (LeagueStatus::Drafting, LeagueStatus::Complete)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct League {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub password: String,
}

/// One row of LeagueUser: a user's membership in a league, with the draft
/// position that fixes their turn order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Membership {
    pub userid: i64,
    pub draftposition: i64,
    pub teamname: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct LeagueSummary {
    pub id: i64,
    pub name: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateLeague {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct JoinLeague {
    pub leagueid: i64,
    pub password: String,
    pub teamname: String,
    pub draftposition: i64,
}

#[derive(Debug, Deserialize)]
pub struct SetStatus {
    pub status: String,
}
