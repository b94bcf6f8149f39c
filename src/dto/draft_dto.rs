use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted pick: this user, in this league, took this player at this
/// overall slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Pick {
    pub userid: i64,
    pub playerid: i64,
    pub draftpick: i64,
}

/// Pick submission as it arrives over the draft socket. `leaguename` and `id`
/// are still sent by older clients; the room and all validation key off
/// `leagueid` alone.
#[derive(Debug, Clone, Deserialize)]
pub struct DraftPlayer {
    #[serde(default)]
    pub leaguename: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
    pub leagueid: i64,
    pub userid: i64,
    pub playerid: i64,
    pub draftpick: i64,
}

/// Messages a client may send over the draft socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "joinRoom")]
    JoinRoom {
        #[serde(default)]
        name: Option<String>,
        id: i64,
    },
    #[serde(rename = "draftPlayer")]
    DraftPlayer(DraftPlayer),
}

/// Messages the server pushes to draft socket clients.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "playerDrafted")]
    PlayerDrafted {
        leagueid: i64,
        userid: i64,
        playerid: i64,
        draftpick: i64,
    },
    #[serde(rename = "draftRejected")]
    DraftRejected {
        reason: &'static str,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::{ClientMessage, ServerMessage};

    #[test]
    fn parses_join_room_with_and_without_name() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"joinRoom","name":"Playoff Push","id":7}"#).unwrap();
        assert!(matches!(msg, ClientMessage::JoinRoom { id: 7, .. }));

        let msg: ClientMessage = serde_json::from_str(r#"{"type":"joinRoom","id":7}"#).unwrap();
        assert!(matches!(msg, ClientMessage::JoinRoom { id: 7, .. }));
    }

    #[test]
    fn parses_draft_player_with_legacy_fields() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"draftPlayer","leaguename":"Playoff Push","id":7,
                "leagueid":7,"userid":10,"playerid":500,"draftpick":1}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::DraftPlayer(pick) => {
                assert_eq!(pick.leagueid, 7);
                assert_eq!(pick.userid, 10);
                assert_eq!(pick.playerid, 500);
                assert_eq!(pick.draftpick, 1);
            }
            other => panic!("expected draftPlayer, got {other:?}"),
        }
    }

    #[test]
    fn player_drafted_carries_the_wire_tag() {
        let json = serde_json::to_string(&ServerMessage::PlayerDrafted {
            leagueid: 7,
            userid: 10,
            playerid: 500,
            draftpick: 1,
        })
        .unwrap();
        assert!(json.contains(r#""type":"playerDrafted""#));
    }
}
