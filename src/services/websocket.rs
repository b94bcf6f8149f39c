use std::sync::Arc;

use axum::{
    extract::{
        Extension,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::dto::draft_dto::{ClientMessage, ServerMessage};
use crate::services::coordinator;
use crate::services::rooms::{ConnId, DraftRooms, RoomEvent};
use crate::services::store::DraftStore;

/* Web Socket stuff */
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Extension(rooms): Extension<Arc<DraftRooms>>,
    Extension(store): Extension<DraftStore>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, rooms, store))
}

async fn handle_socket(socket: WebSocket, rooms: Arc<DraftRooms>, store: DraftStore) {
    let conn_id = rooms.register_connection();
    let (mut sender, mut receiver) = socket.split();

    // League id + broadcast receiver once this connection has joined a room.
    let mut joined: Option<(i64, broadcast::Receiver<RoomEvent>)> = None;

    loop {
        tokio::select! {
            inbound = receiver.next() => {
                let Some(Ok(msg)) = inbound else { break };
                let Message::Text(text) = msg else { continue };

                if let Some(reply) = handle_message(&text, conn_id, &rooms, &store, &mut joined).await {
                    let json = match serde_json::to_string(&reply) {
                        Ok(json) => json,
                        Err(e) => {
                            error!("Failed to serialize reply: {}", e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
            }
            event = next_room_event(&mut joined) => {
                match event {
                    // The submitting client already knows its own pick.
                    Ok(event) if event.source == conn_id => {}
                    Ok(event) => {
                        if sender.send(Message::Text(event.payload.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!("connection {conn_id} fell behind and dropped {missed} draft event(s)");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        joined = None;
                    }
                }
            }
        }
    }

    // Disconnect: drop our receiver before leave() so an emptied room is
    // reclaimed instead of leaking.
    if let Some((leagueid, rx)) = joined.take() {
        drop(rx);
        rooms.leave(leagueid).await;
        info!("connection {conn_id} left league {leagueid} room");
    }
}

/// Resolves to the next room event once the connection has joined a room;
/// pends forever otherwise so the select loop only services client input.
async fn next_room_event(
    joined: &mut Option<(i64, broadcast::Receiver<RoomEvent>)>,
) -> Result<RoomEvent, broadcast::error::RecvError> {
    match joined {
        Some((_, rx)) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Handles one client frame. The returned message, if any, goes back to this
/// connection only; accepted picks are fanned out to the rest of the room
/// from here.
async fn handle_message(
    text: &str,
    conn_id: ConnId,
    rooms: &DraftRooms,
    store: &DraftStore,
    joined: &mut Option<(i64, broadcast::Receiver<RoomEvent>)>,
) -> Option<ServerMessage> {
    let parsed = match serde_json::from_str::<ClientMessage>(text) {
        Ok(parsed) => parsed,
        Err(e) => {
            return Some(ServerMessage::DraftRejected {
                reason: "validation",
                message: format!("unrecognized message: {e}"),
            });
        }
    };

    match parsed {
        // The display name in the payload is ignored; rooms key off the
        // league id so a rename cannot split a live draft.
        ClientMessage::JoinRoom { id, .. } => {
            if let Some((old_id, rx)) = joined.take() {
                drop(rx);
                if old_id != id {
                    rooms.leave(old_id).await;
                }
            }
            let rx = rooms.join(id).await;
            *joined = Some((id, rx));
            info!("connection {conn_id} joined league {id} room");
            None
        }
        ClientMessage::DraftPlayer(pick) => {
            // Older clients derive the room from leaguename+id; leagueid wins.
            if let Some(legacy) = pick.id {
                if legacy != pick.leagueid {
                    warn!(
                        "league {}: ignoring mismatched legacy room key {:?}/{legacy}",
                        pick.leagueid, pick.leaguename
                    );
                }
            }
            match coordinator::submit_pick(store, rooms, &pick).await {
                Ok(accepted) => {
                    let event = ServerMessage::PlayerDrafted {
                        leagueid: pick.leagueid,
                        userid: accepted.userid,
                        playerid: accepted.playerid,
                        draftpick: accepted.draftpick,
                    };
                    match serde_json::to_string(&event) {
                        Ok(json) => {
                            let listeners = rooms.broadcast(pick.leagueid, conn_id, json).await;
                            if listeners == 0 {
                                // Persistence is authoritative; a missed
                                // broadcast is UI staleness, not data loss.
                                warn!(
                                    "league {}: pick {} accepted with no live listeners",
                                    pick.leagueid, accepted.draftpick
                                );
                            }
                        }
                        Err(e) => error!("Failed to serialize playerDrafted: {}", e),
                    }
                    None
                }
                Err(e) => {
                    warn!(
                        "league {}: rejected pick from user {}: {e}",
                        pick.leagueid, pick.userid
                    );
                    Some(ServerMessage::DraftRejected {
                        reason: e.kind(),
                        message: e.to_string(),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_league, seed_players, test_pool};

    fn draft_frame(leagueid: i64, userid: i64, playerid: i64, draftpick: i64) -> String {
        format!(
            r#"{{"type":"draftPlayer","leagueid":{leagueid},"userid":{userid},"playerid":{playerid},"draftpick":{draftpick}}}"#
        )
    }

    #[tokio::test]
    async fn accepted_pick_is_broadcast_to_the_room_not_the_sender() {
        let pool = test_pool().await;
        seed_league(&pool, 7, "Drafting", &[(10, 1), (11, 2)]).await;
        seed_players(&pool, &[500]).await;
        let store = DraftStore::new(pool);
        let rooms = DraftRooms::new();

        let submitter = rooms.register_connection();
        let mut submitter_joined = Some((7, rooms.join(7).await));
        let observer = rooms.register_connection();
        let mut observer_rx = rooms.join(7).await;

        let reply = handle_message(
            &draft_frame(7, 10, 500, 1),
            submitter,
            &rooms,
            &store,
            &mut submitter_joined,
        )
        .await;
        assert!(reply.is_none(), "acceptance sends nothing to the sender");

        let event = observer_rx.recv().await.unwrap();
        assert_eq!(event.source, submitter);
        assert_ne!(event.source, observer);
        let payload: serde_json::Value = serde_json::from_str(&event.payload).unwrap();
        assert_eq!(payload["type"], "playerDrafted");
        assert_eq!(payload["playerid"], 500);
        assert_eq!(payload["draftpick"], 1);
    }

    #[tokio::test]
    async fn rejected_pick_answers_only_the_sender() {
        let pool = test_pool().await;
        seed_league(&pool, 7, "Drafting", &[(10, 1), (11, 2)]).await;
        seed_players(&pool, &[500]).await;
        let store = DraftStore::new(pool);
        let rooms = DraftRooms::new();

        let submitter = rooms.register_connection();
        let mut submitter_joined = Some((7, rooms.join(7).await));
        let mut observer_rx = rooms.join(7).await;

        // Out of turn: slot 1 belongs to user 10.
        let reply = handle_message(
            &draft_frame(7, 11, 500, 1),
            submitter,
            &rooms,
            &store,
            &mut submitter_joined,
        )
        .await;
        match reply {
            Some(ServerMessage::DraftRejected { reason, .. }) => assert_eq!(reason, "conflict"),
            other => panic!("expected rejection, got {other:?}"),
        }
        assert!(
            observer_rx.try_recv().is_err(),
            "room members never observe a rejected attempt"
        );
    }

    #[tokio::test]
    async fn malformed_frames_get_a_validation_rejection() {
        let pool = test_pool().await;
        let store = DraftStore::new(pool);
        let rooms = DraftRooms::new();
        let conn = rooms.register_connection();
        let mut joined = None;

        let reply = handle_message("not json", conn, &rooms, &store, &mut joined).await;
        match reply {
            Some(ServerMessage::DraftRejected { reason, .. }) => assert_eq!(reason, "validation"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn switching_rooms_leaves_the_old_league() {
        let pool = test_pool().await;
        let store = DraftStore::new(pool);
        let rooms = DraftRooms::new();
        let conn = rooms.register_connection();
        let mut joined = None;

        let join = |id: i64| format!(r#"{{"type":"joinRoom","id":{id}}}"#);
        handle_message(&join(1), conn, &rooms, &store, &mut joined).await;
        assert_eq!(joined.as_ref().map(|(id, _)| *id), Some(1));

        handle_message(&join(2), conn, &rooms, &store, &mut joined).await;
        assert_eq!(joined.as_ref().map(|(id, _)| *id), Some(2));
        // League 1's room was reclaimed when its last member moved on.
        assert_eq!(rooms.room_count().await, 1);

        // Re-joining the current room is idempotent.
        handle_message(&join(2), conn, &rooms, &store, &mut joined).await;
        assert_eq!(rooms.room_count().await, 1);
    }
}
