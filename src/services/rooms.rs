use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, RwLock, broadcast};

/// Identity of one live draft socket, handed out at upgrade time.
pub type ConnId = u64;

/// A fan-out event tagged with the connection that caused it, so the
/// submitting client can be excluded from its own broadcast.
#[derive(Debug, Clone)]
pub struct RoomEvent {
    pub source: ConnId,
    pub payload: String,
}

struct Room {
    tx: broadcast::Sender<RoomEvent>,
    /// Serializes validate-then-persist for this league's picks.
    pick_lock: Arc<Mutex<()>>,
}

impl Room {
    fn new() -> Self {
        Self {
            tx: broadcast::channel(64).0,
            pick_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Registry of live draft rooms, keyed purely by league id so renaming a
/// league mid-draft cannot fragment its room. Ephemeral: rebuilt from join
/// events after a restart.
pub struct DraftRooms {
    rooms: RwLock<HashMap<i64, Room>>,
    next_conn_id: AtomicU64,
}

impl DraftRooms {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            next_conn_id: AtomicU64::new(1),
        }
    }

    pub fn register_connection(&self) -> ConnId {
        self.next_conn_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Subscribes the caller to a league's room, creating the room on first
    /// join. Joining the same room again just hands back a fresh receiver on
    /// the same channel.
    pub async fn join(&self, leagueid: i64) -> broadcast::Receiver<RoomEvent> {
        let mut rooms = self.rooms.write().await;
        rooms.entry(leagueid).or_insert_with(Room::new).tx.subscribe()
    }

    /// Called from the disconnect path (after the caller has dropped its
    /// receiver) and after pick submissions. Removes the room once nobody is
    /// listening and no submission still holds a handle to its pick lock, so
    /// finished drafts and rooms created by never-joined submitters do not
    /// linger in memory. The strong-count check keeps a waiting submission's
    /// lock from being orphaned and re-created, which would let two
    /// submissions validate against the same state.
    pub async fn leave(&self, leagueid: i64) {
        let mut rooms = self.rooms.write().await;
        if let Some(room) = rooms.get(&leagueid) {
            if room.tx.receiver_count() == 0 && Arc::strong_count(&room.pick_lock) == 1 {
                rooms.remove(&leagueid);
            }
        }
    }

    /// Mutex serializing pick submissions for one league. Created on demand
    /// so a submission still serializes even if the submitter never joined
    /// the room.
    pub async fn pick_lock(&self, leagueid: i64) -> Arc<Mutex<()>> {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(leagueid)
            .or_insert_with(Room::new)
            .pick_lock
            .clone()
    }

    /// Fans `payload` out to every connection in the league's room. Returns
    /// the number of subscribed receivers (the source connection filters
    /// itself out on its own side).
    pub async fn broadcast(&self, leagueid: i64, source: ConnId, payload: String) -> usize {
        let rooms = self.rooms.read().await;
        match rooms.get(&leagueid) {
            Some(room) => room.tx.send(RoomEvent { source, payload }).unwrap_or(0),
            None => 0,
        }
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::DraftRooms;

    #[tokio::test]
    async fn broadcast_reaches_only_the_leagues_room() {
        let rooms = DraftRooms::new();
        let conn_a = rooms.register_connection();
        let conn_b = rooms.register_connection();

        let mut rx_a = rooms.join(1).await;
        let mut rx_b = rooms.join(2).await;

        let delivered = rooms.broadcast(1, conn_a, "pick".to_string()).await;
        assert_eq!(delivered, 1);

        let event = rx_a.recv().await.unwrap();
        assert_eq!(event.payload, "pick");
        assert_eq!(event.source, conn_a);

        // League 2's room never sees league 1 traffic.
        assert!(rx_b.try_recv().is_err());
        let _ = conn_b;
    }

    #[tokio::test]
    async fn events_carry_the_source_connection_for_sender_exclusion() {
        let rooms = DraftRooms::new();
        let submitter = rooms.register_connection();

        let mut rx_submitter = rooms.join(7).await;
        let mut rx_other = rooms.join(7).await;

        rooms.broadcast(7, submitter, "drafted".to_string()).await;

        // Both receivers get the event; the submitter's side drops it by
        // matching on source.
        assert_eq!(rx_submitter.recv().await.unwrap().source, submitter);
        assert_eq!(rx_other.recv().await.unwrap().source, submitter);
    }

    #[tokio::test]
    async fn broadcast_to_an_empty_room_delivers_nothing() {
        let rooms = DraftRooms::new();
        let conn = rooms.register_connection();
        assert_eq!(rooms.broadcast(3, conn, "pick".to_string()).await, 0);
    }

    #[tokio::test]
    async fn leave_drops_the_room_once_empty() {
        let rooms = DraftRooms::new();

        let rx_a = rooms.join(1).await;
        let rx_b = rooms.join(1).await;
        assert_eq!(rooms.room_count().await, 1);

        drop(rx_a);
        rooms.leave(1).await;
        // One receiver still attached, room survives.
        assert_eq!(rooms.room_count().await, 1);

        drop(rx_b);
        rooms.leave(1).await;
        assert_eq!(rooms.room_count().await, 0);
    }

    #[tokio::test]
    async fn leave_keeps_the_room_while_a_pick_lock_is_handed_out() {
        let rooms = DraftRooms::new();

        let lock = rooms.pick_lock(1).await;
        rooms.leave(1).await;
        // A submission still holds the lock handle; the room must survive so
        // a second submitter serializes on the same mutex.
        assert_eq!(rooms.room_count().await, 1);
        assert!(std::sync::Arc::ptr_eq(&lock, &rooms.pick_lock(1).await));

        drop(lock);
        rooms.leave(1).await;
        assert_eq!(rooms.room_count().await, 0);
    }

    #[tokio::test]
    async fn rejoining_reuses_the_same_room() {
        let rooms = DraftRooms::new();
        let _rx1 = rooms.join(5).await;
        let _rx2 = rooms.join(5).await;
        assert_eq!(rooms.room_count().await, 1);
    }
}
