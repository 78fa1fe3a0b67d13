//! The room registry: the id → room index, and the only place rooms are
//! created or killed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use codeduel_problems::{Deck, Problem};
use codeduel_protocol::RoomId;
use rand::Rng;

use crate::room::spawn_room;
use crate::{RoomConfig, RoomHandle};

type RoomIndex = Mutex<HashMap<RoomId, RoomHandle>>;

/// Creates rooms on demand, looks them up by id, and unindexes them when
/// they close.
///
/// Cheap to clone; constructed once at startup and passed explicitly to
/// the matchmaking path and the garbage collector. The index lock guards
/// only map operations — nothing awaits while holding it. Rooms remove
/// themselves through a disposal callback, so a finished match never
/// lingers in the index.
#[derive(Clone)]
pub struct Registry {
    rooms: Arc<RoomIndex>,
    config: RoomConfig,
    problems: Arc<[Problem]>,
}

impl Registry {
    pub fn new(config: RoomConfig, problems: Arc<[Problem]>) -> Self {
        Self {
            rooms: Arc::new(Mutex::new(HashMap::new())),
            config,
            problems,
        }
    }

    /// Returns the room for `id`, creating an empty one on first
    /// reference. Idempotent: two `get`s with no intervening close see
    /// the same room.
    pub fn get(&self, id: &RoomId) -> RoomHandle {
        let mut rooms = self.rooms.lock().expect("registry lock poisoned");
        if let Some(handle) = rooms.get(id) {
            return handle.clone();
        }
        let handle = self.spawn(id.clone());
        rooms.insert(id.clone(), handle.clone());
        tracing::info!(room_id = %id, "room created");
        handle
    }

    /// Creates a room under a freshly generated shareable code.
    pub fn new_room(&self) -> RoomHandle {
        let mut rooms = self.rooms.lock().expect("registry lock poisoned");
        let id = loop {
            let candidate = RoomId(generate_room_code());
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        let handle = self.spawn(id.clone());
        rooms.insert(id.clone(), handle.clone());
        tracing::info!(room_id = %id, "room created");
        handle
    }

    /// Force-closes a room and drops it from the index. Used by the
    /// garbage collector; a no-op for unknown ids.
    pub async fn kill(&self, id: &RoomId) {
        let handle = {
            let mut rooms = self.rooms.lock().expect("registry lock poisoned");
            rooms.remove(id)
        };
        if let Some(handle) = handle {
            handle.force_close().await;
            tracing::info!(room_id = %id, "room killed");
        }
    }

    /// Snapshot of every live room handle.
    pub fn rooms(&self) -> Vec<RoomHandle> {
        self.rooms
            .lock()
            .expect("registry lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    pub fn contains(&self, id: &RoomId) -> bool {
        self.rooms
            .lock()
            .expect("registry lock poisoned")
            .contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.rooms.lock().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn spawn(&self, id: RoomId) -> RoomHandle {
        // Weak: a room outliving its registry just skips the unindexing.
        let index: Weak<RoomIndex> = Arc::downgrade(&self.rooms);
        let room_id = id.clone();
        let dispose: crate::DisposeFn = Box::new(move || {
            if let Some(index) = index.upgrade() {
                index
                    .lock()
                    .expect("registry lock poisoned")
                    .remove(&room_id);
                tracing::debug!(room_id = %room_id, "room unindexed");
            }
        });

        spawn_room(
            id,
            self.config.clone(),
            Deck::new(Arc::clone(&self.problems)),
            dispose,
        )
    }
}

/// Generates a short shareable room code: 6 hex characters.
fn generate_room_code() -> String {
    let bytes: [u8; 3] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
