// Copyright 2024 The Matrix.org Foundation C.I.C.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{collections::BTreeMap, sync::RwLock};

use tracing::debug;

use crate::{
    identifiers::{IdParseError, RoomId},
    room::{Room, DEFAULT_TIMELINE_LIMIT},
};

/// All rooms the client knows about, keyed by their ID.
///
/// Rooms are only ever created through [`RoomDirectory::get_or_create`] and
/// its siblings, a plain lookup never inserts anything.
#[derive(Debug)]
pub struct RoomDirectory {
    rooms: RwLock<BTreeMap<RoomId, Room>>,
    timeline_limit: usize,
}

impl Default for RoomDirectory {
    fn default() -> Self {
        Self::new(DEFAULT_TIMELINE_LIMIT)
    }
}

impl RoomDirectory {
    /// Create an empty directory whose rooms keep at most `timeline_limit`
    /// timeline events.
    pub fn new(timeline_limit: usize) -> Self {
        Self { rooms: Default::default(), timeline_limit }
    }

    /// Get the room with the given ID, creating an empty one if it doesn't
    /// exist yet.
    ///
    /// The ID is validated before anything else happens, an invalid ID leaves
    /// the directory untouched.
    pub fn get_or_create(&self, room_id: &str) -> Result<Room, IdParseError> {
        let room_id = RoomId::parse(room_id)?;
        Ok(self.get_or_create_by_id(&room_id))
    }

    /// Get the room with the given, already validated, ID, creating an empty
    /// one if it doesn't exist yet.
    pub fn get_or_create_by_id(&self, room_id: &RoomId) -> Room {
        if let Some(room) = self.rooms.read().unwrap().get(room_id) {
            return room.clone();
        }

        self.rooms
            .write()
            .unwrap()
            .entry(room_id.clone())
            .or_insert_with(|| {
                debug!(%room_id, "Creating new room");
                Room::new(room_id.clone(), self.timeline_limit)
            })
            .clone()
    }

    /// Look up a room, `None` if it is unknown.
    ///
    /// The ID isn't validated, a malformed ID simply isn't found.
    pub fn get(&self, room_id: &str) -> Option<Room> {
        self.rooms.read().unwrap().get(room_id).cloned()
    }

    /// Drop a room from the directory, returning it if it was known.
    pub fn remove(&self, room_id: &str) -> Option<Room> {
        let room = self.rooms.write().unwrap().remove(room_id);

        if room.is_some() {
            debug!(room_id, "Removed room");
        }

        room
    }

    /// A snapshot of all rooms.
    ///
    /// Later additions or removals don't show up in the returned map, the
    /// rooms in it still share their state with the directory.
    pub fn all(&self) -> BTreeMap<RoomId, Room> {
        self.rooms.read().unwrap().clone()
    }

    /// The number of known rooms.
    pub fn len(&self) -> usize {
        self.rooms.read().unwrap().len()
    }

    /// Whether no room is known.
    pub fn is_empty(&self) -> bool {
        self.rooms.read().unwrap().is_empty()
    }
}
