use std::collections::BTreeMap;

use serde_json::{json, Value as JsonValue};

mod invited_room;
mod joined_room;
mod left_room;
mod test_event;

pub use invited_room::InvitedRoomBuilder;
pub use joined_room::JoinedRoomBuilder;
pub use left_room::LeftRoomBuilder;
pub use test_event::StateTestEvent;

/// The `SyncResponseBuilder` struct can be used to easily generate valid sync
/// responses for testing.
///
/// It supports a number of canned events, such as a member entering a room or
/// the room name changing. It also supports insertion of custom events in the
/// form of JSON values.
#[derive(Default)]
pub struct SyncResponseBuilder {
    /// Updates to joined rooms.
    joined_rooms: BTreeMap<String, JsonValue>,
    /// Updates to invited rooms.
    invited_rooms: BTreeMap<String, JsonValue>,
    /// Updates to left rooms.
    left_rooms: BTreeMap<String, JsonValue>,
    /// Events that determine the presence state of a user.
    presence: Vec<JsonValue>,
    /// Internal counter to enable the `next_batch` of each sync response to
    /// vary.
    batch_counter: i64,
}

impl SyncResponseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a joined room to the next sync response.
    ///
    /// If a room with the same room ID already exists, it is replaced by this
    /// one.
    pub fn add_joined_room(&mut self, room: JoinedRoomBuilder) -> &mut Self {
        self.invited_rooms.remove(&room.room_id);
        self.left_rooms.remove(&room.room_id);
        self.joined_rooms.insert(room.room_id.clone(), room.build_json());
        self
    }

    /// Add an invited room to the next sync response.
    ///
    /// If a room with the same room ID already exists, it is replaced by this
    /// one.
    pub fn add_invited_room(&mut self, room: InvitedRoomBuilder) -> &mut Self {
        self.joined_rooms.remove(&room.room_id);
        self.left_rooms.remove(&room.room_id);
        self.invited_rooms.insert(room.room_id.clone(), room.build_json());
        self
    }

    /// Add a left room to the next sync response.
    ///
    /// If a room with the same room ID already exists, it is replaced by this
    /// one.
    pub fn add_left_room(&mut self, room: LeftRoomBuilder) -> &mut Self {
        self.joined_rooms.remove(&room.room_id);
        self.invited_rooms.remove(&room.room_id);
        self.left_rooms.insert(room.room_id.clone(), room.build_json());
        self
    }

    /// Add presence in bulk.
    pub fn add_presence_bulk<I>(&mut self, events: I) -> &mut Self
    where
        I: IntoIterator<Item = JsonValue>,
    {
        self.presence.extend(events);
        self
    }

    /// Builds a sync response as a JSON Value containing the events we queued
    /// so far.
    ///
    /// The next response returned by `build_json_sync_response` will then be
    /// empty if no further events were queued.
    pub fn build_json_sync_response(&mut self) -> JsonValue {
        self.batch_counter += 1;
        let next_batch = self.generate_sync_token();

        let body = json! {
            {
                "next_batch": next_batch,
                "rooms": {
                    "invite": self.invited_rooms,
                    "join": self.joined_rooms,
                    "leave": self.left_rooms,
                },
                "presence": {
                    "events": self.presence,
                },
            }
        };

        // Clear state so that the next sync response will be empty if nothing
        // was added.
        self.clear();

        body
    }

    fn generate_sync_token(&self) -> String {
        format!("t392-516_47314_0_7_1_1_1_11444_{}", self.batch_counter)
    }

    fn clear(&mut self) {
        self.invited_rooms.clear();
        self.joined_rooms.clear();
        self.left_rooms.clear();
        self.presence.clear();
    }
}

fn section(events: Vec<JsonValue>) -> JsonValue {
    json!({ "events": events })
}
