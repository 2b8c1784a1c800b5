use serde_json::{json, Value as JsonValue};

use super::{section, StateTestEvent};
use crate::DEFAULT_TEST_ROOM_ID;

pub struct InvitedRoomBuilder {
    pub(super) room_id: String,
    invite_state: Vec<JsonValue>,
}

impl InvitedRoomBuilder {
    /// Create a new `InvitedRoomBuilder` for the given room ID.
    ///
    /// If the room ID is [`DEFAULT_TEST_ROOM_ID`],
    /// [`InvitedRoomBuilder::default()`] can be used instead.
    pub fn new(room_id: &str) -> Self {
        Self { room_id: room_id.to_owned(), invite_state: Vec::new() }
    }

    /// Add an event to the stripped state of the invite.
    pub fn add_state_event(mut self, event: StateTestEvent) -> Self {
        self.invite_state.push(event.into());
        self
    }

    pub(super) fn build_json(self) -> JsonValue {
        json!({ "invite_state": section(self.invite_state) })
    }
}

impl Default for InvitedRoomBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_TEST_ROOM_ID)
    }
}
