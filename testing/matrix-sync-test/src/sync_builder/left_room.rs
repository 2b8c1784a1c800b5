use serde_json::{json, Value as JsonValue};

use super::{section, StateTestEvent};
use crate::DEFAULT_TEST_ROOM_ID;

pub struct LeftRoomBuilder {
    pub(super) room_id: String,
    state: Vec<JsonValue>,
    timeline: Vec<JsonValue>,
}

impl LeftRoomBuilder {
    /// Create a new `LeftRoomBuilder` for the given room ID.
    ///
    /// If the room ID is [`DEFAULT_TEST_ROOM_ID`],
    /// [`LeftRoomBuilder::default()`] can be used instead.
    pub fn new(room_id: &str) -> Self {
        Self {
            room_id: room_id.to_owned(),
            state: Vec::new(),
            timeline: Vec::new(),
        }
    }

    /// Add an event to the timeline.
    pub fn add_timeline_event(mut self, event: impl Into<JsonValue>) -> Self {
        self.timeline.push(event.into());
        self
    }

    /// Add an event to the state.
    pub fn add_state_event(mut self, event: StateTestEvent) -> Self {
        self.state.push(event.into());
        self
    }

    pub(super) fn build_json(self) -> JsonValue {
        json!({
            "state": section(self.state),
            "timeline": {
                "events": self.timeline,
                "limited": false,
            },
        })
    }
}

impl Default for LeftRoomBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_TEST_ROOM_ID)
    }
}
