use serde_json::{json, Value as JsonValue};

use super::{section, StateTestEvent};
use crate::DEFAULT_TEST_ROOM_ID;

pub struct JoinedRoomBuilder {
    pub(super) room_id: String,
    state: Vec<JsonValue>,
    timeline: Vec<JsonValue>,
    ephemeral: Vec<JsonValue>,
    prev_batch: Option<String>,
}

impl JoinedRoomBuilder {
    /// Create a new `JoinedRoomBuilder` for the given room ID.
    ///
    /// If the room ID is [`DEFAULT_TEST_ROOM_ID`],
    /// [`JoinedRoomBuilder::default()`] can be used instead.
    pub fn new(room_id: &str) -> Self {
        Self {
            room_id: room_id.to_owned(),
            state: Vec::new(),
            timeline: Vec::new(),
            ephemeral: Vec::new(),
            prev_batch: None,
        }
    }

    /// Add an event to the timeline.
    pub fn add_timeline_event(mut self, event: impl Into<JsonValue>) -> Self {
        self.timeline.push(event.into());
        self
    }

    /// Set the `prev_batch` of the timeline.
    pub fn set_timeline_prev_batch(mut self, prev_batch: impl Into<String>) -> Self {
        self.prev_batch = Some(prev_batch.into());
        self
    }

    /// Add an event to the state.
    pub fn add_state_event(mut self, event: StateTestEvent) -> Self {
        self.state.push(event.into());
        self
    }

    /// Add an ephemeral event.
    pub fn add_ephemeral_event(mut self, event: impl Into<JsonValue>) -> Self {
        self.ephemeral.push(event.into());
        self
    }

    pub(super) fn build_json(self) -> JsonValue {
        json!({
            "state": section(self.state),
            "timeline": {
                "events": self.timeline,
                "limited": false,
                "prev_batch": self.prev_batch,
            },
            "ephemeral": section(self.ephemeral),
            "unread_notifications": {
                "highlight_count": 0,
                "notification_count": 0,
            },
        })
    }
}

impl Default for JoinedRoomBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_TEST_ROOM_ID)
    }
}
