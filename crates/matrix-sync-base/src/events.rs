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

//! Raw events as they arrive from the server and the typed state events the
//! client understands.
//!
//! Events are kept as raw JSON because the server may send anything, including
//! event types this crate doesn't know about. Only the state events which
//! change a [`RoomInfo`](crate::RoomInfo) are parsed into [`RoomStateEvent`],
//! everything else passes through untouched.

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::identifiers::UserId;

/// A raw event, e.g. a `m.room.message` in a timeline or a `m.presence`
/// update.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(JsonValue);

impl Event {
    /// Wrap the given JSON value.
    pub fn new(json: JsonValue) -> Self {
        Self(json)
    }

    /// The `type` field of the event, if it is a string.
    pub fn event_type(&self) -> Option<&str> {
        self.0.get("type")?.as_str()
    }

    /// The `content` field of the event.
    pub fn content(&self) -> Option<&JsonValue> {
        self.0.get("content")
    }

    /// The `state_key` field, only present on state events.
    pub fn state_key(&self) -> Option<&str> {
        self.0.get("state_key")?.as_str()
    }

    /// The `sender` field of the event.
    pub fn sender(&self) -> Option<&str> {
        self.0.get("sender")?.as_str()
    }

    /// The `event_id` field of the event.
    pub fn event_id(&self) -> Option<&str> {
        self.0.get("event_id")?.as_str()
    }

    /// Deserialize the content of the event into `T`.
    ///
    /// Returns `None` if the event has no content.
    pub fn deserialize_content<T: DeserializeOwned>(&self) -> Option<serde_json::Result<T>> {
        self.content().map(|content| T::deserialize(content))
    }

    /// The underlying JSON.
    pub fn json(&self) -> &JsonValue {
        &self.0
    }

    /// Consume the event, returning the underlying JSON.
    pub fn into_json(self) -> JsonValue {
        self.0
    }
}

impl From<JsonValue> for Event {
    fn from(json: JsonValue) -> Self {
        Self(json)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("type", &self.event_type())
            .field("event_id", &self.event_id())
            .finish_non_exhaustive()
    }
}

/// The content of a `m.room.name` event.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct NameEventContent {
    /// The new name, `None` removes it.
    #[serde(default)]
    pub name: Option<String>,
}

/// The content of a `m.room.topic` event.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct TopicEventContent {
    /// The new topic, `None` removes it.
    #[serde(default)]
    pub topic: Option<String>,
}

/// The content of a `m.room.aliases` event.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct AliasesEventContent {
    /// The complete list of aliases, it replaces the previous one.
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
}

/// The content of a `m.room.canonical_alias` event.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct CanonicalAliasEventContent {
    /// The canonical alias, `None` removes it.
    #[serde(default)]
    pub alias: Option<String>,
}

/// The membership state of a user in a room.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MembershipState {
    /// The user has joined the room.
    Join,
    /// The user has left the room, or was kicked.
    Leave,
    /// The user is banned from the room.
    Ban,
    /// The user was invited to the room.
    Invite,
    /// The user asked to join the room.
    Knock,
    /// A membership value this crate doesn't know about.
    _Custom(String),
}

impl From<String> for MembershipState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "join" => Self::Join,
            "leave" => Self::Leave,
            "ban" => Self::Ban,
            "invite" => Self::Invite,
            "knock" => Self::Knock,
            _ => Self::_Custom(s),
        }
    }
}

impl<'de> Deserialize<'de> for MembershipState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Into::into)
    }
}

/// The content of a `m.room.member` event.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct MemberEventContent {
    /// The membership state the event moves the user to.
    pub membership: MembershipState,
    /// The display name of the user inside of the room.
    #[serde(default)]
    pub displayname: Option<String>,
    /// The avatar of the user inside of the room.
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// The state events that change a room's [`RoomInfo`](crate::RoomInfo).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoomStateEvent {
    /// `m.room.name`
    Name(NameEventContent),
    /// `m.room.topic`
    Topic(TopicEventContent),
    /// `m.room.aliases`
    Aliases(AliasesEventContent),
    /// `m.room.canonical_alias`
    CanonicalAlias(CanonicalAliasEventContent),
    /// `m.room.member`, the user is taken from the `state_key`.
    Member {
        /// The user the membership change applies to.
        user_id: UserId,
        /// The new membership of the user.
        content: MemberEventContent,
    },
}

impl RoomStateEvent {
    /// Parse a raw event into one of the known state events.
    ///
    /// Returns `None` for unknown event types and for events that are missing
    /// required fields or have content of the wrong shape.
    pub fn from_event(event: &Event) -> Option<Self> {
        fn content<T: DeserializeOwned>(event: &Event) -> Option<T> {
            event.deserialize_content().and_then(Result::ok)
        }

        Some(match event.event_type()? {
            "m.room.name" => Self::Name(content(event)?),
            "m.room.topic" => Self::Topic(content(event)?),
            "m.room.aliases" => Self::Aliases(content(event)?),
            "m.room.canonical_alias" => Self::CanonicalAlias(content(event)?),
            "m.room.member" => {
                let user_id = UserId::parse(event.state_key()?).ok()?;
                Self::Member { user_id, content: content(event)? }
            }
            _ => return None,
        })
    }
}
