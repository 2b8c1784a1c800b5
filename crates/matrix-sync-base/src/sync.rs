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

//! The body of a `/sync` response.
//!
//! Only the parts the client acts on are modelled, everything else the server
//! sends is ignored while deserializing. Missing sections default to empty.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{events::Event, identifiers::RoomId};

/// A response to a `/sync` request.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SyncResponse {
    /// The token to pass as `since` to the next sync request.
    pub next_batch: String,
    #[serde(default)]
    pub presence: Events,
    #[serde(default)]
    pub rooms: Rooms,
}

/// A list of events, `{"events": [...]}` on the wire.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Events {
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Events {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Updates to rooms, grouped by the membership of the user.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Rooms {
    #[serde(default, alias = "joined")]
    pub join: BTreeMap<RoomId, JoinedRoom>,
    #[serde(default, alias = "invited")]
    pub invite: BTreeMap<RoomId, InvitedRoom>,
    #[serde(default, alias = "left")]
    pub leave: BTreeMap<RoomId, LeftRoom>,
}

impl Rooms {
    pub fn is_empty(&self) -> bool {
        self.join.is_empty() && self.invite.is_empty() && self.leave.is_empty()
    }
}

/// Updates to a room the user is joined to.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct JoinedRoom {
    /// State events from before the timeline.
    #[serde(default)]
    pub state: Events,
    #[serde(default)]
    pub timeline: Timeline,
    /// Events that aren't recorded in the room history, e.g. typing
    /// notifications.
    #[serde(default)]
    pub ephemeral: Events,
}

/// A room the user is invited to.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct InvitedRoom {
    /// Stripped state events the inviter shared with the user.
    #[serde(default)]
    pub invite_state: Events,
}

/// A room the user has left.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct LeftRoom {
    #[serde(default)]
    pub state: Events,
    #[serde(default)]
    pub timeline: Timeline,
}

/// The timeline of a room.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Timeline {
    /// Whether there are more events between the previous sync and this one.
    #[serde(default)]
    pub limited: bool,
    /// Token to paginate backwards from the first event of `events`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_batch: Option<String>,
    #[serde(default)]
    pub events: Vec<Event>,
}
