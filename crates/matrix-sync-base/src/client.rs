// Copyright 2020 Damir Jelić
// Copyright 2020 The Matrix.org Foundation C.I.C.
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

use std::{
    fmt,
    sync::{Arc, Mutex, RwLock},
};

use tracing::{debug, instrument, trace};

use crate::{
    directory::RoomDirectory,
    events::Event,
    identifiers::{RoomId, UserId},
    listeners::{
        EventOrigin, InvitedRoomUpdate, LeftRoomUpdate, ListenerKind, ListenerRegistry,
        SyncRoomEvent,
    },
    room::{apply_state_event, Room, DEFAULT_TIMELINE_LIMIT},
    session::Session,
    sync::{JoinedRoom, SyncResponse},
};

/// Whether the next sync is the first one of this client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncMode {
    /// No sync token is known, the server sends a full snapshot.
    Initial,
    /// The server only sends what changed since the stored sync token.
    Incremental,
}

/// What a single sync response contained.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// The new sync token.
    pub next_batch: String,
    pub joined_rooms: Vec<RoomId>,
    pub invited_rooms: Vec<RoomId>,
    pub left_rooms: Vec<RoomId>,
    /// The number of presence events.
    pub presence_events: usize,
    /// The number of state, timeline and ephemeral events of joined rooms.
    pub room_events: usize,
}

impl SyncSummary {
    /// Whether the response carried nothing at all.
    pub fn is_empty(&self) -> bool {
        self.joined_rooms.is_empty()
            && self.invited_rooms.is_empty()
            && self.left_rooms.is_empty()
            && self.presence_events == 0
    }
}

/// The listener registries of a client, one per listener class.
#[derive(Debug)]
pub struct Listeners {
    /// Events of joined rooms, state events first, then timeline events.
    pub global: ListenerRegistry<SyncRoomEvent>,
    /// `m.presence` events.
    pub presence: ListenerRegistry<Event>,
    /// Rooms the user got invited to.
    pub invite: ListenerRegistry<InvitedRoomUpdate>,
    /// Rooms the user left.
    pub leave: ListenerRegistry<LeftRoomUpdate>,
    /// Ephemeral events of joined rooms.
    pub ephemeral: ListenerRegistry<SyncRoomEvent>,
}

impl Default for Listeners {
    fn default() -> Self {
        Self {
            global: ListenerRegistry::new(ListenerKind::Global),
            presence: ListenerRegistry::new(ListenerKind::Presence),
            invite: ListenerRegistry::new(ListenerKind::Invite),
            leave: ListenerRegistry::new(ListenerKind::Leave),
            ephemeral: ListenerRegistry::new(ListenerKind::Ephemeral),
        }
    }
}

/// A no-IO client.
///
/// The base client holds the local mirror of the user's rooms and turns sync
/// responses into room state changes and listener calls. It never talks to
/// the server itself, a higher level client feeds it the responses.
#[derive(Clone)]
pub struct BaseClient {
    inner: Arc<BaseClientInner>,
}

struct BaseClientInner {
    session: RwLock<Option<Session>>,
    sync_token: RwLock<Option<String>>,
    rooms: RoomDirectory,
    listeners: Listeners,
    /// Held while a sync response is processed, only one response is ever
    /// folded at a time.
    processing: Mutex<()>,
}

#[cfg(not(tarpaulin_include))]
impl fmt::Debug for BaseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseClient")
            .field("session", &self.session().map(|s| s.user_id))
            .field("sync_token", &self.sync_token())
            .field("rooms", &self.inner.rooms.len())
            .finish_non_exhaustive()
    }
}

impl Default for BaseClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseClient {
    /// Create a new client with the default timeline limit.
    pub fn new() -> Self {
        Self::with_timeline_limit(DEFAULT_TIMELINE_LIMIT)
    }

    /// Create a new client whose rooms keep at most `timeline_limit` timeline
    /// events.
    pub fn with_timeline_limit(timeline_limit: usize) -> Self {
        Self {
            inner: Arc::new(BaseClientInner {
                session: RwLock::new(None),
                sync_token: RwLock::new(None),
                rooms: RoomDirectory::new(timeline_limit),
                listeners: Listeners::default(),
                processing: Mutex::new(()),
            }),
        }
    }

    /// The current session, if the client is logged in.
    pub fn session(&self) -> Option<Session> {
        self.inner.session.read().unwrap().clone()
    }

    /// The user the client is logged in as.
    pub fn user_id(&self) -> Option<UserId> {
        self.inner.session.read().unwrap().as_ref().map(|s| s.user_id.clone())
    }

    /// Whether the client has an access token.
    pub fn logged_in(&self) -> bool {
        self.inner.session.read().unwrap().is_some()
    }

    /// Store the session of a successful login or registration.
    pub fn set_session(&self, session: Session) {
        debug!(user_id = %session.user_id, "Storing new session");
        *self.inner.session.write().unwrap() = Some(session);
    }

    /// The token the next sync request should start from.
    pub fn sync_token(&self) -> Option<String> {
        self.inner.sync_token.read().unwrap().clone()
    }

    /// Replace the stored sync token, e.g. with one persisted by the
    /// application.
    ///
    /// `None` makes the next sync an initial one.
    pub fn set_sync_token(&self, token: Option<String>) {
        *self.inner.sync_token.write().unwrap() = token;
    }

    pub fn sync_mode(&self) -> SyncMode {
        if self.inner.sync_token.read().unwrap().is_some() {
            SyncMode::Incremental
        } else {
            SyncMode::Initial
        }
    }

    /// The rooms known to the client.
    pub fn rooms(&self) -> &RoomDirectory {
        &self.inner.rooms
    }

    /// The listener registries of the client.
    pub fn listeners(&self) -> &Listeners {
        &self.inner.listeners
    }

    /// Get a room, `None` if it is unknown.
    pub fn get_room(&self, room_id: &str) -> Option<Room> {
        self.inner.rooms.get(room_id)
    }

    /// Receive a response from a sync call.
    ///
    /// Presence events are handed to the presence listeners, invited and left
    /// rooms to their listeners. Joined rooms get their state and timeline
    /// events folded into the room state before the events are handed to the
    /// global listeners. The sync token is updated last.
    ///
    /// Listeners run on the calling thread. They must not feed another
    /// response into this client from inside a callback.
    #[instrument(skip_all, fields(next_batch = %response.next_batch))]
    pub fn receive_sync_response(&self, response: SyncResponse) -> SyncSummary {
        let _guard = self.inner.processing.lock().unwrap();
        let listeners = &self.inner.listeners;

        let mut summary = SyncSummary {
            presence_events: response.presence.events.len(),
            ..Default::default()
        };

        for event in &response.presence.events {
            listeners.presence.dispatch(event);
        }

        for (room_id, invited_room) in response.rooms.invite {
            trace!(%room_id, "Received an invite");

            let update = InvitedRoomUpdate {
                room_id: room_id.clone(),
                invite_state: invited_room.invite_state.events,
            };
            listeners.invite.dispatch(&update);
            summary.invited_rooms.push(room_id);
        }

        for (room_id, left_room) in response.rooms.leave {
            trace!(%room_id, "Left room");

            let update = LeftRoomUpdate {
                room_id: room_id.clone(),
                state: left_room.state.events,
                timeline: left_room.timeline.events,
            };
            listeners.leave.dispatch(&update);
            self.inner.rooms.remove(room_id.as_str());
            summary.left_rooms.push(room_id);
        }

        for (room_id, joined_room) in response.rooms.join {
            summary.room_events += self.handle_joined_room(&room_id, joined_room);
            summary.joined_rooms.push(room_id);
        }

        debug!(
            joined = summary.joined_rooms.len(),
            invited = summary.invited_rooms.len(),
            left = summary.left_rooms.len(),
            presence = summary.presence_events,
            "Processed sync response"
        );

        *self.inner.sync_token.write().unwrap() = Some(response.next_batch.clone());
        summary.next_batch = response.next_batch;

        summary
    }

    fn handle_joined_room(&self, room_id: &RoomId, joined_room: JoinedRoom) -> usize {
        let room = self.inner.rooms.get_or_create_by_id(room_id);
        let JoinedRoom { state, timeline, ephemeral } = joined_room;

        // Every event is applied under its own write lock, readers see either
        // all of its effects or none.
        for event in &state.events {
            room.update(|info| apply_state_event(event, info));
        }

        for event in &timeline.events {
            room.update(|info| {
                apply_state_event(event, info);
                info.push_timeline_event(event.clone());
            });
        }

        if timeline.prev_batch.is_some() {
            room.update(|info| info.set_prev_batch(timeline.prev_batch.clone()));
        }

        trace!(
            %room_id,
            state = state.events.len(),
            timeline = timeline.events.len(),
            ephemeral = ephemeral.events.len(),
            "Folded joined room"
        );

        let count = state.events.len() + timeline.events.len() + ephemeral.events.len();
        let listeners = &self.inner.listeners;

        let tagged = |events: Vec<Event>, origin| {
            events.into_iter().map(move |event| SyncRoomEvent {
                room_id: room_id.clone(),
                event,
                origin,
            })
        };

        for event in tagged(state.events, EventOrigin::State)
            .chain(tagged(timeline.events, EventOrigin::Timeline))
        {
            listeners.global.dispatch(&event);
        }

        for event in tagged(ephemeral.events, EventOrigin::Ephemeral) {
            listeners.ephemeral.dispatch(&event);
        }

        count
    }
}
