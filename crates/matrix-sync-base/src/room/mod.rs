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

mod members;
mod state;

use std::{
    collections::{BTreeMap, VecDeque},
    fmt,
    sync::{Arc, RwLock},
};

pub use members::RoomMember;
pub use state::apply_state_event;

use crate::{
    events::Event,
    identifiers::{RoomId, UserId},
};

/// The default number of timeline events a room keeps around.
pub const DEFAULT_TIMELINE_LIMIT: usize = 20;

/// The state of a single room, as folded together from the state events the
/// server sent us.
///
/// All fields are private, they are only changed through
/// [`apply_state_event`] and the few setters below which keep the invariants
/// in one place: a field that got reset by the server is `None`, and a member
/// that left or was banned is gone from the member map.
#[derive(Clone, Debug)]
pub struct RoomInfo {
    room_id: RoomId,
    name: Option<String>,
    topic: Option<String>,
    aliases: Option<Vec<String>>,
    canonical_alias: Option<String>,
    members: BTreeMap<UserId, RoomMember>,
    prev_batch: Option<String>,
    timeline: VecDeque<Event>,
    timeline_limit: usize,
}

impl RoomInfo {
    /// Create an empty room with the default timeline limit.
    pub fn new(room_id: RoomId) -> Self {
        Self::with_timeline_limit(room_id, DEFAULT_TIMELINE_LIMIT)
    }

    /// Create an empty room which keeps at most `timeline_limit` timeline
    /// events.
    pub fn with_timeline_limit(room_id: RoomId, timeline_limit: usize) -> Self {
        Self {
            room_id,
            name: None,
            topic: None,
            aliases: None,
            canonical_alias: None,
            members: BTreeMap::new(),
            prev_batch: None,
            timeline: VecDeque::new(),
            timeline_limit,
        }
    }

    /// The ID of the room.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// The name set by the last `m.room.name` event.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The topic set by the last `m.room.topic` event.
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// The aliases set by the last `m.room.aliases` event.
    pub fn aliases(&self) -> Option<&[String]> {
        self.aliases.as_deref()
    }

    /// The alias set by the last `m.room.canonical_alias` event.
    pub fn canonical_alias(&self) -> Option<&str> {
        self.canonical_alias.as_deref()
    }

    /// The joined members of the room.
    pub fn members(&self) -> impl Iterator<Item = &RoomMember> {
        self.members.values()
    }

    /// Get a joined member by its user ID.
    pub fn get_member(&self, user_id: &UserId) -> Option<&RoomMember> {
        self.members.get(user_id)
    }

    /// The number of joined members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// The token to paginate backwards from the oldest timeline event we know.
    pub fn prev_batch(&self) -> Option<&str> {
        self.prev_batch.as_deref()
    }

    /// The most recent timeline events, oldest first.
    pub fn timeline(&self) -> impl Iterator<Item = &Event> {
        self.timeline.iter()
    }

    /// How many timeline events the room keeps.
    pub fn timeline_limit(&self) -> usize {
        self.timeline_limit
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn set_topic(&mut self, topic: Option<String>) {
        self.topic = topic;
    }

    pub fn set_aliases(&mut self, aliases: Option<Vec<String>>) {
        self.aliases = aliases;
    }

    pub fn set_canonical_alias(&mut self, alias: Option<String>) {
        self.canonical_alias = alias;
    }

    pub fn set_prev_batch(&mut self, prev_batch: Option<String>) {
        self.prev_batch = prev_batch;
    }

    /// Insert or replace a joined member.
    pub fn upsert_member(&mut self, member: RoomMember) {
        self.members.insert(member.user_id().clone(), member);
    }

    /// Remove a member, returns the removed entry if there was one.
    pub fn remove_member(&mut self, user_id: &UserId) -> Option<RoomMember> {
        self.members.remove(user_id)
    }

    /// Remember a timeline event, evicting the oldest one if the buffer is
    /// full.
    pub fn push_timeline_event(&mut self, event: Event) {
        if self.timeline_limit == 0 {
            return;
        }

        while self.timeline.len() >= self.timeline_limit {
            self.timeline.pop_front();
        }

        self.timeline.push_back(event);
    }

    /// The human readable name of the room, derived from its members.
    ///
    /// The own user is excluded. Members are ordered by display name, falling
    /// back to the user ID for members without one.
    ///
    /// * no other members: `Empty room`
    /// * one: `Alice`
    /// * two: `Alice and Bob`
    /// * more: `Alice and 2 others`
    pub fn display_name(&self, own_user_id: &UserId) -> String {
        let mut names: Vec<(&str, &UserId)> = self
            .members
            .values()
            .filter(|m| m.user_id() != own_user_id)
            .map(|m| (m.name(), m.user_id()))
            .collect();
        names.sort_unstable();

        match names.as_slice() {
            [] => "Empty room".to_owned(),
            [(first, _)] => (*first).to_owned(),
            [(first, _), (second, _)] => format!("{first} and {second}"),
            [(first, _), rest @ ..] => format!("{first} and {} others", rest.len()),
        }
    }

    /// The name a client should show for the room.
    ///
    /// Uses the explicit room name if one is set, the canonical alias
    /// otherwise and falls back to [`RoomInfo::display_name`].
    pub fn calculated_name(&self, own_user_id: &UserId) -> String {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.canonical_alias.as_deref().filter(|a| !a.is_empty()))
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| self.display_name(own_user_id))
    }
}

/// A shared handle to a room known to the client.
///
/// Cloning the handle is cheap, all clones observe the same state. Reads take
/// a shared lock, so they never see an event half applied.
#[derive(Clone)]
pub struct Room {
    room_id: RoomId,
    inner: Arc<RwLock<RoomInfo>>,
}

impl fmt::Debug for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Room").field("room_id", &self.room_id).finish_non_exhaustive()
    }
}

impl Room {
    pub(crate) fn new(room_id: RoomId, timeline_limit: usize) -> Self {
        let info = RoomInfo::with_timeline_limit(room_id.clone(), timeline_limit);
        Self { room_id, inner: Arc::new(RwLock::new(info)) }
    }

    /// The ID of the room.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Whether both handles point to the same room object.
    pub fn is_same(&self, other: &Room) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// A copy of the current room state.
    pub fn clone_info(&self) -> RoomInfo {
        self.inner.read().unwrap().clone()
    }

    /// Run `f` with shared access to the room state.
    pub fn with_info<R>(&self, f: impl FnOnce(&RoomInfo) -> R) -> R {
        f(&self.inner.read().unwrap())
    }

    /// Run `f` with exclusive access to the room state.
    ///
    /// Everything `f` does becomes visible to readers at once.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut RoomInfo) -> R) -> R {
        f(&mut self.inner.write().unwrap())
    }

    pub fn name(&self) -> Option<String> {
        self.with_info(|info| info.name().map(ToOwned::to_owned))
    }

    pub fn topic(&self) -> Option<String> {
        self.with_info(|info| info.topic().map(ToOwned::to_owned))
    }

    pub fn aliases(&self) -> Option<Vec<String>> {
        self.with_info(|info| info.aliases().map(ToOwned::to_owned))
    }

    pub fn canonical_alias(&self) -> Option<String> {
        self.with_info(|info| info.canonical_alias().map(ToOwned::to_owned))
    }

    pub fn prev_batch(&self) -> Option<String> {
        self.with_info(|info| info.prev_batch().map(ToOwned::to_owned))
    }

    /// The joined members of the room.
    pub fn members(&self) -> Vec<RoomMember> {
        self.with_info(|info| info.members().cloned().collect())
    }

    /// Get a joined member by its user ID.
    pub fn get_member(&self, user_id: &UserId) -> Option<RoomMember> {
        self.with_info(|info| info.get_member(user_id).cloned())
    }

    pub fn member_count(&self) -> usize {
        self.with_info(RoomInfo::member_count)
    }

    /// The most recent timeline events, oldest first.
    pub fn timeline(&self) -> Vec<Event> {
        self.with_info(|info| info.timeline().cloned().collect())
    }

    pub fn timeline_limit(&self) -> usize {
        self.with_info(RoomInfo::timeline_limit)
    }

    /// See [`RoomInfo::display_name`].
    pub fn display_name(&self, own_user_id: &UserId) -> String {
        self.with_info(|info| info.display_name(own_user_id))
    }

    /// See [`RoomInfo::calculated_name`].
    pub fn calculated_name(&self, own_user_id: &UserId) -> String {
        self.with_info(|info| info.calculated_name(own_user_id))
    }
}
