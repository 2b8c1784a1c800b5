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

use tracing::trace;

use super::{RoomInfo, RoomMember};
use crate::events::{Event, MembershipState, RoomStateEvent};

/// Fold a single event into the room state.
///
/// Events this crate doesn't understand, and known events with a malformed
/// body, leave the room untouched. The function never fails.
///
/// Returns `true` if the event was a known state event and got applied.
pub fn apply_state_event(event: &Event, room: &mut RoomInfo) -> bool {
    let Some(state_event) = RoomStateEvent::from_event(event) else {
        trace!(event_type = ?event.event_type(), "Ignoring event without known room state");
        return false;
    };

    match state_event {
        RoomStateEvent::Name(content) => room.set_name(content.name),
        RoomStateEvent::Topic(content) => room.set_topic(content.topic),
        RoomStateEvent::Aliases(content) => room.set_aliases(content.aliases),
        RoomStateEvent::CanonicalAlias(content) => room.set_canonical_alias(content.alias),
        RoomStateEvent::Member { user_id, content } => match content.membership {
            MembershipState::Join => {
                room.upsert_member(RoomMember::new(
                    user_id,
                    content.displayname,
                    content.avatar_url,
                ));
            }
            MembershipState::Leave | MembershipState::Ban => {
                room.remove_member(&user_id);
            }
            membership => {
                trace!(%user_id, ?membership, "Ignoring membership change");
                return false;
            }
        },
    }

    true
}
