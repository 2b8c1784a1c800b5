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

use crate::identifiers::UserId;

/// A joined member of a room.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomMember {
    user_id: UserId,
    display_name: Option<String>,
    avatar_url: Option<String>,
}

impl RoomMember {
    pub fn new(user_id: UserId, display_name: Option<String>, avatar_url: Option<String>) -> Self {
        Self { user_id, display_name, avatar_url }
    }

    /// The ID of the member.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The display name the member set for this room, if any.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// The avatar the member set for this room, if any.
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    /// The display name of the member, or its user ID if it has none.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(self.user_id.as_str())
    }
}
