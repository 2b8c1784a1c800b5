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

#![doc = include_str!("../README.md")]
#![warn(missing_debug_implementations)]

mod client;
mod directory;
pub mod events;
mod identifiers;
pub mod listeners;
mod room;
mod session;
pub mod sync;

pub use client::{BaseClient, Listeners, SyncMode, SyncSummary};
pub use directory::RoomDirectory;
pub use identifiers::{IdParseError, RoomId, UserId};
pub use room::{apply_state_event, Room, RoomInfo, RoomMember, DEFAULT_TIMELINE_LIMIT};
pub use session::Session;

#[cfg(test)]
matrix_sync_test::init_tracing_for_tests!();
