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

#![doc = include_str!("../README.md")]
#![warn(missing_debug_implementations, missing_docs)]

pub use async_trait::async_trait;
pub use matrix_sync_base::{
    events, listeners,
    listeners::{
        EventFilter, EventOrigin, InvitedRoomUpdate, LeftRoomUpdate, ListenerHandle,
        ListenerKind, SyncRoomEvent, UserFilter,
    },
    BaseClient, IdParseError, Room, RoomDirectory, RoomId, RoomInfo, RoomMember, Session,
    SyncSummary, UserId,
};
pub use reqwest;

mod api;
mod client;
pub mod config;
mod error;
mod http_client;
pub mod sync;

pub use api::ProtocolApi;
pub use client::{Client, ClientBuilder};
pub use error::{ApiError, Error, Result};
pub use http_client::HttpProtocolApi;
pub use sync::{LoopCtrl, StopHandle, SyncEngine};
