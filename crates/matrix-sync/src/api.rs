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

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use matrix_sync_base::{sync::SyncResponse, Session};

use crate::error::ApiError;

/// The homeserver calls the sync engine depends on.
///
/// [`HttpProtocolApi`](crate::HttpProtocolApi) talks to a real homeserver,
/// tests and alternative transports can implement this trait themselves and
/// hand it to [`ClientBuilder::protocol_api`](crate::ClientBuilder::protocol_api).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use matrix_sync::{
///     async_trait,
///     sync::SyncResponse,
///     ApiError, ProtocolApi, Session,
/// };
///
/// #[derive(Debug)]
/// struct Offline;
///
/// #[async_trait]
/// impl ProtocolApi for Offline {
///     async fn sync(
///         &self,
///         _since: Option<&str>,
///         _timeout: Duration,
///     ) -> Result<SyncResponse, ApiError> {
///         Err(ApiError::Protocol("offline".to_owned()))
///     }
///
///     async fn register_guest(&self) -> Result<Session, ApiError> {
///         Err(ApiError::Protocol("offline".to_owned()))
///     }
/// }
/// ```
#[async_trait]
pub trait ProtocolApi: Debug + Send + Sync {
    /// Fetch everything that happened since `since`, or a full snapshot if
    /// `since` is `None`.
    ///
    /// The server may hold the request for up to `timeout` if nothing
    /// happened.
    async fn sync(&self, since: Option<&str>, timeout: Duration)
        -> Result<SyncResponse, ApiError>;

    /// Register a new guest account.
    async fn register_guest(&self) -> Result<Session, ApiError>;

    /// Use the given credentials for subsequent calls.
    fn restore_session(&self, _session: &Session) {}
}
