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

use std::time::Duration;

const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(30);

/// Token to be used in the next sync request.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub enum SyncToken {
    /// Provide a specific token.
    Specific(String),
    /// Enforce no tokens at all, the server sends a full snapshot.
    NoToken,
    /// Use a previous token if the client saw one in the past, and none
    /// otherwise.
    ///
    /// This is the default value.
    #[default]
    ReusePrevious,
}

impl<T> From<T> for SyncToken
where
    T: Into<String>,
{
    fn from(token: T) -> SyncToken {
        SyncToken::Specific(token.into())
    }
}

impl SyncToken {
    /// Convert a token that may exist into a [`SyncToken`]
    pub fn from_optional_token(maybe_token: Option<String>) -> SyncToken {
        match maybe_token {
            Some(token) => SyncToken::Specific(token),
            None => SyncToken::default(),
        }
    }

    /// The token to send, given the one the client currently stores.
    pub(crate) fn resolve(&self, stored: Option<String>) -> Option<String> {
        match self {
            SyncToken::Specific(token) => Some(token.clone()),
            SyncToken::NoToken => None,
            SyncToken::ReusePrevious => stored,
        }
    }
}

/// Settings for a sync call.
#[derive(Clone, Debug)]
pub struct SyncSettings {
    pub(crate) timeout: Duration,
    pub(crate) ignore_timeout_on_first_sync: bool,
    pub(crate) token: SyncToken,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncSettings {
    /// Create new default sync settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_SYNC_TIMEOUT,
            ignore_timeout_on_first_sync: false,
            token: SyncToken::default(),
        }
    }

    /// Set the sync token.
    ///
    /// # Arguments
    ///
    /// * `token` - The sync token that should be used for the sync call.
    #[must_use]
    pub fn token(mut self, token: impl Into<SyncToken>) -> Self {
        self.token = token.into();
        self
    }

    /// Set the maximum time the server can wait before responding to the sync
    /// request.
    ///
    /// # Arguments
    ///
    /// * `timeout` - The time the server is allowed to wait.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether to ignore the `timeout` the first time that the `/sync` endpoint
    /// is called.
    ///
    /// If there is no new data to show, the server will wait until the end of
    /// `timeout` before returning a response. By using a zero timeout on the
    /// first request the homeserver replies immediately, whether the
    /// response is empty or not.
    ///
    /// Note that this setting is ignored when calling [`Client::sync_once()`],
    /// because there is no loop happening.
    ///
    /// [`Client::sync_once()`]: crate::Client::sync_once
    #[must_use]
    pub fn ignore_timeout_on_first_sync(mut self, ignore: bool) -> Self {
        self.ignore_timeout_on_first_sync = ignore;
        self
    }

    /// The settings of the iterations after the first one of a sync loop.
    pub(crate) fn for_next_iteration(mut self) -> Self {
        self.token = SyncToken::ReusePrevious;
        self.ignore_timeout_on_first_sync = false;
        self
    }

    /// The long-poll timeout of the first iteration of a sync loop.
    pub(crate) fn first_loop_timeout(&self) -> Duration {
        if self.ignore_timeout_on_first_sync {
            Duration::ZERO
        } else {
            self.timeout
        }
    }
}
