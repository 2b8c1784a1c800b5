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

use std::sync::Arc;

use matrix_sync_base::{BaseClient, Session, DEFAULT_TIMELINE_LIMIT};
use tracing::debug;
use url::Url;

use super::Client;
use crate::{
    api::ProtocolApi,
    config::{RequestConfig, SyncSettings},
    error::{Error, Result},
    http_client::HttpProtocolApi,
    sync::SyncEngine,
};

/// Builder that allows creating and configuring various parts of a [`Client`].
///
/// Either a homeserver URL or a custom [`ProtocolApi`] has to be set.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use matrix_sync::{config::RequestConfig, Client};
/// use url::Url;
///
/// let client = Client::builder()
///     .homeserver_url(Url::parse("https://example.org")?)
///     .request_config(RequestConfig::short_retry())
///     .room_event_history_limit(50)
///     .user_agent("MyApp/v3.0")
///     .build()?;
/// # anyhow::Ok(())
/// ```
#[must_use]
#[derive(Clone, Debug)]
pub struct ClientBuilder {
    homeserver_url: Option<Url>,
    protocol_api: Option<Arc<dyn ProtocolApi>>,
    session: Option<Session>,
    request_config: RequestConfig,
    sync_settings: SyncSettings,
    room_event_history_limit: usize,
    user_agent: Option<String>,
}

impl ClientBuilder {
    pub(crate) fn new() -> Self {
        Self {
            homeserver_url: None,
            protocol_api: None,
            session: None,
            request_config: Default::default(),
            sync_settings: Default::default(),
            room_event_history_limit: DEFAULT_TIMELINE_LIMIT,
            user_agent: None,
        }
    }

    /// Set the homeserver URL to use.
    ///
    /// Ignored if a [`protocol_api()`](Self::protocol_api) is set.
    pub fn homeserver_url(mut self, url: Url) -> Self {
        self.homeserver_url = Some(url);
        self
    }

    /// Talk to the homeserver through the given API instead of the built-in
    /// HTTP one.
    pub fn protocol_api(mut self, api: Arc<dyn ProtocolApi>) -> Self {
        self.protocol_api = Some(api);
        self
    }

    /// Restore a previously saved session.
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Set the default timeout and retry policy.
    pub fn request_config(mut self, request_config: RequestConfig) -> Self {
        self.request_config = request_config;
        self
    }

    /// The settings of the sync [`Client::register_as_guest`] runs.
    pub fn sync_settings(mut self, sync_settings: SyncSettings) -> Self {
        self.sync_settings = sync_settings;
        self
    }

    /// How many of the latest timeline events every room keeps, 20 by
    /// default.
    pub fn room_event_history_limit(mut self, limit: usize) -> Self {
        self.room_event_history_limit = limit;
        self
    }

    /// Set a custom HTTP user agent for the client.
    pub fn user_agent(mut self, user_agent: impl AsRef<str>) -> Self {
        self.user_agent = Some(user_agent.as_ref().to_owned());
        self
    }

    /// Create a [`Client`] with the options set on this builder.
    ///
    /// # Errors
    ///
    /// This method can fail for two general reasons:
    ///
    /// * Neither a homeserver URL nor a protocol API was set, or the URL
    ///   can't be used as a base for the API paths
    /// * The HTTP client couldn't be created
    pub fn build(self) -> Result<Client> {
        let api = match (self.protocol_api, self.homeserver_url) {
            (Some(api), _) => api,
            (None, Some(url)) => {
                debug!(homeserver = %url, "Using the HTTP API");
                Arc::new(HttpProtocolApi::new(url, self.request_config, self.user_agent)?)
            }
            (None, None) => return Err(Error::MissingHomeserver),
        };

        let base = BaseClient::with_timeline_limit(self.room_event_history_limit);
        let engine = SyncEngine::new(base.clone(), api.clone(), self.request_config);
        let client = Client::from_parts(base, api, engine, self.sync_settings);

        if let Some(session) = self.session {
            client.restore_session(session);
        }

        Ok(client)
    }
}
