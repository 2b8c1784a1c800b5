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

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        RwLock,
    },
    time::Duration,
};

use async_trait::async_trait;
use matrix_sync_base::{sync::SyncResponse, Session, UserId};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use tracing::{debug, instrument, trace, Span};
use url::Url;

use crate::{
    api::ProtocolApi,
    config::RequestConfig,
    error::{ApiError, Result},
};

pub(crate) const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_USER_AGENT: &str = concat!("matrix-sync/", env!("CARGO_PKG_VERSION"));

/// A [`ProtocolApi`] talking to a homeserver over HTTP, using the `r0`
/// client-server API.
#[derive(Debug)]
pub struct HttpProtocolApi {
    homeserver: Url,
    inner: reqwest::Client,
    request_config: RequestConfig,
    access_token: RwLock<Option<String>>,
    next_request_id: AtomicU64,
}

/// The error body of the client-server API.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    errcode: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    access_token: String,
    user_id: String,
    device_id: Option<String>,
    home_server: Option<String>,
}

impl HttpProtocolApi {
    /// Create a new API for the homeserver at `homeserver`.
    ///
    /// # Arguments
    ///
    /// * `homeserver` - The base URL of the homeserver, the API paths are
    ///   appended to it.
    ///
    /// * `request_config` - Timeouts of the HTTP requests.
    ///
    /// * `user_agent` - Sent with every request, defaults to `matrix-sync`
    ///   and the crate version.
    pub fn new(
        homeserver: Url,
        request_config: RequestConfig,
        user_agent: Option<String>,
    ) -> Result<Self> {
        if homeserver.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }

        let user_agent = user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());
        let inner = reqwest::Client::builder().user_agent(user_agent).build()?;

        Ok(Self {
            homeserver,
            inner,
            request_config,
            access_token: RwLock::new(None),
            next_request_id: AtomicU64::new(0),
        })
    }

    /// The homeserver this API talks to.
    pub fn homeserver(&self) -> &Url {
        &self.homeserver
    }

    /// The access token sent with the requests, if any.
    pub fn access_token(&self) -> Option<String> {
        self.access_token.read().unwrap().clone()
    }

    fn get_request_id(&self) -> String {
        let request_id = self.next_request_id.fetch_add(1, Ordering::SeqCst);
        format!("REQ-{request_id}")
    }

    fn endpoint(&self, endpoint: &str) -> Url {
        let mut url = self.homeserver.clone();

        // Only fails for cannot-be-a-base URLs, which `new()` rejects.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["_matrix", "client", "r0", endpoint]);
        }

        url
    }

    fn authenticated(&self, request: RequestBuilder) -> RequestBuilder {
        match self.access_token.read().unwrap().as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        Span::current().record("request_id", self.get_request_id());

        let response = request.send().await.map_err(|e| {
            debug!("Error while sending request: {e}");
            ApiError::transport(e)
        })?;

        Span::current().record("status", response.status().as_u16());

        response_to_result(response).await
    }
}

async fn response_to_result<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().await.map_err(ApiError::transport)?;

    if status.is_success() {
        trace!(response_size = body.len(), "Got response");
        return serde_json::from_slice(&body).map_err(|e| ApiError::Protocol(e.to_string()));
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            let ErrorBody { errcode, error } = serde_json::from_slice(&body).unwrap_or_default();
            Err(ApiError::Auth { status: status.as_u16(), errcode, message: error })
        }
        StatusCode::TOO_MANY_REQUESTS => Err(ApiError::Server { status: status.as_u16() }),
        _ if status.is_server_error() => Err(ApiError::Server { status: status.as_u16() }),
        _ => Err(ApiError::Protocol(format!("unexpected response status {status}"))),
    }
}

#[async_trait]
impl ProtocolApi for HttpProtocolApi {
    #[instrument(skip(self), fields(request_id, status))]
    async fn sync(
        &self,
        since: Option<&str>,
        timeout: Duration,
    ) -> Result<SyncResponse, ApiError> {
        let mut query = vec![("timeout", timeout.as_millis().to_string())];
        if let Some(since) = since {
            query.push(("since", since.to_owned()));
        }

        let request = self
            .inner
            .get(self.endpoint("sync"))
            .query(&query)
            .timeout(self.request_config.timeout + timeout);

        self.send(self.authenticated(request)).await
    }

    #[instrument(skip(self), fields(request_id, status))]
    async fn register_guest(&self) -> Result<Session, ApiError> {
        let request = self
            .inner
            .post(self.endpoint("register"))
            .query(&[("kind", "guest")])
            .json(&json!({}))
            .timeout(self.request_config.timeout);

        let response: RegisterResponse = self.send(request).await?;

        let user_id = UserId::parse(response.user_id)
            .map_err(|e| ApiError::Protocol(format!("invalid user ID in the response: {e}")))?;
        let home_server = response
            .home_server
            .or_else(|| self.homeserver.host_str().map(ToOwned::to_owned))
            .unwrap_or_else(|| user_id.server_name().to_owned());

        let session = Session {
            access_token: response.access_token,
            user_id,
            home_server,
            device_id: response.device_id,
        };

        self.restore_session(&session);
        debug!(user_id = %session.user_id, "Registered a guest account");

        Ok(session)
    }

    fn restore_session(&self, session: &Session) {
        *self.access_token.write().unwrap() = Some(session.access_token.clone());
    }
}
