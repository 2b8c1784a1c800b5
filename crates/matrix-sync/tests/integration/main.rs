use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use matrix_sync::{
    async_trait, config::RequestConfig, sync::SyncResponse, ApiError, Client, ProtocolApi,
    Session, UserId,
};
use matrix_sync_test::DEFAULT_TEST_USER_ID;
use serde_json::Value as JsonValue;
use tokio::sync::Notify;

mod client;
mod http;
mod sync;

matrix_sync_test::init_tracing_for_tests!();

/// A sync request the mock received.
#[derive(Clone, Debug, PartialEq, Eq)]
struct SyncCall {
    since: Option<String>,
    timeout: Duration,
}

/// A [`ProtocolApi`] that answers with scripted results.
///
/// Once the script runs out, sync requests never return, like a long-poll on
/// a quiet server.
#[derive(Debug, Default)]
struct MockApi {
    responses: Mutex<VecDeque<Result<JsonValue, ApiError>>>,
    calls: Mutex<Vec<SyncCall>>,
    registration: Mutex<Option<Result<Session, ApiError>>>,
    restored: Mutex<Option<Session>>,
    hold: Mutex<Option<Arc<Notify>>>,
}

impl MockApi {
    fn new() -> Arc<Self> {
        Arc::default()
    }

    fn respond(&self, response: impl Into<JsonValue>) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(response.into()));
        self
    }

    fn fail(&self, error: ApiError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    fn set_registration(&self, result: Result<Session, ApiError>) {
        *self.registration.lock().unwrap() = Some(result);
    }

    /// Hold back the next sync response until the returned [`Notify`] fires.
    fn hold_next_response(&self) -> Arc<Notify> {
        let release = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some(release.clone());
        release
    }

    fn calls(&self) -> Vec<SyncCall> {
        self.calls.lock().unwrap().clone()
    }

    fn restored_session(&self) -> Option<Session> {
        self.restored.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProtocolApi for MockApi {
    async fn sync(
        &self,
        since: Option<&str>,
        timeout: Duration,
    ) -> Result<SyncResponse, ApiError> {
        self.calls.lock().unwrap().push(SyncCall { since: since.map(ToOwned::to_owned), timeout });

        let hold = self.hold.lock().unwrap().take();
        if let Some(release) = hold {
            release.notified().await;
        }

        let next = self.responses.lock().unwrap().pop_front();

        match next {
            Some(Ok(json)) => {
                serde_json::from_value(json).map_err(|e| ApiError::Protocol(e.to_string()))
            }
            Some(Err(e)) => Err(e),
            None => std::future::pending().await,
        }
    }

    async fn register_guest(&self) -> Result<Session, ApiError> {
        self.registration
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(ApiError::Protocol("no registration scripted".to_owned())))
    }

    fn restore_session(&self, session: &Session) {
        *self.restored.lock().unwrap() = Some(session.clone());
    }
}

fn session() -> Session {
    Session {
        access_token: "1234".to_owned(),
        user_id: UserId::parse(DEFAULT_TEST_USER_ID).unwrap(),
        home_server: "localhost".to_owned(),
        device_id: Some("DEVICEID".to_owned()),
    }
}

/// A logged in client that talks to `api`.
fn client_with_api(api: &Arc<MockApi>) -> Client {
    client_with_config(api, RequestConfig::new())
}

fn client_with_config(api: &Arc<MockApi>, request_config: RequestConfig) -> Client {
    Client::builder()
        .protocol_api(api.clone())
        .session(session())
        .request_config(request_config)
        .build()
        .unwrap()
}

/// Retries that don't slow the tests down.
fn fast_retries() -> RequestConfig {
    RequestConfig::new()
        .initial_retry_interval(Duration::from_millis(1))
        .max_retry_interval(Duration::from_millis(5))
}
