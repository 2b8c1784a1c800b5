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

//! The sync loop and the types of the `/sync` response.

use std::{future::Future, sync::Arc, time::Duration};

use backoff::backoff::Backoff;
use matrix_sync_base::{BaseClient, SyncSummary};
pub use matrix_sync_base::sync::{
    Events, InvitedRoom, JoinedRoom, LeftRoom, Rooms, SyncResponse, Timeline,
};
use tokio::sync::watch;
use tracing::{debug, error, instrument, trace, warn, Span};

use crate::{
    api::ProtocolApi,
    config::{RequestConfig, SyncSettings},
    error::{Error, Result},
};

/// Enum controlling if a loop running callbacks should continue or abort.
///
/// This is mainly used in the [`sync_with_callback`] method, the return value
/// of the provided callback controls if the sync loop should be exited.
///
/// [`sync_with_callback`]: crate::Client::sync_with_callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopCtrl {
    /// Continue running the loop.
    Continue,
    /// Break out of the loop.
    Break,
}

/// Cooperative stop signal for a running sync.
///
/// A stop request cancels an in-flight long-poll, interrupts the wait between
/// two retries, or, if no sync is running, prevents the next one from
/// starting. It is consumed by the sync call that observes it.
#[derive(Clone, Debug)]
pub struct StopHandle {
    requested: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    pub(crate) fn new() -> Self {
        let (requested, _) = watch::channel(false);
        Self { requested: Arc::new(requested) }
    }

    /// Ask the sync to stop.
    pub fn stop(&self) {
        debug!("Sync stop requested");
        self.requested.send_replace(true);
    }

    /// Whether a stop was requested that no sync observed yet.
    pub fn is_stop_requested(&self) -> bool {
        *self.requested.borrow()
    }

    /// Consume a pending stop request.
    fn take(&self) -> bool {
        self.requested.send_replace(false)
    }

    /// Resolves once a stop is requested.
    async fn requested(&self) {
        let mut receiver = self.requested.subscribe();
        // The sender lives as long as `self`, so this can't fail.
        let _ = receiver.wait_for(|requested| *requested).await;
    }
}

/// Polls the homeserver and feeds the responses to a [`BaseClient`].
#[derive(Clone, Debug)]
pub struct SyncEngine {
    base: BaseClient,
    api: Arc<dyn ProtocolApi>,
    request_config: RequestConfig,
    stop: StopHandle,
}

impl SyncEngine {
    /// Create an engine that fetches responses through `api` and hands them
    /// to `base`.
    pub fn new(base: BaseClient, api: Arc<dyn ProtocolApi>, request_config: RequestConfig) -> Self {
        Self { base, api, request_config, stop: StopHandle::new() }
    }

    /// The client the responses are fed to.
    pub fn base(&self) -> &BaseClient {
        &self.base
    }

    /// A handle to stop this engine's syncs.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run a single sync cycle.
    ///
    /// The sync token is only advanced if the response arrived, failed
    /// cycles leave the room state and the token untouched.
    ///
    /// # Errors
    ///
    /// [`Error::Cancelled`] if a stop was requested before or during the
    /// long-poll, [`Error::Api`] if the call failed. Nothing is retried.
    pub async fn sync_once(&self, sync_settings: SyncSettings) -> Result<SyncSummary> {
        let timeout = sync_settings.timeout;
        self.poll(&sync_settings, timeout).await
    }

    /// Run the single sync cycle that completes a client's setup.
    ///
    /// A stop that was requested before this call is meant for the caller's
    /// own syncs: it doesn't cancel this cycle and is still pending afterwards.
    /// A stop requested while this cycle runs cancels it as usual.
    pub(crate) async fn setup_sync(&self, sync_settings: SyncSettings) -> Result<SyncSummary> {
        let pending_stop = self.stop.take();
        let result = self.sync_once(sync_settings).await;

        if pending_stop {
            trace!("Restoring the stop request that predates the setup sync");
            self.stop.requested.send_replace(true);
        }

        result
    }

    #[instrument(skip_all, fields(since, ?timeout))]
    async fn poll(&self, sync_settings: &SyncSettings, timeout: Duration) -> Result<SyncSummary> {
        if self.stop.take() {
            debug!("Not syncing, a stop was requested");
            return Err(Error::Cancelled);
        }

        let since = sync_settings.token.resolve(self.base.sync_token());
        if let Some(since) = &since {
            Span::current().record("since", since.as_str());
        }

        trace!("Syncing");
        // A response that already arrived wins over a stop requested in the
        // same wakeup, the stop is then left for the next sync.
        let response = tokio::select! {
            biased;

            response = self.api.sync(since.as_deref(), timeout) => response?,
            _ = self.stop.requested() => {
                self.stop.take();
                debug!("Sync was cancelled while waiting for the server");
                return Err(Error::Cancelled);
            }
        };

        Ok(self.base.receive_sync_response(response))
    }

    /// Repeatedly run sync cycles until the callback breaks the loop, a stop
    /// is requested or a permanent error occurs.
    ///
    /// Transient errors are retried with an exponential backoff, bounded by
    /// the [`RequestConfig`] of the engine. A successful cycle resets the
    /// backoff.
    #[instrument(skip_all)]
    pub async fn sync_with_callback<C>(
        &self,
        mut sync_settings: SyncSettings,
        callback: impl Fn(SyncSummary) -> C,
    ) -> Result<()>
    where
        C: Future<Output = LoopCtrl>,
    {
        let mut timeout = sync_settings.first_loop_timeout();
        let mut backoff = self.request_config.backoff();
        let mut retries = 0;

        loop {
            let error = match self.poll(&sync_settings, timeout).await {
                Ok(summary) => {
                    backoff.reset();
                    retries = 0;
                    sync_settings = sync_settings.for_next_iteration();
                    timeout = sync_settings.timeout;

                    trace!("Running callback");
                    if callback(summary).await == LoopCtrl::Break {
                        trace!("Callback told us to stop");
                        return Ok(());
                    }

                    continue;
                }
                Err(Error::Cancelled) => {
                    debug!("Sync loop stopped");
                    return Ok(());
                }
                Err(Error::Api(e)) if e.is_transient() => e,
                Err(e) => {
                    error!("Sync failed permanently: {e}");
                    return Err(e);
                }
            };

            let limit_reached = self.request_config.retry_limit.is_some_and(|l| retries >= l);
            let wait = if limit_reached { None } else { backoff.next_backoff() };

            let Some(wait) = wait else {
                error!(retries, "Giving up on syncing: {error}");
                return Err(error.into());
            };

            retries += 1;
            warn!(retries, ?wait, "Sync failed, retrying: {error}");

            tokio::select! {
                biased;

                _ = self.stop.requested() => {
                    self.stop.take();
                    debug!("Sync loop stopped while waiting to retry");
                    return Ok(());
                }
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    /// Repeatedly run sync cycles, see [`SyncEngine::sync_with_callback`].
    pub async fn sync(&self, sync_settings: SyncSettings) -> Result<()> {
        self.sync_with_callback(sync_settings, |_| async { LoopCtrl::Continue }).await
    }
}
