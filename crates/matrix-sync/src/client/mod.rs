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

use std::{collections::BTreeMap, fmt, future::Future, sync::Arc};

use matrix_sync_base::{
    listeners::{
        EventFilter, InvitedRoomUpdate, LeftRoomUpdate, ListenerHandle, ListenerResult,
        SyncRoomEvent, UserFilter,
    },
    events::Event,
    BaseClient, Room, RoomId, Session, SyncSummary, UserId,
};
use tracing::{debug, instrument};

use crate::{
    api::ProtocolApi,
    config::SyncSettings,
    error::Result,
    sync::{LoopCtrl, StopHandle, SyncEngine},
};

mod builder;

pub use self::builder::ClientBuilder;

/// An async/await enabled Matrix client.
///
/// All of the state is held in an `Arc` so the `Client` can be cloned freely.
#[derive(Clone)]
pub struct Client {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    base: BaseClient,
    api: Arc<dyn ProtocolApi>,
    engine: SyncEngine,
    sync_settings: SyncSettings,
}

#[cfg(not(tarpaulin_include))]
impl fmt::Debug for Client {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Client")
            .field("user_id", &self.user_id())
            .field("api", &self.inner.api)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a new [`ClientBuilder`].
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(crate) fn from_parts(
        base: BaseClient,
        api: Arc<dyn ProtocolApi>,
        engine: SyncEngine,
        sync_settings: SyncSettings,
    ) -> Self {
        Self { inner: Arc::new(ClientInner { base, api, engine, sync_settings }) }
    }

    /// The no-IO client holding the room state of this client.
    pub fn base_client(&self) -> &BaseClient {
        &self.inner.base
    }

    /// The user this client is logged in as, if any.
    pub fn user_id(&self) -> Option<UserId> {
        self.inner.base.user_id()
    }

    /// The current session, if any.
    pub fn session(&self) -> Option<Session> {
        self.inner.base.session()
    }

    /// Whether the client has credentials.
    pub fn logged_in(&self) -> bool {
        self.inner.base.logged_in()
    }

    /// Restore a previously saved session.
    ///
    /// The access token is used for every following request.
    pub fn restore_session(&self, session: Session) {
        debug!(user_id = %session.user_id, "Restoring session");
        self.inner.api.restore_session(&session);
        self.inner.base.set_session(session);
    }

    /// Register a guest account and run one sync with it.
    ///
    /// The new credentials are stored before the sync starts, the sync uses
    /// the settings the client was built with. A stop requested before this
    /// call doesn't prevent that sync, it stays pending for the next one.
    ///
    /// # Errors
    ///
    /// Fails if the registration or the sync fails, the session is kept if
    /// only the sync failed.
    #[instrument(skip(self))]
    pub async fn register_as_guest(&self) -> Result<Session> {
        let session = self.inner.api.register_guest().await?;
        self.restore_session(session.clone());

        self.inner.engine.setup_sync(self.inner.sync_settings.clone()).await?;

        Ok(session)
    }

    /// The sync token of the last successful sync.
    ///
    /// Persist it to resume syncing where the client left off after a
    /// restart.
    pub fn sync_token(&self) -> Option<String> {
        self.inner.base.sync_token()
    }

    /// Set the token the next sync continues from, `None` makes the next sync
    /// an initial one.
    pub fn set_sync_token(&self, token: Option<String>) {
        self.inner.base.set_sync_token(token);
    }

    /// A snapshot of all rooms the client knows about.
    pub fn get_rooms(&self) -> BTreeMap<RoomId, Room> {
        self.inner.base.rooms().all()
    }

    /// Get the room with the given ID, if it is known.
    pub fn get_room(&self, room_id: &str) -> Option<Room> {
        self.inner.base.get_room(room_id)
    }

    /// Get the room with the given ID, creating an empty one if it isn't
    /// known yet.
    ///
    /// # Errors
    ///
    /// Fails if `room_id` isn't a valid room ID.
    pub fn get_or_create_room(&self, room_id: &str) -> Result<Room> {
        Ok(self.inner.base.rooms().get_or_create(room_id)?)
    }

    /// Register a listener for all events of joined rooms.
    ///
    /// State events of a room are delivered before its timeline events. The
    /// callback runs on the sync task, long running work should be moved
    /// elsewhere.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn example(client: matrix_sync::Client) {
    /// let handle = client.add_listener(|event| {
    ///     println!("{} in {}", event.event.event_type().unwrap_or("?"), event.room_id);
    /// });
    ///
    /// client.remove_listener(handle);
    /// # }
    /// ```
    pub fn add_listener<F, R>(&self, callback: F) -> ListenerHandle
    where
        F: Fn(&SyncRoomEvent) -> R + Send + Sync + 'static,
        R: ListenerResult,
    {
        self.inner.base.listeners().global.add(callback)
    }

    /// Register a listener for the events of joined rooms `filter` accepts.
    pub fn add_listener_with_filter<F, R>(&self, filter: EventFilter, callback: F) -> ListenerHandle
    where
        F: Fn(&SyncRoomEvent) -> R + Send + Sync + 'static,
        R: ListenerResult,
    {
        self.inner.base.listeners().global.add_with_filter(move |e| filter.matches(e), callback)
    }

    /// Remove a listener, unknown handles are ignored.
    pub fn remove_listener(&self, handle: ListenerHandle) {
        self.inner.base.listeners().global.remove(handle);
    }

    /// Register a listener for presence events.
    pub fn add_presence_listener<F, R>(&self, callback: F) -> ListenerHandle
    where
        F: Fn(&Event) -> R + Send + Sync + 'static,
        R: ListenerResult,
    {
        self.inner.base.listeners().presence.add(callback)
    }

    /// Register a listener for the presence events of the given users.
    pub fn add_presence_listener_with_filter<F, R>(
        &self,
        users: impl IntoIterator<Item = UserId>,
        callback: F,
    ) -> ListenerHandle
    where
        F: Fn(&Event) -> R + Send + Sync + 'static,
        R: ListenerResult,
    {
        let filter = UserFilter::new(users);
        self.inner.base.listeners().presence.add_with_filter(move |e| filter.matches(e), callback)
    }

    /// Remove a presence listener, unknown handles are ignored.
    pub fn remove_presence_listener(&self, handle: ListenerHandle) {
        self.inner.base.listeners().presence.remove(handle);
    }

    /// Register a listener for rooms the user gets invited to.
    pub fn add_invite_listener<F, R>(&self, callback: F) -> ListenerHandle
    where
        F: Fn(&InvitedRoomUpdate) -> R + Send + Sync + 'static,
        R: ListenerResult,
    {
        self.inner.base.listeners().invite.add(callback)
    }

    /// Remove an invite listener, unknown handles are ignored.
    pub fn remove_invite_listener(&self, handle: ListenerHandle) {
        self.inner.base.listeners().invite.remove(handle);
    }

    /// Register a listener for rooms the user left.
    ///
    /// The room is still known to the client while the callback runs, it is
    /// dropped afterwards.
    pub fn add_leave_listener<F, R>(&self, callback: F) -> ListenerHandle
    where
        F: Fn(&LeftRoomUpdate) -> R + Send + Sync + 'static,
        R: ListenerResult,
    {
        self.inner.base.listeners().leave.add(callback)
    }

    /// Remove a leave listener, unknown handles are ignored.
    pub fn remove_leave_listener(&self, handle: ListenerHandle) {
        self.inner.base.listeners().leave.remove(handle);
    }

    /// Register a listener for ephemeral events, like typing notifications
    /// and read receipts, of joined rooms.
    pub fn add_ephemeral_listener<F, R>(&self, callback: F) -> ListenerHandle
    where
        F: Fn(&SyncRoomEvent) -> R + Send + Sync + 'static,
        R: ListenerResult,
    {
        self.inner.base.listeners().ephemeral.add(callback)
    }

    /// Register a listener for the ephemeral events `filter` accepts.
    pub fn add_ephemeral_listener_with_filter<F, R>(
        &self,
        filter: EventFilter,
        callback: F,
    ) -> ListenerHandle
    where
        F: Fn(&SyncRoomEvent) -> R + Send + Sync + 'static,
        R: ListenerResult,
    {
        self.inner.base.listeners().ephemeral.add_with_filter(move |e| filter.matches(e), callback)
    }

    /// Remove an ephemeral listener, unknown handles are ignored.
    pub fn remove_ephemeral_listener(&self, handle: ListenerHandle) {
        self.inner.base.listeners().ephemeral.remove(handle);
    }

    /// Synchronize the client's state with the latest state on the server.
    ///
    /// Runs exactly one sync cycle without retrying. The rooms and the sync
    /// token are updated and the listeners called before this returns.
    ///
    /// # Arguments
    ///
    /// * `sync_settings` - Settings for the sync call, this allows us to set
    ///   the [long polling] timeout and the token to sync from.
    ///
    /// # Errors
    ///
    /// [`Error::Cancelled`] if the sync was stopped, [`Error::Api`] if the
    /// server couldn't be reached or rejected the request. The sync token
    /// isn't advanced in either case.
    ///
    /// [long polling]: crate::config::SyncSettings::timeout
    /// [`Error::Cancelled`]: crate::Error::Cancelled
    /// [`Error::Api`]: crate::Error::Api
    pub async fn sync_once(&self, sync_settings: SyncSettings) -> Result<SyncSummary> {
        self.inner.engine.sync_once(sync_settings).await
    }

    /// Repeatedly synchronize the client state with the server.
    ///
    /// This method only returns on a permanent error or after
    /// [`Client::stop_sync`] was called.
    ///
    /// # Arguments
    ///
    /// * `sync_settings` - Settings for the sync call. *Note* that those
    ///   settings will be only used for the first sync call, later ones use
    ///   the token of the previous response.
    pub async fn sync(&self, sync_settings: SyncSettings) -> Result<()> {
        self.inner.engine.sync(sync_settings).await
    }

    /// Repeatedly call sync to synchronize the client state with the server.
    ///
    /// # Arguments
    ///
    /// * `sync_settings` - Settings for the sync call. *Note* that those
    ///   settings will be only used for the first sync call.
    ///
    /// * `callback` - A callback that will be called every time a successful
    ///   response has been processed. If the callback returns
    ///   `LoopCtrl::Continue` the sync will continue, if the callback returns
    ///   `LoopCtrl::Break` the sync will be stopped.
    ///
    /// # Return
    ///
    /// `Ok(())` if the callback or a [`StopHandle`] stopped the loop, the
    /// error otherwise. Transient errors are retried as configured by the
    /// [`RequestConfig`](crate::config::RequestConfig) first.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use matrix_sync::{config::SyncSettings, Client, LoopCtrl};
    /// # async fn example(client: Client) -> matrix_sync::Result<()> {
    /// client
    ///     .sync_with_callback(SyncSettings::new(), |summary| async move {
    ///         println!("Synced up to {}", summary.next_batch);
    ///
    ///         if summary.joined_rooms.is_empty() {
    ///             LoopCtrl::Continue
    ///         } else {
    ///             LoopCtrl::Break
    ///         }
    ///     })
    ///     .await
    /// # }
    /// ```
    pub async fn sync_with_callback<C>(
        &self,
        sync_settings: SyncSettings,
        callback: impl Fn(SyncSummary) -> C,
    ) -> Result<()>
    where
        C: Future<Output = LoopCtrl>,
    {
        self.inner.engine.sync_with_callback(sync_settings, callback).await
    }

    /// Ask the running sync to stop.
    ///
    /// If no sync is running, the next one is stopped before it polls the
    /// server.
    pub fn stop_sync(&self) {
        self.inner.engine.stop_handle().stop();
    }

    /// A handle that stops the syncs of this client.
    pub fn stop_handle(&self) -> StopHandle {
        self.inner.engine.stop_handle()
    }
}
