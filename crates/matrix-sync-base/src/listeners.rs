// Copyright 2021 Jonas Platte
// Copyright 2022 Famedly GmbH
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

//! Listener registration and dispatch.
//!
//! ### How it works
//!
//! A [`ListenerRegistry`] keeps a list of callbacks in registration order,
//! each with an optional filter. Adding a callback hands out a
//! [`ListenerHandle`] which is the only way to remove it again.
//!
//! [`ListenerRegistry::dispatch`] takes a snapshot of the list before calling
//! anything, so callbacks are free to add or remove listeners while they run.
//! Listeners added during a dispatch are not called by it, listeners removed
//! during a dispatch are skipped if they haven't been called yet.
//!
//! A callback may return `()` or a `Result<(), E>`. Errors and panics are
//! logged and the remaining callbacks still run, a broken listener never
//! reaches the sync loop.

use std::{
    any::Any,
    collections::BTreeSet,
    fmt,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering::SeqCst},
        Arc, RwLock,
    },
};

use thiserror::Error;
use tracing::error;

use crate::{
    events::Event,
    identifiers::{RoomId, UserId},
};

/// The class of listeners a [`ListenerHandle`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListenerKind {
    /// Room events of joined rooms.
    Global,
    /// `m.presence` events.
    Presence,
    /// Rooms the user got invited to.
    Invite,
    /// Rooms the user left.
    Leave,
    /// Ephemeral events of joined rooms, e.g. typing notifications.
    Ephemeral,
}

/// Handle to remove a registered listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerHandle {
    kind: ListenerKind,
    id: u64,
}

impl ListenerHandle {
    /// The class of listeners the handle belongs to.
    pub fn kind(&self) -> ListenerKind {
        self.kind
    }
}

/// A listener that failed while handling a payload.
#[derive(Debug, Error)]
#[error("{kind:?} listener {id} {failure}", kind = .handle.kind, id = .handle.id)]
pub struct ListenerError {
    /// The listener that failed.
    pub handle: ListenerHandle,
    /// How it failed.
    pub failure: ListenerFailure,
}

/// The way a listener failed.
#[derive(Debug, Error)]
pub enum ListenerFailure {
    /// The callback returned an error.
    #[error("failed: {0}")]
    Failed(String),
    /// The callback panicked.
    #[error("panicked: {0}")]
    Panicked(String),
}

/// Return types supported for listeners implement this trait.
///
/// It is not meant to be implemented outside of this crate.
pub trait ListenerResult {
    #[doc(hidden)]
    fn into_failure(self) -> Option<String>;
}

impl ListenerResult for () {
    fn into_failure(self) -> Option<String> {
        None
    }
}

impl<E: fmt::Display> ListenerResult for Result<(), E> {
    fn into_failure(self) -> Option<String> {
        self.err().map(|e| e.to_string())
    }
}

type ListenerFn<P> = dyn Fn(&P) -> Option<String> + Send + Sync;
type FilterFn<P> = dyn Fn(&P) -> bool + Send + Sync;

struct Registration<P> {
    id: u64,
    filter: Option<Box<FilterFn<P>>>,
    callback: Box<ListenerFn<P>>,
    active: AtomicBool,
}

/// An ordered set of callbacks for one kind of payload.
pub struct ListenerRegistry<P> {
    kind: ListenerKind,
    listeners: RwLock<Vec<Arc<Registration<P>>>>,
    counter: AtomicU64,
}

impl<P> fmt::Debug for ListenerRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("kind", &self.kind)
            .field("len", &self.len())
            .finish()
    }
}

impl<P> ListenerRegistry<P> {
    /// Create an empty registry, handles it gives out carry `kind`.
    pub fn new(kind: ListenerKind) -> Self {
        Self { kind, listeners: Default::default(), counter: AtomicU64::new(0) }
    }

    /// The kind of listeners this registry holds.
    pub fn kind(&self) -> ListenerKind {
        self.kind
    }

    /// Register a callback that gets every payload.
    pub fn add<F, R>(&self, callback: F) -> ListenerHandle
    where
        F: Fn(&P) -> R + Send + Sync + 'static,
        R: ListenerResult,
    {
        self.insert(None, callback)
    }

    /// Register a callback that only gets the payloads `filter` accepts.
    pub fn add_with_filter<G, F, R>(&self, filter: G, callback: F) -> ListenerHandle
    where
        G: Fn(&P) -> bool + Send + Sync + 'static,
        F: Fn(&P) -> R + Send + Sync + 'static,
        R: ListenerResult,
    {
        self.insert(Some(Box::new(filter)), callback)
    }

    fn insert<F, R>(&self, filter: Option<Box<FilterFn<P>>>, callback: F) -> ListenerHandle
    where
        F: Fn(&P) -> R + Send + Sync + 'static,
        R: ListenerResult,
    {
        let id = self.counter.fetch_add(1, SeqCst);
        let registration = Registration {
            id,
            filter,
            callback: Box::new(move |payload| callback(payload).into_failure()),
            active: AtomicBool::new(true),
        };

        self.listeners.write().unwrap().push(Arc::new(registration));

        ListenerHandle { kind: self.kind, id }
    }

    /// Remove a listener.
    ///
    /// Unknown handles, handles of another kind and handles that were already
    /// removed are ignored.
    pub fn remove(&self, handle: ListenerHandle) {
        if handle.kind != self.kind {
            return;
        }

        let mut listeners = self.listeners.write().unwrap();

        if let Some(pos) = listeners.iter().position(|r| r.id == handle.id) {
            let registration = listeners.remove(pos);
            registration.active.store(false, SeqCst);
        }
    }

    /// Whether the listener behind `handle` is registered here.
    pub fn contains(&self, handle: ListenerHandle) -> bool {
        handle.kind == self.kind
            && self.listeners.read().unwrap().iter().any(|r| r.id == handle.id)
    }

    /// The number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.read().unwrap().len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.read().unwrap().is_empty()
    }

    /// Call every listener whose filter accepts `payload`, in registration
    /// order.
    ///
    /// Returns the number of listeners that were called, failed ones
    /// included.
    pub fn dispatch(&self, payload: &P) -> usize {
        let snapshot = self.listeners.read().unwrap().clone();
        let mut called = 0;

        for registration in snapshot {
            if !registration.active.load(SeqCst) {
                continue;
            }

            if let Some(filter) = &registration.filter {
                match catch_unwind(AssertUnwindSafe(|| filter(payload))) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(panic) => {
                        let failure = ListenerFailure::Panicked(panic_message(&*panic));
                        self.report(registration.id, failure);
                        continue;
                    }
                }
            }

            called += 1;

            let result = catch_unwind(AssertUnwindSafe(|| (registration.callback)(payload)));
            let failure = match result {
                Ok(None) => continue,
                Ok(Some(message)) => ListenerFailure::Failed(message),
                Err(panic) => ListenerFailure::Panicked(panic_message(&*panic)),
            };

            self.report(registration.id, failure);
        }

        called
    }

    fn report(&self, id: u64, failure: ListenerFailure) {
        let error = ListenerError { handle: ListenerHandle { kind: self.kind, id }, failure };
        error!(%error, "Listener failed");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

/// Where a [`SyncRoomEvent`] came from inside of a joined room.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventOrigin {
    /// The `state` section.
    State,
    /// The `timeline` section.
    Timeline,
    /// The `ephemeral` section.
    Ephemeral,
}

/// An event of a joined room, tagged with the room it belongs to.
#[derive(Clone, Debug)]
pub struct SyncRoomEvent {
    pub room_id: RoomId,
    pub event: Event,
    pub origin: EventOrigin,
}

/// A room the user got invited to.
#[derive(Clone, Debug)]
pub struct InvitedRoomUpdate {
    pub room_id: RoomId,
    /// Stripped state events describing the room.
    pub invite_state: Vec<Event>,
}

/// A room the user left, or got kicked or banned from.
#[derive(Clone, Debug)]
pub struct LeftRoomUpdate {
    pub room_id: RoomId,
    pub state: Vec<Event>,
    pub timeline: Vec<Event>,
}

/// Filter for global listeners, every field that is set has to match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventFilter {
    event_type: Option<String>,
    room_id: Option<RoomId>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept events of the given type.
    #[must_use]
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Only accept events of the given room.
    #[must_use]
    pub fn room_id(mut self, room_id: RoomId) -> Self {
        self.room_id = Some(room_id);
        self
    }

    pub fn matches(&self, event: &SyncRoomEvent) -> bool {
        self.event_type.as_deref().map_or(true, |t| event.event.event_type() == Some(t))
            && self.room_id.as_ref().map_or(true, |r| *r == event.room_id)
    }
}

/// Filter for presence listeners, accepts presence events of the given users.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserFilter {
    users: BTreeSet<UserId>,
}

impl UserFilter {
    pub fn new(users: impl IntoIterator<Item = UserId>) -> Self {
        Self { users: users.into_iter().collect() }
    }

    /// Whether the presence event is about one of the users.
    ///
    /// The user is taken from the `sender` field, older servers only put it
    /// into `content.user_id`.
    pub fn matches(&self, event: &Event) -> bool {
        let content_user =
            event.content().and_then(|c| c.get("user_id")).and_then(|u| u.as_str());

        [event.sender(), content_user].into_iter().flatten().any(|u| self.users.contains(u))
    }
}

impl FromIterator<UserId> for UserFilter {
    fn from_iter<T: IntoIterator<Item = UserId>>(iter: T) -> Self {
        Self::new(iter)
    }
}
