//! Test data for the matrix-sync crates.
//!
//! Exporting each const allows all the test data to have a single source of
//! truth.

use once_cell::sync::Lazy;
use serde_json::{json, Value as JsonValue};

pub mod api_responses;
pub mod sync;
pub mod sync_events;

pub use api_responses::{REGISTER_GUEST, SERVER_ERROR, UNKNOWN_TOKEN};
pub use sync::{EMPTY_SYNC, INVITE_SYNC, LEAVE_SYNC, SYNC};
pub use sync_events::{
    ALIASES, CANONICAL_ALIAS, MEMBER, MEMBER_BAN, MEMBER_INVITE, MEMBER_LEAVE, MESSAGE, NAME,
    PRESENCE_EVENTS, TOPIC, TYPING,
};

/// An empty response.
pub static EMPTY: Lazy<JsonValue> = Lazy::new(|| json!({}));
