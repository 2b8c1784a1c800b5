//! Responses of the client-server API, apart from `/sync`.

use once_cell::sync::Lazy;
use serde_json::{json, Value as JsonValue};

/// `POST /_matrix/client/r0/register?kind=guest`
pub static REGISTER_GUEST: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "access_token": "EXAMPLE_ACCESS_TOKEN",
        "device_id": "guest_device",
        "home_server": "example.com",
        "user_id": "@455:example.com"
    })
});

/// An expired or revoked access token.
pub static UNKNOWN_TOKEN: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "errcode": "M_UNKNOWN_TOKEN",
        "error": "Invalid macaroon passed."
    })
});

/// A homeserver that is having a bad day.
pub static SERVER_ERROR: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "errcode": "M_UNKNOWN",
        "error": "Internal server error"
    })
});
