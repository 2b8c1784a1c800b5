//! Helpers to write tests for the matrix-sync crates.
//!
//! Everything in here produces plain JSON so the helpers can be used from the
//! crates they test without dependency cycles.

mod sync_builder;
pub mod test_json;

pub use self::sync_builder::{
    InvitedRoomBuilder, JoinedRoomBuilder, LeftRoomBuilder, StateTestEvent, SyncResponseBuilder,
};

/// Attribute for async tests, runs the test on a tokio runtime.
pub use tokio::test as async_test;

/// The room ID most test responses use.
pub const DEFAULT_TEST_ROOM_ID: &str = "!SVkFJHzfwvuaIEawgC:localhost";

/// The user most test responses are written for.
pub const DEFAULT_TEST_USER_ID: &str = "@example:localhost";

/// Install a tracing subscriber for the tests of the calling crate.
///
/// The log level is taken from `RUST_LOG`, output goes through the test
/// harness so it only shows up for failing tests.
#[macro_export]
macro_rules! init_tracing_for_tests {
    () => {
        #[$crate::__macro_support::ctor::ctor]
        fn init_logging() {
            use $crate::__macro_support::tracing_subscriber::{
                fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
            };

            let _ = Registry::default()
                .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
                .with(fmt::layer().with_test_writer())
                .try_init();
        }
    };
}

#[doc(hidden)]
pub mod __macro_support {
    pub use ctor;
    pub use tracing_subscriber;
}
