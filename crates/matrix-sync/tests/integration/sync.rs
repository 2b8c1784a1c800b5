use std::{
    io,
    sync::{
        atomic::{AtomicUsize, Ordering::SeqCst},
        Arc, Mutex,
    },
    time::Duration,
};

use assert_matches::assert_matches;
use matrix_sync::{
    config::{RequestConfig, SyncSettings, SyncToken},
    ApiError, Error, EventOrigin, LoopCtrl, UserId,
};
use matrix_sync_test::{
    async_test, test_json, JoinedRoomBuilder, StateTestEvent, SyncResponseBuilder,
    DEFAULT_TEST_ROOM_ID, DEFAULT_TEST_USER_ID,
};
use serde_json::json;

use crate::{client_with_api, client_with_config, fast_retries, MockApi, SyncCall};

#[async_test]
async fn initial_then_incremental_sync() {
    let api = MockApi::new();
    api.respond(test_json::SYNC.clone()).respond(test_json::EMPTY_SYNC.clone());
    let client = client_with_api(&api);

    assert_eq!(client.sync_token(), None);

    let summary = client.sync_once(SyncSettings::default()).await.unwrap();
    assert_eq!(summary.next_batch, "s526_47314_0_7_1_1_1_11444_1");
    assert_eq!(summary.joined_rooms, [DEFAULT_TEST_ROOM_ID]);
    assert_eq!(client.sync_token().as_deref(), Some("s526_47314_0_7_1_1_1_11444_1"));

    let summary = client.sync_once(SyncSettings::default()).await.unwrap();
    assert!(summary.is_empty());

    // An empty response still moves the token forward.
    assert_eq!(client.sync_token().as_deref(), Some("s526_47314_0_7_1_1_1_11444_4"));

    assert_eq!(
        api.calls(),
        [
            SyncCall { since: None, timeout: Duration::from_secs(30) },
            SyncCall {
                since: Some("s526_47314_0_7_1_1_1_11444_1".to_owned()),
                timeout: Duration::from_secs(30)
            },
        ]
    );
}

#[async_test]
async fn sync_folds_room_state() {
    let api = MockApi::new();
    api.respond(test_json::SYNC.clone());
    let client = client_with_api(&api);

    client.sync_once(SyncSettings::default()).await.unwrap();

    let rooms = client.get_rooms();
    assert_eq!(rooms.len(), 1);

    let room = client.get_room(DEFAULT_TEST_ROOM_ID).unwrap();
    let own_user = UserId::parse(DEFAULT_TEST_USER_ID).unwrap();

    assert_eq!(room.name().as_deref(), Some("room name"));
    assert_eq!(room.topic().as_deref(), Some("room topic"));
    assert_eq!(room.member_count(), 2);
    assert_eq!(room.display_name(&own_user), "example2");
    assert_eq!(room.calculated_name(&own_user), "room name");
    assert_eq!(room.prev_batch().as_deref(), Some("t392-516_47314_0_7_1_1_1_11444_1"));
    assert_eq!(room.timeline().len(), 1);
}

#[async_test]
async fn leaving_a_room_drops_it() {
    let api = MockApi::new();
    api.respond(test_json::SYNC.clone()).respond(test_json::LEAVE_SYNC.clone());
    let client = client_with_api(&api);

    client.sync_once(SyncSettings::default()).await.unwrap();
    assert!(client.get_room(DEFAULT_TEST_ROOM_ID).is_some());

    let summary = client.sync_once(SyncSettings::default()).await.unwrap();
    assert_eq!(summary.left_rooms, [DEFAULT_TEST_ROOM_ID]);
    assert!(client.get_room(DEFAULT_TEST_ROOM_ID).is_none());
    assert!(client.get_rooms().is_empty());
    assert_eq!(client.sync_token().as_deref(), Some("s526_47314_0_7_1_1_1_11444_3"));
}

#[async_test]
async fn state_events_are_dispatched_before_timeline_events() {
    let api = MockApi::new();
    let mut builder = SyncResponseBuilder::new();
    builder.add_joined_room(
        JoinedRoomBuilder::new(DEFAULT_TEST_ROOM_ID)
            .add_timeline_event(test_json::MESSAGE.clone())
            .add_timeline_event(test_json::MEMBER_LEAVE.clone())
            .add_state_event(StateTestEvent::Member)
            .add_state_event(StateTestEvent::Name)
            .add_ephemeral_event(test_json::TYPING.clone()),
    );
    api.respond(builder.build_json_sync_response());

    let client = client_with_api(&api);
    let seen = Arc::new(Mutex::new(Vec::new()));

    let global = seen.clone();
    client.add_listener(move |event| {
        global.lock().unwrap().push((event.origin, event.event.event_type().map(ToOwned::to_owned)));
    });
    let ephemeral = seen.clone();
    client.add_ephemeral_listener(move |event| {
        ephemeral
            .lock()
            .unwrap()
            .push((event.origin, event.event.event_type().map(ToOwned::to_owned)));
    });

    let summary = client.sync_once(SyncSettings::default()).await.unwrap();
    assert_eq!(summary.room_events, 5);

    let seen: Vec<_> = seen
        .lock()
        .unwrap()
        .iter()
        .map(|(origin, event_type)| (*origin, event_type.clone().unwrap()))
        .collect();
    assert_eq!(
        seen,
        [
            (EventOrigin::State, "m.room.member".to_owned()),
            (EventOrigin::State, "m.room.name".to_owned()),
            (EventOrigin::Timeline, "m.room.message".to_owned()),
            (EventOrigin::Timeline, "m.room.member".to_owned()),
            (EventOrigin::Ephemeral, "m.typing".to_owned()),
        ]
    );

    // The leave in the timeline was folded after the join from the state.
    let room = client.get_room(DEFAULT_TEST_ROOM_ID).unwrap();
    assert_eq!(room.member_count(), 0);
}

#[async_test]
async fn failed_sync_keeps_token_and_state() {
    let api = MockApi::new();
    api.respond(test_json::SYNC.clone())
        .fail(ApiError::Server { status: 502 })
        .respond(json!({ "rooms": {} }));
    let client = client_with_api(&api);

    client.sync_once(SyncSettings::default()).await.unwrap();
    let token = client.sync_token();

    assert_matches!(
        client.sync_once(SyncSettings::default()).await,
        Err(Error::Api(ApiError::Server { status: 502 }))
    );
    assert_eq!(client.sync_token(), token);

    // A response without a token is discarded as a whole.
    assert_matches!(
        client.sync_once(SyncSettings::default()).await,
        Err(Error::Api(ApiError::Protocol(_)))
    );
    assert_eq!(client.sync_token(), token);

    let room = client.get_room(DEFAULT_TEST_ROOM_ID).unwrap();
    assert_eq!(room.name().as_deref(), Some("room name"));
    assert_eq!(room.member_count(), 2);
}

#[async_test]
async fn sync_token_settings() {
    let api = MockApi::new();
    api.respond(test_json::EMPTY_SYNC.clone())
        .respond(test_json::EMPTY_SYNC.clone())
        .respond(test_json::EMPTY_SYNC.clone());
    let client = client_with_api(&api);

    client.set_sync_token(Some("stored".to_owned()));
    client.sync_once(SyncSettings::new().token("explicit")).await.unwrap();
    client.sync_once(SyncSettings::new().token(SyncToken::NoToken)).await.unwrap();
    client.sync_once(SyncSettings::new().timeout(Duration::from_secs(5))).await.unwrap();

    let calls = api.calls();
    assert_eq!(calls[0].since.as_deref(), Some("explicit"));
    assert_eq!(calls[1].since, None);
    assert_eq!(calls[2].since.as_deref(), Some("s526_47314_0_7_1_1_1_11444_4"));
    assert_eq!(calls[2].timeout, Duration::from_secs(5));
}

#[async_test]
async fn sync_loop_retries_transient_errors() {
    let api = MockApi::new();
    api.fail(ApiError::Server { status: 503 })
        .fail(ApiError::Transport(Box::new(io::Error::from(io::ErrorKind::ConnectionReset))))
        .fail(ApiError::Protocol("garbage".to_owned()))
        .respond(test_json::SYNC.clone());
    let client = client_with_config(&api, fast_retries());

    let counter = AtomicUsize::new(0);
    let summaries = &counter;
    client
        .sync_with_callback(SyncSettings::default(), |_| async move {
            summaries.fetch_add(1, SeqCst);
            LoopCtrl::Break
        })
        .await
        .unwrap();

    assert_eq!(counter.load(SeqCst), 1);
    assert_eq!(api.calls().len(), 4);
    assert!(api.calls().iter().all(|call| call.since.is_none()));
    assert_eq!(client.sync_token().as_deref(), Some("s526_47314_0_7_1_1_1_11444_1"));
}

#[async_test]
async fn sync_loop_gives_up_after_the_retry_limit() {
    let api = MockApi::new();
    for _ in 0..4 {
        api.fail(ApiError::Server { status: 500 });
    }
    let client = client_with_config(&api, fast_retries().retry_limit(2));

    assert_matches!(
        client.sync(SyncSettings::default()).await,
        Err(Error::Api(ApiError::Server { status: 500 }))
    );
    assert_eq!(api.calls().len(), 3);
}

#[async_test]
async fn sync_loop_without_retries() {
    let api = MockApi::new();
    api.fail(ApiError::Server { status: 500 });
    let client = client_with_config(&api, RequestConfig::new().disable_retry());

    client.sync(SyncSettings::default()).await.unwrap_err();
    assert_eq!(api.calls().len(), 1);
}

#[async_test]
async fn auth_errors_end_the_sync_loop() {
    let api = MockApi::new();
    api.respond(test_json::EMPTY_SYNC.clone()).fail(ApiError::Auth {
        status: 401,
        errcode: Some("M_UNKNOWN_TOKEN".to_owned()),
        message: None,
    });
    let client = client_with_config(&api, fast_retries());

    assert_matches!(
        client.sync(SyncSettings::default()).await,
        Err(Error::Api(ApiError::Auth { status: 401, .. }))
    );
    assert_eq!(api.calls().len(), 2);
    assert_eq!(client.sync_token().as_deref(), Some("s526_47314_0_7_1_1_1_11444_4"));
}

#[async_test]
async fn callback_breaks_the_loop() {
    let api = MockApi::new();
    let mut builder = SyncResponseBuilder::new();
    for _ in 0..3 {
        api.respond(builder.build_json_sync_response());
    }
    let client = client_with_api(&api);

    let seen_tokens = Mutex::new(Vec::new());
    let tokens = &seen_tokens;
    client
        .sync_with_callback(
            SyncSettings::new().timeout(Duration::from_secs(10)).ignore_timeout_on_first_sync(true),
            |summary| async move {
                let mut tokens = tokens.lock().unwrap();
                tokens.push(summary.next_batch);

                if tokens.len() == 2 {
                    LoopCtrl::Break
                } else {
                    LoopCtrl::Continue
                }
            },
        )
        .await
        .unwrap();

    assert_eq!(
        *seen_tokens.lock().unwrap(),
        ["t392-516_47314_0_7_1_1_1_11444_1", "t392-516_47314_0_7_1_1_1_11444_2"]
    );
    assert_eq!(
        api.calls(),
        [
            SyncCall { since: None, timeout: Duration::ZERO },
            SyncCall {
                since: Some("t392-516_47314_0_7_1_1_1_11444_1".to_owned()),
                timeout: Duration::from_secs(10)
            },
        ]
    );
}

#[async_test]
async fn stop_before_syncing() {
    let api = MockApi::new();
    api.respond(test_json::EMPTY_SYNC.clone());
    let client = client_with_api(&api);

    client.stop_sync();
    assert!(client.stop_handle().is_stop_requested());

    assert_matches!(client.sync_once(SyncSettings::default()).await, Err(Error::Cancelled));
    assert!(api.calls().is_empty());

    // The request was consumed by the cancelled sync.
    assert!(!client.stop_handle().is_stop_requested());
    client.sync_once(SyncSettings::default()).await.unwrap();
    assert_eq!(api.calls().len(), 1);
}

#[async_test]
async fn arrived_response_wins_over_a_simultaneous_stop() {
    let api = MockApi::new();
    api.respond(test_json::SYNC.clone());
    let release = api.hold_next_response();
    let client = client_with_api(&api);

    let task = tokio::spawn({
        let client = client.clone();
        async move { client.sync_once(SyncSettings::default()).await }
    });

    while api.calls().is_empty() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    // The response and the stop become ready in the same wakeup.
    client.stop_sync();
    release.notify_one();

    let result = tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
    let summary = result.unwrap();
    assert_eq!(summary.joined_rooms, [DEFAULT_TEST_ROOM_ID]);
    assert_eq!(client.sync_token().as_deref(), Some("s526_47314_0_7_1_1_1_11444_1"));

    // The stop is left for the next sync.
    assert_matches!(client.sync_once(SyncSettings::default()).await, Err(Error::Cancelled));
    assert_eq!(api.calls().len(), 1);
}

#[async_test]
async fn stop_cancels_a_pending_long_poll() {
    let api = MockApi::new();
    api.respond(test_json::SYNC.clone());
    let client = client_with_api(&api);

    let task = tokio::spawn({
        let client = client.clone();
        async move { client.sync(SyncSettings::default()).await }
    });

    // The first sync is answered, the second one hangs.
    while api.calls().len() < 2 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    client.stop_handle().stop();

    let result = tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
    result.unwrap();

    assert_eq!(api.calls().len(), 2);
    assert_eq!(client.sync_token().as_deref(), Some("s526_47314_0_7_1_1_1_11444_1"));
    assert!(client.get_room(DEFAULT_TEST_ROOM_ID).is_some());
}

#[async_test]
async fn stop_interrupts_the_retry_wait() {
    let api = MockApi::new();
    api.fail(ApiError::Server { status: 502 });
    let client = client_with_config(
        &api,
        RequestConfig::new().initial_retry_interval(Duration::from_secs(600)),
    );

    let task = tokio::spawn({
        let client = client.clone();
        async move { client.sync(SyncSettings::default()).await }
    });

    while api.calls().is_empty() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    client.stop_sync();

    let result = tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
    result.unwrap();
    assert_eq!(api.calls().len(), 1);
}
