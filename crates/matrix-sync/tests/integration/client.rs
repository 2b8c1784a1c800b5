use std::sync::{
    atomic::{AtomicUsize, Ordering::SeqCst},
    Arc, Mutex,
};

use assert_matches::assert_matches;
use matrix_sync::{
    config::SyncSettings, ApiError, Client, Error, EventFilter, IdParseError, RoomId, Session,
    UserId,
};
use matrix_sync_test::{
    async_test, test_json, InvitedRoomBuilder, JoinedRoomBuilder, LeftRoomBuilder,
    StateTestEvent, SyncResponseBuilder, DEFAULT_TEST_ROOM_ID,
};

use crate::{client_with_api, session, MockApi};

fn guest_session() -> Session {
    Session {
        access_token: "EXAMPLE_ACCESS_TOKEN".to_owned(),
        user_id: UserId::parse("@455:example.com").unwrap(),
        home_server: "example.com".to_owned(),
        device_id: Some("guest_device".to_owned()),
    }
}

#[async_test]
async fn register_as_guest_runs_one_sync() {
    let api = MockApi::new();
    api.set_registration(Ok(guest_session()));
    api.respond(test_json::SYNC.clone());

    let client = Client::builder().protocol_api(api.clone()).build().unwrap();
    assert!(!client.logged_in());

    let session = client.register_as_guest().await.unwrap();

    assert_eq!(session, guest_session());
    assert_eq!(client.session(), Some(guest_session()));
    assert_eq!(api.restored_session(), Some(guest_session()));

    assert_eq!(api.calls().len(), 1);
    assert_eq!(api.calls()[0].since, None);
    assert_eq!(client.sync_token().as_deref(), Some("s526_47314_0_7_1_1_1_11444_1"));
    assert!(client.get_room(DEFAULT_TEST_ROOM_ID).is_some());
}

#[async_test]
async fn register_as_guest_ignores_an_earlier_stop() {
    let api = MockApi::new();
    api.set_registration(Ok(guest_session()));
    api.respond(test_json::SYNC.clone()).respond(test_json::EMPTY_SYNC.clone());

    let client = Client::builder().protocol_api(api.clone()).build().unwrap();
    client.stop_sync();

    let session = client.register_as_guest().await.unwrap();
    assert_eq!(session, guest_session());
    assert_eq!(api.calls().len(), 1);
    assert!(client.get_room(DEFAULT_TEST_ROOM_ID).is_some());

    // The stop still applies to the next sync the caller starts.
    assert!(client.stop_handle().is_stop_requested());
    assert_matches!(client.sync_once(SyncSettings::default()).await, Err(Error::Cancelled));
    assert_eq!(api.calls().len(), 1);

    client.sync_once(SyncSettings::default()).await.unwrap();
    assert_eq!(api.calls().len(), 2);
}

#[async_test]
async fn failed_registration_does_not_sync() {
    let api = MockApi::new();
    api.set_registration(Err(ApiError::Server { status: 503 }));
    api.respond(test_json::SYNC.clone());

    let client = Client::builder().protocol_api(api.clone()).build().unwrap();

    assert_matches!(
        client.register_as_guest().await,
        Err(Error::Api(ApiError::Server { status: 503 }))
    );
    assert!(!client.logged_in());
    assert!(api.calls().is_empty());
}

#[async_test]
async fn restore_session_reaches_the_api() {
    let api = MockApi::new();
    let client = Client::builder().protocol_api(api.clone()).build().unwrap();

    client.restore_session(session());

    assert_eq!(client.user_id().unwrap(), "@example:localhost");
    assert_eq!(api.restored_session(), Some(session()));
}

#[test]
fn room_lookup() {
    let api = MockApi::new();
    let client = client_with_api(&api);

    assert!(client.get_rooms().is_empty());
    assert!(client.get_room("!test:localhost").is_none());

    let room = client.get_or_create_room("!test:localhost").unwrap();
    assert!(client.get_room("!test:localhost").unwrap().is_same(&room));
    assert!(client.get_or_create_room("!test:localhost").unwrap().is_same(&room));
    assert_eq!(client.get_rooms().len(), 1);

    assert_matches!(
        client.get_or_create_room("test:localhost"),
        Err(Error::InvalidIdentifier(IdParseError::MissingLeadingSigil { expected: '!' }))
    );
    assert_matches!(
        client.get_or_create_room("!test"),
        Err(Error::InvalidIdentifier(IdParseError::MissingColon))
    );
    assert_eq!(client.get_rooms().len(), 1);
}

#[async_test]
async fn removed_listeners_are_not_called() {
    let api = MockApi::new();
    let mut builder = SyncResponseBuilder::new();

    builder.add_joined_room(
        JoinedRoomBuilder::new(DEFAULT_TEST_ROOM_ID).add_timeline_event(test_json::MESSAGE.clone()),
    );
    api.respond(builder.build_json_sync_response());
    builder.add_joined_room(
        JoinedRoomBuilder::new(DEFAULT_TEST_ROOM_ID).add_timeline_event(test_json::MESSAGE.clone()),
    );
    api.respond(builder.build_json_sync_response());

    let client = client_with_api(&api);
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let handle = client.add_listener({
        let first = first.clone();
        move |_| {
            first.fetch_add(1, SeqCst);
        }
    });
    client.add_listener({
        let second = second.clone();
        move |_| {
            second.fetch_add(1, SeqCst);
        }
    });

    client.sync_once(SyncSettings::default()).await.unwrap();
    assert_eq!(first.load(SeqCst), 1);
    assert_eq!(second.load(SeqCst), 1);

    client.remove_listener(handle);
    // Removing twice, or through the wrong registry, does nothing.
    client.remove_listener(handle);
    client.remove_presence_listener(handle);

    client.sync_once(SyncSettings::default()).await.unwrap();
    assert_eq!(first.load(SeqCst), 1);
    assert_eq!(second.load(SeqCst), 2);
}

#[async_test]
async fn filtered_listener() {
    let api = MockApi::new();
    api.respond(test_json::SYNC.clone());
    let client = client_with_api(&api);

    let messages = Arc::new(Mutex::new(Vec::new()));
    client.add_listener_with_filter(
        EventFilter::new()
            .event_type("m.room.message")
            .room_id(RoomId::parse(DEFAULT_TEST_ROOM_ID).unwrap()),
        {
            let messages = messages.clone();
            move |event| {
                messages.lock().unwrap().push(event.event.clone());
            }
        },
    );

    let other_room = Arc::new(AtomicUsize::new(0));
    let other = RoomId::parse("!other:localhost").unwrap();
    client.add_listener_with_filter(EventFilter::new().room_id(other), {
        let other_room = other_room.clone();
        move |_| {
            other_room.fetch_add(1, SeqCst);
        }
    });

    client.sync_once(SyncSettings::default()).await.unwrap();

    let messages = messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].event_type(), Some("m.room.message"));
    assert_eq!(other_room.load(SeqCst), 0);
}

#[async_test]
async fn presence_listeners() {
    let api = MockApi::new();
    let mut builder = SyncResponseBuilder::new();
    builder.add_presence_bulk(test_json::PRESENCE_EVENTS.iter().cloned());
    api.respond(builder.build_json_sync_response());
    builder.add_presence_bulk(test_json::PRESENCE_EVENTS.iter().cloned());
    api.respond(builder.build_json_sync_response());

    let client = client_with_api(&api);
    let all = Arc::new(Mutex::new(Vec::new()));
    let filtered = Arc::new(Mutex::new(Vec::new()));

    let handle = client.add_presence_listener({
        let all = all.clone();
        move |event| {
            all.lock().unwrap().push(event.sender().unwrap().to_owned());
        }
    });
    client.add_presence_listener_with_filter(
        [UserId::parse("@example2:localhost").unwrap()],
        {
            let filtered = filtered.clone();
            move |event| {
                filtered.lock().unwrap().push(event.sender().unwrap().to_owned());
            }
        },
    );

    let summary = client.sync_once(SyncSettings::default()).await.unwrap();
    assert_eq!(summary.presence_events, 3);

    assert_eq!(
        *all.lock().unwrap(),
        ["@example:localhost", "@example2:localhost", "@example3:localhost"]
    );
    assert_eq!(*filtered.lock().unwrap(), ["@example2:localhost"]);

    client.remove_presence_listener(handle);
    client.sync_once(SyncSettings::default()).await.unwrap();

    assert_eq!(all.lock().unwrap().len(), 3);
    assert_eq!(filtered.lock().unwrap().len(), 2);
}

#[async_test]
async fn invite_and_leave_listeners() {
    let api = MockApi::new();
    api.respond(test_json::SYNC.clone());

    let mut builder = SyncResponseBuilder::new();
    builder
        .add_invited_room(
            InvitedRoomBuilder::new("!invited:localhost").add_state_event(StateTestEvent::Name),
        )
        .add_left_room(
            LeftRoomBuilder::new(DEFAULT_TEST_ROOM_ID)
                .add_timeline_event(test_json::MEMBER_LEAVE.clone()),
        );
    api.respond(builder.build_json_sync_response());

    let client = client_with_api(&api);
    let invites = Arc::new(Mutex::new(Vec::new()));
    let leaves = Arc::new(Mutex::new(Vec::new()));
    let global = Arc::new(AtomicUsize::new(0));

    client.add_invite_listener({
        let invites = invites.clone();
        move |update| {
            invites.lock().unwrap().push((update.room_id.clone(), update.invite_state.len()));
        }
    });
    client.add_leave_listener({
        let leaves = leaves.clone();
        let client = client.clone();
        move |update| {
            // The room is still known while the listener runs.
            let known = client.get_room(update.room_id.as_str()).is_some();
            leaves.lock().unwrap().push((update.room_id.clone(), update.timeline.len(), known));
        }
    });

    client.sync_once(SyncSettings::default()).await.unwrap();
    client.add_listener({
        let global = global.clone();
        move |_| {
            global.fetch_add(1, SeqCst);
        }
    });

    let summary = client.sync_once(SyncSettings::default()).await.unwrap();
    assert_eq!(summary.invited_rooms, ["!invited:localhost"]);
    assert_eq!(summary.left_rooms, [DEFAULT_TEST_ROOM_ID]);

    let invites = invites.lock().unwrap();
    assert_eq!(invites.len(), 1);
    assert_eq!(invites[0].0, "!invited:localhost");
    assert_eq!(invites[0].1, 1);

    let leaves = leaves.lock().unwrap();
    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].0, DEFAULT_TEST_ROOM_ID);
    assert_eq!(leaves[0].1, 1);
    assert!(leaves[0].2);

    // Neither invites nor leaves reach the global listeners, the invited room
    // isn't created and the left one is gone.
    assert_eq!(global.load(SeqCst), 0);
    assert!(client.get_room("!invited:localhost").is_none());
    assert!(client.get_room(DEFAULT_TEST_ROOM_ID).is_none());
}

#[async_test]
async fn failing_listeners_do_not_break_the_sync() {
    let api = MockApi::new();
    api.respond(test_json::SYNC.clone());
    let client = client_with_api(&api);

    let calls = Arc::new(AtomicUsize::new(0));

    client.add_listener(|_| -> Result<(), &'static str> { Err("nope") });
    client.add_listener(|_| -> Result<(), String> { panic!("listener bug") });
    client.add_listener({
        let calls = calls.clone();
        move |_| {
            calls.fetch_add(1, SeqCst);
        }
    });

    let summary = client.sync_once(SyncSettings::default()).await.unwrap();

    assert_eq!(calls.load(SeqCst), summary.room_events - 1);
    assert_eq!(client.sync_token().as_deref(), Some("s526_47314_0_7_1_1_1_11444_1"));
}
