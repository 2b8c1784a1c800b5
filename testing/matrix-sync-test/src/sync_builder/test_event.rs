use serde_json::Value as JsonValue;

use crate::test_json;

/// Test events that can be added to the state.
pub enum StateTestEvent {
    Aliases,
    CanonicalAlias,
    Member,
    MemberBan,
    MemberInvite,
    MemberLeave,
    Name,
    Topic,
}

impl From<StateTestEvent> for JsonValue {
    fn from(val: StateTestEvent) -> Self {
        match val {
            StateTestEvent::Aliases => test_json::sync_events::ALIASES.to_owned(),
            StateTestEvent::CanonicalAlias => test_json::sync_events::CANONICAL_ALIAS.to_owned(),
            StateTestEvent::Member => test_json::sync_events::MEMBER.to_owned(),
            StateTestEvent::MemberBan => test_json::sync_events::MEMBER_BAN.to_owned(),
            StateTestEvent::MemberInvite => test_json::sync_events::MEMBER_INVITE.to_owned(),
            StateTestEvent::MemberLeave => test_json::sync_events::MEMBER_LEAVE.to_owned(),
            StateTestEvent::Name => test_json::sync_events::NAME.to_owned(),
            StateTestEvent::Topic => test_json::sync_events::TOPIC.to_owned(),
        }
    }
}
