mod order;

use crate::models::actor::Actor;
use crate::models::timestamp::Timestamp;

pub(super) fn jane() -> Actor {
    Actor::parse("Jane Doe (jane@example.com)").unwrap()
}

pub(super) fn ts(s: &str) -> Timestamp {
    Timestamp::parse(s).unwrap()
}
