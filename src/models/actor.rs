//! Event actors
//!
//! Actors are written as `Name (email)`. The email decides the kind:
//! a `@system` domain marks engine-generated events, an `agent.` local part
//! marks AI agents, everything else is a human.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::LifecycleError;

static ACTOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[^()]*[^()\s])\s*\((?P<email>[^()\s@]+@[^()\s@]+)\)$")
        .expect("actor pattern is valid")
});

const CASCADE_NAME: &str = "System Cascade";
const CASCADE_EMAIL: &str = "cascade@system";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorKind {
    Human,
    Agent,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Actor {
    name: String,
    email: String,
}

impl Actor {
    pub fn new(name: &str, email: &str) -> Result<Self, LifecycleError> {
        Self::parse(&format!("{} ({})", name.trim(), email.trim()))
    }

    pub fn parse(value: &str) -> Result<Self, LifecycleError> {
        let caps = ACTOR_PATTERN
            .captures(value.trim())
            .ok_or_else(|| LifecycleError::InvalidActor {
                value: value.to_string(),
            })?;
        Ok(Self {
            name: caps["name"].trim().to_string(),
            email: caps["email"].to_string(),
        })
    }

    /// Reserved identity stamped on every cascade-originated event.
    pub fn system_cascade() -> Self {
        Self {
            name: CASCADE_NAME.to_string(),
            email: CASCADE_EMAIL.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn kind(&self) -> ActorKind {
        let (local, domain) = self.email.split_once('@').unwrap_or((&self.email, ""));
        if domain == "system" {
            ActorKind::System
        } else if local.starts_with("agent.") {
            ActorKind::Agent
        } else {
            ActorKind::Human
        }
    }

    pub fn is_system(&self) -> bool {
        self.kind() == ActorKind::System
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.email)
    }
}

impl FromStr for Actor {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Actor {
    type Error = LifecycleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Actor> for String {
    fn from(actor: Actor) -> Self {
        actor.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_human() {
        let actor = Actor::parse("Jane Doe (jane@example.com)").unwrap();
        assert_eq!(actor.name(), "Jane Doe");
        assert_eq!(actor.email(), "jane@example.com");
        assert_eq!(actor.kind(), ActorKind::Human);
        assert_eq!(actor.to_string(), "Jane Doe (jane@example.com)");
    }

    #[test]
    fn test_kinds_from_email() {
        assert_eq!(
            Actor::parse("Claude (agent.claude@acme.dev)").unwrap().kind(),
            ActorKind::Agent
        );
        assert_eq!(Actor::system_cascade().kind(), ActorKind::System);
        assert!(Actor::system_cascade().is_system());
    }

    #[test]
    fn test_system_cascade_round_trips() {
        let rendered = Actor::system_cascade().to_string();
        assert_eq!(rendered, "System Cascade (cascade@system)");
        assert_eq!(Actor::parse(&rendered).unwrap(), Actor::system_cascade());
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["", "Jane", "Jane <jane@example.com>", "(jane@example.com)", "Jane (jane)"] {
            assert!(Actor::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_new_trims_parts() {
        let actor = Actor::new("  Jane ", " jane@example.com ").unwrap();
        assert_eq!(actor.to_string(), "Jane (jane@example.com)");
    }
}
