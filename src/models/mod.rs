pub mod actor;
pub mod artifact;
pub mod artifact_id;
pub mod event;
pub mod timestamp;

pub use actor::{Actor, ActorKind};
pub use artifact::{Artifact, ArtifactSet, RelationshipField, Relationships};
pub use artifact_id::{ArtifactId, ArtifactKind};
pub use event::{ArtifactState, BlockingDependency, Event, EventMetadata, Trigger};
pub use timestamp::Timestamp;
