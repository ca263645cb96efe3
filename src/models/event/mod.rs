mod methods;
mod types;


pub use types::{ArtifactState, BlockingDependency, Event, EventMetadata, Trigger};
