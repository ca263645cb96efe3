mod methods;
mod set;
mod types;


pub use types::{
    Artifact, ArtifactMetadata, ArtifactSet, Estimation, Priority, RelationshipField,
    Relationships, SCHEMA_VERSION,
};
