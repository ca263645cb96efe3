pub mod artifact_store;
pub mod locking;

pub use artifact_store::{ArtifactStore, FsArtifactStore, MemoryArtifactStore};
