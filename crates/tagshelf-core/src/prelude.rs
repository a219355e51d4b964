pub use crate::config::{ConfigValidationError, StoreConfig};
pub use crate::error::{Result, TagShelfError};
pub use crate::persist::{FileSnapshotStore, SnapshotStore};
pub use crate::query::{TagQuery, playlist_uris, shared_tags};
pub use crate::session::{LoadOutcome, PersistenceStatus, ScenePhase, Session, SessionEvent};
pub use crate::snapshot::Snapshot;
pub use crate::store::{StoreEvent, UserDataStore};
pub use crate::tags::{TagAssignments, TagSet};
pub use crate::track::{ArtistRef, TrackCache, TrackId, TrackRecord};
