use tokio::sync::broadcast;
use tracing::debug;

use crate::query::TagQuery;
use crate::snapshot::Snapshot;
use crate::tags::{TagAssignments, TagSet};
use crate::track::{TrackCache, TrackId, TrackRecord};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    TagAdded(String),
    TagRemoved(String),
    TagMoved { from: usize, to: usize },
    Assigned { track: TrackId, tag: String },
    Unassigned { track: TrackId, tag: String },
    AssignmentsCleared(TrackId),
    TracksCached(usize),
    TrackCacheCleared,
    Restored,
}

/// The user's tag list, per-track tag assignments and the track cache.
///
/// Every mutator returns whether anything changed and never fails. Changes
/// are announced on a broadcast channel; see [`UserDataStore::subscribe`].
#[derive(Debug)]
pub struct UserDataStore {
    tags: TagSet,
    assignments: TagAssignments,
    cache: TrackCache,
    signal: broadcast::Sender<StoreEvent>,
}

impl Default for UserDataStore {
    fn default() -> Self {
        Self::from_snapshot(Snapshot::default())
    }
}

impl UserDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let (signal, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            tags: snapshot.tags,
            assignments: snapshot.track_tags,
            cache: snapshot.track_cache,
            signal,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.signal.subscribe()
    }

    fn emit(&self, event: StoreEvent) {
        let _ = self.signal.send(event);
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn assignments(&self) -> &TagAssignments {
        &self.assignments
    }

    pub fn track_cache(&self) -> &TrackCache {
        &self.cache
    }

    /// Copies the current state out; later mutations do not affect it.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tags: self.tags.clone(),
            track_tags: self.assignments.clone(),
            track_cache: self.cache.clone(),
        }
    }

    /// Replaces the whole state, keeping existing subscribers.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.tags = snapshot.tags;
        self.assignments = snapshot.track_tags;
        self.cache = snapshot.track_cache;
        self.emit(StoreEvent::Restored);
    }

    pub fn add_tag(&mut self, name: &str) -> bool {
        if !self.tags.insert(name) {
            return false;
        }
        debug!(tag = name, "tag added");
        self.emit(StoreEvent::TagAdded(name.to_owned()));
        true
    }

    /// Deletes `name` from the tag list and from every track that carries it.
    pub fn remove_tag(&mut self, name: &str) -> bool {
        let listed = self.tags.remove(name);
        let affected = self.assignments.remove_everywhere(name);
        if !listed && affected == 0 {
            return false;
        }
        debug!(tag = name, tracks = affected, "tag removed");
        self.emit(StoreEvent::TagRemoved(name.to_owned()));
        true
    }

    pub fn move_tag(&mut self, from: usize, to: usize) -> bool {
        if from == to || !self.tags.move_item(from, to) {
            return false;
        }
        self.emit(StoreEvent::TagMoved { from, to });
        true
    }

    pub fn assign(&mut self, track: &TrackId, tag: &str) -> bool {
        if !self.assignments.assign(track, tag) {
            return false;
        }
        debug!(%track, tag, "tag assigned");
        self.emit(StoreEvent::Assigned {
            track: track.clone(),
            tag: tag.to_owned(),
        });
        true
    }

    pub fn unassign(&mut self, track: &TrackId, tag: &str) -> bool {
        if !self.assignments.unassign(track, tag) {
            return false;
        }
        debug!(%track, tag, "tag unassigned");
        self.emit(StoreEvent::Unassigned {
            track: track.clone(),
            tag: tag.to_owned(),
        });
        true
    }

    pub fn clear_assignments(&mut self, track: &TrackId) -> bool {
        if !self.assignments.clear(track) {
            return false;
        }
        self.emit(StoreEvent::AssignmentsCleared(track.clone()));
        true
    }

    /// Adds `tag` to the tag list and assigns it to `track`.
    pub fn create_and_assign(&mut self, track: &TrackId, tag: &str) -> bool {
        let added = self.add_tag(tag);
        let assigned = self.assign(track, tag);
        added || assigned
    }

    /// Assigns `tag` to every track given, returning how many changed.
    pub fn assign_all<'a, I>(&mut self, tracks: I, tag: &str) -> usize
    where
        I: IntoIterator<Item = &'a TrackId>,
    {
        tracks
            .into_iter()
            .filter(|track| self.assign(track, tag))
            .count()
    }

    pub fn unassign_all<'a, I>(&mut self, tracks: I, tag: &str) -> usize
    where
        I: IntoIterator<Item = &'a TrackId>,
    {
        tracks
            .into_iter()
            .filter(|track| self.unassign(track, tag))
            .count()
    }

    /// Tags assigned to `track`; empty when it has none.
    pub fn tags_for(&self, track: &TrackId) -> TagSet {
        self.assignments.get(track).cloned().unwrap_or_default()
    }

    /// Tags from the global list that `track` does not carry yet.
    pub fn available_tags(&self, track: &TrackId) -> TagSet {
        match self.assignments.get(track) {
            Some(assigned) => self.tags.difference(assigned),
            None => self.tags.clone(),
        }
    }

    pub fn cache_tracks<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = TrackRecord>,
    {
        let added = self.cache.extend(records);
        if added > 0 {
            debug!(added, total = self.cache.len(), "tracks cached");
            self.emit(StoreEvent::TracksCached(added));
        }
        added
    }

    /// Empties the track cache. Tag assignments are left alone, so tracks
    /// that were tagged keep their entries without a cached record.
    pub fn clear_track_cache(&mut self) -> bool {
        if self.cache.is_empty() {
            return false;
        }
        self.cache.clear();
        self.emit(StoreEvent::TrackCacheCleared);
        true
    }

    /// Cached tracks carrying every tag of `selected` and none of `excluded`.
    pub fn query(&self, selected: &TagSet, excluded: &TagSet) -> Vec<&TrackRecord> {
        TagQuery::new(selected.clone(), excluded.clone()).run(self)
    }
}
