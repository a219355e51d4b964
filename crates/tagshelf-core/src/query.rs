use crate::store::UserDataStore;
use crate::tags::TagSet;
use crate::track::{TrackId, TrackRecord};

/// Tag search over the track cache.
///
/// A track matches when it carries every `selected` tag and no `excluded`
/// tag. An empty `selected` set matches nothing: listing the whole cache is
/// not a tag search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagQuery {
    pub selected: TagSet,
    pub excluded: TagSet,
}

impl TagQuery {
    pub fn new(selected: TagSet, excluded: TagSet) -> Self {
        Self { selected, excluded }
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn matches(&self, assigned: &TagSet) -> bool {
        !self.is_empty() && self.selected.is_subset(assigned) && assigned.is_disjoint(&self.excluded)
    }

    /// Matching tracks in cache order.
    pub fn run<'a>(&self, store: &'a UserDataStore) -> Vec<&'a TrackRecord> {
        if self.is_empty() {
            return Vec::new();
        }
        let none = TagSet::new();
        store
            .track_cache()
            .iter()
            .filter(|record| {
                let assigned = store.assignments().get(&record.id).unwrap_or(&none);
                self.matches(assigned)
            })
            .collect()
    }
}

/// Tags carried by every one of `tracks`, in the first track's order.
/// Empty when `tracks` is empty.
pub fn shared_tags(store: &UserDataStore, tracks: &[TrackId]) -> TagSet {
    let Some((first, rest)) = tracks.split_first() else {
        return TagSet::new();
    };
    let mut shared = store.tags_for(first);
    for track in rest {
        if shared.is_empty() {
            break;
        }
        shared = shared.intersection(&store.tags_for(track));
    }
    shared
}

/// Playlist URIs for `results`, skipping tracks without one.
pub fn playlist_uris(results: &[&TrackRecord]) -> Vec<String> {
    results
        .iter()
        .filter_map(|record| record.uri.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[&str]) -> TagSet {
        values.iter().copied().collect()
    }

    fn tagged_store() -> UserDataStore {
        let mut store = UserDataStore::new();
        store.cache_tracks([
            TrackRecord::new("a", "Come Together").with_uri("spotify:track:a"),
            TrackRecord::new("b", "Faces").with_uri("spotify:track:b"),
            TrackRecord::new("c", "Ill Wind").with_uri("spotify:track:c"),
        ]);
        store.assign(&TrackId::from("a"), "rock");
        store.assign(&TrackId::from("b"), "rock");
        store.assign(&TrackId::from("c"), "pop");
        store
    }

    fn ids<'a>(records: &[&'a TrackRecord]) -> Vec<&'a str> {
        records.iter().map(|record| record.id.as_str()).collect()
    }

    #[test]
    fn empty_selection_returns_nothing() {
        let store = tagged_store();
        for excluded in [set(&[]), set(&["pop"]), set(&["rock", "pop"])] {
            let query = TagQuery::new(TagSet::new(), excluded);
            assert!(query.run(&store).is_empty());
        }
    }

    #[test]
    fn selected_tag_in_cache_order() {
        let store = tagged_store();
        let query = TagQuery::new(set(&["rock"]), TagSet::new());
        assert_eq!(ids(&query.run(&store)), ["a", "b"]);
    }

    #[test]
    fn excluded_tags_filter_out() {
        let mut store = tagged_store();
        store.assign(&TrackId::from("b"), "live");

        let query = TagQuery::new(set(&["rock"]), set(&["live"]));
        assert_eq!(ids(&query.run(&store)), ["a"]);
    }

    #[test]
    fn all_selected_tags_required() {
        let mut store = tagged_store();
        store.assign(&TrackId::from("a"), "90s");

        let query = TagQuery::new(set(&["rock", "90s"]), TagSet::new());
        assert_eq!(ids(&query.run(&store)), ["a"]);
    }

    #[test]
    fn orphaned_assignments_are_not_results() {
        let mut store = tagged_store();
        store.assign(&TrackId::from("uncached"), "rock");

        let query = TagQuery::new(set(&["rock"]), TagSet::new());
        assert_eq!(ids(&query.run(&store)), ["a", "b"]);
    }

    #[test]
    fn shared_tags_is_intersection() {
        let mut store = tagged_store();
        store.assign(&TrackId::from("a"), "live");
        store.assign(&TrackId::from("b"), "live");

        let album = [TrackId::from("a"), TrackId::from("b")];
        assert_eq!(shared_tags(&store, &album).as_slice(), ["rock", "live"]);

        let mixed = [TrackId::from("a"), TrackId::from("c")];
        assert!(shared_tags(&store, &mixed).is_empty());
        assert!(shared_tags(&store, &[]).is_empty());
    }

    #[test]
    fn shared_tags_follow_latest_state() {
        let mut store = tagged_store();
        let album = [TrackId::from("a"), TrackId::from("b")];
        assert_eq!(shared_tags(&store, &album).as_slice(), ["rock"]);

        store.unassign(&TrackId::from("b"), "rock");
        assert!(shared_tags(&store, &album).is_empty());
    }

    #[test]
    fn uris_skip_missing() {
        let mut store = tagged_store();
        store.cache_tracks([TrackRecord::new("d", "Local file")]);
        store.assign(&TrackId::from("d"), "rock");

        let query = TagQuery::new(set(&["rock"]), TagSet::new());
        let results = query.run(&store);
        assert_eq!(results.len(), 3);
        assert_eq!(
            playlist_uris(&results),
            ["spotify:track:a", "spotify:track:b"]
        );
    }
}
