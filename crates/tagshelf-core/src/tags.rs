use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::track::TrackId;

/// Ordered collection of distinct tag names.
///
/// Insertion order is kept and is meaningful: the global list is displayed in
/// the order the user arranged it. Names are compared byte for byte, so
/// `"Rock"` and `"rock"` are two different tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(Vec<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `tag` unless it is already present.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        match self.position(tag) {
            Some(idx) => {
                self.0.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.position(tag).is_some()
    }

    pub fn position(&self, tag: &str) -> Option<usize> {
        self.0.iter().position(|existing| existing == tag)
    }

    /// Moves the tag at `from` so that it ends up at index `to`.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        if from >= self.0.len() || to >= self.0.len() {
            return false;
        }
        if from == to {
            return true;
        }
        let tag = self.0.remove(from);
        self.0.insert(to, tag);
        true
    }

    pub fn is_subset(&self, other: &TagSet) -> bool {
        self.iter().all(|tag| other.contains(tag))
    }

    pub fn is_disjoint(&self, other: &TagSet) -> bool {
        !self.iter().any(|tag| other.contains(tag))
    }

    /// Tags present in both sets, in `self` order.
    pub fn intersection(&self, other: &TagSet) -> TagSet {
        self.iter().filter(|tag| other.contains(tag)).cloned().collect()
    }

    /// Tags of `self` that are not in `other`, in `self` order.
    pub fn difference(&self, other: &TagSet) -> TagSet {
        self.iter().filter(|tag| !other.contains(tag)).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(tags: TagSet) -> Self {
        tags.0
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Per-track tag assignments. A track without an entry has no tags; entries
/// are dropped once their set becomes empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagAssignments(BTreeMap<TrackId, TagSet>);

impl TagAssignments {
    pub fn get(&self, track: &TrackId) -> Option<&TagSet> {
        self.0.get(track)
    }

    pub fn assign(&mut self, track: &TrackId, tag: &str) -> bool {
        self.0.entry(track.clone()).or_default().insert(tag)
    }

    pub fn unassign(&mut self, track: &TrackId, tag: &str) -> bool {
        let Some(tags) = self.0.get_mut(track) else {
            return false;
        };
        let removed = tags.remove(tag);
        if tags.is_empty() {
            self.0.remove(track);
        }
        removed
    }

    /// Drops every tag of `track`, returning whether it had any.
    pub fn clear(&mut self, track: &TrackId) -> bool {
        self.0
            .remove(track)
            .is_some_and(|tags| !tags.is_empty())
    }

    /// Removes `tag` from every track, returning how many tracks lost it.
    pub fn remove_everywhere(&mut self, tag: &str) -> usize {
        let mut affected = 0;
        self.0.retain(|_, tags| {
            if tags.remove(tag) {
                affected += 1;
            }
            !tags.is_empty()
        });
        affected
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TrackId, &TagSet)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_first_position() {
        let mut tags = TagSet::new();
        assert!(tags.insert("rock"));
        assert!(tags.insert("chill"));
        assert!(!tags.insert("rock"));
        assert!(tags.insert("Rock"));
        assert_eq!(tags.as_slice(), ["rock", "chill", "Rock"]);
    }

    #[test]
    fn move_item_reorders() {
        let mut tags: TagSet = ["a", "b", "c"].into_iter().collect();
        assert!(tags.move_item(0, 2));
        assert_eq!(tags.as_slice(), ["b", "c", "a"]);
        assert!(!tags.move_item(3, 0));
        assert_eq!(tags.as_slice(), ["b", "c", "a"]);
    }

    #[test]
    fn set_relations() {
        let a: TagSet = ["rock", "live"].into_iter().collect();
        let b: TagSet = ["live", "rock", "90s"].into_iter().collect();
        let c: TagSet = ["pop"].into_iter().collect();

        assert!(a.is_subset(&b));
        assert!(!b.is_subset(&a));
        assert!(a.is_disjoint(&c));
        assert!(!a.is_disjoint(&b));
        assert_eq!(b.intersection(&a).as_slice(), ["live", "rock"]);
        assert_eq!(b.difference(&a).as_slice(), ["90s"]);
        assert!(TagSet::new().is_subset(&c));
    }

    #[test]
    fn deserializing_drops_duplicates() {
        let tags: TagSet = serde_json::from_str(r#"["a", "b", "a"]"#).unwrap();
        assert_eq!(tags.as_slice(), ["a", "b"]);
    }

    #[test]
    fn assignments_prune_empty_entries() {
        let track = TrackId::from("t1");
        let mut map = TagAssignments::default();

        assert!(map.assign(&track, "rock"));
        assert!(!map.assign(&track, "rock"));
        assert!(map.unassign(&track, "rock"));
        assert!(map.get(&track).is_none());
        assert!(!map.unassign(&track, "rock"));
        assert!(!map.clear(&track));
    }

    #[test]
    fn remove_everywhere_counts_tracks() {
        let mut map = TagAssignments::default();
        map.assign(&TrackId::from("t1"), "rock");
        map.assign(&TrackId::from("t1"), "live");
        map.assign(&TrackId::from("t2"), "rock");
        map.assign(&TrackId::from("t3"), "pop");

        assert_eq!(map.remove_everywhere("rock"), 2);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&TrackId::from("t1")).unwrap().as_slice(), ["live"]);
        assert!(map.get(&TrackId::from("t2")).is_none());
    }
}
