use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier the streaming service assigns to a track.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd)]
#[serde(transparent)]
pub struct TrackId(pub String);

impl TrackId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for TrackId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRef {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ArtistRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: Map::new(),
        }
    }
}

/// A track as last seen from the streaming service.
///
/// Only `id` is interpreted. Display fields are carried as-is, and any other
/// field the service sent is kept in `extra` so that a save writes it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: TrackId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TrackRecord {
    pub fn new(id: impl Into<TrackId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artists: Vec::new(),
            uri: None,
            extra: Map::new(),
        }
    }

    pub fn with_artist(mut self, name: impl Into<String>) -> Self {
        self.artists.push(ArtistRef::named(name));
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Artist names joined for display, e.g. `"Pink Floyd, David Gilmour"`.
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|artist| artist.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Tracks seen while browsing, in first-seen order, at most one per id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<TrackRecord>", into = "Vec<TrackRecord>")]
pub struct TrackCache {
    records: Vec<TrackRecord>,
    positions: HashMap<TrackId, usize>,
}

impl TrackCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `record` unless a record with the same id is already cached.
    /// The cached record is left as it was.
    pub fn insert(&mut self, record: TrackRecord) -> bool {
        if self.positions.contains_key(&record.id) {
            return false;
        }
        self.positions.insert(record.id.clone(), self.records.len());
        self.records.push(record);
        true
    }

    /// Inserts every record, returning how many were new.
    pub fn extend<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = TrackRecord>,
    {
        records
            .into_iter()
            .map(|record| self.insert(record))
            .filter(|added| *added)
            .count()
    }

    pub fn get(&self, id: &TrackId) -> Option<&TrackRecord> {
        self.positions.get(id).map(|&idx| &self.records[idx])
    }

    pub fn contains(&self, id: &TrackId) -> bool {
        self.positions.contains_key(id)
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.positions.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackRecord> {
        self.records.iter()
    }
}

impl From<Vec<TrackRecord>> for TrackCache {
    fn from(records: Vec<TrackRecord>) -> Self {
        let mut cache = TrackCache::new();
        cache.extend(records);
        cache
    }
}

impl From<TrackCache> for Vec<TrackRecord> {
    fn from(cache: TrackCache) -> Self {
        cache.records
    }
}

impl<'a> IntoIterator for &'a TrackCache {
    type Item = &'a TrackRecord;
    type IntoIter = std::slice::Iter<'a, TrackRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_insert_keeps_original() {
        let mut cache = TrackCache::new();
        assert!(cache.insert(TrackRecord::new("a", "Time")));
        assert!(cache.insert(TrackRecord::new("b", "Reckoner")));
        assert!(!cache.insert(TrackRecord::new("a", "Time (Remastered)")));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.iter().next().unwrap().name, "Time");
        assert_eq!(cache.get(&TrackId::from("b")).unwrap().name, "Reckoner");
    }

    #[test]
    fn record_keeps_unknown_fields() {
        let raw = r#"{
            "id": "6rqhFgbbKwnb9MLmUQDhG6",
            "name": "Because",
            "artists": [{"name": "The Beatles", "type": "artist"}],
            "uri": "spotify:track:6rqhFgbbKwnb9MLmUQDhG6",
            "durationMS": 165000,
            "isLocal": false
        }"#;
        let record: TrackRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.artist_names(), "The Beatles");
        assert_eq!(record.extra.get("durationMS"), Some(&Value::from(165000)));

        let encoded = serde_json::to_value(&record).unwrap();
        assert_eq!(encoded["isLocal"], Value::Bool(false));
        assert_eq!(encoded["artists"][0]["type"], Value::from("artist"));
    }

    #[test]
    fn record_requires_id() {
        let err = serde_json::from_str::<TrackRecord>(r#"{"name": "No id"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn artist_names_joined() {
        let record = TrackRecord::new("a", "Ode to Viceroy")
            .with_artist("Mac DeMarco")
            .with_artist("Guest");
        assert_eq!(record.artist_names(), "Mac DeMarco, Guest");
        assert_eq!(TrackRecord::new("b", "x").artist_names(), "");
    }
}
