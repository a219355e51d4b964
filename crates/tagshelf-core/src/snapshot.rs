use serde::{Deserialize, Serialize};

use crate::tags::{TagAssignments, TagSet};
use crate::track::TrackCache;

/// Everything that is written to disk, as one value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub tags: TagSet,
    pub track_tags: TagAssignments,
    pub track_cache: TrackCache,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.track_tags.is_empty() && self.track_cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{TrackId, TrackRecord};

    #[test]
    fn uses_camel_case_keys() {
        let mut snapshot = Snapshot::default();
        snapshot.tags.insert("rock");
        snapshot.track_tags.assign(&TrackId::from("a"), "rock");
        snapshot.track_cache.insert(TrackRecord::new("a", "Time"));

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["tags"], serde_json::json!(["rock"]));
        assert_eq!(value["trackTags"], serde_json::json!({"a": ["rock"]}));
        assert_eq!(value["trackCache"][0]["id"], "a");
    }

    #[test]
    fn all_fields_are_required() {
        let missing = r#"{"tags": [], "trackTags": {}}"#;
        assert!(serde_json::from_str::<Snapshot>(missing).is_err());

        let wrong_type = r#"{"tags": {}, "trackTags": {}, "trackCache": []}"#;
        assert!(serde_json::from_str::<Snapshot>(wrong_type).is_err());
    }
}
