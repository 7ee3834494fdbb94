//! Room records, embedded stages, and the tagged lookup key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// Maximum stored length of `uniqueId`.
pub const UNIQUE_ID_MAX_LEN: usize = 128;

/// One puzzle step within a room. Stages have no identity of their own;
/// they are ordered by index inside the parent record's sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub solution: String,
    /// Data URI of the stage image, or empty.
    #[serde(default)]
    pub stage_image: String,
}

/// A persisted escape-room configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    pub id: i64,
    pub unique_id: Option<String>,
    pub name: String,
    /// Ordered stage sequence. Deserialization accepts both a JSON array and
    /// a JSON string holding serialized stages (text-typed storage engines
    /// hand the latter back).
    #[serde(deserialize_with = "stages_from_wire")]
    pub applied_images_data: Vec<Stage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn stages_from_wire<'de, D>(de: D) -> Result<Vec<Stage>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Parsed(Vec<Stage>),
        Raw(String),
    }
    match Wire::deserialize(de)? {
        Wire::Parsed(stages) => Ok(stages),
        Wire::Raw(s) => serde_json::from_str(&s).map_err(serde::de::Error::custom),
    }
}

/// Validated input for the create operation.
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub unique_id: Option<String>,
    pub name: String,
    pub stages: Vec<Stage>,
}

/// Partial update: only the fields present in the request are applied.
#[derive(Debug, Clone, Default)]
pub struct RoomPatch {
    pub name: Option<String>,
    pub stages: Option<Vec<Stage>>,
}

/// Lookup key for a single record: the numeric primary key or the
/// client-supplied opaque identifier. Resolved once at the service boundary;
/// `id` wins when both query parameters are supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomKey {
    Id(i64),
    Uid(String),
}

impl RoomKey {
    /// Build a key from the `id`/`uid` query parameters. `Ok(None)` when
    /// neither is present; a non-numeric `id` is a client error, not a miss.
    pub fn from_params(id: Option<&str>, uid: Option<&str>) -> Result<Option<Self>, AppError> {
        if let Some(raw) = id {
            let n: i64 = raw.parse().map_err(|_| AppError::InvalidId)?;
            return Ok(Some(RoomKey::Id(n)));
        }
        Ok(uid.map(|u| RoomKey::Uid(u.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_prefers_id_over_uid() {
        let key = RoomKey::from_params(Some("7"), Some("t1")).unwrap();
        assert_eq!(key, Some(RoomKey::Id(7)));
    }

    #[test]
    fn key_rejects_non_numeric_id() {
        assert!(RoomKey::from_params(Some("abc"), None).is_err());
        // id is checked before uid, so a bad id is an error even with a valid uid
        assert!(RoomKey::from_params(Some("abc"), Some("t1")).is_err());
    }

    #[test]
    fn key_absent_when_no_params() {
        assert_eq!(RoomKey::from_params(None, None).unwrap(), None);
    }

    #[test]
    fn record_accepts_structured_stage_sequence() {
        let record: RoomRecord = serde_json::from_value(json!({
            "id": 1,
            "uniqueId": "t1",
            "name": "Room A",
            "appliedImagesData": [{"title": "Find the key"}],
            "createdAt": "2025-10-16T13:13:28Z",
            "updatedAt": "2025-10-16T13:13:28Z",
        }))
        .unwrap();
        assert_eq!(record.applied_images_data.len(), 1);
        assert_eq!(record.applied_images_data[0].title, "Find the key");
        assert_eq!(record.applied_images_data[0].solution, "");
    }

    #[test]
    fn record_accepts_stage_sequence_as_string() {
        let record: RoomRecord = serde_json::from_value(json!({
            "id": 2,
            "uniqueId": null,
            "name": "Room B",
            "appliedImagesData": "[{\"title\":\"t\",\"description\":\"d\",\"solution\":\"s\",\"stageImage\":\"\"}]",
            "createdAt": "2025-10-16T13:13:28Z",
            "updatedAt": "2025-10-16T13:13:28Z",
        }))
        .unwrap();
        assert_eq!(record.applied_images_data.len(), 1);
        assert_eq!(record.applied_images_data[0].description, "d");
    }

    #[test]
    fn stage_serializes_with_wire_names() {
        let v = serde_json::to_value(Stage {
            title: "t".into(),
            description: String::new(),
            solution: String::new(),
            stage_image: "data:image/png;base64,AAAA".into(),
        })
        .unwrap();
        assert_eq!(v["stageImage"], "data:image/png;base64,AAAA");
        assert!(v.get("stage_image").is_none());
    }
}
