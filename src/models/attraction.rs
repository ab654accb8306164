//! Attraction (schedule entry) model

use std::fmt;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Kind of show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttractionKind {
    #[default]
    Banda,
    Dj,
    #[serde(other)]
    Outro,
}

impl fmt::Display for AttractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AttractionKind::Banda => "banda",
            AttractionKind::Dj => "dj",
            AttractionKind::Outro => "outro",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub time: String,
    #[serde(rename = "type", default)]
    pub kind: AttractionKind,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Attraction {
    pub fn featured(&self) -> bool {
        self.is_featured.unwrap_or(false)
    }
}

/// Create/update payload for an attraction
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttractionDraft {
    pub name: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: AttractionKind,
    pub is_featured: bool,
}

impl AttractionDraft {
    /// Name and time are both required
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.time.trim().is_empty()
    }
}

impl From<&Attraction> for AttractionDraft {
    fn from(attraction: &Attraction) -> Self {
        Self {
            name: attraction.name.clone(),
            time: attraction.time.clone(),
            kind: attraction.kind,
            is_featured: attraction.featured(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_kind_falls_back_to_outro() {
        let attraction: Attraction = serde_json::from_value(json!({
            "id": "a-1",
            "name": "Orquestra",
            "time": "20:00",
            "type": "orquestra",
            "is_featured": null
        }))
        .unwrap();

        assert_eq!(attraction.kind, AttractionKind::Outro);
        assert!(!attraction.featured());
    }

    #[test]
    fn test_draft_serializes_type_column() {
        let draft = AttractionDraft {
            name: "DJ Folia".to_string(),
            time: "22:30".to_string(),
            kind: AttractionKind::Dj,
            is_featured: true,
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["type"], "dj");
        assert_eq!(value["is_featured"], true);
    }

    #[test]
    fn test_draft_completeness() {
        let mut draft = AttractionDraft::default();
        assert!(!draft.is_complete());
        draft.name = "Banda".to_string();
        draft.time = "  ".to_string();
        assert!(!draft.is_complete());
        draft.time = "19:00".to_string();
        assert!(draft.is_complete());
    }
}
