use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ContentKind, ItemId};

/// A saved content item. `(id, kind)` identifies it within a user's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub title: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl Bookmark {
    #[must_use]
    pub fn new(
        id: ItemId,
        kind: ContentKind,
        title: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            timestamp,
        }
    }

    #[must_use]
    pub fn matches(&self, id: ItemId, kind: ContentKind) -> bool {
        self.id == id && self.kind == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn persists_in_source_layout() {
        let bookmark = Bookmark::new(ItemId::new(3), ContentKind::Book, "Preamble", fixed_now());
        let json = serde_json::to_value(&bookmark).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["type"], "book");
        assert_eq!(json["timestamp"], 1_700_000_000_000_i64);
    }
}
