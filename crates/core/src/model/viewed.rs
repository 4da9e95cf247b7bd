use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::{ContentKind, ItemId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ViewedKeyError {
    #[error("viewed marker must look like `kind-id`: {0}")]
    Malformed(String),
}

/// Marker that a content item was opened, persisted as `"{type}-{id}"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ViewedKey {
    kind: ContentKind,
    id: ItemId,
}

impl ViewedKey {
    #[must_use]
    pub fn new(id: ItemId, kind: ContentKind) -> Self {
        Self { kind, id }
    }

    #[must_use]
    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }
}

impl fmt::Display for ViewedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.id)
    }
}

impl FromStr for ViewedKey {
    type Err = ViewedKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ViewedKeyError::Malformed(s.to_string());
        let (kind, id) = s.split_once('-').ok_or_else(malformed)?;
        let kind = kind.parse::<ContentKind>().map_err(|_| malformed())?;
        let id = id.parse::<u64>().map_err(|_| malformed())?;
        Ok(Self::new(ItemId::new(id), kind))
    }
}

impl TryFrom<String> for ViewedKey {
    type Error = ViewedKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ViewedKey> for String {
    fn from(key: ViewedKey) -> Self {
        key.to_string()
    }
}

/// Insertion-ordered set of viewed markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ViewedKey>", into = "Vec<ViewedKey>")]
pub struct ViewedSet {
    keys: Vec<ViewedKey>,
}

impl ViewedSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the marker if absent. Returns `true` when the set changed.
    pub fn insert(&mut self, key: ViewedKey) -> bool {
        if self.contains(key) {
            return false;
        }
        self.keys.push(key);
        true
    }

    #[must_use]
    pub fn contains(&self, key: ViewedKey) -> bool {
        self.keys.contains(&key)
    }

    /// Number of distinct items of `kind` that were opened.
    #[must_use]
    pub fn count(&self, kind: ContentKind) -> usize {
        self.keys.iter().filter(|k| k.kind == kind).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ViewedKey> {
        self.keys.iter()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

impl From<Vec<ViewedKey>> for ViewedSet {
    fn from(keys: Vec<ViewedKey>) -> Self {
        let mut set = Self::new();
        for key in keys {
            set.insert(key);
        }
        set
    }
}

impl From<ViewedSet> for Vec<ViewedKey> {
    fn from(set: ViewedSet) -> Self {
        set.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_round_trips_through_marker_string() {
        let key = ViewedKey::new(ItemId::new(14), ContentKind::Article);
        assert_eq!(key.to_string(), "article-14");
        assert_eq!("article-14".parse::<ViewedKey>().unwrap(), key);
    }

    #[test]
    fn malformed_markers_are_rejected() {
        assert!("article".parse::<ViewedKey>().is_err());
        assert!("song-3".parse::<ViewedKey>().is_err());
        assert!("book-x".parse::<ViewedKey>().is_err());
    }

    #[test]
    fn insert_is_idempotent() {
        let mut set = ViewedSet::new();
        let key = ViewedKey::new(ItemId::new(14), ContentKind::Article);
        assert!(set.insert(key));
        assert!(!set.insert(key));
        assert_eq!(set.len(), 1);
        assert_eq!(set.count(ContentKind::Article), 1);
    }

    #[test]
    fn duplicates_in_persisted_list_collapse() {
        let set: ViewedSet =
            serde_json::from_str(r#"["video-1","book-2","video-1"]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.count(ContentKind::Video), 1);
        assert_eq!(
            serde_json::to_string(&set).unwrap(),
            r#"["video-1","book-2"]"#
        );
    }
}
