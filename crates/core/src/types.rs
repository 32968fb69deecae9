use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Opaque user identifier. Equality is byte-exact on the wrapped string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

/// Opaque item identifier. Equality is byte-exact on the wrapped string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        UserId(s)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId(s.to_string())
    }
}

/// An `(id, score)` pair as returned by the cache store's ranked lists.
/// Ordering among a `Vec<Scored>` is defined by the producer; nothing in
/// this crate re-sorts one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scored {
    pub id: String,
    pub score: f32,
}

impl Scored {
    pub fn new(id: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            score,
        }
    }
}

/// A user's feedback on an item. Identified by the `(user_id, item_id,
/// feedback_type)` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub feedback_type: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub comment: String,
}

impl Feedback {
    pub fn new(
        user_id: impl Into<UserId>,
        item_id: impl Into<ItemId>,
        feedback_type: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            feedback_type: feedback_type.into(),
            timestamp,
            comment: String::new(),
        }
    }

    pub fn key(&self) -> (UserId, ItemId, String) {
        (
            self.user_id.clone(),
            self.item_id.clone(),
            self.feedback_type.clone(),
        )
    }
}

/// A catalog item known to the data store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: ItemId,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub categories: HashSet<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub labels: HashSet<String>,
}

impl Item {
    pub fn new(item_id: impl Into<ItemId>) -> Self {
        Self {
            item_id: item_id.into(),
            is_hidden: false,
            categories: HashSet::new(),
            timestamp: Utc::now(),
            labels: HashSet::new(),
        }
    }

    /// Empty category means "any" and matches every item.
    pub fn in_category(&self, category: &str) -> bool {
        category.is_empty() || self.categories.contains(category)
    }
}

/// A user row known to the data store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    #[serde(default)]
    pub labels: HashSet<String>,
    #[serde(default)]
    pub subscribe: HashSet<String>,
}

impl User {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            labels: HashSet::new(),
            subscribe: HashSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_in_category_empty_matches_any() {
        let item = Item::new("i1");
        assert!(item.in_category(""));
        assert!(!item.in_category("books"));
    }

    #[test]
    fn item_in_category_matches_member() {
        let mut item = Item::new("i1");
        item.categories.insert("books".to_string());
        assert!(item.in_category("books"));
        assert!(!item.in_category("music"));
    }

    #[test]
    fn feedback_key_identifies_triple() {
        let fb = Feedback {
            user_id: "u1".into(),
            item_id: "i1".into(),
            feedback_type: "like".to_string(),
            timestamp: Utc::now(),
            comment: String::new(),
        };
        assert_eq!(
            fb.key(),
            (UserId("u1".to_string()), ItemId("i1".to_string()), "like".to_string())
        );
    }
}
