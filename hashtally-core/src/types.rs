use crate::normalize::normalize;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use time::{Date, OffsetDateTime};

/// Public profile snapshot, fetched once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub handle: String,
    pub followers_count: u64,
    pub total_posts_count: u64,
}

/// A single post as seen by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub tags: Vec<TagMention>,
}

/// Tag text exactly as it appeared in the post, without the leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagMention {
    pub raw_text: String,
}

impl TagMention {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
        }
    }
}

/// Allow-list of normalized tags. Empty admits everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    allowed: HashSet<String>,
}

impl TagFilter {
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: tags.into_iter().map(|t| normalize(t.as_ref())).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    /// Whether a raw tag passes the filter once normalized.
    pub fn admits(&self, raw_text: &str) -> bool {
        self.allowed.is_empty() || self.allowed.contains(&normalize(raw_text))
    }
}

/// Occurrences per raw tag text.
///
/// Keys keep their original casing and accents: `"Go"` and `"go"` are
/// counted separately even though they normalize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashtagCounts(BTreeMap<String, u64>);

impl HashtagCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, raw_text: &str) {
        match self.0.get_mut(raw_text) {
            Some(count) => *count += 1,
            None => {
                self.0.insert(raw_text.to_owned(), 1);
            }
        }
    }

    pub fn get(&self, raw_text: &str) -> Option<u64> {
        self.0.get(raw_text).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counted mentions.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Entries by descending count, ties broken by key.
    pub fn ranked(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

impl<K: Into<String>> FromIterator<(K, u64)> for HashtagCounts {
    fn from_iter<T: IntoIterator<Item = (K, u64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Outcome of one aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub handle: String,
    pub followers_count: u64,
    pub total_posts_count: u64,
    pub run_date: Date,
    pub posts_read: u64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub oldest_post_read: Option<OffsetDateTime>,
    pub hashtag_counts: HashtagCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matches_on_normalized_text() {
        let filter = TagFilter::from_tags(["cats"]);
        assert!(filter.admits("Cats"));
        assert!(!filter.admits("Dogs"));
        assert!(!filter.admits("café"));
    }

    #[test]
    fn filter_entries_are_normalized_too() {
        let filter = TagFilter::from_tags(["Café", "CAFE"]);
        assert_eq!(filter.len(), 1);
        assert!(filter.admits("cafe"));
        assert!(filter.admits("CAFÉ"));
    }

    #[test]
    fn empty_filter_admits_everything() {
        let filter = TagFilter::from_tags(Vec::<String>::new());
        assert!(filter.is_empty());
        assert!(filter.admits("anything"));
        assert!(filter.admits(""));
    }

    #[test]
    fn counts_keep_raw_keys_apart() {
        let mut counts = HashtagCounts::new();
        counts.increment("Go");
        counts.increment("go");
        counts.increment("Go");
        assert_eq!(counts.get("Go"), Some(2));
        assert_eq!(counts.get("go"), Some(1));
        assert_eq!(counts.get("GO"), None);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn ranked_orders_by_count_then_key() {
        let counts: HashtagCounts = [("b", 2), ("a", 2), ("c", 5), ("d", 1)]
            .into_iter()
            .collect();
        assert_eq!(
            counts.ranked(),
            vec![("c", 5), ("a", 2), ("b", 2), ("d", 1)]
        );
    }

    #[test]
    fn counts_serialize_as_plain_map() {
        let counts: HashtagCounts = [("Rust", 1), ("Go", 2)].into_iter().collect();
        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json, serde_json::json!({"Go": 2, "Rust": 1}));
    }
}
