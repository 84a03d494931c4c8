//! Per-run poster cache
//!
//! Keyed by normalized title and release year, so "Amélie" and "Amelie"
//! from the same export share one lookup. A cached `None` is a confirmed
//! miss and counts as a hit.

use media_diary_common::normalize_title;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    title: String,
    year: Option<i32>,
}

impl CacheKey {
    pub fn new(raw_title: &str, year: Option<i32>) -> Self {
        Self {
            title: normalize_title(raw_title),
            year,
        }
    }
}

#[derive(Debug, Default)]
pub struct PosterCache {
    entries: HashMap<CacheKey, Option<String>>,
}

impl PosterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None`: never looked up. `Some(None)`: looked up, no poster.
    pub fn get(&self, key: &CacheKey) -> Option<Option<&str>> {
        self.entries.get(key).map(|poster| poster.as_deref())
    }

    pub fn insert(&mut self, key: CacheKey, poster: Option<String>) {
        self.entries.insert(key, poster);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_normalizes_title() {
        assert_eq!(
            CacheKey::new("Amélie", Some(2001)),
            CacheKey::new("amelie", Some(2001))
        );
        assert_ne!(
            CacheKey::new("Amélie", Some(2001)),
            CacheKey::new("Amélie", None)
        );
    }

    #[test]
    fn test_negative_entry_is_a_hit() {
        let mut cache = PosterCache::new();
        let key = CacheKey::new("Unknown Film", Some(1999));
        assert_eq!(cache.get(&key), None);

        cache.insert(key.clone(), None);
        assert_eq!(cache.get(&key), Some(None));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_positive_entry() {
        let mut cache = PosterCache::new();
        let key = CacheKey::new("Heat", Some(1995));
        cache.insert(key.clone(), Some("https://img/heat.jpg".into()));
        assert_eq!(cache.get(&key), Some(Some("https://img/heat.jpg")));
    }
}
