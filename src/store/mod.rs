//! Diary entry storage
//!
//! [`DiaryStore`] is the persistence boundary used by the CLI and the
//! import/backfill pipelines. Mutations are validated before they touch
//! state and only reach disk on [`DiaryStore::commit`].

mod json;

pub use json::JsonStore;

use chrono::{DateTime, NaiveDate, Utc};
use media_diary_common::MediaKind;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

pub const MAX_TITLE_LEN: usize = 256;
pub const MAX_EXTERNAL_ID_LEN: usize = media_diary_common::letterboxd::EXTERNAL_ID_MAX_LEN;
pub const MAX_POSTER_LEN: usize = 512;
pub const RATING_RANGE: std::ops::RangeInclusive<i32> = 1..=10;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("invalid entry: {0}")]
    Validation(String),

    #[error("entry #{0} does not exist")]
    NotFound(u64),

    #[error("data file is corrupt: {0}")]
    Corrupt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One logged watch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: u64,
    /// Catalog id, or `letterboxd:...` for imported rows
    pub external_id: Option<String>,
    pub kind: MediaKind,
    pub title: String,
    pub poster_url: Option<String>,
    pub date_watched: Option<NaiveDate>,
    /// 1..=10
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DiaryEntry {
    pub fn has_poster(&self) -> bool {
        self.poster_url
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
    }
}

/// Fields for a new entry; id and timestamp are assigned by the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEntry {
    pub external_id: Option<String>,
    pub kind: MediaKind,
    pub title: String,
    pub poster_url: Option<String>,
    pub date_watched: Option<NaiveDate>,
    pub rating: Option<i32>,
    pub review: Option<String>,
}

impl NewEntry {
    pub fn validate(&self) -> Result<(), StoreError> {
        validate_title(&self.title)?;
        check_len("external id", self.external_id.as_deref(), MAX_EXTERNAL_ID_LEN)?;
        check_len("poster url", self.poster_url.as_deref(), MAX_POSTER_LEN)?;
        validate_rating(self.rating)
    }
}

/// Partial update. The outer `Option` means "leave unchanged", the inner
/// one is the new value (`Some(None)` clears the field).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryPatch {
    pub title: Option<String>,
    pub poster_url: Option<Option<String>>,
    pub date_watched: Option<Option<NaiveDate>>,
    pub rating: Option<Option<i32>>,
    pub review: Option<Option<String>>,
}

impl EntryPatch {
    pub fn poster(url: impl Into<String>) -> Self {
        Self {
            poster_url: Some(Some(url.into())),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(poster) = &self.poster_url {
            check_len("poster url", poster.as_deref(), MAX_POSTER_LEN)?;
        }
        if let Some(rating) = self.rating {
            validate_rating(rating)?;
        }
        Ok(())
    }

    pub(crate) fn apply(self, entry: &mut DiaryEntry) {
        if let Some(title) = self.title {
            entry.title = title;
        }
        if let Some(poster) = self.poster_url {
            entry.poster_url = poster;
        }
        if let Some(date) = self.date_watched {
            entry.date_watched = date;
        }
        if let Some(rating) = self.rating {
            entry.rating = rating;
        }
        if let Some(review) = self.review {
            entry.review = review;
        }
    }
}

/// Record store for diary entries
pub trait DiaryStore {
    fn create(&mut self, entry: NewEntry) -> Result<DiaryEntry, StoreError>;

    fn get(&self, id: u64) -> Option<DiaryEntry>;

    /// All entries, newest created first
    fn list(&self) -> Vec<DiaryEntry>;

    fn update(&mut self, id: u64, patch: EntryPatch) -> Result<DiaryEntry, StoreError>;

    fn delete(&mut self, id: u64) -> Result<DiaryEntry, StoreError>;

    /// Remove every entry, returning how many were removed
    fn clear(&mut self) -> usize;

    /// Persist staged changes
    fn commit(&mut self) -> Result<(), StoreError>;
}

/// Newest created first; ids break ties between entries created in the same instant
pub fn created_desc(a: &DiaryEntry, b: &DiaryEntry) -> Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

/// Diary order: watched date descending, undated entries last, then newest created
pub fn diary_order(a: &DiaryEntry, b: &DiaryEntry) -> Ordering {
    match (a.date_watched, b.date_watched) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| created_desc(a, b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => created_desc(a, b),
    }
}

/// Sort into diary order and group consecutive entries sharing a watched date
pub fn group_by_watched_date(
    mut entries: Vec<DiaryEntry>,
) -> Vec<(Option<NaiveDate>, Vec<DiaryEntry>)> {
    entries.sort_by(diary_order);

    let mut groups: Vec<(Option<NaiveDate>, Vec<DiaryEntry>)> = Vec::new();
    for entry in entries {
        match groups.last_mut() {
            Some((date, group)) if *date == entry.date_watched => group.push(entry),
            _ => groups.push((entry.date_watched, vec![entry])),
        }
    }
    groups
}

fn validate_title(title: &str) -> Result<(), StoreError> {
    if title.trim().is_empty() {
        return Err(StoreError::Validation("title is empty".into()));
    }
    check_len("title", Some(title), MAX_TITLE_LEN)
}

fn validate_rating(rating: Option<i32>) -> Result<(), StoreError> {
    match rating {
        Some(r) if !RATING_RANGE.contains(&r) => Err(StoreError::Validation(format!(
            "rating {} is outside {}..={}",
            r,
            RATING_RANGE.start(),
            RATING_RANGE.end()
        ))),
        _ => Ok(()),
    }
}

fn check_len(field: &str, value: Option<&str>, max: usize) -> Result<(), StoreError> {
    match value {
        Some(v) if v.chars().count() > max => Err(StoreError::Validation(format!(
            "{} is longer than {} characters",
            field, max
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(id: u64, date: Option<(i32, u32, u32)>, created_secs: i64) -> DiaryEntry {
        DiaryEntry {
            id,
            external_id: None,
            kind: MediaKind::Movie,
            title: format!("Entry {}", id),
            poster_url: None,
            date_watched: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            rating: None,
            review: None,
            created_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_new_entry_validation() {
        let ok = NewEntry {
            title: "Heat".into(),
            rating: Some(10),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let empty = NewEntry {
            title: "   ".into(),
            ..Default::default()
        };
        assert!(matches!(empty.validate(), Err(StoreError::Validation(_))));

        let too_high = NewEntry {
            title: "Heat".into(),
            rating: Some(11),
            ..Default::default()
        };
        assert!(too_high.validate().is_err());

        let long_title = NewEntry {
            title: "x".repeat(MAX_TITLE_LEN + 1),
            ..Default::default()
        };
        assert!(long_title.validate().is_err());
    }

    #[test]
    fn test_patch_apply_clears_fields() {
        let mut e = entry(1, Some((2024, 3, 1)), 0);
        e.rating = Some(8);

        let patch = EntryPatch {
            date_watched: Some(None),
            rating: Some(None),
            ..Default::default()
        };
        patch.apply(&mut e);

        assert_eq!(e.date_watched, None);
        assert_eq!(e.rating, None);
        assert_eq!(e.title, "Entry 1");
    }

    #[test]
    fn test_patch_poster() {
        let patch = EntryPatch::poster("https://img/p.jpg");
        assert!(!patch.is_empty());
        assert!(EntryPatch::default().is_empty());
    }

    #[test]
    fn test_diary_order() {
        let mut entries = vec![
            entry(1, None, 10),
            entry(2, Some((2024, 1, 5)), 1),
            entry(3, Some((2024, 2, 1)), 2),
            entry(4, Some((2024, 1, 5)), 3),
            entry(5, None, 20),
        ];
        entries.sort_by(diary_order);

        let ids: Vec<u64> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 4, 2, 5, 1]);
    }

    #[test]
    fn test_group_by_watched_date() {
        let groups = group_by_watched_date(vec![
            entry(1, Some((2024, 1, 5)), 1),
            entry(2, None, 2),
            entry(3, Some((2024, 1, 5)), 3),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, None);
    }

    #[test]
    fn test_created_desc_tie_breaks_on_id() {
        let a = entry(1, None, 5);
        let b = entry(2, None, 5);
        assert_eq!(created_desc(&a, &b), Ordering::Greater);
    }
}
