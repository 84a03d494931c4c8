//! Poster backfill for entries saved without one

use crate::catalog::Catalog;
use crate::error::Result;
use crate::reconcile::Reconciler;
use crate::store::{DiaryEntry, DiaryStore, EntryPatch};
use chrono::Datelike;
use indicatif::ProgressBar;
use media_diary_common::year_from_external_id;
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BackfillReport {
    /// Entries that had no poster
    pub scanned: usize,
    pub filled: usize,
    pub errors: usize,
    /// Titles still without a poster, up to the report limit
    pub missing: Vec<String>,
    /// Missing titles beyond the limit
    pub missing_overflow: usize,
    pub lookups: usize,
    pub cache_hits: usize,
}

impl BackfillReport {
    pub fn missing_total(&self) -> usize {
        self.missing.len() + self.missing_overflow
    }
}

impl fmt::Display for BackfillReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Filled {} of {} entries missing posters, {} errors",
            self.filled, self.scanned, self.errors
        )
    }
}

/// Year used as the search hint: the watched year, else a year embedded in
/// an imported external id.
pub fn year_hint(entry: &DiaryEntry) -> Option<i32> {
    entry
        .date_watched
        .map(|date| date.year())
        .or_else(|| entry.external_id.as_deref().and_then(year_from_external_id))
}

/// Look up posters for every entry without one.
///
/// `missing_limit` caps the list of titles reported as not found.
pub async fn backfill_posters<C, S>(
    catalog: &C,
    store: &mut S,
    missing_limit: usize,
    progress: &ProgressBar,
) -> Result<BackfillReport>
where
    C: Catalog + ?Sized,
    S: DiaryStore + ?Sized,
{
    let mut pending: Vec<DiaryEntry> = store
        .list()
        .into_iter()
        .filter(|entry| !entry.has_poster())
        .collect();
    pending.sort_by_key(|entry| entry.id);
    progress.set_length(pending.len() as u64);

    let mut reconciler = Reconciler::new(catalog);
    let mut report = BackfillReport {
        scanned: pending.len(),
        ..Default::default()
    };

    for entry in pending {
        progress.inc(1);
        progress.set_message(entry.title.clone());

        match reconciler.poster_for(&entry.title, year_hint(&entry)).await {
            Some(poster) => match store.update(entry.id, EntryPatch::poster(poster)) {
                Ok(_) => report.filled += 1,
                Err(e) => {
                    report.errors += 1;
                    warn!(id = entry.id, title = %entry.title, error = %e, "poster not saved");
                }
            },
            None => {
                if report.missing.len() < missing_limit {
                    report.missing.push(entry.title);
                } else {
                    report.missing_overflow += 1;
                }
            }
        }
    }

    store.commit()?;
    progress.finish_and_clear();

    let stats = reconciler.stats();
    report.lookups = stats.lookups;
    report.cache_hits = stats.cache_hits;

    info!(
        scanned = report.scanned,
        filled = report.filled,
        missing = report.missing_total(),
        "backfill finished"
    );
    Ok(report)
}
