//! Letterboxd import
//!
//! Every row with a title becomes a diary entry, with a poster when the
//! catalog has one. Lookup and per-row persistence failures are counted,
//! never fatal.

use crate::catalog::Catalog;
use crate::error::{DiaryError, Result};
use crate::reconcile::Reconciler;
use crate::store::{DiaryStore, NewEntry};
use indicatif::ProgressBar;
use media_diary_common::{parse_export, ImportRow, MediaKind};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// Outcome of one import run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub added: usize,
    /// Added rows that got a poster
    pub enriched: usize,
    /// Rows the store rejected
    pub errors: usize,
    /// Rows without a title
    pub skipped: usize,
    pub lookups: usize,
    pub lookup_failures: usize,
    pub cache_hits: usize,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Imported {} entries ({} with posters), {} errors",
            self.added, self.enriched, self.errors
        )?;
        if self.skipped > 0 {
            write!(f, ", {} skipped", self.skipped)?;
        }
        Ok(())
    }
}

/// Import a Letterboxd CSV file.
///
/// Only `.csv` files are accepted. Invalid UTF-8 is replaced rather than
/// rejected.
pub async fn import_file<C, S>(
    path: &Path,
    catalog: &C,
    store: &mut S,
    progress: &ProgressBar,
) -> Result<ImportReport>
where
    C: Catalog + ?Sized,
    S: DiaryStore + ?Sized,
{
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(DiaryError::InvalidImportFile(path.display().to_string()));
    }
    if !path.exists() {
        return Err(DiaryError::FileNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    import_export(&text, catalog, store, progress).await
}

/// Import the contents of a Letterboxd export, committing the store once at the end.
pub async fn import_export<C, S>(
    text: &str,
    catalog: &C,
    store: &mut S,
    progress: &ProgressBar,
) -> Result<ImportReport>
where
    C: Catalog + ?Sized,
    S: DiaryStore + ?Sized,
{
    let table = parse_export(text)?;
    progress.set_length(table.len() as u64);

    let mut reconciler = Reconciler::new(catalog);
    let mut report = ImportReport::default();

    for record in table.records() {
        progress.inc(1);

        let row = match ImportRow::from_record(&record) {
            Some(row) => row,
            None => {
                report.skipped += 1;
                continue;
            }
        };
        progress.set_message(row.title.clone());

        let poster = reconciler.poster_for(&row.title, row.year).await;
        let enriched = poster.is_some();

        let entry = NewEntry {
            external_id: Some(row.external_id()),
            kind: MediaKind::Movie,
            title: row.title.clone(),
            poster_url: poster,
            date_watched: row.watched,
            rating: row.rating,
            review: row.review(),
        };

        match store.create(entry) {
            Ok(_) => {
                report.added += 1;
                if enriched {
                    report.enriched += 1;
                }
            }
            Err(e) => {
                report.errors += 1;
                warn!(title = %row.title, error = %e, "row not saved");
            }
        }
    }

    store.commit()?;
    progress.finish_and_clear();

    let stats = reconciler.stats();
    report.lookups = stats.lookups;
    report.lookup_failures = stats.lookup_failures;
    report.cache_hits = stats.cache_hits;

    info!(
        added = report.added,
        enriched = report.enriched,
        errors = report.errors,
        lookups = report.lookups,
        cache_hits = report.cache_hits,
        "import finished"
    );
    Ok(report)
}
