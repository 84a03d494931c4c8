//! Title reconciliation
//!
//! Resolves a free-text (title, year) pair to a poster using catalog search
//! plus the ranker, with one [`PosterCache`] per run.

mod cache;

pub use cache::{CacheKey, PosterCache};

use crate::catalog::Catalog;
use media_diary_common::{normalize_title, rank, Candidate, MatchQuery};
use tracing::{debug, warn};

/// Catalog traffic of one run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LookupStats {
    /// Search requests issued, retries included
    pub lookups: usize,
    pub lookup_failures: usize,
    pub cache_hits: usize,
}

/// Poster resolver for a single import or backfill run.
///
/// Lookups are issued one at a time in call order.
pub struct Reconciler<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    cache: PosterCache,
    stats: LookupStats,
}

impl<'a, C: Catalog + ?Sized> Reconciler<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self {
            catalog,
            cache: PosterCache::new(),
            stats: LookupStats::default(),
        }
    }

    pub fn stats(&self) -> LookupStats {
        self.stats
    }

    pub fn cache(&self) -> &PosterCache {
        &self.cache
    }

    /// Poster for `title` released in `year`, if the catalog has one.
    ///
    /// Searches with the year first and retries without it when nothing
    /// usable comes back. Lookup failures count as empty results.
    pub async fn poster_for(&mut self, title: &str, year: Option<i32>) -> Option<String> {
        let key = CacheKey::new(title, year);
        if let Some(cached) = self.cache.get(&key) {
            self.stats.cache_hits += 1;
            debug!(title, ?year, "poster cache hit");
            return cached.map(str::to_string);
        }

        let query = MatchQuery::new(title, year);
        let mut poster = self.search(&query, year).await;
        if poster.is_none() && year.is_some() {
            debug!(title, "retrying without year");
            poster = self.search(&query, None).await;
        }

        self.cache.insert(key, poster.clone());
        poster
    }

    async fn search(&mut self, query: &MatchQuery, year_hint: Option<i32>) -> Option<String> {
        self.stats.lookups += 1;

        let candidates = match self.catalog.search_by_title(&query.raw_title, year_hint).await {
            Ok(candidates) => candidates,
            Err(e) => {
                self.stats.lookup_failures += 1;
                warn!(title = %query.raw_title, ?year_hint, error = %e, "catalog lookup failed");
                Vec::new()
            }
        };

        debug!(
            title = %query.raw_title,
            ?year_hint,
            count = candidates.len(),
            "catalog candidates"
        );
        select_poster(query, &candidates)
    }
}

/// Pick a poster from search results.
///
/// Only candidates with a poster are eligible. Among eligible candidates
/// whose normalized title equals the query, the ranker picks one (so the
/// release year decides between remakes, and the earlier one wins ties).
/// Without such a hit the first eligible candidate in catalog order is used.
pub fn select_poster(query: &MatchQuery, candidates: &[Candidate]) -> Option<String> {
    let eligible: Vec<Candidate> = candidates
        .iter()
        .filter(|c| c.has_poster())
        .cloned()
        .collect();

    let wanted = normalize_title(&query.raw_title);
    let exact: Vec<Candidate> = eligible
        .iter()
        .filter(|c| normalize_title(&c.title) == wanted)
        .cloned()
        .collect();

    rank(query, &exact)
        .into_candidate()
        .or_else(|| eligible.into_iter().next())
        .and_then(|c| c.poster)
}
