//! Catalog collaborator
//!
//! Read-only access to the movie/series catalog: text search for the
//! reconciliation pipeline and detail fetches for `diary show`.

mod mock;
mod tmdb;

pub use mock::{MockCatalog, SearchCall};
pub use tmdb::TmdbClient;

use media_diary_common::{Candidate, MediaKind};
use serde::Serialize;
use thiserror::Error;

/// A failed catalog request. The import pipeline treats it as "no results".
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("catalog returned HTTP {0}")]
    Status(u16),

    #[error("unexpected response: {0}")]
    Parse(String),

    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CastMember {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub character: Option<String>,
    pub photo: Option<String>,
}

/// Full record behind a detail page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetailRecord {
    pub id: u64,
    pub kind: MediaKind,
    pub title: String,
    pub poster: Option<String>,
    pub overview: Option<String>,
    pub year: Option<i32>,
    pub status: Option<String>,
    pub genres: Vec<String>,
    pub studios: Vec<String>,
    /// Minutes (episode runtime for series)
    pub runtime: Option<u32>,
    pub rating: Option<f64>,
    pub cast: Vec<CastMember>,
}

/// Catalog lookups.
///
/// Implementations return candidates in their own relevance order; callers
/// rely on that order for tie-breaking.
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    /// Search by free text.
    ///
    /// # Arguments
    /// * `text` - title as typed or imported
    /// * `year_hint` - release year, when known
    async fn search_by_title(
        &self,
        text: &str,
        year_hint: Option<i32>,
    ) -> Result<Vec<Candidate>, LookupError>;

    /// Fetch one movie or series by catalog id.
    async fn fetch_detail(&self, kind: MediaKind, id: u64) -> Result<DetailRecord, LookupError>;
}
