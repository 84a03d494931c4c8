//! media-diary common library
//!
//! I/O-free core shared by the CLI: title normalization, similarity
//! scoring, candidate ranking and the Letterboxd export reader.

pub mod error;
pub mod letterboxd;
pub mod normalize;
pub mod ranker;
pub mod similarity;
pub mod types;

pub use error::{Error, Result};
pub use letterboxd::{
    map_rating, parse_export, parse_watched_date, year_from_external_id, ExportRecord,
    ExportTable, ImportRow,
};
pub use normalize::normalize_title;
pub use ranker::{rank, score_candidates, EXACT_MATCH_BONUS};
pub use similarity::{score, score_normalized, sequence_ratio, year_bonus};
pub use types::{Candidate, MatchQuery, MatchResult, MediaKind, ScoredCandidate};
