//! Matching types
//!
//! Shared between the ranker and the catalog/import layers:
//! - MatchQuery: what we are looking for (free-text title, optional year)
//! - Candidate: one catalog search hit
//! - ScoredCandidate / MatchResult: ranker output

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Movie or series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Movie,
    Series,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
        }
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" | "film" => Ok(MediaKind::Movie),
            "series" | "tv" | "show" => Ok(MediaKind::Series),
            _ => Err(format!("Unknown kind: {}. Use movie or series", s)),
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A title lookup, built per row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchQuery {
    pub raw_title: String,
    pub year: Option<i32>,
}

impl MatchQuery {
    pub fn new(raw_title: impl Into<String>, year: Option<i32>) -> Self {
        Self {
            raw_title: raw_title.into(),
            year,
        }
    }
}

/// Catalog search result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub external_id: String,

    #[serde(default)]
    pub kind: MediaKind,

    pub title: String,

    #[serde(default)]
    pub year: Option<i32>,

    /// Absolute poster URL
    #[serde(default)]
    pub poster: Option<String>,

    #[serde(default)]
    pub overview: Option<String>,
}

impl Candidate {
    pub fn has_poster(&self) -> bool {
        self.poster.as_deref().is_some_and(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: f64,
}

/// Outcome of ranking a candidate list
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    Matched { candidate: Candidate, score: f64 },
    NoMatch,
}

impl MatchResult {
    pub fn candidate(&self) -> Option<&Candidate> {
        match self {
            MatchResult::Matched { candidate, .. } => Some(candidate),
            MatchResult::NoMatch => None,
        }
    }

    pub fn into_candidate(self) -> Option<Candidate> {
        match self {
            MatchResult::Matched { candidate, .. } => Some(candidate),
            MatchResult::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_from_str() {
        assert_eq!("movie".parse::<MediaKind>(), Ok(MediaKind::Movie));
        assert_eq!("TV".parse::<MediaKind>(), Ok(MediaKind::Series));
        assert_eq!("series".parse::<MediaKind>(), Ok(MediaKind::Series));
        assert!("podcast".parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_media_kind_serde() {
        let json = serde_json::to_string(&MediaKind::Series).unwrap();
        assert_eq!(json, "\"series\"");
        let kind: MediaKind = serde_json::from_str("\"movie\"").unwrap();
        assert_eq!(kind, MediaKind::Movie);
    }

    #[test]
    fn test_candidate_has_poster() {
        let mut candidate = Candidate {
            external_id: "1".into(),
            title: "Dune".into(),
            ..Default::default()
        };
        assert!(!candidate.has_poster());
        candidate.poster = Some(String::new());
        assert!(!candidate.has_poster());
        candidate.poster = Some("https://image.tmdb.org/t/p/w500/x.jpg".into());
        assert!(candidate.has_poster());
    }
}
