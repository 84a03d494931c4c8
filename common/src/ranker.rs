//! Candidate ranking
//!
//! Picks the best catalog candidate for a query. Candidates arrive in the
//! catalog's own relevance order; on equal scores the earlier one wins.

use crate::normalize::normalize_title;
use crate::similarity::score_normalized;
use crate::types::{Candidate, MatchQuery, MatchResult, ScoredCandidate};

/// Added when the normalized titles are identical and the year does not contradict
pub const EXACT_MATCH_BONUS: f64 = 0.5;

/// Score every candidate in input order.
///
/// Each score is `ratio + year_bonus`, plus [`EXACT_MATCH_BONUS`] when the
/// normalized titles are equal and the query year is absent or equal to the
/// candidate year.
pub fn score_candidates(query: &MatchQuery, candidates: &[Candidate]) -> Vec<ScoredCandidate> {
    let query_norm = normalize_title(&query.raw_title);

    candidates
        .iter()
        .map(|candidate| {
            let candidate_norm = normalize_title(&candidate.title);
            let mut score =
                score_normalized(&query_norm, &candidate_norm, query.year, candidate.year);

            if candidate_norm == query_norm
                && (query.year.is_none() || query.year == candidate.year)
            {
                score += EXACT_MATCH_BONUS;
            }

            ScoredCandidate {
                candidate: candidate.clone(),
                score,
            }
        })
        .collect()
}

/// Select the best candidate, or `NoMatch` when the list is empty or
/// nothing scores above zero.
///
/// Poster availability is not considered here.
pub fn rank(query: &MatchQuery, candidates: &[Candidate]) -> MatchResult {
    let mut best: Option<ScoredCandidate> = None;

    for scored in score_candidates(query, candidates) {
        let better = match &best {
            Some(current) => scored.score > current.score,
            None => scored.score > 0.0,
        };
        if better {
            best = Some(scored);
        }
    }

    match best {
        Some(ScoredCandidate { candidate, score }) => MatchResult::Matched { candidate, score },
        None => MatchResult::NoMatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, title: &str, year: Option<i32>) -> Candidate {
        Candidate {
            external_id: id.to_string(),
            title: title.to_string(),
            year,
            poster: Some(format!("https://image.tmdb.org/t/p/w500/{}.jpg", id)),
            ..Default::default()
        }
    }

    #[test]
    fn test_rank_empty_is_no_match() {
        let query = MatchQuery::new("Dune", Some(2021));
        assert_eq!(rank(&query, &[]), MatchResult::NoMatch);
        assert_eq!(rank(&MatchQuery::new("", None), &[]), MatchResult::NoMatch);
    }

    #[test]
    fn test_rank_exact_title_and_year_wins() {
        let query = MatchQuery::new("Dune", Some(2021));
        let candidates = vec![
            candidate("a", "Dune: Part One", Some(2021)),
            candidate("b", "Dune", Some(2021)),
        ];

        let result = rank(&query, &candidates);
        let MatchResult::Matched { candidate, score } = result else {
            panic!("expected a match");
        };
        assert_eq!(candidate.external_id, "b");
        assert!((score - 1.7).abs() < 1e-9);
    }

    #[test]
    fn test_rank_exact_title_beats_noisy_fuzzy_candidate() {
        // Exact title with the right year must dominate a near-identical
        // title that also has the right year.
        let query = MatchQuery::new("Parasite", Some(2019));
        let candidates = vec![
            candidate("fuzzy", "Parasites", Some(2019)),
            candidate("exact", "Parasite", Some(2019)),
        ];
        let best = rank(&query, &candidates).into_candidate().unwrap();
        assert_eq!(best.external_id, "exact");
    }

    #[test]
    fn test_rank_no_override_when_year_contradicts() {
        let query = MatchQuery::new("Dune", Some(2021));
        let scored = score_candidates(&query, &[candidate("old", "Dune", Some(1984))]);
        assert!((scored[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rank_override_without_query_year() {
        let query = MatchQuery::new("Dune", None);
        let scored = score_candidates(&query, &[candidate("old", "Dune", Some(1984))]);
        assert!((scored[0].score - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_rank_tie_keeps_first_seen() {
        let query = MatchQuery::new("The Room", None);
        let candidates = vec![
            candidate("first", "The Room", Some(2003)),
            candidate("second", "The Room", Some(2015)),
        ];
        let best = rank(&query, &candidates).into_candidate().unwrap();
        assert_eq!(best.external_id, "first");
    }

    #[test]
    fn test_rank_no_positive_score() {
        let query = MatchQuery::new("abc", None);
        let candidates = vec![candidate("x", "xyz", None)];
        assert_eq!(rank(&query, &candidates), MatchResult::NoMatch);
    }

    #[test]
    fn test_rank_ignores_missing_poster() {
        let query = MatchQuery::new("Heat", Some(1995));
        let mut only = candidate("heat", "Heat", Some(1995));
        only.poster = None;
        let result = rank(&query, &[only]);
        assert!(result.is_match());
        assert!(result.candidate().unwrap().poster.is_none());
    }

    #[test]
    fn test_year_bonus_breaks_title_tie() {
        let query = MatchQuery::new("Solaris", Some(2002));
        let candidates = vec![
            candidate("1972", "Solaris", Some(1972)),
            candidate("2002", "Solaris", Some(2002)),
        ];
        let best = rank(&query, &candidates).into_candidate().unwrap();
        assert_eq!(best.external_id, "2002");
    }
}
