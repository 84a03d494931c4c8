//! Title similarity scoring
//!
//! Base similarity is the Ratcliff/Obershelp sequence ratio (`2*M / T`,
//! where `M` counts characters in matching blocks), computed on normalized
//! titles. A small bonus rewards release-year agreement.

use crate::normalize::normalize_title;
use std::collections::HashMap;

/// Bonus when both years are present and equal
pub const EXACT_YEAR_BONUS: f64 = 0.20;
/// Bonus when the years are one apart
pub const NEAR_YEAR_BONUS: f64 = 0.05;

/// Score a candidate against a query.
///
/// Both titles are normalized first. The result is `ratio + year_bonus`
/// and is only meaningful relative to other scores (no upper clamp).
/// Argument order matters; see [`sequence_ratio`].
pub fn score(
    query_title: &str,
    candidate_title: &str,
    query_year: Option<i32>,
    candidate_year: Option<i32>,
) -> f64 {
    score_normalized(
        &normalize_title(query_title),
        &normalize_title(candidate_title),
        query_year,
        candidate_year,
    )
}

/// Same as [`score`] for titles that are already normalized.
pub fn score_normalized(
    query_norm: &str,
    candidate_norm: &str,
    query_year: Option<i32>,
    candidate_year: Option<i32>,
) -> f64 {
    sequence_ratio(query_norm, candidate_norm) + year_bonus(query_year, candidate_year)
}

/// Year proximity bonus. Zero unless both years are known.
pub fn year_bonus(query_year: Option<i32>, candidate_year: Option<i32>) -> f64 {
    match (query_year, candidate_year) {
        (Some(q), Some(c)) if q == c => EXACT_YEAR_BONUS,
        (Some(q), Some(c)) if (q - c).abs() == 1 => NEAR_YEAR_BONUS,
        _ => 0.0,
    }
}

/// Sequence-matching ratio in `[0, 1]`.
///
/// 1.0 for identical strings (including two empty strings), 0.0 when one
/// side is empty or nothing matches.
///
/// Not symmetric: equally long blocks are resolved toward the start of `a`,
/// so swapping the arguments can change the matched total
/// (`("of a", "an man")` gives 0.4, the reverse 0.2).
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let total = a_chars.len() + b_chars.len();

    if total == 0 {
        return 1.0;
    }

    let matched = matching_characters(&a_chars, &b_chars);
    2.0 * matched as f64 / total as f64
}

/// Total size of the matching blocks between `a` and `b`.
///
/// Finds the longest common block, then recurses on the unmatched
/// pieces to its left and right.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b2j.entry(*c).or_default().push(j);
    }

    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = find_longest_match(a, &b2j, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// Longest block `a[i..i+k] == b[j..j+k]` inside the given window.
///
/// Ties go to the block starting earliest in `a`, then earliest in `b`.
fn find_longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // j2len[j] = length of the match ending at a[i-1], b[j]
    let mut j2len: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut new_j2len = HashMap::new();
        if let Some(positions) = b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let prev = if j > 0 {
                    j2len.get(&(j - 1)).copied().unwrap_or(0)
                } else {
                    0
                };
                let size = prev + 1;
                new_j2len.insert(j, size);
                if size > best_size {
                    best_i = i + 1 - size;
                    best_j = j + 1 - size;
                    best_size = size;
                }
            }
        }
        j2len = new_j2len;
    }

    (best_i, best_j, best_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_sequence_ratio_identical() {
        assert!(approx(sequence_ratio("parasite", "parasite"), 1.0));
        assert!(approx(sequence_ratio("", ""), 1.0));
    }

    #[test]
    fn test_sequence_ratio_disjoint() {
        assert!(approx(sequence_ratio("abc", "xyz"), 0.0));
        assert!(approx(sequence_ratio("abc", ""), 0.0));
    }

    #[test]
    fn test_sequence_ratio_known_values() {
        // "abcd" / "bcde": one block "bcd" => 2*3/8
        assert!(approx(sequence_ratio("abcd", "bcde"), 0.75));
        // "dune" inside "dune part one" => 2*4/17
        assert!(approx(sequence_ratio("dune", "dune part one"), 8.0 / 17.0));
        // blocks "the ro" + "m" => 2*7/16
        assert!(approx(sequence_ratio("the room", "the roam"), 14.0 / 16.0));
    }

    #[test]
    fn test_sequence_ratio_is_order_sensitive() {
        // Same letters, different order: not a bag comparison
        assert!(sequence_ratio("abc", "cba") < 1.0);
    }

    #[test]
    fn test_sequence_ratio_decreases_with_edits() {
        let one_edit = sequence_ratio("the godfather", "the godfathr");
        let three_edits = sequence_ratio("the godfather", "the gdfthr");
        assert!(one_edit > three_edits);
        assert!(one_edit < 1.0);
    }

    #[test]
    fn test_year_bonus() {
        assert!(approx(year_bonus(Some(2021), Some(2021)), 0.20));
        assert!(approx(year_bonus(Some(2021), Some(2020)), 0.05));
        assert!(approx(year_bonus(Some(2020), Some(2021)), 0.05));
        assert!(approx(year_bonus(Some(2021), Some(2019)), 0.0));
        assert!(approx(year_bonus(None, Some(2021)), 0.0));
        assert!(approx(year_bonus(Some(2021), None), 0.0));
    }

    #[test]
    fn test_score_normalizes_titles() {
        assert!(approx(score("Amélie", "AMELIE (2001)", Some(2001), Some(2001)), 1.2));
    }

    #[test]
    fn test_score_same_both_ways_for_prefix_pairs() {
        let pairs = [
            ("Dune", "Dune: Part One"),
            ("The Room", "Room"),
            ("Parasite", "Parasites"),
            ("Blade Runner", "Blade Runner 2049"),
        ];
        for (a, b) in pairs {
            assert!(
                approx(score(a, b, Some(2021), Some(2021)), score(b, a, Some(2021), Some(2021))),
                "score differs for {:?} / {:?}",
                a,
                b
            );
        }
    }

    #[test]
    fn test_sequence_ratio_depends_on_argument_order() {
        assert!(approx(sequence_ratio("of a", "an man"), 0.4));
        assert!(approx(sequence_ratio("an man", "of a"), 0.2));

        assert!(approx(score("of man", "the one an", Some(2021), Some(2021)), 0.7));
        assert!(approx(score("the one an", "of man", Some(2021), Some(2021)), 0.575));
    }
}
