//! Fuzzy artist-name matching for search results.
//!
//! Scores are token-set ratios: both names are lowercased and tokenized, and
//! the shared tokens are compared against each name's full token set, so
//! word order and extra words ("The", "feat. ...") cost little.

use std::collections::BTreeSet;

use crate::types::ArtistCandidate;

/// Candidates scoring below this are not considered the searched artist.
pub const DEFAULT_MIN_SCORE: u8 = 50;

/// Similarity of a search result name to the searched name, 0 to 100.
///
/// Underscores in the query count as spaces, since some sites use them in
/// artist slugs.
pub fn score(candidate: &str, query: &str) -> u8 {
    token_set_ratio(candidate, &query.replace('_', " "))
}

/// Highest-scoring candidate. Ties go to the one listed first.
pub fn best_match<'a>(
    candidates: &'a [ArtistCandidate],
    query: &str,
) -> Option<(&'a ArtistCandidate, u8)> {
    let mut scored: Vec<(&ArtistCandidate, u8)> = candidates
        .iter()
        .map(|candidate| (candidate, score(&candidate.name, query)))
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().next()
}

/// Picks the searched artist among search results.
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    min_score: u8,
}

impl Resolver {
    pub fn new(min_score: u8) -> Self {
        Self { min_score }
    }

    pub fn min_score(&self) -> u8 {
        self.min_score
    }

    /// Best candidate for `query`, or `None` when there are no candidates or
    /// the best one scores under the threshold.
    pub fn resolve(&self, candidates: &[ArtistCandidate], query: &str) -> Option<ArtistCandidate> {
        let (best, score) = best_match(candidates, query)?;
        if score < self.min_score {
            tracing::info!(
                query = %query,
                best = %best.name,
                score,
                min_score = self.min_score,
                "Closest search result is too far from the query"
            );
            return None;
        }
        tracing::debug!(
            query = %query,
            name = %best.name,
            url = %best.url,
            score,
            "Resolved artist"
        );
        Some(best.clone())
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SCORE)
    }
}

fn process(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

fn token_set_ratio(a: &str, b: &str) -> u8 {
    let a = process(a);
    let b = process(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let sect = join(tokens_a.intersection(&tokens_b));
    let diff_ab = join(tokens_a.difference(&tokens_b));
    let diff_ba = join(tokens_b.difference(&tokens_a));

    let combined_ab = format!("{sect} {diff_ab}").trim().to_string();
    let combined_ba = format!("{sect} {diff_ba}").trim().to_string();

    [
        ratio(&sect, &combined_ab),
        ratio(&sect, &combined_ba),
        ratio(&combined_ab, &combined_ba),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
}

fn join<'a, 'b: 'a>(tokens: impl Iterator<Item = &'a &'b str>) -> String {
    tokens.copied().collect::<Vec<_>>().join(" ")
}

/// `2 * lcs / (len_a + len_b)` as a 0..=100 percentage.
fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let total = (a.len() + b.len()) as f64;
    let matched = 2.0 * longest_common_subsequence(&a, &b) as f64;
    (100.0 * matched / total).round() as u8
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(names: &[&str]) -> Vec<ArtistCandidate> {
        names
            .iter()
            .map(|n| ArtistCandidate::new(*n, format!("https://example.com/{n}")))
            .collect()
    }

    #[test]
    fn test_word_order_does_not_matter() {
        assert_eq!(score("Bob Marley", "Marley Bob"), 100);
    }

    #[test]
    fn test_extra_words_still_match() {
        assert_eq!(score("Notorious B.I.G.", "The Notorious B.I.G."), 100);
        assert_eq!(score("The Notorious B.I.G.", "The_Notorious_B.I.G."), 100);
    }

    #[test]
    fn test_unrelated_names_score_low() {
        assert!(score("Bob Marley", "Fake Rapper") < DEFAULT_MIN_SCORE);
        assert_eq!(score("", "Fake Rapper"), 0);
        assert_eq!(score("!!!", "Fake Rapper"), 0);
    }

    #[test]
    fn test_score_is_deterministic() {
        let first = score("Reggie Watts", "Regie Wats");
        assert_eq!(first, score("Reggie Watts", "Regie Wats"));
        assert!(first > 50 && first < 100);
    }

    #[test]
    fn test_ratio_partial_overlap() {
        assert_eq!(ratio("abcd", "abcd"), 100);
        assert_eq!(ratio("abcd", "abxy"), 50);
        assert_eq!(ratio("", "abcd"), 0);
    }

    #[test]
    fn test_best_match_prefers_higher_score() {
        let found = candidates(&["Marley Marl", "Bob Marley", "Ziggy Marley"]);
        let (best, score) = best_match(&found, "Marley Bob").unwrap();
        assert_eq!(best.name, "Bob Marley");
        assert_eq!(score, 100);
    }

    #[test]
    fn test_best_match_ties_keep_listing_order() {
        let found = candidates(&["Nas", "Nas"]);
        let (best, _) = best_match(&found, "Nas").unwrap();
        assert!(std::ptr::eq(best, &found[0]));
    }

    #[test]
    fn test_best_match_empty() {
        assert!(best_match(&[], "Nas").is_none());
    }

    #[test]
    fn test_resolver_threshold() {
        let found = candidates(&["Bob Marley"]);
        assert!(Resolver::default().resolve(&found, "Fake Rapper").is_none());
        assert_eq!(
            Resolver::default().resolve(&found, "marley bob").map(|c| c.name),
            Some("Bob Marley".to_string())
        );
        assert!(Resolver::new(0).resolve(&found, "Fake Rapper").is_some());
        assert!(Resolver::new(0).resolve(&[], "Fake Rapper").is_none());
    }
}
