//! Token-sort-ratio string similarity, scored 0-100.
//!
//! Mirrors `rapidfuzz.fuzz.token_sort_ratio` from the source system: tokens
//! are alphabetically sorted before comparison (so word order doesn't
//! matter), then scored with the same ratio RapidFuzz's `fuzz.ratio` uses —
//! `2 * longest_common_subsequence / (len_a + len_b)`, expressed as a
//! percentage. This is a pure, crate-free computation; no ecosystem fuzzy
//! matching crate appears anywhere in this pipeline's lineage, so the
//! algorithm is implemented directly rather than imported.

/// Longest common subsequence length between two character slices.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// `2 * lcs / (len_a + len_b)` expressed as a 0-100 score.
#[must_use]
pub fn ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let total = a_chars.len() + b_chars.len();
    if total == 0 {
        return 100.0;
    }
    let lcs = lcs_len(&a_chars, &b_chars);
    (2.0 * lcs as f64 / total as f64) * 100.0
}

/// Sort whitespace-separated tokens alphabetically and rejoin with a single
/// space, then score with [`ratio`].
#[must_use]
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_100() {
        assert_eq!(token_sort_ratio("will it rain", "will it rain"), 100.0);
    }

    #[test]
    fn word_order_does_not_matter() {
        let a = token_sort_ratio("rain tomorrow will it", "will it rain tomorrow");
        assert_eq!(a, 100.0);
    }

    #[test]
    fn dissimilar_strings_score_low() {
        let score = token_sort_ratio("will it rain tomorrow", "bitcoin above 100k by june");
        assert!(score < 40.0, "score was {score}");
    }

    #[test]
    fn near_duplicate_titles_score_high() {
        let score = token_sort_ratio(
            "will republican win the presidency in 2028",
            "will the republican party win the 2028 presidency",
        );
        assert!(score >= 82.0, "score was {score}");
    }

    #[test]
    fn empty_strings_score_100() {
        assert_eq!(ratio("", ""), 100.0);
    }
}
