//! Deterministic top-k selection shared by the similarity index and the
//! reranker
//!
//! Ties always resolve to the lowest original index, so a batch produces
//! the same ranking regardless of how it is split up.

use std::cmp::Ordering;

/// Float types with a total ordering usable for ranking
pub(crate) trait TotalOrd: Copy {
    fn total_ord(self, other: Self) -> Ordering;
}

impl TotalOrd for f32 {
    fn total_ord(self, other: Self) -> Ordering {
        self.total_cmp(&other)
    }
}

impl TotalOrd for f64 {
    fn total_ord(self, other: Self) -> Ordering {
        self.total_cmp(&other)
    }
}

/// Indices of the k largest scores, best first.
///
/// Ordering: descending score, ties broken by ascending original index.
/// Selection is O(n) via partitioning plus O(k log k) for the final sort,
/// so large corpora only pay for the slice they keep.
pub(crate) fn top_k_indices<T: TotalOrd>(scores: &[T], k: usize) -> Vec<usize> {
    let rank = |a: usize, b: usize| {
        scores[b]
            .total_ord(scores[a])
            .then_with(|| a.cmp(&b))
    };

    let mut indices: Vec<usize> = (0..scores.len()).collect();
    if k == 0 {
        return Vec::new();
    }
    if k < indices.len() {
        indices.select_nth_unstable_by(k - 1, |&a, &b| rank(a, b));
        indices.truncate(k);
    }
    indices.sort_unstable_by(|&a, &b| rank(a, b));
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_top_k_basic() {
        let scores = vec![0.1f64, 0.9, 0.5];
        assert_eq!(top_k_indices(&scores, 2), vec![1, 2]);
    }

    #[test]
    fn test_top_k_full_length() {
        let scores = vec![0.3f32, 0.7, 0.5, 0.1];
        assert_eq!(top_k_indices(&scores, 4), vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_top_k_larger_than_input() {
        let scores = vec![0.5f32, 0.2];
        assert_eq!(top_k_indices(&scores, 10), vec![0, 1]);
    }

    #[test]
    fn test_ties_resolve_to_lowest_index() {
        let scores = vec![0.5f32, 0.9, 0.5, 0.9, 0.5];
        assert_eq!(top_k_indices(&scores, 4), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_k_zero_returns_empty() {
        let scores = vec![0.5f32, 0.2];
        assert!(top_k_indices(&scores, 0).is_empty());
    }

    #[test]
    fn test_empty_scores() {
        let scores: Vec<f32> = Vec::new();
        assert!(top_k_indices(&scores, 3).is_empty());
    }

    #[quickcheck]
    fn prop_output_size_and_uniqueness(scores: Vec<f32>, k: usize) -> bool {
        let k = if scores.is_empty() { 0 } else { k % (scores.len() + 1) };
        let out = top_k_indices(&scores, k);
        let unique = out.iter().collect::<std::collections::HashSet<_>>().len();
        out.len() == k.min(scores.len())
            && unique == out.len()
            && out.iter().all(|&i| i < scores.len())
    }

    #[quickcheck]
    fn prop_ordering_is_non_increasing(scores: Vec<f32>, k: usize) -> bool {
        let k = if scores.is_empty() { 0 } else { k % (scores.len() + 1) };
        let out = top_k_indices(&scores, k);
        out.windows(2).all(|w| {
            match scores[w[0]].total_cmp(&scores[w[1]]) {
                Ordering::Greater => true,
                Ordering::Equal => w[0] < w[1],
                Ordering::Less => false,
            }
        })
    }

    #[quickcheck]
    fn prop_selected_beat_unselected(scores: Vec<f32>, k: usize) -> bool {
        let k = if scores.is_empty() { 0 } else { k % (scores.len() + 1) };
        let out = top_k_indices(&scores, k);
        if out.is_empty() {
            return true;
        }
        let worst = *out.last().unwrap();
        (0..scores.len()).filter(|i| !out.contains(i)).all(|i| {
            match scores[i].total_cmp(&scores[worst]) {
                Ordering::Less => true,
                Ordering::Equal => i > worst,
                Ordering::Greater => false,
            }
        })
    }
}
