use std::cmp::Ordering;
use serde::{Deserialize, Serialize};

/// Estimated number of matching documents for a plan node.
///
/// `empty` means the node can be proven to never match. An empty estimate
/// always has `est_hits == 0`, while a zero estimate is not necessarily empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HitEstimate {
    pub est_hits: u32,
    pub empty: bool,
}

impl HitEstimate {
    pub fn new(est_hits: u32, empty: bool) -> Self {
        if empty {
            HitEstimate::empty()
        } else {
            HitEstimate { est_hits, empty }
        }
    }

    pub fn hits(est_hits: u32) -> Self {
        HitEstimate { est_hits, empty: false }
    }

    pub fn empty() -> Self {
        HitEstimate { est_hits: 0, empty: true }
    }

    /// Cap the estimate to the size of the document universe.
    pub fn clamped(self, docid_limit: u32) -> Self {
        if docid_limit == 0 || self.est_hits <= docid_limit {
            self
        } else {
            HitEstimate { est_hits: docid_limit, empty: self.empty }
        }
    }

    /// Fraction of the document universe expected to match.
    pub fn relative(&self, docid_limit: u32) -> f64 {
        if docid_limit == 0 {
            return 0.0;
        }
        (self.est_hits as f64 / docid_limit as f64).min(1.0)
    }

    /// Conjunction: the smallest estimate wins, and one empty operand
    /// makes the whole result empty.
    pub fn min_of<I: IntoIterator<Item = HitEstimate>>(estimates: I) -> HitEstimate {
        estimates.into_iter().min().unwrap_or_default()
    }

    /// Disjunction: the largest estimate wins; empty only if all are.
    pub fn max_of<I: IntoIterator<Item = HitEstimate>>(estimates: I) -> HitEstimate {
        estimates.into_iter().max().unwrap_or_default()
    }
}

impl Default for HitEstimate {
    fn default() -> Self {
        HitEstimate::empty()
    }
}

impl Ord for HitEstimate {
    fn cmp(&self, other: &Self) -> Ordering {
        // empty sorts before non-empty, then by hit count
        (!self.empty, self.est_hits).cmp(&(!other.empty, other.est_hits))
    }
}

impl PartialOrd for HitEstimate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_less_than_any_non_empty() {
        assert!(HitEstimate::empty() < HitEstimate::hits(0));
        assert!(HitEstimate::hits(0) < HitEstimate::hits(1));
        assert_eq!(HitEstimate::new(10, true), HitEstimate::empty());
    }

    #[test]
    fn and_combination_is_dominated_by_empty() {
        let est = HitEstimate::min_of([HitEstimate::hits(0), HitEstimate::empty()]);
        assert!(est.empty);
        assert_eq!(est.est_hits, 0);

        let est = HitEstimate::min_of([7, 4, 6].map(HitEstimate::hits));
        assert_eq!(est, HitEstimate::hits(4));
    }

    #[test]
    fn or_combination_is_empty_only_if_all_are() {
        let est = HitEstimate::max_of([HitEstimate::hits(0), HitEstimate::empty()]);
        assert!(!est.empty);
        assert_eq!(est.est_hits, 0);

        assert!(HitEstimate::max_of([HitEstimate::empty(), HitEstimate::empty()]).empty);
        assert!(HitEstimate::max_of(Vec::new()).empty);
    }

    #[test]
    fn relative_estimate_is_zero_without_limit() {
        assert_eq!(HitEstimate::hits(250).relative(0), 0.0);
        assert_eq!(HitEstimate::hits(250).relative(1000), 0.25);
        assert_eq!(HitEstimate::hits(5000).clamped(1000).est_hits, 1000);
    }
}
