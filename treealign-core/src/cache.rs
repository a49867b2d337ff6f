//! Sparse interval-based position set.
//!
//! Tracks visited genome positions by storing maximal contiguous runs
//! instead of individual elements. Efficient whenever positions cluster
//! into intervals, which is the normal access pattern for both graph
//! construction and column export.

use crate::types::GenomicPos;

/// A set of genome positions stored as pairwise disjoint, non-adjacent
/// intervals. Intervals are keyed by their last position so that membership
/// lookups are a single upper-bound search.
#[derive(Debug, Clone, Default)]
pub struct PositionCache {
    // end -> start; intervals never touch or overlap
    set: std::collections::BTreeMap<GenomicPos, GenomicPos>,
    size: u64,
}

impl PositionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a position. Returns true iff the position was not already
    /// covered. Adjacent intervals are coalesced so the non-adjacency
    /// invariant holds after every insert.
    pub fn insert(&mut self, pos: GenomicPos) -> bool {
        let next = self.set.range(pos..).next().map(|(&e, &s)| (e, s));
        if let Some((_, start)) = next {
            if start <= pos {
                return false;
            }
        }
        let prev = self.set.range(..pos).next_back().map(|(&e, &s)| (e, s));

        let touches_next = matches!(next, Some((_, s)) if pos.checked_add(1) == Some(s));
        let touches_prev = matches!(prev, Some((e, _)) if e + 1 == pos);

        match (touches_prev, touches_next) {
            (true, true) => {
                // bridging two intervals: coalesce transitively
                let (prev_end, prev_start) = prev.unwrap();
                let (next_end, _) = next.unwrap();
                self.set.remove(&prev_end);
                if let Some(start) = self.set.get_mut(&next_end) {
                    *start = prev_start;
                }
            }
            (true, false) => {
                let (prev_end, prev_start) = prev.unwrap();
                self.set.remove(&prev_end);
                self.set.insert(pos, prev_start);
            }
            (false, true) => {
                let (next_end, _) = next.unwrap();
                if let Some(start) = self.set.get_mut(&next_end) {
                    *start = pos;
                }
            }
            (false, false) => {
                self.set.insert(pos, pos);
            }
        }
        self.size += 1;
        true
    }

    /// Membership test: true iff `pos` has been inserted.
    pub fn find(&self, pos: GenomicPos) -> bool {
        self.set
            .range(pos..)
            .next()
            .map_or(false, |(_, &start)| start <= pos)
    }

    /// Drop all intervals and reset the covered count to zero.
    pub fn clear(&mut self) {
        self.set.clear();
        self.size = 0;
    }

    /// Self-validation: intervals strictly increasing, separated by at
    /// least one position, and the maintained size matches the interval
    /// sum. Test/debug aid, not for the hot path.
    pub fn check(&self) -> bool {
        let mut prev_end: Option<GenomicPos> = None;
        let mut total = 0u64;
        for (&end, &start) in &self.set {
            if start > end {
                return false;
            }
            if let Some(pe) = prev_end {
                if start <= pe || start - pe < 2 {
                    return false;
                }
            }
            total += end - start + 1;
            prev_end = Some(end);
        }
        total == self.size
    }

    /// Total number of covered positions.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of maximal stored runs.
    pub fn num_intervals(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_find() {
        let mut cache = PositionCache::new();
        assert!(cache.insert(10));
        assert!(cache.insert(11));
        assert!(cache.insert(13));
        assert!(!cache.insert(10));
        assert!(cache.find(10));
        assert!(cache.find(11));
        assert!(!cache.find(12));
        assert!(cache.find(13));
        assert!(!cache.find(9));
        assert_eq!(cache.size(), 3);
        assert_eq!(cache.num_intervals(), 2);
        assert!(cache.check());
    }

    #[test]
    fn test_bridging_merge() {
        let mut cache = PositionCache::new();
        cache.insert(5);
        cache.insert(7);
        assert_eq!(cache.num_intervals(), 2);
        // 6 bridges [5,5] and [7,7]
        assert!(cache.insert(6));
        assert_eq!(cache.num_intervals(), 1);
        assert_eq!(cache.size(), 3);
        assert!(cache.check());
    }

    #[test]
    fn test_order_independence() {
        let positions: &[GenomicPos] = &[3, 9, 4, 1, 8, 2, 100, 7, 0];
        let mut sorted = positions.to_vec();
        sorted.sort_unstable();

        let mut a = PositionCache::new();
        for &p in positions {
            assert!(a.insert(p));
        }
        let mut b = PositionCache::new();
        for &p in &sorted {
            assert!(b.insert(p));
        }
        assert_eq!(a.size(), b.size());
        assert_eq!(a.num_intervals(), b.num_intervals());
        assert!(a.check());
        assert!(b.check());
        for p in 0..110 {
            assert_eq!(a.find(p), b.find(p));
            assert_eq!(a.find(p), sorted.contains(&p));
        }
    }

    #[test]
    fn test_clear() {
        let mut cache = PositionCache::new();
        cache.insert(1);
        cache.insert(2);
        cache.clear();
        assert_eq!(cache.size(), 0);
        assert_eq!(cache.num_intervals(), 0);
        assert!(cache.is_empty());
        assert!(!cache.find(1));
        assert!(cache.insert(1));
    }

    #[test]
    fn test_zero_boundary() {
        let mut cache = PositionCache::new();
        assert!(cache.insert(0));
        assert!(cache.insert(1));
        assert!(!cache.insert(0));
        assert!(cache.find(0));
        assert_eq!(cache.num_intervals(), 1);
        assert!(cache.check());
    }
}
