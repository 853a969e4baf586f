//! 8-ary radix trie over signed integers, split into a `negative_root` and
//! a `positive_root` sub-trie. Negative values are stored by absolute
//! magnitude in `negative_root`, which inverts the usual ordering: walking
//! that sub-trie from smallest to largest byte visits values from least
//! negative to most negative. Range queries that straddle zero combine a
//! bound on each side; every other query touches exactly one sub-trie (or,
//! for an unbounded side, takes the other sub-trie's root wholesale).

mod node;

use crate::iterator::SeqIdIterator;
use node::{indexable_limit, Node};

/// `i64::MIN` has no representable absolute value and is therefore never
/// insertable; treat it as the next representable bound for search purposes
/// so callers don't need to special-case it themselves.
fn clamp_min(value: i64) -> i64 {
    if value == i64::MIN { -i64::MAX } else { value }
}

fn merge_matches(matches: Vec<&Node>) -> Vec<u32> {
    let mut out = Vec::new();
    for node in matches {
        node.ids.materialize_into(&mut out);
    }
    out.sort_unstable();
    out.dedup();
    out
}

fn iterator_from_matches(matches: Vec<&Node>) -> SeqIdIterator {
    let leaf_ids = matches.into_iter().map(|n| n.ids.materialize()).collect();
    SeqIdIterator::new(leaf_ids)
}

/// Radix trie over signed `i32`/`i64` seq_id keys, and (via the geopoint
/// entry points) over unsigned 64-bit geospatial cell ids.
pub struct NumericTrie {
    negative_root: Option<Box<Node>>,
    positive_root: Option<Box<Node>>,
    max_level: u8,
}

impl NumericTrie {
    /// `num_bits` must be 32 or 64; it sets how many trie levels (one byte
    /// each) are walked to reach a leaf.
    pub fn new(num_bits: u8) -> Self {
        debug_assert!(num_bits == 32 || num_bits == 64, "num_bits must be 32 or 64");
        NumericTrie {
            negative_root: None,
            positive_root: None,
            max_level: num_bits / 8,
        }
    }

    pub fn insert(&mut self, value: i64, seq_id: u32) {
        if value == i64::MIN {
            return;
        }
        debug_assert!(
            value.abs() <= indexable_limit(self.max_level),
            "value {value} exceeds the indexable limit for max_level {}; dropped in release builds",
            self.max_level
        );
        if value < 0 {
            self.negative_root
                .get_or_insert_with(|| Box::new(Node::new()))
                .insert(value.abs(), seq_id, self.max_level);
        } else {
            self.positive_root
                .get_or_insert_with(|| Box::new(Node::new()))
                .insert(value, seq_id, self.max_level);
        }
    }

    pub fn remove(&mut self, value: i64, seq_id: u32) {
        if value == i64::MIN {
            return;
        }
        if value < 0 {
            if let Some(root) = self.negative_root.as_mut() {
                root.remove(value.abs(), seq_id, self.max_level);
            }
        } else if let Some(root) = self.positive_root.as_mut() {
            root.remove(value, seq_id, self.max_level);
        }
    }

    /// Geopoint entry points always address `positive_root`: cell ids are
    /// unsigned and have no sign-straddling case to split on.
    pub fn insert_geopoint(&mut self, cell_id: u64, seq_id: u32) {
        self.positive_root
            .get_or_insert_with(|| Box::new(Node::new()))
            .insert_geopoint(cell_id, seq_id, self.max_level);
    }

    pub fn delete_geopoint(&mut self, cell_id: u64, seq_id: u32) {
        if let Some(root) = self.positive_root.as_mut() {
            root.delete_geopoint(cell_id, seq_id, self.max_level);
        }
    }

    /// Union of ids found at each cell id's resolved node. Node identity is
    /// not deduplicated (two cell ids can legitimately resolve to the same
    /// ancestor when one is coarser than the tree's finest level); the final
    /// sort-and-dedup over materialized ids produces the same result as
    /// deduplicating nodes first would, since ids are the thing callers
    /// observe.
    pub fn search_geopoints(&self, cell_ids: &[u64]) -> Vec<u32> {
        let Some(root) = self.positive_root.as_deref() else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for &cell_id in cell_ids {
            if let Some(node) = root.search_geopoint_node(cell_id, self.max_level) {
                node.ids.materialize_into(&mut out);
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    fn equal_to_matches(&self, value: i64) -> Vec<&Node> {
        let mut matches = Vec::new();
        if value == i64::MIN {
            return matches;
        }
        if value < 0 {
            if let Some(node) = self
                .negative_root
                .as_deref()
                .and_then(|root| root.find_leaf(value.abs(), self.max_level))
            {
                matches.push(node);
            }
        } else if let Some(node) = self
            .positive_root
            .as_deref()
            .and_then(|root| root.find_leaf(value, self.max_level))
        {
            matches.push(node);
        }
        matches
    }

    pub fn search_equal_to(&self, value: i64) -> Vec<u32> {
        merge_matches(self.equal_to_matches(value))
    }

    pub fn search_equal_to_iter(&self, value: i64) -> SeqIdIterator {
        iterator_from_matches(self.equal_to_matches(value))
    }

    fn range_matches(&self, low: i64, low_inclusive: bool, high: i64, high_inclusive: bool) -> Vec<&Node> {
        let low = clamp_min(low);
        let high = clamp_min(high);
        let mut matches = Vec::new();
        if low > high {
            return matches;
        }

        if low < 0 && high >= 0 {
            // Combine ">low" from the negative sub-trie with "<high" from
            // the positive one.
            if let Some(neg) = self.negative_root.as_deref() {
                if !(low == -1 && !low_inclusive) {
                    let abs_low = low.abs();
                    let bound = if low_inclusive { abs_low } else { abs_low - 1 };
                    neg.search_less_than(bound, self.max_level, &mut matches);
                }
            }
            if let Some(pos) = self.positive_root.as_deref() {
                if !(high == 0 && !high_inclusive) {
                    let bound = if high_inclusive { high } else { high - 1 };
                    pos.search_less_than(bound, self.max_level, &mut matches);
                }
            }
        } else if low >= 0 {
            if let Some(pos) = self.positive_root.as_deref() {
                let lo = if low_inclusive { low } else { low + 1 };
                let hi = if high_inclusive { high } else { high - 1 };
                pos.search_range(lo, hi, self.max_level, &mut matches);
            }
        } else {
            // Both bounds negative: magnitudes invert, so swap low and high.
            if let Some(neg) = self.negative_root.as_deref() {
                let abs_high = high.abs();
                let abs_low = low.abs();
                let lo = if high_inclusive { abs_high } else { abs_high + 1 };
                let hi = if low_inclusive { abs_low } else { abs_low - 1 };
                neg.search_range(lo, hi, self.max_level, &mut matches);
            }
        }

        matches
    }

    pub fn search_range(&self, low: i64, low_inclusive: bool, high: i64, high_inclusive: bool) -> Vec<u32> {
        merge_matches(self.range_matches(low, low_inclusive, high, high_inclusive))
    }

    pub fn search_range_iter(&self, low: i64, low_inclusive: bool, high: i64, high_inclusive: bool) -> SeqIdIterator {
        iterator_from_matches(self.range_matches(low, low_inclusive, high, high_inclusive))
    }

    fn greater_than_matches(&self, value: i64, inclusive: bool) -> Vec<&Node> {
        let value = clamp_min(value);
        let mut matches = Vec::new();

        if (value == 0 && inclusive) || (value == -1 && !inclusive) {
            if let Some(pos) = self.positive_root.as_deref() {
                matches.push(pos);
            }
            return matches;
        }

        if value >= 0 {
            if let Some(pos) = self.positive_root.as_deref() {
                let bound = if inclusive { value } else { value + 1 };
                pos.search_greater_than(bound, self.max_level, &mut matches);
            }
        } else {
            if let Some(neg) = self.negative_root.as_deref() {
                let abs_low = value.abs();
                let bound = if inclusive { abs_low } else { abs_low - 1 };
                neg.search_less_than(bound, self.max_level, &mut matches);
            }
            if let Some(pos) = self.positive_root.as_deref() {
                matches.push(pos);
            }
        }

        matches
    }

    pub fn search_greater_than(&self, value: i64, inclusive: bool) -> Vec<u32> {
        merge_matches(self.greater_than_matches(value, inclusive))
    }

    pub fn search_greater_than_iter(&self, value: i64, inclusive: bool) -> SeqIdIterator {
        iterator_from_matches(self.greater_than_matches(value, inclusive))
    }

    fn less_than_matches(&self, value: i64, inclusive: bool) -> Vec<&Node> {
        let value = clamp_min(value);
        let mut matches = Vec::new();

        if (value == 0 && !inclusive) || (value == -1 && inclusive) {
            if let Some(neg) = self.negative_root.as_deref() {
                matches.push(neg);
            }
            return matches;
        }

        if value < 0 {
            if let Some(neg) = self.negative_root.as_deref() {
                let abs_low = value.abs();
                let bound = if inclusive { abs_low } else { abs_low + 1 };
                neg.search_greater_than(bound, self.max_level, &mut matches);
            }
        } else {
            if let Some(pos) = self.positive_root.as_deref() {
                let bound = if inclusive { value } else { value - 1 };
                pos.search_less_than(bound, self.max_level, &mut matches);
            }
            if let Some(neg) = self.negative_root.as_deref() {
                matches.push(neg);
            }
        }

        matches
    }

    pub fn search_less_than(&self, value: i64, inclusive: bool) -> Vec<u32> {
        merge_matches(self.less_than_matches(value, inclusive))
    }

    pub fn search_less_than_iter(&self, value: i64, inclusive: bool) -> SeqIdIterator {
        iterator_from_matches(self.less_than_matches(value, inclusive))
    }

    /// Ids of every entry outside the top `k` by value (negative trie
    /// entries rank below all positive ones). Unlike the node-level walk,
    /// which emits ids in descending-value block order, this returns them
    /// sorted ascending to match every other bulk query on this type.
    pub fn seq_ids_outside_top_k(&self, k: usize) -> Vec<u32> {
        let mut ids_skipped = 0usize;
        let mut result = Vec::new();

        match (self.negative_root.as_deref(), self.positive_root.as_deref()) {
            (Some(neg), Some(pos)) => {
                pos.seq_ids_outside_top_k(k, self.max_level, &mut ids_skipped, false, &mut result);
                if ids_skipped < k {
                    neg.seq_ids_outside_top_k(k, self.max_level, &mut ids_skipped, true, &mut result);
                } else {
                    neg.ids.materialize_into(&mut result);
                }
            }
            (Some(neg), None) => {
                neg.seq_ids_outside_top_k(k, self.max_level, &mut ids_skipped, true, &mut result);
            }
            (None, Some(pos)) => {
                pos.seq_ids_outside_top_k(k, self.max_level, &mut ids_skipped, false, &mut result);
            }
            (None, None) => {}
        }

        result.sort_unstable();
        result.dedup();
        result
    }

    /// Total number of (value, seq_id) entries indexed.
    pub fn len(&self) -> usize {
        self.negative_root.as_deref().map_or(0, Node::len) + self.positive_root.as_deref().map_or(0, Node::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for NumericTrie {
    fn default() -> Self {
        Self::new(32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trie_with(values: &[(i64, u32)]) -> NumericTrie {
        let mut t = NumericTrie::new(32);
        for &(v, id) in values {
            t.insert(v, id);
        }
        t
    }

    #[test]
    fn scenario_a_signed_range_query() {
        let t = trie_with(&[(-100, 7), (-1, 3), (0, 4), (1, 1), (50, 9), (100, 2)]);
        assert_eq!(t.search_range(-1, true, 50, true), vec![1, 3, 4, 9]);
    }

    #[test]
    fn scenario_b_exclusive_at_zero_boundary() {
        let t = trie_with(&[(-100, 7), (-1, 3), (0, 4), (1, 1), (50, 9), (100, 2)]);
        assert_eq!(t.search_range(-1, false, 0, false), Vec::<u32>::new());
    }

    #[test]
    fn scenario_c_top_k_exclusion_is_sorted_ascending() {
        let t = trie_with(&[(10, 1), (20, 2), (30, 3), (40, 4), (50, 5), (-5, 6), (-15, 7)]);
        assert_eq!(t.seq_ids_outside_top_k(3), vec![1, 2, 6, 7]);
    }

    #[test]
    fn equal_to_matches_only_exact_value() {
        let t = trie_with(&[(5, 1), (5, 2), (-5, 3), (6, 4)]);
        assert_eq!(t.search_equal_to(5), vec![1, 2]);
        assert_eq!(t.search_equal_to(-5), vec![3]);
        assert!(t.search_equal_to(7).is_empty());
    }

    #[test]
    fn remove_drops_id_from_every_query() {
        let mut t = trie_with(&[(5, 1), (5, 2)]);
        t.remove(5, 1);
        assert_eq!(t.search_equal_to(5), vec![2]);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn range_with_both_bounds_negative() {
        let t = trie_with(&[(-100, 1), (-50, 2), (-10, 3), (-1, 4)]);
        assert_eq!(t.search_range(-60, true, -5, true), vec![2, 3]);
    }

    #[test]
    fn empty_trie_returns_empty_everywhere() {
        let t = NumericTrie::new(32);
        assert!(t.search_range(-10, true, 10, true).is_empty());
        assert!(t.search_greater_than(0, true).is_empty());
        assert!(t.search_less_than(0, true).is_empty());
        assert!(t.search_equal_to(0).is_empty());
        assert!(t.seq_ids_outside_top_k(5).is_empty());
        assert!(t.is_empty());
    }

    #[test]
    fn i64_min_is_silently_unindexable() {
        let mut t = NumericTrie::new(64);
        t.insert(i64::MIN, 1);
        assert!(t.is_empty());

        t.insert(-5, 2);
        assert_eq!(t.search_range(i64::MIN, true, 10, true), vec![2]);
    }

    #[test]
    fn iterator_variant_matches_bulk_variant() {
        let t = trie_with(&[(-5, 1), (0, 2), (5, 3), (10, 4)]);
        let bulk = t.search_range(-10, true, 10, true);

        let mut it = t.search_range_iter(-10, true, 10, true);
        let mut collected = Vec::new();
        while it.valid() {
            collected.push(it.seq_id());
            it.next();
        }
        assert_eq!(bulk, collected);
    }

    #[test]
    fn geopoint_round_trip() {
        let mut t = NumericTrie::new(64);
        t.insert_geopoint(0x47E6_6C30_0000_0000, 1);
        t.insert_geopoint(0x47E6_6C31_0000_0000, 2);
        assert_eq!(t.search_geopoints(&[0x47E6_6C30_0000_0000]), vec![1]);
        assert_eq!(
            t.search_geopoints(&[0x47E6_6C30_0000_0000, 0x47E6_6C31_0000_0000]),
            vec![1, 2]
        );
        t.delete_geopoint(0x47E6_6C30_0000_0000, 1);
        assert!(t.search_geopoints(&[0x47E6_6C30_0000_0000]).is_empty());
    }
}
