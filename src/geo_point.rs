//! Point index over S2-style 64-bit cell ids: a `NumericTrie` fixed at
//! 8 levels, one byte per level of cell resolution.

use crate::trie::NumericTrie;

/// Indexes points by the unsigned 64-bit cell id a geo library assigns
/// them. Grounded on `GeoPointIndex` in `geopolygon_index.h`, which is
/// documented there as "just a `NumericTrie<uint64_t>` with max_level=8".
pub struct GeoPointIndex {
    trie: NumericTrie,
}

impl GeoPointIndex {
    pub fn new() -> Self {
        GeoPointIndex { trie: NumericTrie::new(64) }
    }

    pub fn insert_geopoint(&mut self, cell_id: u64, seq_id: u32) {
        self.trie.insert_geopoint(cell_id, seq_id);
    }

    pub fn delete_geopoint(&mut self, cell_id: u64, seq_id: u32) {
        self.trie.delete_geopoint(cell_id, seq_id);
    }

    /// Union of every matching node's ids across `query_cell_ids`, sorted
    /// and deduplicated. Each cell id's effective search depth is the
    /// position of its lowest-order non-zero byte: coarser cells match at a
    /// shallower depth, so the result is a superset that callers may need
    /// to refine (e.g. by exact distance).
    pub fn search_geopoints(&self, query_cell_ids: &[u64]) -> Vec<u32> {
        self.trie.search_geopoints(query_cell_ids)
    }

    pub fn len(&self) -> usize {
        self.trie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }
}

impl Default for GeoPointIndex {
    fn default() -> Self {
        Self::new()
    }
}
