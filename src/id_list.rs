use smallvec::SmallVec;

/// Above this cardinality a [`IdList`] promotes from the compact inline form
/// to a growable `Vec`. Chosen so the compact form still fits in one heap
/// block alongside the `SmallVec` header.
const PROMOTE_AT: usize = 16;

type Inline = SmallVec<[u32; PROMOTE_AT]>;

/// A sorted, deduplicated set of seq_ids owned by one trie node or geo cell.
///
/// Starts out as a small inline array (`Compact`) and promotes itself to a
/// growable `Vec` (`Full`) once it crosses [`PROMOTE_AT`] entries. Promotion
/// is one-way: the list never demotes back to `Compact`, since shrinking
/// leaves no state worth reclaiming compared to the cost of checking for it
/// on every `erase`.
#[derive(Debug, Clone)]
pub(crate) enum IdList {
    Compact(Inline),
    Full(Vec<u32>),
}

impl IdList {
    /// An empty list in its compact form.
    pub(crate) fn new() -> Self {
        IdList::Compact(SmallVec::new())
    }

    /// Build a list directly from a sorted, deduplicated slice.
    pub(crate) fn from_sorted_unique(ids: &[u32]) -> Self {
        if ids.len() <= PROMOTE_AT {
            IdList::Compact(SmallVec::from_slice(ids))
        } else {
            IdList::Full(ids.to_vec())
        }
    }

    /// Current cardinality.
    pub(crate) fn len(&self) -> usize {
        match self {
            IdList::Compact(v) => v.len(),
            IdList::Full(v) => v.len(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn as_slice(&self) -> &[u32] {
        match self {
            IdList::Compact(v) => v.as_slice(),
            IdList::Full(v) => v.as_slice(),
        }
    }

    /// Idempotent sorted insert. Promotes `Compact` -> `Full` once the
    /// post-insert count exceeds [`PROMOTE_AT`].
    pub(crate) fn insert(&mut self, id: u32) {
        match self {
            IdList::Compact(v) => {
                match v.binary_search(&id) {
                    Ok(_) => return,
                    Err(pos) => v.insert(pos, id),
                }
                if v.len() > PROMOTE_AT {
                    let full = std::mem::take(v).into_vec();
                    *self = IdList::Full(full);
                }
            }
            IdList::Full(v) => {
                if let Err(pos) = v.binary_search(&id) {
                    v.insert(pos, id);
                }
            }
        }
    }

    /// Remove `id` if present; no-op otherwise. Never demotes.
    pub(crate) fn erase(&mut self, id: u32) {
        let v: &mut [u32] = match self {
            IdList::Compact(v) => v.as_mut_slice(),
            IdList::Full(v) => v.as_mut_slice(),
        };
        if let Ok(pos) = v.binary_search(&id) {
            match self {
                IdList::Compact(v) => {
                    v.remove(pos);
                }
                IdList::Full(v) => {
                    v.remove(pos);
                }
            }
        }
    }

    /// O(log n) membership test on `Full`; linear (n bounded by
    /// [`PROMOTE_AT`]) on `Compact`.
    pub(crate) fn contains(&self, id: u32) -> bool {
        self.as_slice().binary_search(&id).is_ok()
    }

    /// A freshly allocated sorted copy of the ids in this list.
    pub(crate) fn materialize(&self) -> Vec<u32> {
        self.as_slice().to_vec()
    }

    /// Append this list's ids, in order, to a caller-owned vector.
    pub(crate) fn materialize_into(&self, out: &mut Vec<u32>) {
        out.extend_from_slice(self.as_slice());
    }
}

impl Default for IdList {
    fn default() -> Self {
        IdList::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent_and_sorted() {
        let mut ids = IdList::new();
        ids.insert(5);
        ids.insert(1);
        ids.insert(5);
        ids.insert(3);
        assert_eq!(ids.materialize(), vec![1, 3, 5]);
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn erase_absent_is_noop() {
        let mut ids = IdList::new();
        ids.insert(1);
        ids.erase(99);
        assert_eq!(ids.materialize(), vec![1]);
    }

    #[test]
    fn promotes_past_threshold() {
        let mut ids = IdList::new();
        for i in 0..=PROMOTE_AT as u32 {
            ids.insert(i);
        }
        assert!(matches!(ids, IdList::Full(_)));
        assert_eq!(ids.len(), PROMOTE_AT + 1);

        let expected: Vec<u32> = (0..=PROMOTE_AT as u32).collect();
        assert_eq!(ids.materialize(), expected);
    }

    #[test]
    fn stays_compact_at_threshold() {
        let mut ids = IdList::new();
        for i in 0..PROMOTE_AT as u32 {
            ids.insert(i);
        }
        assert!(matches!(ids, IdList::Compact(_)));
    }

    #[test]
    fn contains_after_promotion() {
        let mut ids = IdList::new();
        for i in 0..64u32 {
            ids.insert(i * 2);
        }
        assert!(matches!(ids, IdList::Full(_)));
        assert!(ids.contains(10));
        assert!(!ids.contains(11));
    }

    #[test]
    fn erase_does_not_demote() {
        let mut ids = IdList::new();
        for i in 0..64u32 {
            ids.insert(i);
        }
        for i in 0..60u32 {
            ids.erase(i);
        }
        assert!(matches!(ids, IdList::Full(_)));
        assert_eq!(ids.materialize(), vec![60, 61, 62, 63]);
    }

    #[test]
    fn from_sorted_unique_round_trips() {
        let ids = IdList::from_sorted_unique(&[2, 4, 6, 8]);
        assert_eq!(ids.materialize(), vec![2, 4, 6, 8]);
        assert!(matches!(ids, IdList::Compact(_)));

        let many: Vec<u32> = (0..32).collect();
        let ids = IdList::from_sorted_unique(&many);
        assert!(matches!(ids, IdList::Full(_)));
    }

    #[test]
    fn materialize_into_appends() {
        let mut ids = IdList::new();
        ids.insert(1);
        ids.insert(2);
        let mut out = vec![0];
        ids.materialize_into(&mut out);
        assert_eq!(out, vec![0, 1, 2]);
    }
}
