//! Pure functions over sorted, deduplicated `u32` slices: intersection,
//! union, difference, and the skip-to-target cursor advance used by the
//! iterator façade. None of these allocate more than the output requires.

/// Intersection of two sorted unique slices. Output length is at most
/// `min(A.len(), B.len())`.
///
/// Uses the "skip-first-compare" shape: once one side has been advanced
/// past an equal match, the loop does not re-test equality at the
/// position it just advanced from.
pub(crate) fn intersect(a: &[u32], b: &[u32]) -> Vec<u32> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);

    'outer: loop {
        while a[i] < b[j] {
            i += 1;
            if i == a.len() {
                break 'outer;
            }
        }
        while a[i] > b[j] {
            j += 1;
            if j == b.len() {
                break 'outer;
            }
        }
        if a[i] == b[j] {
            out.push(a[i]);
            i += 1;
            j += 1;
            if i == a.len() || j == b.len() {
                break;
            }
        }
    }

    out
}

/// Sorted, deduplicated union of two sorted unique slices.
///
/// Duplicate suppression is against the last value *written to the
/// output*, not against both inputs independently — this is what lets a
/// single linear merge produce a deduplicated result even when `a` and `b`
/// share values.
pub(crate) fn union(a: &[u32], b: &[u32]) -> Vec<u32> {
    if a.is_empty() {
        return b.to_vec();
    }
    if b.is_empty() {
        return a.to_vec();
    }

    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);

    let mut push = |out: &mut Vec<u32>, v: u32| {
        if out.last() != Some(&v) {
            out.push(v);
        }
    };

    while i < a.len() && j < b.len() {
        if a[i] < b[j] {
            push(&mut out, a[i]);
            i += 1;
        } else {
            push(&mut out, b[j]);
            j += 1;
        }
    }
    while i < a.len() {
        push(&mut out, a[i]);
        i += 1;
    }
    while j < b.len() {
        push(&mut out, b[j]);
        j += 1;
    }

    out
}

/// `a \ b`: elements of `a` not present in `b`. Empty `a` yields empty;
/// empty `b` yields a copy of `a`.
pub(crate) fn difference(a: &[u32], b: &[u32]) -> Vec<u32> {
    if a.is_empty() {
        return Vec::new();
    }
    if b.is_empty() {
        return a.to_vec();
    }

    let mut out = Vec::with_capacity(a.len());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        if a[i] < b[j] {
            out.push(a[i]);
            i += 1;
        } else if a[i] == b[j] {
            i += 1;
            j += 1;
        } else {
            j += 1;
        }
    }
    out.extend_from_slice(&a[i..]);

    out
}

/// Advance `*cursor` so that `arr[*cursor] >= target`. Returns `true` iff
/// `arr[*cursor] == target`.
///
/// First does an O(1) guard for the already-there/past-it case, then binary
/// searches the remainder. On a miss, `*cursor` is left at the insertion
/// point, which may equal `arr.len()`.
pub(crate) fn skip_to(cursor: &mut usize, arr: &[u32], target: u32) -> bool {
    if *cursor >= arr.len() {
        return false;
    }
    if target <= arr[*cursor] {
        return target == arr[*cursor];
    }

    let mut start = *cursor;
    let mut end = arr.len(); // exclusive
    while start < end {
        let mid = start + (end - start) / 2;
        match arr[mid].cmp(&target) {
            std::cmp::Ordering::Equal => {
                *cursor = mid;
                return true;
            }
            std::cmp::Ordering::Less => start = mid + 1,
            std::cmp::Ordering::Greater => end = mid,
        }
    }

    *cursor = start;
    false
}
