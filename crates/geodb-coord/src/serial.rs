//! Serial numbers for coincident coordinates.

use std::collections::BTreeMap;

/// Serial returned once a position has used up all 255 regular serials.
/// Records receiving it cannot be stored.
pub const SERIAL_OVERFLOW: u8 = 255;

/// Position key → next serial to hand out, for positions shared by more than
/// one source node.
///
/// Positions never marked as duplicate always get serial 0.  For a marked
/// position the n-th call of [`next_serial`](Self::next_serial) returns
/// `n - 1` until [`SERIAL_OVERFLOW`] is reached, which is then returned for
/// every further call.
#[derive(Default, Debug)]
pub struct SerialAssignment {
    next: BTreeMap<u64, u8>,
}

impl SerialAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `key` occurs more than once.  Idempotent.
    pub fn mark_duplicate(&mut self, key: u64) {
        self.next.entry(key).or_insert(0);
    }

    pub fn is_duplicate(&self, key: u64) -> bool {
        self.next.contains_key(&key)
    }

    /// Number of positions marked as duplicate.
    pub fn len(&self) -> usize {
        self.next.len()
    }

    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }

    /// Serial for the next record at position `key`.
    pub fn next_serial(&mut self, key: u64) -> u8 {
        let Some(next) = self.next.get_mut(&key) else {
            return 0;
        };
        let serial = *next;
        if serial < SERIAL_OVERFLOW {
            *next += 1;
        }
        serial
    }
}
