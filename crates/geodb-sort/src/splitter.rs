//! Splits an ascending key stream into fixed-size disk pages.

use crate::{SortError, SortResult};

/// One disk page: `slots[i]` holds the entry with key
/// `index * slots.len() + i`, if any.
#[derive(Debug, PartialEq)]
pub struct DiskPage<E> {
    pub index: u64,
    pub slots: Vec<Option<E>>,
}

impl<E> DiskPage<E> {
    /// Key of the first slot.
    #[inline]
    pub fn first_key(&self) -> u64 {
        self.index * self.slots.len() as u64
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// Collects entries with ascending keys into pages of `page_size` slots and
/// hands out each page as soon as a key of a later page arrives.
///
/// Only pages that received at least one entry are produced.
pub struct PageSplitter<E> {
    page_size: u64,
    current:   Option<DiskPage<E>>,
    last_key:  Option<u64>,
    pages:     u64,
}

impl<E> PageSplitter<E> {
    pub fn new(page_size: u64) -> SortResult<Self> {
        if page_size == 0 {
            return Err(SortError::ZeroPageSize);
        }
        Ok(Self { page_size, current: None, last_key: None, pages: 0 })
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of pages handed out so far.
    pub fn pages_flushed(&self) -> u64 {
        self.pages
    }

    /// Place `entry` at `key`.  Returns the previous page once `key` moves on
    /// to a later page.  A key equal to the previous one replaces its entry.
    pub fn push(&mut self, key: u64, entry: E) -> SortResult<Option<DiskPage<E>>> {
        if let Some(previous) = self.last_key.filter(|&previous| key < previous) {
            return Err(SortError::OutOfOrder { previous, key });
        }
        self.last_key = Some(key);

        let index = key / self.page_size;
        let slot = (key % self.page_size) as usize;

        let moved_on = self.current.as_ref().is_some_and(|page| page.index != index);
        let flushed = if moved_on { self.current.take() } else { None };
        if flushed.is_some() {
            self.pages += 1;
        }

        let page_size = self.page_size as usize;
        let page = self.current.get_or_insert_with(|| DiskPage {
            index,
            slots: std::iter::repeat_with(|| None).take(page_size).collect(),
        });
        page.slots[slot] = Some(entry);
        Ok(flushed)
    }

    /// Hand out the last, partially filled page.  Idempotent.
    pub fn finish(&mut self) -> Option<DiskPage<E>> {
        let page = self.current.take();
        if page.is_some() {
            self.pages += 1;
        }
        page
    }
}
