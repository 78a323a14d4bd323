//! Window of resident key pages for one sort round, and the round driver.

use std::collections::BTreeMap;

use rayon::slice::ParallelSliceMut;
use tracing::debug;

use crate::{SortError, SortResult, SortSource};

// ── Page ──────────────────────────────────────────────────────────────────────

/// All entries whose key falls into `[index * page_size, (index + 1) * page_size)`.
///
/// Entries are kept in scan order; [`sort`](Self::sort) orders them by key.
#[derive(Debug)]
pub struct Page<E> {
    pub index:   u64,
    pub entries: Vec<(u64, E)>,
}

impl<E: Send> Page<E> {
    /// Stable parallel sort by key.
    pub fn sort(&mut self) {
        self.entries.par_sort_by_key(|(key, _)| *key);
    }
}

// ── PageManager ───────────────────────────────────────────────────────────────

/// Tracks which key pages the current round is collecting.
///
/// The window starts at `[min_page, last possible page]` and shrinks from the
/// top whenever the resident entry count exceeds the budget, as long as more
/// than one page is resident.  A single page is never dropped, so one page
/// may exceed the budget on its own.
pub struct PageManager<E> {
    budget:    usize,
    page_size: u64,
    total:     u64,
    pages:     BTreeMap<u64, Vec<(u64, E)>>,
    resident:  usize,
    min_page:  u64,
    max_page:  u64,
    processed: u64,
}

impl<E> PageManager<E> {
    /// `budget` resident entries, pages of `page_size` keys, `total` entries
    /// in the input.
    pub fn new(budget: usize, page_size: u64, total: u64) -> SortResult<Self> {
        if page_size == 0 {
            return Err(SortError::ZeroPageSize);
        }
        Ok(Self {
            budget: budget.max(1),
            page_size,
            total,
            pages: BTreeMap::new(),
            resident: 0,
            min_page: 0,
            max_page: u64::MAX / page_size,
            processed: 0,
        })
    }

    /// Whether `key` belongs to the pages collected in this round.
    #[inline]
    pub fn is_handled(&self, key: u64) -> bool {
        (self.min_page..=self.max_page).contains(&(key / self.page_size))
    }

    /// Collect `entry` if its page is inside the window.
    pub fn add(&mut self, key: u64, entry: E) {
        if !self.is_handled(key) {
            return;
        }
        self.pages.entry(key / self.page_size).or_default().push((key, entry));
        self.resident += 1;

        while self.resident > self.budget && self.pages.len() > 1 {
            let Some((dropped, entries)) = self.pages.pop_last() else {
                break;
            };
            self.resident -= entries.len();
            self.max_page = dropped - 1;
        }
    }

    /// Every entry of the input is either resident or already emitted.
    #[inline]
    pub fn all_loaded(&self) -> bool {
        self.processed + self.resident as u64 >= self.total
    }

    /// Every entry of the input has been emitted.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn resident(&self) -> usize {
        self.resident
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// End of a round: hand resident pages to `consumer` in ascending order
    /// and move the window past them.  Returns `false` if the consumer refused
    /// a page.
    pub fn file_completely_scanned(&mut self, consumer: &mut dyn FnMut(Page<E>) -> bool) -> bool {
        let pages = std::mem::take(&mut self.pages);
        self.resident = 0;
        for (index, entries) in pages {
            self.processed += entries.len() as u64;
            if !consumer(Page { index, entries }) {
                return false;
            }
        }
        self.min_page = self.max_page.saturating_add(1);
        self.max_page = u64::MAX / self.page_size;
        true
    }
}

// ── ExternalSorter ────────────────────────────────────────────────────────────

/// Outcome of [`ExternalSorter::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SortStats {
    /// Number of scans of the input.
    pub rounds:  u32,
    /// Number of pages handed to the consumer.
    pub pages:   u64,
    pub entries: u64,
}

/// Drives [`PageManager`] rounds over a [`SortSource`] until every entry has
/// been emitted exactly once.
#[derive(Clone, Copy, Debug)]
pub struct ExternalSorter {
    pub budget:    usize,
    pub page_size: u64,
}

impl ExternalSorter {
    pub fn new(budget: usize, page_size: u64) -> Self {
        Self { budget, page_size }
    }

    /// Emit all entries of `source` as key pages in ascending page order.
    ///
    /// Within a page entries are in scan order.  The final scan stops as soon
    /// as every remaining entry is resident.
    pub fn run<E, S>(
        &self,
        source: &mut S,
        consumer: &mut dyn FnMut(Page<E>) -> bool,
    ) -> SortResult<SortStats>
    where
        S: SortSource<E> + ?Sized,
    {
        let mut pm = PageManager::new(self.budget, self.page_size, source.entry_count())?;
        let mut stats = SortStats::default();

        while !pm.is_complete() {
            let before = pm.processed();
            stats.rounds += 1;

            source.scan(&mut |key, entry| {
                pm.add(key, entry);
                !pm.all_loaded()
            })?;

            let resident = pm.resident();
            let mut counting = |page: Page<E>| {
                stats.pages += 1;
                consumer(page)
            };
            if !pm.file_completely_scanned(&mut counting) {
                return Err(SortError::Aborted);
            }
            debug!(round = stats.rounds, resident, processed = pm.processed(), total = pm.total(), "sort round");

            if pm.processed() == before {
                return Err(SortError::Corrupt(format!(
                    "input announced {} entries but only {} could be read",
                    pm.total(),
                    pm.processed()
                )));
            }
        }
        stats.entries = pm.processed();
        Ok(stats)
    }
}
