//! Unit tests for geodb-sort.

#[cfg(test)]
mod page_manager {
    use crate::PageManager;

    #[test]
    fn window_shrinks_from_the_top() {
        let mut pm = PageManager::new(3, 10, 6).unwrap();
        pm.add(5, 'a');
        pm.add(25, 'b');
        pm.add(15, 'c');
        assert_eq!(pm.resident(), 3);
        // Page 2 is dropped; the window now ends at page 1.
        pm.add(6, 'd');
        assert_eq!(pm.resident(), 3);
        assert!(!pm.is_handled(25));
        assert!(pm.is_handled(19));
        pm.add(27, 'e');
        assert_eq!(pm.resident(), 3);
    }

    #[test]
    fn a_single_page_may_exceed_the_budget() {
        let mut pm = PageManager::new(2, 100, 5).unwrap();
        for k in 0..5 {
            pm.add(k, k);
        }
        assert_eq!(pm.resident(), 5);
        assert!(pm.all_loaded());
    }

    #[test]
    fn scan_end_emits_ascending_and_advances() {
        let mut pm = PageManager::new(2, 10, 4).unwrap();
        pm.add(35, 1);
        pm.add(3, 2);
        pm.add(12, 3);
        // Budget 2: page 3 dropped, window is now [0, 2].
        let mut seen = Vec::new();
        assert!(pm.file_completely_scanned(&mut |p| {
            seen.push(p.index);
            true
        }));
        assert_eq!(seen, vec![0, 1]);
        assert_eq!(pm.processed(), 2);
        assert!(!pm.is_handled(12));
        assert!(pm.is_handled(35));
        assert!(pm.is_handled(u64::MAX));
    }

    #[test]
    fn zero_page_size_rejected() {
        assert!(PageManager::<u8>::new(1, 0, 0).is_err());
    }
}

#[cfg(test)]
mod external_sorter {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use crate::{ExternalSorter, Page, SortError, SortSource, SortResult};

    fn collect(sorter: ExternalSorter, input: &mut Vec<(u64, u32)>) -> (Vec<Page<u32>>, u32) {
        let mut pages = Vec::new();
        let stats = sorter
            .run(input, &mut |page| {
                pages.push(page);
                true
            })
            .unwrap();
        (pages, stats.rounds)
    }

    #[test]
    fn every_entry_exactly_once_in_page_order() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut input: Vec<(u64, u32)> =
            (0..5_000).map(|i| (rng.gen_range(0..1_000_000), i)).collect();

        let (pages, rounds) = collect(ExternalSorter::new(700, 50_000), &mut input);
        assert!(rounds > 1, "budget should force several rounds");

        let indices: Vec<u64> = pages.iter().map(|p| p.index).collect();
        assert!(indices.windows(2).all(|w| w[0] < w[1]));

        let mut emitted: Vec<u32> = Vec::new();
        for mut page in pages {
            page.sort();
            assert!(page.entries.windows(2).all(|w| w[0].0 <= w[1].0));
            assert!(page.entries.iter().all(|(k, _)| k / 50_000 == page.index));
            emitted.extend(page.entries.iter().map(|(_, v)| *v));
        }
        emitted.sort_unstable();
        assert_eq!(emitted, (0..5_000).collect::<Vec<u32>>());
    }

    #[test]
    fn everything_fits_in_one_round() {
        let mut input: Vec<(u64, u32)> = vec![(30, 0), (10, 1), (20, 2), (10, 3)];
        let (pages, rounds) = collect(ExternalSorter::new(100, 10), &mut input);
        assert_eq!(rounds, 1);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].entries, vec![(10, 1), (10, 3)]);
    }

    #[test]
    fn empty_input_needs_no_round() {
        let mut input: Vec<(u64, u32)> = Vec::new();
        let (pages, rounds) = collect(ExternalSorter::new(10, 10), &mut input);
        assert!(pages.is_empty());
        assert_eq!(rounds, 0);
    }

    #[test]
    fn huge_keys_do_not_overflow_the_window() {
        let mut input: Vec<(u64, u32)> = vec![(u64::MAX, 0), (0, 1), (u64::MAX - 1, 2)];
        let (pages, _) = collect(ExternalSorter::new(1, 1 << 62), &mut input);
        let total: usize = pages.iter().map(|p| p.entries.len()).sum();
        assert_eq!(total, 3);
    }

    struct Liar(Vec<(u64, u32)>);

    impl SortSource<u32> for Liar {
        fn entry_count(&self) -> u64 {
            self.0.len() as u64 + 1
        }

        fn scan(&mut self, visit: &mut dyn FnMut(u64, u32) -> bool) -> SortResult<()> {
            self.0.scan(visit)
        }
    }

    #[test]
    fn short_input_is_reported_corrupt() {
        let mut src = Liar(vec![(1, 1), (2, 2)]);
        let res = ExternalSorter::new(10, 10).run(&mut src, &mut |_| true);
        assert!(matches!(res, Err(SortError::Corrupt(_))));
    }

    #[test]
    fn refusing_consumer_aborts() {
        let mut input: Vec<(u64, u32)> = vec![(1, 1), (200, 2)];
        let res = ExternalSorter::new(10, 10).run(&mut input, &mut |_| false);
        assert!(matches!(res, Err(SortError::Aborted)));
    }
}

#[cfg(test)]
mod splitter {
    use crate::{PageSplitter, SortError};

    #[test]
    fn flushes_on_page_change() {
        let mut s = PageSplitter::new(4).unwrap();
        assert!(s.push(1, "a").unwrap().is_none());
        assert!(s.push(3, "b").unwrap().is_none());
        let first = s.push(9, "c").unwrap().expect("page 0 complete");
        assert_eq!(first.index, 0);
        assert_eq!(first.first_key(), 0);
        assert_eq!(first.slots, vec![None, Some("a"), None, Some("b")]);
        assert_eq!(first.occupied(), 2);

        let last = s.finish().expect("page 2 pending");
        assert_eq!(last.index, 2);
        assert_eq!(last.first_key(), 8);
        assert_eq!(last.slots[1], Some("c"));
        assert!(s.finish().is_none());
        assert_eq!(s.pages_flushed(), 2);
    }

    #[test]
    fn descending_key_rejected() {
        let mut s = PageSplitter::new(4).unwrap();
        s.push(10, ()).unwrap();
        assert!(matches!(s.push(2, ()), Err(SortError::OutOfOrder { previous: 10, key: 2 })));
    }

    #[test]
    fn empty_splitter_produces_nothing() {
        let mut s = PageSplitter::<u8>::new(64).unwrap();
        assert!(s.finish().is_none());
    }
}
