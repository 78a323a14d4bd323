//! Unit tests for geodb-coord.

#[cfg(test)]
mod serial {
    use crate::{SERIAL_OVERFLOW, SerialAssignment};

    #[test]
    fn unmarked_positions_get_zero() {
        let mut s = SerialAssignment::new();
        assert_eq!(s.next_serial(17), 0);
        assert_eq!(s.next_serial(17), 0);
        assert!(s.is_empty());
    }

    #[test]
    fn duplicates_count_up_from_zero() {
        let mut s = SerialAssignment::new();
        s.mark_duplicate(5);
        s.mark_duplicate(5);
        assert_eq!(s.len(), 1);
        assert!(s.is_duplicate(5));
        let got: Vec<u8> = (0..3).map(|_| s.next_serial(5)).collect();
        assert_eq!(got, vec![0, 1, 2]);
    }

    #[test]
    fn overflow_does_not_wrap() {
        let mut s = SerialAssignment::new();
        s.mark_duplicate(1);
        for expected in 0..SERIAL_OVERFLOW {
            assert_eq!(s.next_serial(1), expected);
        }
        // The 256th and every later record is rejected.
        assert_eq!(s.next_serial(1), SERIAL_OVERFLOW);
        assert_eq!(s.next_serial(1), SERIAL_OVERFLOW);
    }
}

#[cfg(test)]
mod raw {
    use geodb_sort::SortSource;
    use tempfile::tempdir;

    use crate::{RawCoord, RawCoordFile, RawCoordKey, RawCoordWriter};

    #[test]
    fn write_and_rescan() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rawcoord.dat");
        let coords = [RawCoord::new(-4, 1.0, 2.0), RawCoord::new(9, -50.5, 120.25)];

        let mut w = RawCoordWriter::create(&path).unwrap();
        for c in &coords {
            w.write(c).unwrap();
        }
        assert_eq!(w.finish().unwrap(), 2);

        let mut f = RawCoordFile::open(&path, RawCoordKey::ExternalId).unwrap();
        assert_eq!(f.entry_count(), 2);
        for _ in 0..2 {
            let mut seen = Vec::new();
            f.scan(&mut |key, raw| {
                seen.push((key, raw.id));
                true
            })
            .unwrap();
            assert_eq!(seen, vec![(coords[0].id.sort_key(), coords[0].id), (coords[1].id.sort_key(), coords[1].id)]);
        }
    }

    #[test]
    fn position_key_scan() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rawcoord.dat");
        let mut w = RawCoordWriter::create(&path).unwrap();
        w.write(&RawCoord::new(1, 10.0, 10.0)).unwrap();
        w.write(&RawCoord::new(2, 10.0, 10.0)).unwrap();
        w.finish().unwrap();

        let mut f = RawCoordFile::open(&path, RawCoordKey::Position).unwrap();
        let mut keys = Vec::new();
        f.scan(&mut |key, _| {
            keys.push(key);
            true
        })
        .unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0], keys[1]);
    }
}

#[cfg(test)]
mod generator {
    use std::path::Path;

    use geodb_core::{ExternalId, GeoCoord, ImportParameter, ImportProgress};
    use tempfile::tempdir;

    use crate::{
        COORD_DAT, CoordDataGenerator, CoordStore, RAW_COORD_DAT, RawCoord, RawCoordWriter,
    };

    #[derive(Default)]
    struct Collect {
        errors: Vec<String>,
    }

    impl ImportProgress for Collect {
        fn error(&mut self, msg: &str) {
            self.errors.push(msg.to_owned());
        }
    }

    fn write_raw(dir: &Path, coords: &[RawCoord]) {
        let mut w = RawCoordWriter::create(&dir.join(RAW_COORD_DAT)).unwrap();
        for c in coords {
            w.write(c).unwrap();
        }
        w.finish().unwrap();
    }

    fn small_param(dir: &Path) -> ImportParameter {
        let mut p = ImportParameter::new(dir);
        p.raw_coord_block_size = 2;
        p.coord_sort_page_size = 1 << 40;
        p.coord_disk_page_size = 4;
        p.queue_capacity = 2;
        p
    }

    fn serial_of(store: &CoordStore, id: i64) -> Option<u8> {
        store.get(ExternalId(id)).unwrap().map(|p| p.serial)
    }

    #[test]
    fn coincident_coordinates_get_serials_in_id_order() {
        let dir = tempdir().unwrap();
        let (p, q, r) = ((48.1, 11.5), (-12.0, 77.7), (0.5, 0.5));
        write_raw(dir.path(), &[
            RawCoord::new(10, p.0, p.1),
            RawCoord::new(5, q.0, q.1),
            RawCoord::new(3, p.0, p.1),
            RawCoord::new(1, r.0, r.1),
            RawCoord::new(-2, q.0, q.1),
            RawCoord::new(7, p.0, p.1),
        ]);

        let param = small_param(dir.path());
        let mut progress = Collect::default();
        let stats = CoordDataGenerator::new(&param).run(&mut progress).unwrap();
        assert_eq!(stats.coords, 6);
        assert_eq!(stats.duplicate_positions, 2);
        assert_eq!(stats.duplicate_coords, 3);
        assert_eq!(stats.dropped, 0);
        assert!(stats.detect_rounds > 1);
        assert!(progress.errors.is_empty());

        let store = CoordStore::open(&dir.path().join(COORD_DAT)).unwrap();
        assert_eq!(store.page_size(), 4);
        assert_eq!(serial_of(&store, 3), Some(0));
        assert_eq!(serial_of(&store, 7), Some(1));
        assert_eq!(serial_of(&store, 10), Some(2));
        assert_eq!(serial_of(&store, -2), Some(0));
        assert_eq!(serial_of(&store, 5), Some(1));
        assert_eq!(serial_of(&store, 1), Some(0));

        let point = store.get(ExternalId(10)).unwrap().unwrap();
        assert!((point.coord.lat - p.0).abs() < 1e-5);
        assert!((point.coord.lon - p.1).abs() < 1e-5);

        // Unused slot on an existing page, and an id without any page.
        assert_eq!(serial_of(&store, 4), None);
        assert_eq!(serial_of(&store, 1_000_000), None);

        let many = store.get_many(&[ExternalId(7), ExternalId(999), ExternalId(-2)]).unwrap();
        assert_eq!(many.iter().map(|p| p.map(|p| p.serial)).collect::<Vec<_>>(), vec![Some(1), None, Some(0)]);
    }

    #[test]
    fn position_running_out_of_serials_drops_records() {
        let dir = tempdir().unwrap();
        let coords: Vec<RawCoord> = (0..257).rev().map(|id| RawCoord::new(id, 1.0, 1.0)).collect();
        write_raw(dir.path(), &coords);

        let mut param = small_param(dir.path());
        param.raw_coord_block_size = 1_000;
        param.coord_disk_page_size = 64;
        let mut progress = Collect::default();
        let stats = CoordDataGenerator::new(&param).run(&mut progress).unwrap();
        assert_eq!(stats.dropped, 2);
        assert_eq!(progress.errors.len(), 2);

        let store = CoordStore::open(&dir.path().join(COORD_DAT)).unwrap();
        assert_eq!(serial_of(&store, 0), Some(0));
        assert_eq!(serial_of(&store, 254), Some(254));
        assert_eq!(serial_of(&store, 255), None);
        assert_eq!(serial_of(&store, 256), None);
    }

    #[test]
    fn empty_input_gives_empty_store() {
        let dir = tempdir().unwrap();
        write_raw(dir.path(), &[]);
        let param = small_param(dir.path());
        let stats = CoordDataGenerator::new(&param).run(&mut geodb_core::NoopProgress).unwrap();
        assert_eq!(stats.pages_written, 0);
        let store = CoordStore::open(&dir.path().join(COORD_DAT)).unwrap();
        assert_eq!(store.page_count(), 0);
        assert_eq!(store.get(ExternalId(1)).unwrap(), None);
    }

    #[test]
    fn missing_input_fails_without_output() {
        let dir = tempdir().unwrap();
        let param = small_param(dir.path());
        assert!(CoordDataGenerator::new(&param).run(&mut geodb_core::NoopProgress).is_err());
        assert!(!dir.path().join(COORD_DAT).exists());
    }

    #[test]
    fn unfinished_store_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(COORD_DAT);
        let mut w = geodb_io::FileWriter::create(&path).unwrap();
        w.write_u64(0).unwrap();
        w.write_u32(64).unwrap();
        w.write_coord(GeoCoord::new(1.0, 1.0)).unwrap();
        w.close().unwrap();
        assert!(CoordStore::open(&path).is_err());
    }
}
