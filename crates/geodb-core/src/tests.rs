//! Unit tests for geodb-core primitives.

#[cfg(test)]
mod ids {
    use crate::{ExternalId, TypeId};

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(TypeId::INVALID.0, u16::MAX);
        assert_eq!(ExternalId::INVALID.0, i64::MAX);
    }

    #[test]
    fn display() {
        assert_eq!(TypeId(7).to_string(), "TypeId(7)");
        assert_eq!(ExternalId(-3).to_string(), "ExternalId(-3)");
    }

    #[test]
    fn sort_key_preserves_signed_order() {
        let ids = [i64::MIN, -1_000_000, -1, 0, 1, 42, i64::MAX - 1];
        for pair in ids.windows(2) {
            let (a, b) = (ExternalId(pair[0]), ExternalId(pair[1]));
            assert!(a.sort_key() < b.sort_key(), "{a} vs {b}");
        }
    }

    #[test]
    fn sort_key_inverts() {
        for id in [i64::MIN, -5, 0, 5, i64::MAX] {
            let id = ExternalId(id);
            assert_eq!(ExternalId::from_sort_key(id.sort_key()), id);
        }
    }
}

#[cfg(test)]
mod geo {
    use crate::{GeoBox, GeoCoord};

    const QUANTUM: f64 = 1e-5;

    #[test]
    fn encode_decode_within_quantum() {
        for (lat, lon) in [(0.0, 0.0), (51.5, -0.12), (-33.86, 151.2), (90.0, 180.0), (-90.0, -180.0)] {
            let c = GeoCoord::new(lat, lon);
            let back = GeoCoord::decode(&c.encode()).expect("valid coordinate decodes");
            assert!((back.lat - lat).abs() < QUANTUM, "lat {lat} -> {}", back.lat);
            assert!((back.lon - lon).abs() < QUANTUM, "lon {lon} -> {}", back.lon);
        }
    }

    #[test]
    fn invalid_sentinel_does_not_decode() {
        assert_eq!(GeoCoord::decode(&GeoCoord::invalid_encoding()), None);
    }

    #[test]
    fn extreme_coordinate_is_not_the_sentinel() {
        let enc = GeoCoord::new(90.0, 180.0).encode();
        assert_ne!(enc, GeoCoord::invalid_encoding());
        assert_eq!(enc[6] & 0x88, 0);
    }

    #[test]
    fn equal_positions_share_a_key() {
        let a = GeoCoord::new(48.137154, 11.576124);
        let b = GeoCoord::new(48.137154, 11.576124);
        let c = GeoCoord::new(48.137254, 11.576124);
        assert_eq!(a.position_key(), b.position_key());
        assert_ne!(a.position_key(), c.position_key());
    }

    #[test]
    fn checked_rejects_out_of_range() {
        assert!(GeoCoord::checked(91.0, 0.0).is_err());
        assert!(GeoCoord::checked(0.0, -181.0).is_err());
        assert!(GeoCoord::checked(45.0, 90.0).is_ok());
    }

    #[test]
    fn box_normalises_corners() {
        let b = GeoBox::new(GeoCoord::new(10.0, 20.0), GeoCoord::new(-10.0, -20.0));
        assert_eq!(b.min, GeoCoord::new(-10.0, -20.0));
        assert_eq!(b.max, GeoCoord::new(10.0, 20.0));
        assert!(b.includes(GeoCoord::new(0.0, 0.0)));
        assert!(!b.includes(GeoCoord::new(11.0, 0.0)));
    }

    #[test]
    fn covering_and_intersection() {
        let b = GeoBox::covering([GeoCoord::new(1.0, 1.0), GeoCoord::new(3.0, -2.0)]).unwrap();
        assert_eq!(b.min, GeoCoord::new(1.0, -2.0));
        assert_eq!(b.max, GeoCoord::new(3.0, 1.0));
        assert!(GeoBox::covering(std::iter::empty()).is_none());

        let other = GeoBox::new(GeoCoord::new(3.0, 1.0), GeoCoord::new(5.0, 5.0));
        assert!(b.intersects(&other));
        let far = GeoBox::new(GeoCoord::new(4.0, 4.0), GeoCoord::new(5.0, 5.0));
        assert!(!b.intersects(&far));
    }
}

#[cfg(test)]
mod cell {
    use crate::{Cell, CellBox, GeoBox, GeoCoord, Level};

    #[test]
    fn level_geometry() {
        assert_eq!(Level(0).cells_per_axis(), 1);
        assert_eq!(Level(4).cells_per_axis(), 16);
        assert_eq!(Level(1).cell_width(), 180.0);
        assert_eq!(Level(1).cell_height(), 90.0);
    }

    #[test]
    fn cell_of_clamps_on_north_east_border() {
        let l = Level(1);
        assert_eq!(l.cell_of(GeoCoord::new(-90.0, -180.0)), Cell::new(0, 0));
        assert_eq!(l.cell_of(GeoCoord::new(0.0, 0.0)), Cell::new(1, 1));
        assert_eq!(l.cell_of(GeoCoord::new(90.0, 180.0)), Cell::new(1, 1));
        assert_eq!(l.cell_of(GeoCoord::new(-45.0, 10.0)), Cell::new(1, 0));
    }

    #[test]
    fn cells_of_box() {
        let b = GeoBox::new(GeoCoord::new(-80.0, -170.0), GeoCoord::new(80.0, 170.0));
        let cb = Level(2).cells_of(&b);
        assert_eq!(cb, CellBox { x_start: 0, x_end: 3, y_start: 0, y_end: 3 });
        assert_eq!(cb.count(), 16);
    }

    #[test]
    fn cells_order_by_row_then_column() {
        let mut cells = vec![Cell::new(0, 1), Cell::new(1, 0), Cell::new(0, 0)];
        cells.sort();
        assert_eq!(cells, vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(0, 1)]);
    }

    #[test]
    fn slot_and_iteration_are_row_major() {
        let cb = CellBox { x_start: 2, x_end: 4, y_start: 5, y_end: 6 };
        let all: Vec<Cell> = cb.cells().collect();
        assert_eq!(all.len(), 6);
        for (slot, c) in all.iter().enumerate() {
            assert_eq!(cb.slot_of(*c), slot as u64);
            assert!(cb.contains(*c));
        }
        assert!(!cb.contains(Cell::new(1, 5)));
    }

    #[test]
    fn intersection() {
        let a = CellBox { x_start: 0, x_end: 4, y_start: 0, y_end: 4 };
        let b = CellBox { x_start: 3, x_end: 8, y_start: 2, y_end: 3 };
        assert_eq!(a.intersection(&b), Some(CellBox { x_start: 3, x_end: 4, y_start: 2, y_end: 3 }));
        let c = CellBox { x_start: 5, x_end: 6, y_start: 0, y_end: 0 };
        assert_eq!(a.intersection(&c), None);
    }

    #[test]
    fn include_grows() {
        let cb = CellBox::from_cell(Cell::new(3, 3)).include(Cell::new(1, 5));
        assert_eq!(cb, CellBox { x_start: 1, x_end: 3, y_start: 3, y_end: 5 });
    }
}

#[cfg(test)]
mod config {
    use crate::{ImportParameter, Level};

    #[test]
    fn defaults_validate() {
        let p = ImportParameter::default();
        assert!(p.validate().is_ok());
        assert_eq!(p.coord_disk_page_size, 64);
        assert_eq!(p.area_way_index.min_level, Level(10));
        assert_eq!(p.area_way_index.max_level, Level(15));
    }

    #[test]
    fn zero_page_size_rejected() {
        let mut p = ImportParameter::new("/tmp");
        p.coord_sort_page_size = 0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn inverted_levels_rejected() {
        let mut p = ImportParameter::default();
        p.area_node_index.min_level = Level(12);
        p.area_node_index.max_level = Level(8);
        assert!(p.validate().is_err());
    }

    #[test]
    fn max_level_bounded() {
        let mut p = ImportParameter::default();
        p.area_area_index.max_level = Level(31);
        assert!(p.validate().is_err());
    }

    #[test]
    fn destination_file_joins() {
        let p = ImportParameter::new("/data/import");
        assert_eq!(p.destination_file("coord.dat"), std::path::Path::new("/data/import/coord.dat"));
    }
}

#[cfg(test)]
mod progress {
    use crate::{ImportProgress, NoopProgress, TracingProgress};

    #[derive(Default)]
    struct Recorder {
        warnings: Vec<String>,
    }

    impl ImportProgress for Recorder {
        fn warning(&mut self, msg: &str) {
            self.warnings.push(msg.to_owned());
        }
    }

    #[test]
    fn default_methods_are_noops() {
        let mut r = Recorder::default();
        r.info("ignored");
        r.error("ignored");
        r.warning("kept");
        assert_eq!(r.warnings, vec!["kept".to_owned()]);
        NoopProgress.error("discarded");
    }

    #[test]
    fn tracing_progress_tracks_step() {
        let mut p = TracingProgress::new();
        p.set_step("coords");
        assert_eq!(p.step(), "coords");
    }
}
