//! Unit tests for geodb-io.

#[cfg(test)]
mod varint {
    use crate::varint::{bytes_needed, decode, encode, encoded_len, read};

    #[test]
    fn known_encodings() {
        let mut buf = Vec::new();
        encode(0, &mut buf);
        encode(127, &mut buf);
        encode(300, &mut buf);
        assert_eq!(buf, vec![0x00, 0x7F, 0xAC, 0x02]);
    }

    #[test]
    fn lengths() {
        assert_eq!(encoded_len(0), 1);
        assert_eq!(encoded_len(127), 1);
        assert_eq!(encoded_len(128), 2);
        assert_eq!(encoded_len(u64::MAX), 10);
        for v in [0u64, 1, 127, 128, 16_383, 16_384, 1 << 40, u64::MAX] {
            let mut buf = Vec::new();
            assert_eq!(encode(v, &mut buf), encoded_len(v));
            assert_eq!(decode(&buf), Some((v, buf.len())));
        }
    }

    #[test]
    fn truncated_input_is_rejected() {
        assert_eq!(decode(&[0x80, 0x80]), None);
        let mut r: &[u8] = &[0xFF];
        assert!(read(&mut r).is_err());
    }

    #[test]
    fn overflow_is_rejected() {
        let too_long = [0xFFu8; 10];
        assert_eq!(decode(&too_long), None);
    }

    #[test]
    fn byte_width() {
        assert_eq!(bytes_needed(0), 1);
        assert_eq!(bytes_needed(255), 1);
        assert_eq!(bytes_needed(256), 2);
        assert_eq!(bytes_needed(0x00FF_FFFF), 3);
        assert_eq!(bytes_needed(u64::MAX), 8);
    }
}

#[cfg(test)]
mod file {
    use geodb_core::GeoCoord;
    use tempfile::tempdir;

    use crate::{FileScanner, FileWriter, IoError};

    #[test]
    fn write_patch_and_scan() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.bin");

        let mut w = FileWriter::create(&path).unwrap();
        w.write_u32(0).unwrap();
        let patch_pos = w.pos();
        w.write_u64(0).unwrap();
        w.write_varint(300).unwrap();
        w.write_i64(-7).unwrap();
        w.write_coord(GeoCoord::new(10.0, 20.0)).unwrap();
        w.write_invalid_coord().unwrap();
        w.write_file_offset(0x0102_03, 3).unwrap();
        let end = w.pos();
        assert_eq!(end, 4 + 8 + 2 + 8 + 7 + 7 + 3);

        w.set_pos(patch_pos).unwrap();
        w.write_u64(end).unwrap();
        w.set_pos(0).unwrap();
        w.write_u32(99).unwrap();
        w.close().unwrap();
        w.close().unwrap();

        let mut s = FileScanner::open(&path).unwrap();
        assert_eq!(s.len(), end);
        assert_eq!(s.read_u32().unwrap(), 99);
        assert_eq!(s.read_u64().unwrap(), end);
        assert_eq!(s.read_varint().unwrap(), 300);
        assert_eq!(s.read_i64().unwrap(), -7);
        let c = s.read_coord().unwrap().unwrap();
        assert!((c.lat - 10.0).abs() < 1e-5 && (c.lon - 20.0).abs() < 1e-5);
        assert_eq!(s.read_coord().unwrap(), None);
        assert_eq!(s.read_file_offset(3).unwrap(), 0x0102_03);
        assert!(s.at_end());

        s.set_pos(12).unwrap();
        assert_eq!(s.read_varint().unwrap(), 300);
        s.set_pos(4).unwrap();
        assert_eq!(s.read_u64().unwrap(), end);
    }

    #[test]
    fn offset_width_overflow() {
        let dir = tempdir().unwrap();
        let mut w = FileWriter::create(&dir.path().join("w.bin")).unwrap();
        assert!(matches!(
            w.write_file_offset(256, 1),
            Err(IoError::WidthOverflow { value: 256, width: 1 })
        ));
        w.write_file_offset(u64::MAX, 8).unwrap();
        assert_eq!(w.pos(), 8);
    }

    #[test]
    fn failsafe_close_drops_buffer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.bin");
        let mut w = FileWriter::create(&path).unwrap();
        w.write_u64(1).unwrap();
        w.close_failsafe();
        assert!(!w.is_open());
        assert!(w.write_u8(0).is_err());
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn reading_past_end_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.bin");
        let mut w = FileWriter::create(&path).unwrap();
        w.write_u8(1).unwrap();
        w.close().unwrap();

        let mut s = FileScanner::open(&path).unwrap();
        assert!(s.read_u32().is_err());
    }
}
