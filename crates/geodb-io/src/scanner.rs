//! Buffered, seekable file reader.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};
use geodb_core::{COORD_BYTE_SIZE, GeoCoord};

use crate::{IoError, IoResult, varint};

/// Reads little-endian binary data, tracking the current byte position.
///
/// Not `Sync`: shared readers wrap it in a `Mutex` so that a seek and the
/// reads that follow it are not interleaved with another thread's.
pub struct FileScanner {
    path:  PathBuf,
    inner: BufReader<File>,
    pos:   u64,
    len:   u64,
}

impl FileScanner {
    pub fn open(path: &Path) -> IoResult<Self> {
        let err = |op, source| IoError::File { path: path.to_path_buf(), op, source };
        let file = File::open(path).map_err(|e| err("open", e))?;
        let len = file.metadata().map_err(|e| err("stat", e))?.len();
        Ok(Self { path: path.to_path_buf(), inner: BufReader::new(file), pos: 0, len })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// File size at open time.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.pos >= self.len
    }

    pub fn set_pos(&mut self, pos: u64) -> IoResult<()> {
        if pos == self.pos {
            return Ok(());
        }
        let delta = pos as i64 - self.pos as i64;
        let res = self.inner.seek_relative(delta);
        self.wrap("seek", res)?;
        self.pos = pos;
        Ok(())
    }

    /// Build a `Corrupt` error at the current position.
    pub fn corrupt(&self, reason: impl Into<String>) -> IoError {
        IoError::Corrupt { path: self.path.clone(), pos: self.pos, reason: reason.into() }
    }

    // ── Primitives ───────────────────────────────────────────────────────────

    pub fn read_u8(&mut self) -> IoResult<u8> {
        let res = self.inner.read_u8();
        self.advance(res, 1)
    }

    pub fn read_u32(&mut self) -> IoResult<u32> {
        let res = self.inner.read_u32::<LittleEndian>();
        self.advance(res, 4)
    }

    pub fn read_u64(&mut self) -> IoResult<u64> {
        let res = self.inner.read_u64::<LittleEndian>();
        self.advance(res, 8)
    }

    pub fn read_i64(&mut self) -> IoResult<i64> {
        let res = self.inner.read_i64::<LittleEndian>();
        self.advance(res, 8)
    }

    pub fn read_bytes(&mut self, buf: &mut [u8]) -> IoResult<()> {
        let res = self.inner.read_exact(buf);
        self.advance(res, buf.len() as u64)
    }

    pub fn read_varint(&mut self) -> IoResult<u64> {
        let res = varint::read(&mut self.inner);
        let (value, n) = self.wrap("read", res)?;
        self.pos += n as u64;
        Ok(value)
    }

    pub fn read_coord_bytes(&mut self) -> IoResult<[u8; COORD_BYTE_SIZE]> {
        let mut buf = [0u8; COORD_BYTE_SIZE];
        self.read_bytes(&mut buf)?;
        Ok(buf)
    }

    /// Read a coordinate; `None` for the invalid-slot sentinel.
    pub fn read_coord(&mut self) -> IoResult<Option<GeoCoord>> {
        let buf = self.read_coord_bytes()?;
        Ok(GeoCoord::decode(&buf))
    }

    /// Read a `width`-byte little-endian unsigned value.
    pub fn read_file_offset(&mut self, width: u8) -> IoResult<u64> {
        if width == 0 || width > 8 {
            return Err(self.corrupt(format!("invalid address width {width}")));
        }
        let mut bytes = [0u8; 8];
        self.read_bytes(&mut bytes[..width as usize])?;
        Ok(u64::from_le_bytes(bytes))
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn wrap<T>(&self, op: &'static str, res: std::io::Result<T>) -> IoResult<T> {
        res.map_err(|source| IoError::File { path: self.path.clone(), op, source })
    }

    fn advance<T>(&mut self, res: std::io::Result<T>, n: u64) -> IoResult<T> {
        let v = self.wrap("read", res)?;
        self.pos += n;
        Ok(v)
    }
}
