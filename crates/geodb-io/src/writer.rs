//! Buffered, position-tracking file writer.

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use geodb_core::GeoCoord;
use tracing::debug;

use crate::{IoError, IoResult, varint};

/// Writes little-endian binary data sequentially, remembering the current
/// byte position so that header fields can be reserved now and patched later
/// through [`set_pos`](Self::set_pos).
///
/// [`close`](Self::close) flushes and syncs; [`close_failsafe`](Self::close_failsafe)
/// drops pending buffered data and is meant for error paths, after which the
/// caller normally removes the file.
pub struct FileWriter {
    path:  PathBuf,
    inner: Option<BufWriter<File>>,
    pos:   u64,
}

impl FileWriter {
    /// Create (or truncate) `path`.
    pub fn create(path: &Path) -> IoResult<Self> {
        let file = File::create(path).map_err(|source| IoError::File {
            path: path.to_path_buf(),
            op: "create",
            source,
        })?;
        Ok(Self { path: path.to_path_buf(), inner: Some(BufWriter::new(file)), pos: 0 })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current write position.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Move the write position.  Buffered data is flushed first.
    pub fn set_pos(&mut self, pos: u64) -> IoResult<()> {
        let res = self.stream("seek")?.seek(SeekFrom::Start(pos));
        self.pos = self.wrap("seek", res)?;
        Ok(())
    }

    // ── Primitives ───────────────────────────────────────────────────────────

    pub fn write_u8(&mut self, v: u8) -> IoResult<()> {
        let res = self.stream("write")?.write_u8(v);
        self.advance(res, 1)
    }

    pub fn write_u32(&mut self, v: u32) -> IoResult<()> {
        let res = self.stream("write")?.write_u32::<LittleEndian>(v);
        self.advance(res, 4)
    }

    pub fn write_u64(&mut self, v: u64) -> IoResult<()> {
        let res = self.stream("write")?.write_u64::<LittleEndian>(v);
        self.advance(res, 8)
    }

    pub fn write_i64(&mut self, v: i64) -> IoResult<()> {
        let res = self.stream("write")?.write_i64::<LittleEndian>(v);
        self.advance(res, 8)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> IoResult<()> {
        let res = self.stream("write")?.write_all(bytes);
        self.advance(res, bytes.len() as u64)
    }

    pub fn write_varint(&mut self, v: u64) -> IoResult<()> {
        let res = varint::write(self.stream("write")?, v);
        let n = self.wrap("write", res)?;
        self.pos += n as u64;
        Ok(())
    }

    pub fn write_coord(&mut self, c: GeoCoord) -> IoResult<()> {
        self.write_bytes(&c.encode())
    }

    /// Write the sentinel of an unused coordinate slot.
    pub fn write_invalid_coord(&mut self) -> IoResult<()> {
        self.write_bytes(&GeoCoord::invalid_encoding())
    }

    /// Write the low `width` bytes of `value` (little-endian).
    pub fn write_file_offset(&mut self, value: u64, width: u8) -> IoResult<()> {
        if width == 0 || (width < 8 && value >> (8 * width as u32) != 0) {
            return Err(IoError::WidthOverflow { value, width });
        }
        let bytes = value.to_le_bytes();
        self.write_bytes(&bytes[..width.min(8) as usize])
    }

    // ── Closing ──────────────────────────────────────────────────────────────

    /// Flush buffered data and sync the file.  Idempotent.
    pub fn close(&mut self) -> IoResult<()> {
        let Some(mut w) = self.inner.take() else {
            return Ok(());
        };
        let res = w.flush();
        self.wrap("flush", res)?;
        let res = w.get_ref().sync_all();
        self.wrap("sync", res)
    }

    /// Close without flushing pending data.  Never fails; idempotent.
    pub fn close_failsafe(&mut self) {
        if let Some(w) = self.inner.take() {
            let (_file, pending) = w.into_parts();
            if let Ok(buf) = pending {
                debug!(path = %self.path.display(), dropped = buf.len(), "failsafe close");
            }
        }
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn stream(&mut self, op: &'static str) -> IoResult<&mut BufWriter<File>> {
        match self.inner.as_mut() {
            Some(w) => Ok(w),
            None => Err(IoError::File {
                path: self.path.clone(),
                op,
                source: std::io::Error::other("file already closed"),
            }),
        }
    }

    fn wrap<T>(&self, op: &'static str, res: std::io::Result<T>) -> IoResult<T> {
        res.map_err(|source| IoError::File { path: self.path.clone(), op, source })
    }

    fn advance(&mut self, res: std::io::Result<()>, n: u64) -> IoResult<()> {
        self.wrap("write", res)?;
        self.pos += n;
        Ok(())
    }
}
