//! Unsigned LEB128 varints: 7 payload bits per byte, `0x80` marks a
//! continuation byte.

use std::io::{self, Read, Write};

/// Longest encoding of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

/// Number of bytes `value` occupies once encoded.
#[inline]
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Append the encoding of `value` to `buf`; returns the number of bytes added.
pub fn encode(mut value: u64, buf: &mut Vec<u8>) -> usize {
    let start = buf.len();
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
    buf.len() - start
}

/// Decode one varint from the front of `buf`.  Returns the value and the
/// number of bytes consumed, or `None` if `buf` ends mid-varint or the value
/// overflows 64 bits.
pub fn decode(buf: &[u8]) -> Option<(u64, usize)> {
    let mut value = 0u64;
    for (i, &b) in buf.iter().enumerate().take(MAX_VARINT_LEN) {
        let payload = (b & 0x7F) as u64;
        if i == MAX_VARINT_LEN - 1 && payload > 1 {
            return None;
        }
        value |= payload << (7 * i);
        if b & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}

pub fn write<W: Write>(w: &mut W, value: u64) -> io::Result<usize> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let mut v = value;
    let mut n = 0;
    while v >= 0x80 {
        buf[n] = (v as u8) | 0x80;
        v >>= 7;
        n += 1;
    }
    buf[n] = v as u8;
    n += 1;
    w.write_all(&buf[..n])?;
    Ok(n)
}

/// Read one varint; returns the value and the number of bytes consumed.
pub fn read<R: Read>(r: &mut R) -> io::Result<(u64, usize)> {
    let mut value = 0u64;
    let mut byte = [0u8; 1];
    for i in 0..MAX_VARINT_LEN {
        r.read_exact(&mut byte)?;
        let payload = (byte[0] & 0x7F) as u64;
        if i == MAX_VARINT_LEN - 1 && payload > 1 {
            break;
        }
        value |= payload << (7 * i);
        if byte[0] & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(io::Error::new(io::ErrorKind::InvalidData, "varint overflows 64 bits"))
}

/// Minimum number of bytes (base 256, at least one) needed to store `value`.
#[inline]
pub fn bytes_needed(value: u64) -> u8 {
    let bits = 64 - (value | 1).leading_zeros();
    bits.div_ceil(8) as u8
}
