//! Geographic coordinate type, its disk encoding and bounding boxes.
//!
//! # Disk encoding
//!
//! Coordinates are quantised to 27 bits per axis and stored in 7 bytes:
//!
//! ```text
//! byte 0..3   lat bits 0..24
//! byte 3..6   lon bits 0..24
//! byte 6      lat bits 24..27 in 0x07, lon bits 24..27 in 0x70
//! ```
//!
//! Bits `0x88` of byte 6 are never set by a valid coordinate, so seven `0xFF`
//! bytes serve as the "invalid coordinate" sentinel for empty store slots.
//!
//! # Position key
//!
//! [`GeoCoord::position_key`] interleaves the quantised bytes into a `u64`.
//! Two coordinates that encode to the same 7 bytes have the same key, which is
//! what duplicate detection sorts on.

use std::fmt;

use crate::{CoreError, CoreResult};

/// Number of bytes of one encoded coordinate.
pub const COORD_BYTE_SIZE: usize = 7;

const MAX_RAW_COORD_VALUE: u32 = 0x07FF_FFFF; // 27 bit
const LAT_CONVERSION_FACTOR: f64 = MAX_RAW_COORD_VALUE as f64 / 180.0;
const LON_CONVERSION_FACTOR: f64 = MAX_RAW_COORD_VALUE as f64 / 360.0;

const INVALID_ENCODING: [u8; COORD_BYTE_SIZE] = [0xFF; COORD_BYTE_SIZE];

/// A WGS-84 coordinate in double precision degrees.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoCoord {
    pub lat: f64,
    pub lon: f64,
}

impl GeoCoord {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Like [`new`](Self::new) but rejects values outside ±90 / ±180.
    pub fn checked(lat: f64, lon: f64) -> CoreResult<Self> {
        let coord = Self { lat, lon };
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(CoreError::CoordOutOfRange { lat, lon })
        }
    }

    pub fn is_valid(self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }

    /// Quantised 27-bit (lat, lon) values.
    #[inline]
    fn raw(self) -> (u32, u32) {
        let lat = ((self.lat + 90.0) * LAT_CONVERSION_FACTOR)
            .round()
            .clamp(0.0, MAX_RAW_COORD_VALUE as f64) as u32;
        let lon = ((self.lon + 180.0) * LON_CONVERSION_FACTOR)
            .round()
            .clamp(0.0, MAX_RAW_COORD_VALUE as f64) as u32;
        (lat, lon)
    }

    /// Encode into the 7-byte on-disk representation.
    pub fn encode(self) -> [u8; COORD_BYTE_SIZE] {
        let (lat, lon) = self.raw();
        [
            lat as u8,
            (lat >> 8) as u8,
            (lat >> 16) as u8,
            lon as u8,
            (lon >> 8) as u8,
            (lon >> 16) as u8,
            (((lat >> 24) & 0x07) | ((lon >> 20) & 0x70)) as u8,
        ]
    }

    /// The encoding written into unused coordinate-store slots.
    #[inline]
    pub fn invalid_encoding() -> [u8; COORD_BYTE_SIZE] {
        INVALID_ENCODING
    }

    /// Decode the 7-byte representation.  Returns `None` for the invalid
    /// sentinel (or any byte pattern no valid coordinate produces).
    pub fn decode(buf: &[u8; COORD_BYTE_SIZE]) -> Option<GeoCoord> {
        if buf[6] & 0x88 != 0 {
            return None;
        }
        let lat = buf[0] as u32
            | (buf[1] as u32) << 8
            | (buf[2] as u32) << 16
            | ((buf[6] & 0x07) as u32) << 24;
        let lon = buf[3] as u32
            | (buf[4] as u32) << 8
            | (buf[5] as u32) << 16
            | ((buf[6] & 0x70) as u32) << 20;
        Some(GeoCoord {
            lat: lat as f64 / LAT_CONVERSION_FACTOR - 90.0,
            lon: lon as f64 / LON_CONVERSION_FACTOR - 180.0,
        })
    }

    /// Byte-interleaved key of the quantised position.
    pub fn position_key(self) -> u64 {
        let (lat, lon) = self.raw();
        let (lat, lon) = (lat as u64, lon as u64);

        ((lat & 0x0000_00ff) << 8)
            + (lon & 0x0000_00ff)
            + ((lat & 0x0000_ff00) << 16)
            + ((lon & 0x0000_ff00) << 8)
            + ((lat & 0x00ff_0000) << 24)
            + ((lon & 0x00ff_0000) << 16)
            + ((lat & 0x0700_0000) << 27)
            + ((lon & 0x0700_0000) << 24)
    }
}

impl fmt::Display for GeoCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.lat >= 0.0 { 'N' } else { 'S' };
        let ew = if self.lon >= 0.0 { 'E' } else { 'W' };
        write!(f, "{:.5} {} {:.5} {}", self.lat.abs(), ns, self.lon.abs(), ew)
    }
}

// ── GeoBox ────────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box in degrees.  Both corners are inclusive.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoBox {
    pub min: GeoCoord,
    pub max: GeoCoord,
}

impl GeoBox {
    /// Build a box from two arbitrary corners.
    pub fn new(a: GeoCoord, b: GeoCoord) -> Self {
        Self {
            min: GeoCoord::new(a.lat.min(b.lat), a.lon.min(b.lon)),
            max: GeoCoord::new(a.lat.max(b.lat), a.lon.max(b.lon)),
        }
    }

    /// Degenerate box around a single point (the shape of a node).
    pub fn from_point(p: GeoCoord) -> Self {
        Self { min: p, max: p }
    }

    /// The whole globe.
    pub fn world() -> Self {
        Self::new(GeoCoord::new(-90.0, -180.0), GeoCoord::new(90.0, 180.0))
    }

    /// Smallest box containing every coordinate, `None` for an empty input.
    pub fn covering<I: IntoIterator<Item = GeoCoord>>(coords: I) -> Option<Self> {
        let mut iter = coords.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::from_point(first), |b, c| b.include(c)))
    }

    pub fn include(self, c: GeoCoord) -> Self {
        Self {
            min: GeoCoord::new(self.min.lat.min(c.lat), self.min.lon.min(c.lon)),
            max: GeoCoord::new(self.max.lat.max(c.lat), self.max.lon.max(c.lon)),
        }
    }

    #[inline]
    pub fn includes(&self, c: GeoCoord) -> bool {
        c.lat >= self.min.lat && c.lat <= self.max.lat
            && c.lon >= self.min.lon && c.lon <= self.max.lon
    }

    #[inline]
    pub fn intersects(&self, other: &GeoBox) -> bool {
        self.min.lat <= other.max.lat && self.max.lat >= other.min.lat
            && self.min.lon <= other.max.lon && self.max.lon >= other.min.lon
    }
}

impl fmt::Display for GeoBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", self.min, self.max)
    }
}
