//! Embedded upstream data: a handful of places around Munich.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use geodb_coord::{RAW_COORD_DAT, RawCoord, RawCoordWriter};
use geodb_core::{GeoBox, GeoCoord, TypeId};
use geodb_index::{DataFileWriter, RecordKind};
use serde::Deserialize;

pub const TYPE_POI:      TypeId = TypeId(1);
pub const TYPE_STATION:  TypeId = TypeId(2);
pub const TYPE_ROAD:     TypeId = TypeId(10);
pub const TYPE_PARK:     TypeId = TypeId(20);

// Node ids 101/102 (and 103/104) share a position, as entrance nodes of one
// building often do.
const NODES_CSV: &str = "\
id,type_id,lat,lon\n\
101,1,48.13743,11.57549\n\
102,1,48.13743,11.57549\n\
103,2,48.14020,11.55840\n\
104,2,48.14020,11.55840\n\
105,1,48.15234,11.59218\n\
106,1,48.17301,11.54659\n\
107,2,48.35378,11.78610\n\
";

const SHAPES_CSV: &str = "\
kind,type_id,min_lat,min_lon,max_lat,max_lon\n\
way,10,48.1300,11.5500,48.1420,11.5800\n\
way,10,48.1500,11.5700,48.1600,11.6100\n\
way,10,48.3400,11.7500,48.3600,11.8000\n\
area,20,48.1420,11.5850,48.1890,11.6200\n\
area,20,48.1720,11.5420,48.1830,11.5560\n\
";

#[derive(Debug, Deserialize)]
struct NodeRow {
    id:      i64,
    type_id: u16,
    lat:     f64,
    lon:     f64,
}

#[derive(Debug, Deserialize)]
struct ShapeRow {
    kind:    String,
    type_id: u16,
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
}

/// Number of records written per file.
#[derive(Debug, Default)]
pub struct FixtureCounts {
    pub nodes: u32,
    pub ways:  u32,
    pub areas: u32,
}

/// Write `rawcoord.dat`, `nodes.dat`, `ways.dat` and `areas.dat` into `dir`.
pub fn write_fixture(dir: &Path) -> Result<FixtureCounts> {
    let mut raw = RawCoordWriter::create(&dir.join(RAW_COORD_DAT))?;
    let mut nodes = DataFileWriter::create(&dir.join(RecordKind::Node.data_file()))?;
    for row in csv::Reader::from_reader(Cursor::new(NODES_CSV)).deserialize() {
        let row: NodeRow = row.context("bad node row")?;
        let coord = GeoCoord::checked(row.lat, row.lon)?;
        raw.write(&RawCoord::new(row.id, coord.lat, coord.lon))?;
        nodes.write_point(TypeId(row.type_id), coord)?;
    }
    raw.finish()?;

    let mut ways = DataFileWriter::create(&dir.join(RecordKind::Way.data_file()))?;
    let mut areas = DataFileWriter::create(&dir.join(RecordKind::Area.data_file()))?;
    for row in csv::Reader::from_reader(Cursor::new(SHAPES_CSV)).deserialize() {
        let row: ShapeRow = row.context("bad shape row")?;
        let bbox = GeoBox::new(
            GeoCoord::checked(row.min_lat, row.min_lon)?,
            GeoCoord::checked(row.max_lat, row.max_lon)?,
        );
        let writer = match row.kind.as_str() {
            "way" => &mut ways,
            "area" => &mut areas,
            other => anyhow::bail!("unknown shape kind '{other}'"),
        };
        writer.write(TypeId(row.type_id), &bbox)?;
    }

    Ok(FixtureCounts { nodes: nodes.finish()?, ways: ways.finish()?, areas: areas.finish()? })
}
