//! small-import — end-to-end run of the geodb import core.
//!
//! Writes a tiny embedded dataset as upstream files, runs the standard
//! import into a scratch directory and queries the result.
//!
//! ```text
//! small-import [config.json]
//! ```
//!
//! The optional JSON file overrides `ImportParameter` fields; missing fields
//! keep their defaults.  Set `RUST_LOG=debug` for per-type index statistics.

mod fixture;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use geodb_core::{ExternalId, GeoBox, GeoCoord, ImportParameter, TracingProgress};
use geodb_db::Database;
use geodb_import::Importer;
use tracing_subscriber::EnvFilter;

use fixture::{TYPE_PARK, TYPE_POI, TYPE_ROAD, TYPE_STATION, write_fixture};

// ── Setup ─────────────────────────────────────────────────────────────────────

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn load_parameter(config: Option<&Path>, destination: &Path) -> Result<ImportParameter> {
    let mut param = match config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read '{}'", path.display()))?;
            serde_json::from_str::<ImportParameter>(&text)
                .with_context(|| format!("cannot parse '{}'", path.display()))?
        }
        None => ImportParameter::default(),
    };
    param.destination_directory = destination.to_path_buf();
    Ok(param)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();
    let config = std::env::args().nth(1);

    let scratch = tempfile::tempdir()?;
    let dir = scratch.path();
    let param = load_parameter(config.as_deref().map(Path::new), dir)?;

    println!("=== small-import ===");
    println!("Destination: {}", dir.display());

    let counts = write_fixture(dir)?;
    println!("Upstream: {} nodes, {} ways, {} areas", counts.nodes, counts.ways, counts.areas);
    println!();

    let t0 = Instant::now();
    let report = Importer::standard().run(&param, &mut TracingProgress::new())?;
    println!("Import complete in {:.3} s", t0.elapsed().as_secs_f64());
    for step in &report.steps {
        println!("  {:<24} {:>8.3} ms", step.module, step.duration.as_secs_f64() * 1000.0);
    }
    println!();

    let db = Database::new();
    db.open(dir)?;

    // Central Munich, about 3 km across.
    let center = GeoBox::new(GeoCoord::new(48.125, 11.54), GeoCoord::new(48.155, 11.60));
    let nodes = db.node_offsets(&center, &[TYPE_POI, TYPE_STATION])?;
    let ways = db.way_offsets(&center, &[TYPE_ROAD])?;
    let areas = db.area_offsets(&center, &[TYPE_PARK])?;
    println!("Query {center}");
    println!("  nodes : {:?} (types {:?})", nodes.offsets, nodes.loaded_types);
    println!("  ways  : {:?}", ways.offsets);
    println!("  areas : {:?}", areas.offsets);
    println!();

    println!("{:<8} {:<8} {:<24}", "Node", "Serial", "Coordinate");
    println!("{}", "-".repeat(40));
    let ids: Vec<ExternalId> = (101..=107).map(ExternalId).collect();
    for (id, point) in ids.iter().zip(db.coords(&ids)?) {
        match point {
            Some(p) => println!("{:<8} {:<8} {}", id.0, p.serial, p.coord),
            None => println!("{:<8} {:<8} -", id.0, "-"),
        }
    }

    db.close();
    Ok(())
}
