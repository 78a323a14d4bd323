//! Sequential module runner.

use std::time::{Duration, Instant};

use geodb_core::{ImportParameter, ImportProgress};
use geodb_index::RecordKind;
use tracing::{error, info};

use crate::{AreaIndexModule, CoordDataModule, ImportError, ImportModule, ImportResult};

/// Timing of one finished module.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    pub module:   &'static str,
    pub duration: Duration,
}

/// Returned by a successful [`Importer::run`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportReport {
    pub steps: Vec<StepReport>,
}

impl ImportReport {
    pub fn total(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }
}

/// Runs a fixed list of modules in order.
#[derive(Default)]
pub struct Importer {
    modules: Vec<Box<dyn ImportModule>>,
}

impl Importer {
    /// An importer without modules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Coordinate store followed by the node, way and area indexes.
    pub fn standard() -> Self {
        Self::new()
            .with_module(Box::new(CoordDataModule))
            .with_module(Box::new(AreaIndexModule::new(RecordKind::Node)))
            .with_module(Box::new(AreaIndexModule::new(RecordKind::Way)))
            .with_module(Box::new(AreaIndexModule::new(RecordKind::Area)))
    }

    pub fn with_module(mut self, module: Box<dyn ImportModule>) -> Self {
        self.modules.push(module);
        self
    }

    pub fn modules(&self) -> impl Iterator<Item = &dyn ImportModule> {
        self.modules.iter().map(|m| m.as_ref())
    }

    /// Validate `param` and run every module.  Stops at the first failure.
    pub fn run(&self, param: &ImportParameter, progress: &mut dyn ImportProgress) -> ImportResult<ImportReport> {
        param.validate()?;
        if !param.destination().is_dir() {
            return Err(ImportError::MissingDirectory(param.destination().to_path_buf()));
        }

        let mut report = ImportReport::default();
        for (i, module) in self.modules.iter().enumerate() {
            progress.set_step(&format!("{}/{} {}", i + 1, self.modules.len(), module.name()));
            progress.info(module.description());

            let start = Instant::now();
            if let Err(e) = module.run(param, progress) {
                progress.error(&format!("{} failed: {e}", module.name()));
                error!(module = module.name(), "import aborted");
                return Err(ImportError::ModuleFailed { module: module.name(), source: Box::new(e) });
            }
            let duration = start.elapsed();

            progress.info(&format!("{} done in {:.3}s", module.name(), duration.as_secs_f64()));
            info!(module = module.name(), ms = duration.as_millis() as u64, "module finished");
            report.steps.push(StepReport { module: module.name(), duration });
        }

        info!(modules = report.steps.len(), total_ms = report.total().as_millis() as u64, "import finished");
        Ok(report)
    }
}
