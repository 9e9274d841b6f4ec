//! Report generation port trait.

use std::path::Path;

use crate::domain::engine::EngineOutput;
use crate::domain::error::SignalboardError;

/// Port for writing the per-date indicator and score table.
pub trait ReportPort {
    fn write(&self, output: &EngineOutput, path: &Path) -> Result<(), SignalboardError>;
}
