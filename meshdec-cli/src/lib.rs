//! Mesh decimation pipeline
//!
//! Loads an OFF or OBJ mesh, reduces it with a [`MeshDecimationEngine`] and
//! writes the result as OBJ. The `meshdec` binary wires the pipeline to
//! command-line arguments and the [`EdgeCollapseDecimator`].
//!
//! [`MeshDecimationEngine`]: meshdec_simplification::MeshDecimationEngine
//! [`EdgeCollapseDecimator`]: meshdec_simplification::EdgeCollapseDecimator

pub mod args;
pub mod logging;
pub mod pipeline;

pub use args::{CliArgs, LogLevel};
pub use pipeline::{run, DecimationParams, PipelineError, PipelineReport, EXIT_FAILURE};
