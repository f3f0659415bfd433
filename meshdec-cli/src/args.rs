//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use meshdec_core::Float;

use crate::pipeline::{validate_max_error, DecimationParams};

/// meshdec command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "meshdec",
    version,
    about = "Decimate a triangle mesh (OFF or OBJ in, OBJ out)",
    after_help = "Recommended parameters: meshdec input.obj 1000 500 1.0 decimated.obj"
)]
pub struct CliArgs {
    /// Input mesh file (.off or .obj, case-insensitive).
    #[arg(value_name = "INPUT_MESH")]
    pub input: PathBuf,
    /// Target number of triangles in the decimated mesh.
    #[arg(value_name = "TARGET_TRIANGLES")]
    pub target_triangles: usize,
    /// Target number of vertices in the decimated mesh.
    #[arg(value_name = "TARGET_VERTICES")]
    pub target_vertices: usize,
    /// Maximum geometric error a single collapse may introduce.
    #[arg(value_name = "MAX_ERROR", value_parser = parse_max_error)]
    pub max_error: Float,
    /// Output mesh file, always written as OBJ.
    #[arg(value_name = "OUTPUT_MESH")]
    pub output: PathBuf,
    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl CliArgs {
    pub fn params(&self) -> DecimationParams {
        DecimationParams {
            input: self.input.clone(),
            target_triangles: self.target_triangles,
            target_vertices: self.target_vertices,
            max_error: self.max_error,
            output: self.output.clone(),
        }
    }
}

fn parse_max_error(value: &str) -> Result<Float, String> {
    let parsed: Float = value
        .parse()
        .map_err(|_| format!("`{}` is not a number", value))?;
    validate_max_error(parsed).map_err(|err| err.to_string())
}
