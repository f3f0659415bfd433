//! Load, decimate, save

use std::path::PathBuf;

use log::{info, warn};
use meshdec_core::{Drawable, Float, IndexedMesh};
use meshdec_io::{LoadError, MeshFormat, SaveError};
use meshdec_simplification::MeshDecimationEngine;
use thiserror::Error;

/// Validated, immutable parameters of one decimation run
#[derive(Debug, Clone, PartialEq)]
pub struct DecimationParams {
    pub input: PathBuf,
    pub target_triangles: usize,
    pub target_vertices: usize,
    pub max_error: Float,
    pub output: PathBuf,
}

impl DecimationParams {
    pub fn new(
        input: impl Into<PathBuf>,
        target_triangles: usize,
        target_vertices: usize,
        max_error: Float,
        output: impl Into<PathBuf>,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            input: input.into(),
            target_triangles,
            target_vertices,
            max_error: validate_max_error(max_error)?,
            output: output.into(),
        })
    }
}

/// Accept only finite, non-negative error bounds
pub fn validate_max_error(max_error: Float) -> Result<Float, PipelineError> {
    if max_error.is_finite() && max_error >= 0.0 {
        Ok(max_error)
    } else {
        Err(PipelineError::InvalidParameter(format!(
            "maximum decimation error must be a finite non-negative number, got {}",
            max_error
        )))
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Format not supported: {}", path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("Loading error: {0}")]
    Load(#[from] LoadError),
    #[error("Decimation error: {0}")]
    Engine(#[from] meshdec_core::Error),
    #[error("Saving error: {0}")]
    Save(#[from] SaveError),
}

/// Process status for any failed run, the value a C-style `return -1` produces
pub const EXIT_FAILURE: u8 = 255;

/// Mesh sizes before and after decimation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineReport {
    pub input_vertices: usize,
    pub input_triangles: usize,
    pub output_vertices: usize,
    pub output_triangles: usize,
}

/// Run the whole pipeline against `engine`.
///
/// Stages run strictly in order and the first failure aborts the run. An
/// unsupported input extension is rejected before the engine is touched, and
/// nothing is written unless decimation succeeded.
pub fn run<E: MeshDecimationEngine>(
    params: &DecimationParams,
    engine: &mut E,
) -> Result<PipelineReport, PipelineError> {
    info!("+ Parameters");
    info!("\t input                      {}", params.input.display());
    info!("\t target # triangles         {}", params.target_triangles);
    info!("\t target # vertices          {}", params.target_vertices);
    info!("\t max. decimation error      {}", params.max_error);
    info!("\t output                     {}", params.output.display());

    info!("+ Load mesh");
    if MeshFormat::classify(&params.input) == MeshFormat::Unsupported {
        return Err(PipelineError::UnsupportedFormat {
            path: params.input.clone(),
        });
    }
    let mesh = meshdec_io::read_mesh(&params.input)?;
    info!(
        "\t {} vertices, {} triangles, bounding box diagonal {}",
        mesh.vertex_count(),
        mesh.triangle_count(),
        mesh.diagonal()
    );
    let out_of_range = mesh.out_of_range_triangles();
    if !out_of_range.is_empty() {
        warn!(
            "{} triangles reference missing vertices (first at position {})",
            out_of_range.len(),
            out_of_range[0]
        );
    }

    engine.register_callback(Box::new(|message: &str| {
        info!("{}", message.trim_end());
    }));
    engine.initialize(&mesh.points, &mesh.triangles)?;
    engine.decimate(
        params.target_vertices,
        params.target_triangles,
        params.max_error,
    )?;

    let mut decimated = IndexedMesh::with_size(
        engine.result_vertex_count(),
        engine.result_triangle_count(),
    );
    engine.extract_result(&mut decimated.points, &mut decimated.triangles)?;

    meshdec_io::write_mesh(&decimated, &params.output)?;

    Ok(PipelineReport {
        input_vertices: mesh.vertex_count(),
        input_triangles: mesh.triangle_count(),
        output_vertices: decimated.vertex_count(),
        output_triangles: decimated.triangle_count(),
    })
}
