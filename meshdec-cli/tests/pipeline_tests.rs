//! End-to-end tests for the decimation pipeline with the edge-collapse engine

use meshdec_cli::{run, DecimationParams, PipelineError};
use meshdec_core::{IndexTriple, IndexedMesh, Point3f};
use meshdec_io::{MeshReader, ObjReader, ObjWriter, MeshWriter};
use meshdec_simplification::EdgeCollapseDecimator;
use std::fs;
use std::path::Path;

/// Closed octahedron subdivided `levels` times, projected onto the unit sphere
fn create_sphere_mesh(levels: usize) -> IndexedMesh {
    let mut points = vec![
        Point3f::new(1.0, 0.0, 0.0),
        Point3f::new(-1.0, 0.0, 0.0),
        Point3f::new(0.0, 1.0, 0.0),
        Point3f::new(0.0, -1.0, 0.0),
        Point3f::new(0.0, 0.0, 1.0),
        Point3f::new(0.0, 0.0, -1.0),
    ];
    let mut faces: Vec<[usize; 3]> = vec![
        [0, 2, 4],
        [2, 1, 4],
        [1, 3, 4],
        [3, 0, 4],
        [2, 0, 5],
        [1, 2, 5],
        [3, 1, 5],
        [0, 3, 5],
    ];

    for _ in 0..levels {
        let mut midpoints = std::collections::HashMap::new();
        let mut midpoint = |a: usize, b: usize, points: &mut Vec<Point3f>| -> usize {
            *midpoints.entry((a.min(b), a.max(b))).or_insert_with(|| {
                let m = Point3f::from((points[a].coords + points[b].coords) * 0.5);
                points.push(Point3f::from(m.coords.normalize()));
                points.len() - 1
            })
        };
        let mut next = Vec::with_capacity(faces.len() * 4);
        for &[a, b, c] in &faces {
            let ab = midpoint(a, b, &mut points);
            let bc = midpoint(b, c, &mut points);
            let ca = midpoint(c, a, &mut points);
            next.push([a, ab, ca]);
            next.push([ab, b, bc]);
            next.push([ca, bc, c]);
            next.push([ab, bc, ca]);
        }
        faces = next;
    }

    IndexedMesh::from_parts(
        points,
        faces
            .into_iter()
            .map(|[a, b, c]| IndexTriple::new(a as i32, b as i32, c as i32))
            .collect(),
    )
}

fn run_with_engine(
    input: &Path,
    output: &Path,
    target_triangles: usize,
    target_vertices: usize,
    max_error: f32,
) -> Result<meshdec_cli::PipelineReport, PipelineError> {
    let params = DecimationParams::new(input, target_triangles, target_vertices, max_error, output)?;
    let mut decimator = EdgeCollapseDecimator::new();
    run(&params, &mut decimator)
}

#[test]
fn test_square_passes_through_when_targets_met() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("square.obj");
    let output = dir.path().join("square_out.obj");
    fs::write(&input, "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf 1 2 3\nf 2 4 3\n").unwrap();

    let report = run_with_engine(&input, &output, 100, 100, 1.0).unwrap();
    assert_eq!(report.output_vertices, 4);
    assert_eq!(report.output_triangles, 2);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf 1 2 3\nf 2 4 3\n"
    );
}

#[test]
fn test_sphere_decimation_reaches_a_target() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sphere.obj");
    let output = dir.path().join("sphere_out.obj");
    let sphere = create_sphere_mesh(2);
    assert_eq!(sphere.triangle_count(), 128);
    ObjWriter::write_mesh(&sphere, &input).unwrap();

    let report = run_with_engine(&input, &output, 64, 0, 10.0).unwrap();
    assert_eq!(report.input_triangles, 128);
    assert!(report.output_triangles <= 64);
    assert!(report.output_triangles <= report.input_triangles);

    let decimated = ObjReader::read_mesh(&output).unwrap();
    assert_eq!(decimated.vertex_count(), report.output_vertices);
    assert_eq!(decimated.triangle_count(), report.output_triangles);
    assert!(decimated.out_of_range_triangles().is_empty());
}

#[test]
fn test_off_input_with_quad() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("mixed.OFF");
    let output = dir.path().join("mixed_out.obj");
    fs::write(
        &input,
        "OFF\n5 3 0\n0 0 0\n1 0 0\n1 1 0\n0 1 0\n2 2 0\n3 0 1 2\n4 0 1 2 3\n3 2 1 4\n",
    )
    .unwrap();

    let report = run_with_engine(&input, &output, 100, 100, 1.0).unwrap();
    assert_eq!(report.input_triangles, 3);
    // The quad placeholder is degenerate and does not reach the output
    assert_eq!(report.output_triangles, 2);

    let decimated = ObjReader::read_mesh(&output).unwrap();
    assert_eq!(decimated.triangle_count(), 2);
}

#[test]
fn test_unsupported_input_creates_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.stl");
    let output = dir.path().join("out.obj");
    fs::write(&input, "solid s\nendsolid s\n").unwrap();

    let err = run_with_engine(&input, &output, 10, 10, 1.0).unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedFormat { .. }));
    assert!(!output.exists());
}

#[test]
fn test_out_of_range_indices_rejected_by_engine() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.obj");
    let output = dir.path().join("out.obj");
    fs::write(&input, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n").unwrap();

    let err = run_with_engine(&input, &output, 0, 0, 1.0).unwrap_err();
    assert!(matches!(err, PipelineError::Engine(_)));
    assert!(!output.exists());
}
