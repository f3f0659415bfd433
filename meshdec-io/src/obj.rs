//! OBJ format support
//!
//! Reading keeps only vertex positions (`v`) and triangle position indices
//! (`f`). Normal and texture-coordinate records are counted, not stored: once
//! a `vn` or `vt` line has been seen anywhere earlier in the file, every later
//! face reference is expected to carry the matching extra index. Writing
//! emits `v` and `f` records only.

use crate::{LoadError, MeshReader, MeshWriter, SaveError};
use meshdec_core::{Float, IndexTriple, IndexedMesh, Point3f};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

pub struct ObjReader;
pub struct ObjWriter;

/// Counters that decide how many indices each face reference consumes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ObjParseState {
    pub normals: usize,
    pub texcoords: usize,
}

impl ObjParseState {
    /// Indices making up one face vertex reference
    pub fn indices_per_reference(&self) -> usize {
        1 + usize::from(self.texcoords > 0) + usize::from(self.normals > 0)
    }
}

impl MeshReader for ObjReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<IndexedMesh, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|_| LoadError::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::read_from(BufReader::new(file))
    }
}

impl ObjReader {
    /// Parse OBJ text from any buffered reader
    pub fn read_from<R: BufRead>(reader: R) -> Result<IndexedMesh, LoadError> {
        let mut mesh = IndexedMesh::new();
        let mut state = ObjParseState::default();

        // Lines are raw bytes; only `v` and `f` bodies need to be text
        for (index, line) in reader.split(b'\n').enumerate() {
            let line = line?;
            let line = line.strip_suffix(b"\r").unwrap_or(&line);
            Self::parse_line(line, index + 1, &mut state, &mut mesh)?;
        }

        log::debug!(
            "OBJ: {} vertices, {} triangles ({} normals, {} texture coordinates ignored)",
            mesh.vertex_count(),
            mesh.triangle_count(),
            state.normals,
            state.texcoords
        );
        Ok(mesh)
    }

    /// Apply one physical line to the mesh under construction
    pub fn parse_line(
        line: &[u8],
        line_number: usize,
        state: &mut ObjParseState,
        mesh: &mut IndexedMesh,
    ) -> Result<(), LoadError> {
        if let Some(rest) = record_body(line, b"v") {
            let point = parse_vertex(rest)
                .ok_or(LoadError::MalformedVertex { line: line_number })?;
            mesh.add_point(point);
        } else if line.starts_with(b"vn") {
            state.normals += 1;
        } else if line.starts_with(b"vt") {
            state.texcoords += 1;
        } else if let Some(rest) = record_body(line, b"f") {
            let triangle = parse_face(rest, state, line_number)
                .ok_or(LoadError::MalformedFace { line: line_number })?;
            mesh.add_triangle(triangle);
        }
        Ok(())
    }
}

/// Text after `tag` when the line is a record of that type.
///
/// A body that is not valid UTF-8 comes back empty so the field parser
/// reports the line as malformed.
fn record_body<'a>(line: &'a [u8], tag: &[u8]) -> Option<&'a str> {
    let rest = line.strip_prefix(tag)?;
    match rest.first() {
        Some(c) if c.is_ascii_whitespace() => Some(std::str::from_utf8(rest).unwrap_or("")),
        _ => None,
    }
}

fn parse_vertex(body: &str) -> Option<Point3f> {
    let mut fields = body.split_ascii_whitespace();
    let mut coords = [0.0 as Float; 3];
    for coord in coords.iter_mut() {
        *coord = fields.next()?.parse().ok()?;
    }
    Some(Point3f::new(coords[0], coords[1], coords[2]))
}

fn parse_face(body: &str, state: &ObjParseState, line_number: usize) -> Option<IndexTriple> {
    let mut tokens = body
        .split(|c: char| c == '/' || c.is_ascii_whitespace())
        .filter(|token| !token.is_empty());
    let mut triangle = IndexTriple::default();

    for k in 0..3 {
        let position: i32 = tokens.next()?.parse().ok()?;
        triangle[k] = position.checked_sub(1)?;
        // Texture and normal indices only keep the stream aligned
        for _ in 1..state.indices_per_reference() {
            tokens.next()?.parse::<i32>().ok()?;
        }
    }

    if tokens.next().is_some() {
        log::warn!(
            "OBJ line {}: face has more than three vertex references, extra references ignored",
            line_number
        );
    }
    Some(triangle)
}

impl MeshWriter for ObjWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> Result<(), SaveError> {
        let path = path.as_ref();
        log::info!("Saving {}", path.display());
        let file = File::create(path).map_err(|source| SaveError::CannotOpenOutput {
            path: path.display().to_string(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        Self::write_to(&mut writer, mesh)?;
        writer.flush()?;
        Ok(())
    }
}

impl ObjWriter {
    /// Serialize `v` records in point order, then `f` records with 1-based indices
    pub fn write_to<W: Write>(writer: &mut W, mesh: &IndexedMesh) -> std::io::Result<()> {
        for point in &mesh.points {
            writeln!(writer, "v {} {} {}", point[0], point[1], point[2])?;
        }
        for triangle in &mesh.triangles {
            writeln!(
                writer,
                "f {} {} {}",
                i64::from(triangle[0]) + 1,
                i64::from(triangle[1]) + 1,
                i64::from(triangle[2]) + 1
            )?;
        }
        Ok(())
    }
}
