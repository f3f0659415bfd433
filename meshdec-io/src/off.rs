//! OFF format support
//!
//! Grammar: the token `OFF`, the counts `nv nf ne`, `nv` coordinate triples,
//! then `nf` face records `s i0 .. i(s-1)`. Tokens may be separated by any
//! whitespace, including line breaks. Only `s == 3` records become triangles;
//! other arities are skipped and leave a zeroed placeholder in their slot so
//! that `triangles.len() == nf`.

use crate::{LoadError, MeshReader};
use meshdec_core::{Float, IndexTriple, IndexedMesh, Point3f};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const OFF_MAGIC: &str = "OFF";

/// Upper bound on capacity reserved from header counts before any record is read
const MAX_PREALLOCATION: usize = 1 << 20;

pub struct OffReader;

impl MeshReader for OffReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<IndexedMesh, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|_| LoadError::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::read_from(BufReader::new(file)).map_err(|err| match err {
            LoadError::UnrecognizedFormat { reason, .. } => LoadError::UnrecognizedFormat {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }
}

impl OffReader {
    /// Parse OFF text from any buffered reader
    pub fn read_from<R: BufRead>(mut reader: R) -> Result<IndexedMesh, LoadError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        let mut tokens = Tokens::new(&text);

        match tokens.next_token() {
            Some(OFF_MAGIC) => {}
            _ => return Err(unrecognized("missing OFF magic token")),
        }

        let vertex_count = tokens.next_count()?;
        let face_count = tokens.next_count()?;
        // Edge count is part of the header but carries no data we use
        let _edge_count = tokens.next_count()?;
        log::debug!(
            "OFF header: {} vertices, {} faces",
            vertex_count,
            face_count
        );

        let mut points = Vec::with_capacity(vertex_count.min(MAX_PREALLOCATION));
        for _ in 0..vertex_count {
            let x = tokens.next_coordinate()?;
            let y = tokens.next_coordinate()?;
            let z = tokens.next_coordinate()?;
            points.push(Point3f::new(x, y, z));
        }

        let mut triangles = Vec::with_capacity(face_count.min(MAX_PREALLOCATION));
        let mut skipped = 0usize;
        for _ in 0..face_count {
            let arity = tokens.next_face_index()?;
            if arity == 3 {
                let i = tokens.next_face_index()?;
                let j = tokens.next_face_index()?;
                let k = tokens.next_face_index()?;
                triangles.push(IndexTriple::new(i, j, k));
            } else {
                for _ in 0..arity.max(0) {
                    tokens.next_face_index()?;
                }
                triangles.push(IndexTriple::default());
                skipped += 1;
            }
        }

        if skipped > 0 {
            log::warn!(
                "OFF: {} non-triangular faces skipped, zeroed placeholders kept",
                skipped
            );
        }

        Ok(IndexedMesh::from_parts(points, triangles))
    }
}

fn unrecognized(reason: &str) -> LoadError {
    LoadError::UnrecognizedFormat {
        path: String::new(),
        reason: reason.to_string(),
    }
}

/// Whitespace token stream that remembers which line it is on
struct Tokens<'a> {
    lines: std::str::Lines<'a>,
    words: std::str::SplitWhitespace<'a>,
    line: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            words: "".split_whitespace(),
            line: 0,
        }
    }

    fn next_token(&mut self) -> Option<&'a str> {
        loop {
            if let Some(word) = self.words.next() {
                return Some(word);
            }
            self.words = self.lines.next()?.split_whitespace();
            self.line += 1;
        }
    }

    fn next_count(&mut self) -> Result<usize, LoadError> {
        self.next_token()
            .and_then(|token| token.parse().ok())
            .ok_or_else(|| unrecognized("invalid element counts"))
    }

    fn next_coordinate(&mut self) -> Result<Float, LoadError> {
        self.next_token()
            .and_then(|token| token.parse().ok())
            .ok_or(LoadError::MalformedVertex { line: self.line })
    }

    fn next_face_index(&mut self) -> Result<i32, LoadError> {
        self.next_token()
            .and_then(|token| token.parse().ok())
            .ok_or(LoadError::MalformedFace { line: self.line })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn parse(text: &str) -> Result<IndexedMesh, LoadError> {
        OffReader::read_from(Cursor::new(text))
    }

    #[test]
    fn test_read_tetrahedron() {
        let mesh = parse(
            "OFF\n4 4 6\n0 0 0\n1 0 0\n0 1 0\n0 0 1\n3 0 2 1\n3 0 1 3\n3 0 3 2\n3 1 2 3\n",
        )
        .unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(mesh.points[3], Point3f::new(0.0, 0.0, 1.0));
        // OFF indices are already 0-based
        assert_eq!(mesh.triangles[0], IndexTriple::new(0, 2, 1));
        assert_eq!(mesh.triangles[3], IndexTriple::new(1, 2, 3));
    }

    #[test]
    fn test_quads_become_placeholders_without_shifting() {
        let mesh = parse(
            "OFF\n5 3 0\n\
             0 0 0\n1 0 0\n1 1 0\n0 1 0\n0.5 0.5 1\n\
             3 0 1 4\n\
             4 0 1 2 3\n\
             3 2 3 4\n",
        )
        .unwrap();
        assert_eq!(mesh.triangle_count(), 3);
        assert_eq!(mesh.triangles[0], IndexTriple::new(0, 1, 4));
        assert_eq!(mesh.triangles[1], IndexTriple::default());
        assert_eq!(mesh.triangles[2], IndexTriple::new(2, 3, 4));
    }

    #[test]
    fn test_tokens_span_lines() {
        let mesh = parse("OFF 3 1 0 0 0 0 1 0 0\n0 1\n0 3 0\n1\n2").unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.points[2], Point3f::new(0.0, 1.0, 0.0));
        assert_eq!(mesh.triangles, vec![IndexTriple::new(0, 1, 2)]);
    }

    #[test]
    fn test_bad_magic() {
        let err = parse("COFF\n0 0 0\n").unwrap_err();
        assert!(matches!(err, LoadError::UnrecognizedFormat { .. }));

        // Magic token is case-sensitive
        let err = parse("off\n0 0 0\n").unwrap_err();
        assert!(matches!(err, LoadError::UnrecognizedFormat { .. }));

        let err = parse("").unwrap_err();
        assert!(matches!(err, LoadError::UnrecognizedFormat { .. }));
    }

    #[test]
    fn test_bad_counts() {
        let err = parse("OFF\n3 x 0\n").unwrap_err();
        assert!(matches!(err, LoadError::UnrecognizedFormat { .. }));
    }

    #[test]
    fn test_truncated_records() {
        let err = parse("OFF\n2 0 0\n0 0 0\n1 0\n").unwrap_err();
        assert!(matches!(err, LoadError::MalformedVertex { line: 4 }));

        let err = parse("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1\n").unwrap_err();
        assert!(matches!(err, LoadError::MalformedFace { .. }));
    }

    #[test]
    fn test_indices_not_bounds_checked() {
        let mesh = parse("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 7\n").unwrap();
        assert_eq!(mesh.triangles[0], IndexTriple::new(0, 1, 7));
        assert_eq!(mesh.out_of_range_triangles(), vec![0]);
    }

    #[test]
    fn test_read_mesh_from_file() {
        let mut file = tempfile::Builder::new().suffix(".off").tempfile().unwrap();
        write!(file, "OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n").unwrap();
        file.flush().unwrap();

        let mesh = OffReader::read_mesh(file.path()).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = OffReader::read_mesh(dir.path().join("missing.off")).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
    }
}
