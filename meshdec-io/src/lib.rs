//! Mesh file I/O for meshdec
//!
//! This crate reads triangle meshes from OFF and OBJ files into an
//! [`IndexedMesh`] and writes meshes back out as OBJ.

pub mod error;
pub mod format;
pub mod obj;
pub mod off;

pub use error::*;
pub use format::{file_extension, MeshFormat};
pub use obj::{ObjParseState, ObjReader, ObjWriter};
pub use off::OffReader;

use meshdec_core::IndexedMesh;
use std::path::Path;

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<IndexedMesh, LoadError>;
}

/// Trait for writing meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> Result<(), SaveError>;
}

/// Pick a reader from the file extension and read the mesh
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<IndexedMesh, LoadError> {
    let path = path.as_ref();
    match MeshFormat::classify(path) {
        MeshFormat::Off => OffReader::read_mesh(path),
        MeshFormat::Obj => ObjReader::read_mesh(path),
        MeshFormat::Unsupported => Err(LoadError::UnrecognizedFormat {
            path: path.display().to_string(),
            reason: format!("unsupported extension {:?}", file_extension(path)),
        }),
    }
}

/// Write a mesh as OBJ, whatever the output extension
pub fn write_mesh<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> Result<(), SaveError> {
    ObjWriter::write_mesh(mesh, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshdec_core::{IndexTriple, Point3f};
    use std::fs;

    fn triangle() -> IndexedMesh {
        IndexedMesh::from_parts(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![IndexTriple::new(0, 1, 2)],
        )
    }

    #[test]
    fn test_read_mesh_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let obj_path = dir.path().join("tri.OBJ");
        fs::write(&obj_path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(read_mesh(&obj_path).unwrap(), triangle());

        let off_path = dir.path().join("tri.Off");
        fs::write(&off_path, "OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n").unwrap();
        assert_eq!(read_mesh(&off_path).unwrap(), triangle());
    }

    #[test]
    fn test_read_mesh_rejects_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let stl_path = dir.path().join("input.stl");
        fs::write(&stl_path, "solid empty\nendsolid empty\n").unwrap();

        let err = read_mesh(&stl_path).unwrap_err();
        assert!(matches!(err, LoadError::UnrecognizedFormat { .. }));
    }

    #[test]
    fn test_off_content_in_obj_file_is_not_sniffed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mislabeled.obj");
        fs::write(&path, "OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n").unwrap();

        // Dispatch is by extension only; OBJ parsing ignores every OFF line
        let mesh = read_mesh(&path).unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_write_mesh_always_obj() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decimated.txt");
        write_mesh(&triangle(), &path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n"
        );
    }
}
