//! File extension dispatch

use std::fmt;
use std::path::Path;

/// Mesh file formats recognized by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Off,
    Obj,
    Unsupported,
}

impl MeshFormat {
    /// Classify a path by the text after its last `.`, compared case-insensitively
    pub fn classify<P: AsRef<Path>>(path: P) -> Self {
        match file_extension(path).as_str() {
            ".OFF" => MeshFormat::Off,
            ".OBJ" => MeshFormat::Obj,
            _ => MeshFormat::Unsupported,
        }
    }
}

impl fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MeshFormat::Off => "OFF",
            MeshFormat::Obj => "OBJ",
            MeshFormat::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// Uppercased suffix starting at the last `.` of the path, dot included.
///
/// Returns an empty string when the path has no `.` at all. The whole path
/// string is searched, so `dir.v2/mesh` yields `".V2/MESH"`.
pub fn file_extension<P: AsRef<Path>>(path: P) -> String {
    let name = path.as_ref().to_string_lossy();
    match name.rfind('.') {
        Some(dot) => name[dot..].to_uppercase(),
        None => String::new(),
    }
}
