//! Wavefront OBJ export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::KernelError;
use crate::types::Mesh;

/// Write `mesh` as an OBJ object named `name`
pub fn write_obj<W: Write>(mesh: &Mesh, name: &str, out: &mut W) -> Result<(), KernelError> {
    writeln!(out, "o {name}")?;
    for p in &mesh.positions {
        writeln!(out, "v {:.6} {:.6} {:.6}", p[0], p[1], p[2])?;
    }
    for n in &mesh.normals {
        writeln!(out, "vn {:.6} {:.6} {:.6}", n[0], n[1], n[2])?;
    }
    for tri in mesh.indices.chunks_exact(3) {
        // OBJ indices are 1-based
        let (a, b, c) = (tri[0] + 1, tri[1] + 1, tri[2] + 1);
        writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?;
    }
    Ok(())
}

/// Write `mesh` to an OBJ file at `path`
pub fn save_obj(mesh: &Mesh, name: &str, path: &Path) -> Result<(), KernelError> {
    let mut out = BufWriter::new(File::create(path)?);
    write_obj(mesh, name, &mut out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::generate_cuboid;

    #[test]
    fn test_obj_counts() {
        let cube = generate_cuboid(1.0, 1.0, 1.0).unwrap();
        let mut buf = Vec::new();
        write_obj(&cube, "cube", &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("o cube\n"));
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 8);
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 8);
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 12);
    }

    #[test]
    fn test_save_obj_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.obj");
        save_obj(&generate_cuboid(1.0, 1.0, 1.0).unwrap(), "cube", &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("f 1//1"));
    }
}
