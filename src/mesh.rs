//! Mesh loading from a subset of the OBJ text format
//!
//! `v x y z` lines declare vertex positions, `f a b c` lines declare
//! triangular faces by 1-based vertex index. `vt` lines and anything
//! else are skipped. Malformed tokens fail fast with the offending line
//! number instead of silently defaulting.

use std::fs;
use std::path::Path;

use crate::renderer::{Triangle, Vec4};

/// Error type for mesh loading
#[derive(Debug)]
pub enum MeshError {
    Io(std::io::Error),
    Parse { line: usize, message: String },
}

impl From<std::io::Error> for MeshError {
    fn from(e: std::io::Error) -> Self {
        MeshError::Io(e)
    }
}

impl std::fmt::Display for MeshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshError::Io(e) => write!(f, "IO error: {}", e),
            MeshError::Parse { line, message } => write!(f, "Parse error on line {}: {}", line, message),
        }
    }
}

impl std::error::Error for MeshError {}

/// An ordered triangle list, immutable after load.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Load a mesh from an OBJ file on disk.
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh, MeshError> {
        let contents = fs::read_to_string(path)?;
        Mesh::parse_obj(&contents)
    }

    /// Parse OBJ text into a mesh.
    pub fn parse_obj(src: &str) -> Result<Mesh, MeshError> {
        let mut verts: Vec<Vec4> = Vec::new();
        let mut triangles: Vec<Triangle> = Vec::new();

        for (idx, raw_line) in src.lines().enumerate() {
            let line = idx + 1;
            let mut tokens = raw_line.split_whitespace();

            match tokens.next() {
                Some("v") => {
                    let mut coords = [0.0f32; 3];
                    for c in &mut coords {
                        let token = tokens.next().ok_or_else(|| MeshError::Parse {
                            line,
                            message: "vertex needs three coordinates".to_string(),
                        })?;
                        *c = token.parse().map_err(|_| MeshError::Parse {
                            line,
                            message: format!("bad float '{}'", token),
                        })?;
                    }
                    verts.push(Vec4::point(coords[0], coords[1], coords[2]));
                }
                Some("f") => {
                    let mut points = [Vec4::default(); 3];
                    for p in &mut points {
                        let token = tokens.next().ok_or_else(|| MeshError::Parse {
                            line,
                            message: "face needs three vertex indices".to_string(),
                        })?;
                        let index: usize = token.parse().map_err(|_| MeshError::Parse {
                            line,
                            message: format!("bad index '{}'", token),
                        })?;
                        // indices are 1-based
                        *p = *verts
                            .get(index.wrapping_sub(1))
                            .ok_or_else(|| MeshError::Parse {
                                line,
                                message: format!(
                                    "face index {} out of range (have {} vertices)",
                                    index,
                                    verts.len()
                                ),
                            })?;
                    }
                    triangles.push(Triangle::new(points[0], points[1], points[2]));
                }
                // `vt`, `vn`, comments, object names: not ours
                _ => {}
            }
        }

        Ok(Mesh { triangles })
    }

    /// Built-in unit cube, used when no mesh file is available.
    pub fn unit_cube() -> Mesh {
        let p = |x: f32, y: f32, z: f32| Vec4::point(x, y, z);
        let faces = [
            // south
            [p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(1.0, 1.0, 0.0)],
            [p(0.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(1.0, 0.0, 0.0)],
            // east
            [p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(1.0, 1.0, 1.0)],
            [p(1.0, 0.0, 0.0), p(1.0, 1.0, 1.0), p(1.0, 0.0, 1.0)],
            // north
            [p(1.0, 0.0, 1.0), p(1.0, 1.0, 1.0), p(0.0, 1.0, 1.0)],
            [p(1.0, 0.0, 1.0), p(0.0, 1.0, 1.0), p(0.0, 0.0, 1.0)],
            // west
            [p(0.0, 0.0, 1.0), p(0.0, 1.0, 1.0), p(0.0, 1.0, 0.0)],
            [p(0.0, 0.0, 1.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 0.0)],
            // top
            [p(0.0, 1.0, 0.0), p(0.0, 1.0, 1.0), p(1.0, 1.0, 1.0)],
            [p(0.0, 1.0, 0.0), p(1.0, 1.0, 1.0), p(1.0, 1.0, 0.0)],
            // bottom
            [p(1.0, 0.0, 1.0), p(0.0, 0.0, 1.0), p(0.0, 0.0, 0.0)],
            [p(1.0, 0.0, 1.0), p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)],
        ];

        Mesh {
            triangles: faces
                .iter()
                .map(|f| Triangle::new(f[0], f[1], f[2]))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_load_round_trip() {
        let mesh = Mesh::parse_obj("v 0.0 1.0 2.0\nv 1.0 0.0 0.0\nv 0.0 0.0 0.0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.len(), 1);

        let tri = &mesh.triangles()[0];
        let expect = [(0.0, 1.0, 2.0), (1.0, 0.0, 0.0), (0.0, 0.0, 0.0)];
        for (p, (x, y, z)) in tri.points.iter().zip(expect) {
            assert!((p.x - x).abs() < EPS);
            assert!((p.y - y).abs() < EPS);
            assert!((p.z - z).abs() < EPS);
        }
    }

    #[test]
    fn test_ignores_other_lines() {
        let src = "# comment\no teapot\nv 0 0 0\nvt 0.5 0.5\nvn 0 1 0\nv 1 0 0\nv 0 1 0\ns off\nf 1 2 3\n";
        let mesh = Mesh::parse_obj(src).unwrap();
        assert_eq!(mesh.len(), 1);
    }

    #[test]
    fn test_bad_float_fails_with_line() {
        let err = Mesh::parse_obj("v 0 0 0\nv 1 oops 0\n").unwrap_err();
        match err {
            MeshError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_face_index_fails() {
        assert!(Mesh::parse_obj("v 0 0 0\nf 1 1\n").is_err());
    }

    #[test]
    fn test_out_of_range_index_fails() {
        let err = Mesh::parse_obj("v 0 0 0\nf 1 2 3\n").unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_zero_index_fails() {
        assert!(Mesh::parse_obj("v 0 0 0\nf 0 1 1\n").is_err());
    }

    #[test]
    fn test_load_from_file_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.obj");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "v 0 0 0").unwrap();
        writeln!(f, "v 1 0 0").unwrap();
        writeln!(f, "v 0 1 0").unwrap();
        writeln!(f, "f 1 2 3").unwrap();

        let mesh = Mesh::load_obj(&path).unwrap();
        assert_eq!(mesh.len(), 1);

        let missing = Mesh::load_obj(dir.path().join("nope.obj"));
        assert!(matches!(missing, Err(MeshError::Io(_))));
    }

    #[test]
    fn test_unit_cube_has_twelve_faces() {
        assert_eq!(Mesh::unit_cube().len(), 12);
    }
}
