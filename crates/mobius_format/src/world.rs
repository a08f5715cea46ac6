use crate::error::Result;
use crate::text::TextOptions;
use gfx_maths::Vec3;
use std::path::Path;

/// Submesh takes part in collision.
pub const PHYSICAL: u32 = 1;
/// Submesh takes part in rendering.
pub const VISIBLE: u32 = 2;

/// Positions, scales and directions are stored in runtime axis order.
pub type Vector3 = Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRGB {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Triangle {
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quad {
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub d: u32,
}

/// Faces of a single submesh, indexing into [`Mesh::vertex`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub tri: Vec<Triangle>,
    pub quad: Vec<Quad>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub colour: ColorRGB,
}

impl Material {
    pub fn white() -> Self {
        Self {
            colour: ColorRGB {
                r: 1.0,
                g: 1.0,
                b: 1.0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submesh {
    /// Index into [`Mesh::geometry`]
    pub geometry: u32,
    /// Bitmask of [`PHYSICAL`] and [`VISIBLE`]
    pub flags: u32,
    pub material: Material,
    pub scale: Vector3,
    pub translate: Vector3,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertex: Vec<Vector3>,
    pub geometry: Vec<Geometry>,
    pub submesh: Vec<Submesh>,
}

impl Mesh {
    /// Appends `geometry` and a submesh pointing at it. The `geometry` field of `submesh` is overwritten.
    pub fn push_submesh(&mut self, geometry: Geometry, mut submesh: Submesh) -> &mut Submesh {
        submesh.geometry = self.geometry.len() as u32;
        self.geometry.push(geometry);
        self.submesh.push(submesh);
        let last = self.submesh.len() - 1;
        &mut self.submesh[last]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortalOrientation {
    pub origin: Vector3,
    /// Unit length, pointing away from the portal mesh's centroid
    pub normal: Vector3,
    /// Unit length and axis aligned
    pub up: Vector3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portal {
    /// Name of the chunk this portal leads to
    pub chunk_name: String,
    pub portal_mesh: Mesh,
    pub local_id: Option<i64>,
    pub remote_id: Option<i64>,
    pub local: PortalOrientation,
    /// Only set if the matching portal was found in the target chunk
    pub remote: Option<PortalOrientation>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    pub name: String,
    pub mesh: Mesh,
    pub portal: Vec<Portal>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct World {
    pub chunk: Vec<Chunk>,
}

impl World {
    pub fn to_text(&self, options: &TextOptions) -> String {
        options.write_root(self)
    }

    /// Serializes the whole world before touching `path`, then overwrites it in one go.
    pub fn write_to_file(&self, path: &Path, options: &TextOptions) -> Result<()> {
        let text = self.to_text(options);
        std::fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_push_submesh_links_geometry() {
        let mut mesh = Mesh::default();
        let submesh = Submesh {
            geometry: 42,
            flags: PHYSICAL,
            material: Material::white(),
            scale: Vec3::one(),
            translate: Vec3::zero(),
        };

        mesh.push_submesh(Geometry::default(), submesh.clone());
        let second = mesh.push_submesh(Geometry::default(), submesh);
        second.flags = PHYSICAL | VISIBLE;

        assert_eq!(mesh.geometry.len(), 2);
        assert_eq!(mesh.submesh[0].geometry, 0);
        assert_eq!(mesh.submesh[1].geometry, 1);
        assert_eq!(mesh.submesh[1].flags, 3);
    }

    #[test]
    fn test_write_to_file_overwrites() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("world.txt");
        std::fs::write(&path, "stale contents that are longer than the output")?;

        let world = World {
            chunk: vec![Chunk {
                name: "A".into(),
                ..Chunk::default()
            }],
        };
        world.write_to_file(&path, &TextOptions::default())?;

        assert_eq!(std::fs::read_to_string(&path)?, "chunk: {\n  name: \"A\"\n}\n");
        Ok(())
    }
}
