use log::debug;
use mobius_format::world::*;

use super::policy::{ExportPolicy, FlagsMode, IndexBase};
use crate::error::{ExportError, ExportResult};
use crate::scene::SceneObject;

pub(crate) const FLAGS: &str = "flags";

/// The `flags` property of `object`, 0 if absent
pub(crate) fn object_flags<O: SceneObject>(object: &O) -> ExportResult<u32> {
    match object.int_property(FLAGS)? {
        None => Ok(0),
        Some(value) => u32::try_from(value).map_err(|_| ExportError::FlagsOutOfRange {
            object: object.name().to_owned(),
            value,
        }),
    }
}

/// Whether `object` contributes a submesh to its chunk's mesh
pub(crate) fn is_chunk_geometry<O: SceneObject>(
    object: &O,
    policy: &ExportPolicy,
) -> ExportResult<bool> {
    match policy.flags {
        FlagsMode::Property => Ok(object_flags(object)? != 0),
        FlagsMode::Always => Ok(true),
    }
}

/// Appends the vertices of `object` to the vertex pool of `mesh`, together with one geometry and one submesh.
/// Faces with other than 3 or 4 vertices are skipped.
pub(crate) fn extract_submesh<'m, O: SceneObject>(
    mesh: &'m mut Mesh,
    object: &O,
    policy: &ExportPolicy,
) -> ExportResult<&'m mut Submesh> {
    let flags = match policy.flags {
        FlagsMode::Property => object_flags(object)?,
        FlagsMode::Always => PHYSICAL | VISIBLE,
    };

    let start_index = mesh.vertex.len() as u32;
    mesh.vertex.extend(
        object
            .vertices()
            .iter()
            .map(|&vertex| policy.axes.apply(vertex)),
    );
    let offset = match policy.indices {
        IndexBase::Mesh => start_index,
        IndexBase::Submesh => 0,
    };

    let mut geometry = Geometry::default();
    for face in object.faces() {
        let mut indices: Vec<u32> = face.iter().map(|i| i + offset).collect();
        policy.winding.apply(&mut indices);

        match indices[..] {
            [a, b, c] => geometry.tri.push(Triangle { a, b, c }),
            [a, b, c, d] => geometry.quad.push(Quad { a, b, c, d }),
            _ => debug!(
                "Skipping face with {} vertices on `{}`",
                indices.len(),
                object.name()
            ),
        }
    }

    debug!(
        "Extracted `{}`: {} vertices, {} triangles, {} quads",
        object.name(),
        object.vertices().len(),
        geometry.tri.len(),
        geometry.quad.len()
    );

    let submesh = Submesh {
        geometry: 0,
        flags,
        material: Material::white(),
        scale: policy.axes.apply(object.scale()),
        translate: policy.axes.apply(object.location()),
    };
    Ok(mesh.push_submesh(geometry, submesh))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::export::fixture;
    use crate::export::policy::Winding;
    use crate::scene::{dump::DumpObject, Property};

    #[test]
    fn test_extract_cube() -> ExportResult<()> {
        let cube = fixture::cube("crate")
            .with_location([1.0, 2.0, 3.0])
            .with_scale([4.0, 5.0, 6.0])
            .with_property("flags", Property::Int(1));
        let mut mesh = Mesh::default();

        let submesh = extract_submesh(&mut mesh, &cube, &ExportPolicy::default())?.clone();

        assert_eq!(mesh.vertex.len(), 8);
        assert_eq!(mesh.vertex[1], Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(mesh.geometry.len(), 1);
        assert_eq!(mesh.geometry[0].quad.len(), 6);
        assert!(mesh.geometry[0].tri.is_empty());
        assert_eq!(submesh.geometry, 0);
        assert_eq!(submesh.flags, PHYSICAL);
        assert_eq!(submesh.material, Material::white());
        assert_eq!(submesh.translate, Vector3::new(2.0, 3.0, 1.0));
        assert_eq!(submesh.scale, Vector3::new(5.0, 6.0, 4.0));
        Ok(())
    }

    #[test]
    fn test_faces_of_other_sizes_are_skipped() -> ExportResult<()> {
        let vertices = vec![[0.0; 3]; 5];
        let object = DumpObject::mesh(
            "odd",
            vertices,
            vec![vec![0, 1], vec![0, 1, 2], vec![0, 1, 2, 3, 4], vec![1, 2, 3, 4]],
        );
        let mut mesh = Mesh::default();

        extract_submesh(&mut mesh, &object, &ExportPolicy::default())?;

        assert_eq!(mesh.geometry[0].tri, vec![Triangle { a: 0, b: 1, c: 2 }]);
        assert_eq!(
            mesh.geometry[0].quad,
            vec![Quad {
                a: 1,
                b: 2,
                c: 3,
                d: 4
            }]
        );
        Ok(())
    }

    #[test]
    fn test_winding_applies_to_every_face() -> ExportResult<()> {
        let cube = fixture::cube("crate");
        let policy = ExportPolicy {
            winding: Winding::Reverse,
            ..ExportPolicy::default()
        };
        let mut mesh = Mesh::default();

        extract_submesh(&mut mesh, &cube, &policy)?;

        let source = cube.faces();
        let quads = &mesh.geometry[0].quad;
        assert_eq!(quads.len(), source.len());
        for (quad, face) in quads.iter().zip(source) {
            assert_eq!(
                [quad.a, quad.b, quad.c, quad.d],
                [face[3], face[2], face[1], face[0]]
            );
        }
        Ok(())
    }

    #[test]
    fn test_second_submesh_indexes_its_own_vertices() -> ExportResult<()> {
        let first = fixture::cube("first");
        let second = fixture::cube("second");
        let mut mesh = Mesh::default();

        extract_submesh(&mut mesh, &first, &ExportPolicy::default())?;
        extract_submesh(&mut mesh, &second, &ExportPolicy::default())?;

        assert_eq!(mesh.vertex.len(), 16);
        assert_eq!(mesh.submesh[1].geometry, 1);
        for quad in &mesh.geometry[1].quad {
            for index in [quad.a, quad.b, quad.c, quad.d] {
                assert!((8..16).contains(&index));
            }
        }
        Ok(())
    }

    #[test]
    fn test_submesh_local_indices() -> ExportResult<()> {
        let policy = ExportPolicy {
            indices: IndexBase::Submesh,
            ..ExportPolicy::default()
        };
        let mut mesh = Mesh::default();

        extract_submesh(&mut mesh, &fixture::cube("first"), &policy)?;
        extract_submesh(&mut mesh, &fixture::cube("second"), &policy)?;

        assert_eq!(mesh.geometry[0].quad, mesh.geometry[1].quad);
        Ok(())
    }

    #[test]
    fn test_flags_policy() -> ExportResult<()> {
        let plain = fixture::cube("plain");
        assert_eq!(object_flags(&plain)?, 0);
        assert!(!is_chunk_geometry(&plain, &ExportPolicy::default())?);
        assert!(is_chunk_geometry(&plain, &ExportPolicy::legacy())?);

        let mut mesh = Mesh::default();
        let submesh = extract_submesh(&mut mesh, &plain, &ExportPolicy::legacy())?;
        assert_eq!(submesh.flags, PHYSICAL | VISIBLE);
        Ok(())
    }

    #[test]
    fn test_negative_flags() {
        let object = fixture::cube("bad").with_property("flags", Property::Int(-1));
        assert!(matches!(
            object_flags(&object),
            Err(ExportError::FlagsOutOfRange { value: -1, .. })
        ));
    }
}
