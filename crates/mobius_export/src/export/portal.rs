use gfx_maths::Vec3;
use log::{debug, warn};
use mobius_format::world::*;

use super::geometry::extract_submesh;
use super::policy::ExportPolicy;
use crate::error::{ExportError, ExportResult};
use crate::scene::{ObjectKind, Scene, SceneGraph, SceneObject};

pub(crate) const PORTAL_TARGET: &str = "portal_target";
pub(crate) const PORTAL_UP: &str = "portal_up";
pub(crate) const LOCAL_ID: &str = "local_id";
pub(crate) const REMOTE_ID: &str = "remote_id";

/// Exports `object` as a portal of the chunk `current_chunk`.
/// The portal's remote side is looked up in the scene named by its `portal_target` property.
pub(crate) fn export_portal<G, O>(
    current_chunk: &str,
    object: &O,
    graph: &G,
    policy: &ExportPolicy,
) -> ExportResult<Portal>
where
    G: SceneGraph,
    O: SceneObject,
{
    let chunk_name = object
        .string_property(PORTAL_TARGET)?
        .ok_or_else(|| ExportError::MissingProperty {
            object: object.name().to_owned(),
            property: PORTAL_TARGET,
        })?
        .to_owned();

    // portals are always solid and visible
    let mut portal_mesh = Mesh::default();
    extract_submesh(&mut portal_mesh, object, policy)?.flags = PHYSICAL | VISIBLE;

    let local_id = object.int_property(LOCAL_ID)?;
    let remote_id = object.int_property(REMOTE_ID)?;

    let remote_object = match local_id {
        Some(id) => find_remote(graph, &chunk_name, current_chunk, id)?,
        None => None,
    };
    if remote_object.is_none() {
        debug!(
            "Portal `{}` in `{}` has no counterpart in `{}`",
            object.name(),
            current_chunk,
            chunk_name
        );
    }

    let local = portal_orientation(object, policy)?;
    let remote = remote_object
        .map(|remote| portal_orientation(remote, policy))
        .transpose()?;

    Ok(Portal {
        chunk_name,
        portal_mesh,
        local_id,
        remote_id,
        local,
        remote,
    })
}

/// First mesh object in scene `target` that points back to `current_chunk` and whose `remote_id` is `local_id`
fn find_remote<'g, G: SceneGraph>(
    graph: &'g G,
    target: &str,
    current_chunk: &str,
    local_id: i64,
) -> ExportResult<Option<&'g <G::Scene as Scene>::Object>> {
    let scene = match graph.find_scene(target) {
        Some(scene) => scene,
        None => {
            warn!("Portal target `{}` is not a scene", target);
            return Ok(None);
        }
    };

    for candidate in scene.objects() {
        if candidate.kind() != ObjectKind::Mesh
            || candidate.string_property(PORTAL_TARGET)? != Some(current_chunk)
        {
            continue;
        }
        if candidate.int_property(REMOTE_ID)? == Some(local_id) {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

pub(crate) fn portal_orientation<O: SceneObject>(
    object: &O,
    policy: &ExportPolicy,
) -> ExportResult<PortalOrientation> {
    Ok(PortalOrientation {
        origin: policy.axes.apply(object.location()),
        normal: portal_normal(object, policy)?,
        up: portal_up(object, policy)?,
    })
}

/// Unit vector pointing from the mean vertex position back towards the object's origin
fn portal_normal<O: SceneObject>(object: &O, policy: &ExportPolicy) -> ExportResult<Vector3> {
    let degenerate = |reason| ExportError::DegeneratePortal {
        object: object.name().to_owned(),
        reason,
    };

    let vertices = object.vertices();
    if vertices.is_empty() {
        return Err(degenerate("mesh has no vertices"));
    }

    let mut sum = Vec3::zero();
    for &vertex in vertices {
        sum += policy.axes.apply(vertex);
    }
    let count = vertices.len() as f32;
    let away = Vec3::new(-sum.x / count, -sum.y / count, -sum.z / count);

    let length = away.sqr_magnitude().sqrt();
    if length == 0.0 || !length.is_finite() {
        return Err(degenerate("mean vertex position is the object origin"));
    }
    Ok(Vec3::new(away.x / length, away.y / length, away.z / length))
}

/// Axis named by the `portal_up` property, +Z if absent or unknown
fn portal_up<O: SceneObject>(object: &O, policy: &ExportPolicy) -> ExportResult<Vector3> {
    let axis = match object.string_property(PORTAL_UP)? {
        None | Some("+Z") => [0.0, 0.0, 1.0],
        Some("+X") => [1.0, 0.0, 0.0],
        Some("-X") => [-1.0, 0.0, 0.0],
        Some("+Y") => [0.0, 1.0, 0.0],
        Some("-Y") => [0.0, -1.0, 0.0],
        Some("-Z") => [0.0, 0.0, -1.0],
        Some(other) => {
            warn!(
                "Unknown {} `{}` on `{}`, using +Z",
                PORTAL_UP,
                other,
                object.name()
            );
            [0.0, 0.0, 1.0]
        }
    };
    Ok(policy.axes.apply(axis))
}
