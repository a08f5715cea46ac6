use log::{debug, info};
use mobius_format::world::{Chunk, World};

use super::geometry::{extract_submesh, is_chunk_geometry};
use super::policy::ExportPolicy;
use super::portal::{export_portal, PORTAL_TARGET};
use crate::error::ExportResult;
use crate::scene::{ObjectKind, Scene, SceneGraph, SceneObject};

/// Exports every scene of `graph` as one chunk, in scene order
pub(crate) fn build_world<G: SceneGraph>(graph: &G, policy: &ExportPolicy) -> ExportResult<World> {
    let mut world = World::default();
    for scene in graph.scenes() {
        info!("exporting chunk '{}'", scene.name());
        world.chunk.push(export_chunk(scene, graph, policy)?);
    }
    Ok(world)
}

/// Collects the geometry and the outgoing portals of `scene`.
/// A mesh object can end up both in the chunk mesh and as a portal.
pub(crate) fn export_chunk<G: SceneGraph>(
    scene: &G::Scene,
    graph: &G,
    policy: &ExportPolicy,
) -> ExportResult<Chunk> {
    let mut chunk = Chunk {
        name: scene.name().to_owned(),
        ..Chunk::default()
    };

    for object in scene.objects() {
        if object.kind() != ObjectKind::Mesh {
            debug!("Ignoring `{}`: not a mesh", object.name());
            continue;
        }
        if is_chunk_geometry(object, policy)? {
            extract_submesh(&mut chunk.mesh, object, policy)?;
        }
        if object.has_property(PORTAL_TARGET) {
            chunk
                .portal
                .push(export_portal(scene.name(), object, graph, policy)?);
        }
    }

    Ok(chunk)
}
