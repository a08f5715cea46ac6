//! Turns a scene graph into a mobius [`World`](mobius_format::world::World).

pub(crate) mod chunk;
pub(crate) mod geometry;
pub(crate) mod policy;
pub(crate) mod portal;

pub(crate) use chunk::build_world;
