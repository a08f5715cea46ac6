//! Scene graph loaded from a dump folder.
//!
//! Every `<scene name>.scene` file in the folder is one scene, written as TOML:
//!
//! ```toml
//! [[object]]
//! name = "floor"
//! type = "mesh"
//! location = [0.0, 0.0, 0.0]
//! scale = [1.0, 1.0, 1.0]
//! vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]
//! faces = [[0, 1, 2]]
//!
//! [object.properties]
//! flags = { type = "int", value = 3 }
//! ```

use super::{ObjectKind, Property, Scene, SceneGraph, SceneObject};
use crate::utils;
use anyhow::{bail, Context, Result};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

pub(crate) const SCENE_EXTENSION: &str = "scene";

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DumpObject {
    name: String,
    #[serde(rename = "type", default = "default_kind")]
    kind: String,
    #[serde(default)]
    location: [f32; 3],
    #[serde(default = "unit_scale")]
    scale: [f32; 3],
    #[serde(default)]
    vertices: Vec<[f32; 3]>,
    #[serde(default)]
    faces: Vec<Vec<u32>>,
    #[serde(default)]
    properties: BTreeMap<String, Property>,
}

fn default_kind() -> String {
    "mesh".into()
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl DumpObject {
    fn validate(&self) -> Result<()> {
        for face in &self.faces {
            if let Some(index) = face.iter().find(|&&i| i as usize >= self.vertices.len()) {
                bail!(
                    "Face of object `{}` references vertex {}, but it only has {} vertices",
                    self.name,
                    index,
                    self.vertices.len()
                );
            }
        }
        Ok(())
    }
}

impl SceneObject for DumpObject {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ObjectKind {
        if self.kind.eq_ignore_ascii_case("mesh") {
            ObjectKind::Mesh
        } else {
            ObjectKind::Other
        }
    }

    fn location(&self) -> [f32; 3] {
        self.location
    }

    fn scale(&self) -> [f32; 3] {
        self.scale
    }

    fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    fn faces(&self) -> &[Vec<u32>] {
        &self.faces
    }

    fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }
}

#[derive(Debug, Default, Deserialize)]
struct SceneFile {
    #[serde(default, rename = "object")]
    objects: Vec<DumpObject>,
}

#[derive(Debug, Clone)]
pub(crate) struct DumpScene {
    name: String,
    objects: Vec<DumpObject>,
}

impl DumpScene {
    pub(crate) fn new(name: impl Into<String>, objects: Vec<DumpObject>) -> Self {
        Self {
            name: name.into(),
            objects,
        }
    }

    pub(crate) fn parse(name: &str, data: &str) -> Result<Self> {
        let file: SceneFile = toml::from_str(data)?;
        for object in &file.objects {
            object.validate()?;
        }
        Ok(Self::new(name, file.objects))
    }
}

impl Scene for DumpScene {
    type Object = DumpObject;

    fn name(&self) -> &str {
        &self.name
    }

    fn objects(&self) -> &[DumpObject] {
        &self.objects
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SceneDump {
    scenes: Vec<DumpScene>,
}

impl SceneDump {
    pub(crate) fn new(scenes: Vec<DumpScene>) -> Self {
        Self { scenes }
    }

    /// Loads every `.scene` file directly inside `dir`, ordered by file name
    pub(crate) fn load(dir: &Path) -> Result<Self> {
        let mut scenes = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry =
                entry.with_context(|| format!("Could not read dump folder: {}", dir.display()))?;
            let path = entry.path();

            if path.is_dir() {
                continue;
            }

            let extension = path
                .extension()
                .and_then(|x| x.to_str())
                .map(|x| x.to_ascii_lowercase());
            match extension.as_deref() {
                Some(SCENE_EXTENSION) => {
                    let name = utils::file_name(path)?;
                    let data = std::fs::read_to_string(path)
                        .with_context(|| format!("Could not read scene: {}", path.display()))?;
                    let scene = DumpScene::parse(name, &data)
                        .with_context(|| format!("Could not parse scene: {}", path.display()))?;
                    debug!("Loaded scene `{}` with {} objects", name, scene.objects.len());
                    scenes.push(scene);
                }
                Some("toml") => debug!("Ignored toml file: {}", path.display()),
                _ => warn!("Could not handle path: {}", path.display()),
            }
        }

        Ok(Self::new(scenes))
    }
}

impl SceneGraph for SceneDump {
    type Scene = DumpScene;

    fn scenes(&self) -> &[DumpScene] {
        &self.scenes
    }
}

#[cfg(test)]
impl DumpObject {
    pub(crate) fn mesh(name: &str, vertices: Vec<[f32; 3]>, faces: Vec<Vec<u32>>) -> Self {
        Self {
            name: name.into(),
            kind: default_kind(),
            location: [0.0; 3],
            scale: unit_scale(),
            vertices,
            faces,
            properties: BTreeMap::new(),
        }
    }

    pub(crate) fn with_kind(mut self, kind: &str) -> Self {
        self.kind = kind.into();
        self
    }

    pub(crate) fn with_location(mut self, location: [f32; 3]) -> Self {
        self.location = location;
        self
    }

    pub(crate) fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale;
        self
    }

    pub(crate) fn with_property(mut self, name: &str, value: Property) -> Self {
        self.properties.insert(name.into(), value);
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const HALL: &str = r#"
[[object]]
name = "floor"
location = [1.0, 2.0, 3.0]
vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]
faces = [[0, 1, 2]]

[object.properties]
flags = { type = "int", value = 3 }
portal_up = { type = "string", value = "+Y" }

[[object]]
name = "lamp"
type = "LIGHT"
"#;

    #[test]
    fn test_parse_scene() -> Result<()> {
        let scene = DumpScene::parse("hall", HALL)?;

        assert_eq!(scene.name(), "hall");
        assert_eq!(scene.objects().len(), 2);

        let floor = &scene.objects()[0];
        assert_eq!(floor.kind(), ObjectKind::Mesh);
        assert_eq!(floor.location(), [1.0, 2.0, 3.0]);
        assert_eq!(floor.scale(), [1.0, 1.0, 1.0]);
        assert_eq!(floor.faces().to_vec(), vec![vec![0u32, 1, 2]]);
        assert_eq!(floor.property("flags"), Some(&Property::Int(3)));
        assert_eq!(
            floor.property("portal_up"),
            Some(&Property::String("+Y".into()))
        );

        let lamp = &scene.objects()[1];
        assert_eq!(lamp.kind(), ObjectKind::Other);
        assert!(lamp.vertices().is_empty());
        Ok(())
    }

    #[test]
    fn test_face_out_of_range() {
        let data = r#"
[[object]]
name = "broken"
vertices = [[0.0, 0.0, 0.0]]
faces = [[0, 1, 2]]
"#;
        assert!(DumpScene::parse("hall", data).is_err());
    }

    #[test]
    fn test_load_folder() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("hall.scene"), HALL)?;
        std::fs::write(dir.path().join("garden.scene"), "")?;
        std::fs::write(dir.path().join("cellar.SCENE"), "")?;
        std::fs::write(dir.path().join("export.toml"), "preset = \"legacy\"")?;
        std::fs::write(dir.path().join("BACKUP.TOML"), "not a scene")?;
        std::fs::write(dir.path().join("notes.txt"), "ignored")?;

        let dump = SceneDump::load(dir.path())?;
        let names: Vec<&str> = dump.scenes().iter().map(|s| s.name()).collect();

        assert_eq!(names, vec!["cellar", "garden", "hall"]);
        assert!(dump.find_scene("hall").is_some());
        assert!(dump.find_scene("attic").is_none());
        Ok(())
    }
    #[test]
    fn test_unreadable_folder_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let missing = dir.path().join("gone");

        let err = SceneDump::load(&missing).unwrap_err();
        assert!(err.to_string().starts_with("Could not read dump folder"));
        Ok(())
    }
}
