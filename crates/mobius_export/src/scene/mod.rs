//! Read-only view of the scene graph that gets exported.

pub(crate) mod dump;

use crate::error::{ExportError, ExportResult};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ObjectKind {
    Mesh,
    Other,
}

/// A typed value from an object's metadata store
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub(crate) enum Property {
    Int(i64),
    Bool(bool),
    Float(f64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PropertyType {
    Int,
    Bool,
    Float,
    String,
}

impl Property {
    pub(crate) fn kind(&self) -> PropertyType {
        match self {
            Property::Int(_) => PropertyType::Int,
            Property::Bool(_) => PropertyType::Bool,
            Property::Float(_) => PropertyType::Float,
            Property::String(_) => PropertyType::String,
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Int(value) => write!(f, "{}", value),
            Property::Bool(value) => write!(f, "{}", value),
            Property::Float(value) => write!(f, "{}", value),
            Property::String(value) => write!(f, "{:?}", value),
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyType::Int => "an int",
            PropertyType::Bool => "a bool",
            PropertyType::Float => "a float",
            PropertyType::String => "a string",
        };
        f.write_str(name)
    }
}

pub(crate) trait SceneGraph {
    type Scene: Scene;

    /// All scenes, in export order
    fn scenes(&self) -> &[Self::Scene];

    fn find_scene(&self, name: &str) -> Option<&Self::Scene> {
        self.scenes().iter().find(|scene| scene.name() == name)
    }
}

pub(crate) trait Scene {
    type Object: SceneObject;

    fn name(&self) -> &str;
    fn objects(&self) -> &[Self::Object];
}

/// Coordinates are in the source's native axis order.
pub(crate) trait SceneObject {
    fn name(&self) -> &str;
    fn kind(&self) -> ObjectKind;
    fn location(&self) -> [f32; 3];
    fn scale(&self) -> [f32; 3];
    fn vertices(&self) -> &[[f32; 3]];
    /// Each face lists indices into [`SceneObject::vertices`]
    fn faces(&self) -> &[Vec<u32>];
    fn property(&self, name: &str) -> Option<&Property>;

    fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    fn int_property(&self, name: &'static str) -> ExportResult<Option<i64>> {
        match self.property(name) {
            None => Ok(None),
            Some(Property::Int(value)) => Ok(Some(*value)),
            Some(other) => Err(self.type_mismatch(name, PropertyType::Int, other)),
        }
    }

    fn string_property(&self, name: &'static str) -> ExportResult<Option<&str>> {
        match self.property(name) {
            None => Ok(None),
            Some(Property::String(value)) => Ok(Some(value.as_str())),
            Some(other) => Err(self.type_mismatch(name, PropertyType::String, other)),
        }
    }

    fn type_mismatch(
        &self,
        property: &'static str,
        expected: PropertyType,
        found: &Property,
    ) -> ExportError {
        ExportError::MetadataType {
            object: self.name().to_owned(),
            property,
            expected,
            found: found.kind(),
            value: found.to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::dump::DumpObject;
    use super::*;

    #[test]
    fn test_typed_lookup() -> ExportResult<()> {
        let object = DumpObject::mesh("door", vec![], vec![])
            .with_property("flags", Property::Int(3))
            .with_property("portal_target", Property::String("garden".into()));

        assert!(object.has_property("flags"));
        assert!(!object.has_property("local_id"));
        assert_eq!(object.int_property("flags")?, Some(3));
        assert_eq!(object.int_property("local_id")?, None);
        assert_eq!(object.string_property("portal_target")?, Some("garden"));
        Ok(())
    }

    #[test]
    fn test_type_mismatch_names_object_and_property() {
        let object =
            DumpObject::mesh("door", vec![], vec![]).with_property("flags", Property::Float(1.5));

        let err = object.int_property("flags").unwrap_err();
        assert!(matches!(
            err,
            ExportError::MetadataType {
                property: "flags",
                expected: PropertyType::Int,
                found: PropertyType::Float,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "Property `flags` of object `door` is a float (1.5), expected an int"
        );
    }
}
