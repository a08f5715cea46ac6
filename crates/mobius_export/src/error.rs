use crate::scene::PropertyType;

/// Happens while turning scenes into a world; aborts the whole export
#[derive(thiserror::Error, Debug)]
pub(crate) enum ExportError {
    #[error("Property `{property}` of object `{object}` is {found} ({value}), expected {expected}")]
    MetadataType {
        object: String,
        property: &'static str,
        expected: PropertyType,
        found: PropertyType,
        value: String,
    },
    #[error("Object `{object}` is missing the required property `{property}`")]
    MissingProperty {
        object: String,
        property: &'static str,
    },
    #[error("Property `flags` of object `{object}` is not a valid bitmask: {value}")]
    FlagsOutOfRange { object: String, value: i64 },
    #[error("Cannot orient portal `{object}`: {reason}")]
    DegeneratePortal {
        object: String,
        reason: &'static str,
    },
}

pub(crate) type ExportResult<T> = ::std::result::Result<T, ExportError>;
