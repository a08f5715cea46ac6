use anyhow::{Context, Result};
use log::debug;
use mobius_format::{
    text::{FloatFormat, TextOptions},
    world::Vector3,
};
use serde::Deserialize;
use std::path::Path;

use crate::utils;

/// Name of the folder scoped policy file, without extension
pub(crate) const POLICY_FILE: &str = "export";

/// How source axes map onto runtime axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum AxisMapping {
    /// (x, y, z) = (s1, s2, s0)
    Rotate,
    /// (x, y, z) = (s0, s2, s1)
    SwapYz,
}

impl AxisMapping {
    pub(crate) fn apply(self, v: [f32; 3]) -> Vector3 {
        match self {
            AxisMapping::Rotate => Vector3::new(v[1], v[2], v[0]),
            AxisMapping::SwapYz => Vector3::new(v[0], v[2], v[1]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Winding {
    Preserve,
    Reverse,
}

impl Winding {
    pub(crate) fn apply(self, indices: &mut [u32]) {
        if self == Winding::Reverse {
            indices.reverse();
        }
    }
}

/// Where submesh flags come from, and which mesh objects count as chunk geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum FlagsMode {
    /// Read the `flags` int property (0 if absent); only objects with non-zero flags are geometry
    Property,
    /// Always `PHYSICAL | VISIBLE`; every mesh object is geometry
    Always,
}

/// What face indices are relative to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum IndexBase {
    /// The mesh's whole vertex pool
    Mesh,
    /// The first vertex of the submesh's own block
    Submesh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExportPolicy {
    pub(crate) axes: AxisMapping,
    pub(crate) winding: Winding,
    pub(crate) flags: FlagsMode,
    pub(crate) indices: IndexBase,
    pub(crate) text: TextOptions,
}

impl Default for ExportPolicy {
    fn default() -> Self {
        Self {
            axes: AxisMapping::Rotate,
            winding: Winding::Preserve,
            flags: FlagsMode::Property,
            indices: IndexBase::Mesh,
            text: TextOptions::default(),
        }
    }
}

impl ExportPolicy {
    /// Settings of the older exporter: Y/Z swapped, reversed winding, every mesh solid and visible
    pub(crate) fn legacy() -> Self {
        Self {
            axes: AxisMapping::SwapYz,
            winding: Winding::Reverse,
            flags: FlagsMode::Always,
            indices: IndexBase::Submesh,
            text: TextOptions {
                float_format: FloatFormat::Full,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Preset {
    #[default]
    Mobius,
    Legacy,
}

/// Policy file contents: a preset plus optional overrides
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PolicyFile {
    preset: Preset,
    axes: Option<AxisMapping>,
    winding: Option<Winding>,
    flags: Option<FlagsMode>,
    indices: Option<IndexBase>,
    text: Option<TextOptions>,
}

impl PolicyFile {
    fn resolve(self) -> ExportPolicy {
        let base = match self.preset {
            Preset::Mobius => ExportPolicy::default(),
            Preset::Legacy => ExportPolicy::legacy(),
        };
        ExportPolicy {
            axes: self.axes.unwrap_or(base.axes),
            winding: self.winding.unwrap_or(base.winding),
            flags: self.flags.unwrap_or(base.flags),
            indices: self.indices.unwrap_or(base.indices),
            text: self.text.unwrap_or(base.text),
        }
    }
}

pub(crate) fn parse(data: &str) -> Result<ExportPolicy> {
    let file: PolicyFile = toml::from_str(data)?;
    Ok(file.resolve())
}

fn parse_file(path: &Path) -> Result<ExportPolicy> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read policy: {}", path.display()))?;
    parse(&data).with_context(|| format!("Could not parse policy: {}", path.display()))
}

/// Load policy from `explicit`, alternatively from the folder scoped `export.toml` or else use the default policy
pub(crate) fn load(explicit: Option<&Path>, input_dir: &Path) -> Result<ExportPolicy> {
    if let Some(path) = explicit {
        return parse_file(path);
    }

    let path = utils::combine_path(input_dir, POLICY_FILE, "toml");
    if path.is_file() {
        debug!("Using folder scoped policy: {}", path.display());
        parse_file(&path)
    } else {
        debug!("No policy file found, using defaults");
        Ok(ExportPolicy::default())
    }
}
