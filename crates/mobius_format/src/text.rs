//! Nested `key: value` text format read by the mobius runtime.
//!
//! Records are written as brace blocks, repeated fields as one line per element:
//!
//! ```text
//! chunk: {
//!   name: "hall"
//!   portal: {
//!     chunk_name: "garden"
//!   }
//! }
//! ```

use crate::world::*;
use serde::Deserialize;

const INDENT: &str = "  ";

/// A value in the serialized tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node<'a> {
    Str(&'a str),
    Int(i64),
    Float(f32),
    Record(Vec<Field<'a>>),
}

/// A named field of a record, holding zero or more values
#[derive(Debug, Clone, PartialEq)]
pub struct Field<'a> {
    pub key: &'static str,
    pub values: Vec<Node<'a>>,
    /// Repeated fields always emit their elements, even empty records
    pub repeated: bool,
}

impl<'a> Field<'a> {
    pub fn one(key: &'static str, value: Node<'a>) -> Self {
        Self {
            key,
            values: vec![value],
            repeated: false,
        }
    }

    pub fn optional(key: &'static str, value: Option<Node<'a>>) -> Self {
        Self {
            key,
            values: value.into_iter().collect(),
            repeated: false,
        }
    }

    pub fn many<I>(key: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = Node<'a>>,
    {
        Self {
            key,
            values: values.into_iter().collect(),
            repeated: true,
        }
    }
}

/// Anything that can be written as a brace block.
/// Fields are returned in the order they should appear in the output.
pub trait TextRecord {
    fn fields(&self) -> Vec<Field<'_>>;
}

fn record<R: TextRecord>(value: &R) -> Node<'_> {
    Node::Record(value.fields())
}

fn records<R: TextRecord>(values: &[R]) -> impl Iterator<Item = Node<'_>> {
    values.iter().map(record)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatFormat {
    /// Two decimal places, e.g. `0.33` or `1.0`
    #[default]
    Rounded,
    /// Shortest representation that reads back to the same `f32`
    Full,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    pub float_format: FloatFormat,
}

impl TextOptions {
    /// Writes the fields of `root` without an enclosing brace block
    pub fn write_root<R: TextRecord>(&self, root: &R) -> String {
        let mut out = String::new();
        self.write_fields(&root.fields(), 0, &mut out);
        out
    }

    fn write_fields(&self, fields: &[Field], depth: usize, out: &mut String) {
        for field in fields {
            for value in &field.values {
                if !field.repeated && is_blank(value) {
                    continue;
                }
                out.push_str(&INDENT.repeat(depth));
                out.push_str(field.key);
                out.push_str(": ");
                self.write_node(value, depth + 1, out);
                out.push('\n');
            }
        }
    }

    fn write_node(&self, node: &Node, depth: usize, out: &mut String) {
        match node {
            Node::Str(s) => out.push_str(&quote(s)),
            Node::Int(i) => out.push_str(&i.to_string()),
            Node::Float(f) => out.push_str(&self.format_float(*f)),
            Node::Record(fields) => {
                out.push_str("{\n");
                self.write_fields(fields, depth, out);
                out.push_str(&INDENT.repeat(depth - 1));
                out.push('}');
            }
        }
    }

    pub fn format_float(&self, value: f32) -> String {
        match self.float_format {
            FloatFormat::Rounded => {
                format!("{:?}", ((f64::from(value) * 100.0).round() / 100.0) as f32)
            }
            FloatFormat::Full => format!("{:?}", value),
        }
    }
}

/// A record that would not emit a single line
fn is_blank(node: &Node) -> bool {
    match node {
        Node::Record(fields) => fields
            .iter()
            .all(|f| f.values.iter().all(|v| !f.repeated && is_blank(v))),
        _ => false,
    }
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

impl TextRecord for Vector3 {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::one("x", Node::Float(self.x)),
            Field::one("y", Node::Float(self.y)),
            Field::one("z", Node::Float(self.z)),
        ]
    }
}

impl TextRecord for ColorRGB {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::one("r", Node::Float(self.r)),
            Field::one("g", Node::Float(self.g)),
            Field::one("b", Node::Float(self.b)),
        ]
    }
}

impl TextRecord for Triangle {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::one("a", Node::Int(self.a.into())),
            Field::one("b", Node::Int(self.b.into())),
            Field::one("c", Node::Int(self.c.into())),
        ]
    }
}

impl TextRecord for Quad {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::one("a", Node::Int(self.a.into())),
            Field::one("b", Node::Int(self.b.into())),
            Field::one("c", Node::Int(self.c.into())),
            Field::one("d", Node::Int(self.d.into())),
        ]
    }
}

impl TextRecord for Geometry {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::many("tri", records(&self.tri)),
            Field::many("quad", records(&self.quad)),
        ]
    }
}

impl TextRecord for Material {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field::one("colour", record(&self.colour))]
    }
}

impl TextRecord for Submesh {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::one("geometry", Node::Int(self.geometry.into())),
            Field::one("flags", Node::Int(self.flags.into())),
            Field::one("material", record(&self.material)),
            Field::one("scale", record(&self.scale)),
            Field::one("translate", record(&self.translate)),
        ]
    }
}

impl TextRecord for Mesh {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::many("vertex", records(&self.vertex)),
            Field::many("geometry", records(&self.geometry)),
            Field::many("submesh", records(&self.submesh)),
        ]
    }
}

impl TextRecord for PortalOrientation {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::one("origin", record(&self.origin)),
            Field::one("normal", record(&self.normal)),
            Field::one("up", record(&self.up)),
        ]
    }
}

impl TextRecord for Portal {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::one("chunk_name", Node::Str(&self.chunk_name)),
            Field::one("portal_mesh", record(&self.portal_mesh)),
            Field::optional("local_id", self.local_id.map(Node::Int)),
            Field::optional("remote_id", self.remote_id.map(Node::Int)),
            Field::one("local", record(&self.local)),
            Field::optional("remote", self.remote.as_ref().map(record)),
        ]
    }
}

impl TextRecord for Chunk {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::one("name", Node::Str(&self.name)),
            Field::one("mesh", record(&self.mesh)),
            Field::many("portal", records(&self.portal)),
        ]
    }
}

impl TextRecord for World {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field::many("chunk", records(&self.chunk))]
    }
}
