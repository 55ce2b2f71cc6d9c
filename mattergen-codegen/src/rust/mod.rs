//! Rust code generation modules.

pub mod attributes;
pub mod codec;
pub mod commands;
pub mod dispatch;
pub mod enums;
pub mod events;
pub mod structs;

pub use attributes::AttributeGenerator;
pub use codec::Codec;
pub use commands::CommandGenerator;
pub use dispatch::DispatchGenerator;
pub use enums::EnumGenerator;
pub use events::EventGenerator;
pub use structs::StructGenerator;

use mattergen_schema::{AttributeField, Bitmap, Command, CommandResponse, Enum, Event, Struct};

/// Spaces per indentation level.
const INDENT: &str = "    ";

/// Section comments of a generated module, in output order.
pub const SECTIONS: [&str; 7] = [
    "Enum definitions",
    "Bitmap definitions",
    "Struct definitions",
    "Command encoders",
    "Attribute decoders",
    "Command response decoders",
    "Event decoders",
];

/// Index of the section holding attribute decoders and the per-cluster
/// dispatchers.
pub const ATTRIBUTE_SECTION: usize = 4;

/// One emittable cluster entity.
#[derive(Debug, Clone, Copy)]
pub enum Item<'a> {
    /// Enum declaration.
    Enum(&'a Enum),
    /// Bitmap type alias and constants.
    Bitmap(&'a Bitmap),
    /// Struct declaration.
    Struct(&'a Struct),
    /// Command encoder.
    Command(&'a Command),
    /// Attribute decoder.
    Attribute(&'a AttributeField),
    /// Command response type and decoder.
    Response(&'a CommandResponse),
    /// Event type and decoder.
    Event(&'a Event),
}

impl Item<'_> {
    /// Index into [`SECTIONS`] of the item's kind.
    #[must_use]
    pub const fn section(&self) -> usize {
        match self {
            Self::Enum(_) => 0,
            Self::Bitmap(_) => 1,
            Self::Struct(_) => 2,
            Self::Command(_) => 3,
            Self::Attribute(_) => ATTRIBUTE_SECTION,
            Self::Response(_) => 5,
            Self::Event(_) => 6,
        }
    }

    /// Kind of definition the item came from.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Enum(_) => "enum",
            Self::Bitmap(_) => "bitmap",
            Self::Struct(_) => "struct",
            Self::Command(_) => "command",
            Self::Attribute(_) => "attribute",
            Self::Response(_) => "command response",
            Self::Event(_) => "event",
        }
    }

    /// Source name of the item.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Enum(e) => &e.name,
            Self::Bitmap(b) => &b.name,
            Self::Struct(s) => &s.name,
            Self::Command(c) => &c.name,
            Self::Attribute(a) => a.name(),
            Self::Response(r) => &r.name,
            Self::Event(e) => &e.name,
        }
    }
}

/// Indents every non-empty line of `code` by `level` steps.
#[must_use]
pub fn indent(code: &str, level: usize) -> String {
    indent_lines(code, level, true)
}

/// Indents every non-empty line of `code` except the first.
///
/// Used when a multi-line expression is spliced after text on its first line.
#[must_use]
pub fn indent_tail(code: &str, level: usize) -> String {
    indent_lines(code, level, false)
}

fn indent_lines(code: &str, level: usize, first: bool) -> String {
    let prefix = INDENT.repeat(level);
    let mut output = String::with_capacity(code.len());
    for (i, line) in code.split_inclusive('\n').enumerate() {
        if (i > 0 || first) && !line.trim().is_empty() {
            output.push_str(&prefix);
        }
        output.push_str(line);
    }
    output
}

/// Single-line doc text: whitespace collapsed, trimmed.
#[must_use]
pub fn doc_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
