//! Cluster element definitions.
//!
//! Attributes, commands, command responses and events, plus the
//! [`ClusterDef`] that owns them together with the cluster's type tables.

use crate::naming::{field_ident, to_pascal_case, type_ident};
use crate::types::{Bitmap, Enum, Field, Struct, SymbolTable};

/// Parses a decimal or `0x`-prefixed hexadecimal integer.
#[must_use]
pub fn parse_int(value: &str) -> Option<u64> {
    let value = value.trim();
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

/// Cluster attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeField {
    /// Attribute id as written in the XML.
    pub id: String,
    /// Type information; the field tag is unused for attributes.
    pub field: Field,
}

impl AttributeField {
    /// Creates a new attribute.
    #[must_use]
    pub fn new(id: impl Into<String>, field: Field) -> Self {
        Self {
            id: id.into(),
            field,
        }
    }

    /// Attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.field.name
    }

    /// Numeric attribute id.
    #[must_use]
    pub fn numeric_id(&self) -> Option<u32> {
        parse_int(&self.id).and_then(|v| u32::try_from(v).ok())
    }

    /// Name of the generated decode function.
    #[must_use]
    pub fn decoder_name(&self) -> String {
        format!("decode_{}", field_ident(&self.field.name))
    }
}

/// Direction of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandDirection {
    /// Client request (`commandToServer`).
    ToServer,
    /// Server response (`responseFromServer`).
    ResponseFromServer,
    /// Any other declared direction.
    Other(String),
}

impl CommandDirection {
    /// Parses a direction attribute value.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "commandToServer" => Self::ToServer,
            "responseFromServer" => Self::ResponseFromServer,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Client-issued command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command id as written in the XML.
    pub id: String,
    /// Command name.
    pub name: String,
    /// Request fields.
    pub fields: Vec<Field>,
}

impl Command {
    /// Creates a new command.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Name of the generated encode function.
    #[must_use]
    pub fn encoder_name(&self) -> String {
        format!("encode_{}", field_ident(&self.name))
    }

    /// Name of the parameter struct used when the command has many fields.
    #[must_use]
    pub fn params_struct_name(&self) -> String {
        format!("{}Params", type_ident(&to_pascal_case(&self.name), "", true))
    }
}

/// Server response command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    /// Command id as written in the XML.
    pub id: String,
    /// Response name.
    pub name: String,
    /// Response fields.
    pub fields: Vec<Field>,
}

impl CommandResponse {
    /// Creates a new response.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Rust struct name; keeps the `Response` suffix.
    #[must_use]
    pub fn rust_name(&self) -> String {
        type_ident(&to_pascal_case(&self.name), "", true)
    }

    /// Name of the generated decode function.
    #[must_use]
    pub fn decoder_name(&self) -> String {
        format!("decode_{}", field_ident(&self.name))
    }
}

/// Cluster event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event id as written in the XML.
    pub id: String,
    /// Event name.
    pub name: String,
    /// Priority (`debug`, `info`, `critical`).
    pub priority: String,
    /// Event fields.
    pub fields: Vec<Field>,
}

impl Event {
    /// Creates a new event.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, priority: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            priority: priority.into(),
            fields: Vec::new(),
        }
    }

    /// Rust struct name (`<Name>Event`).
    #[must_use]
    pub fn rust_name(&self) -> String {
        format!("{}Event", type_ident(&to_pascal_case(&self.name), "", true))
    }

    /// Name of the generated decode function.
    #[must_use]
    pub fn decoder_name(&self) -> String {
        format!("decode_{}_event", field_ident(&self.name))
    }
}

/// Parsed cluster document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterDef {
    /// Numeric cluster id.
    pub id: u32,
    /// Cluster id as written in the XML.
    pub id_literal: String,
    /// Cluster name.
    pub name: String,
    /// Client-issued commands.
    pub commands: Vec<Command>,
    /// Server responses.
    pub responses: Vec<CommandResponse>,
    /// Attributes.
    pub attributes: Vec<AttributeField>,
    /// Events.
    pub events: Vec<Event>,
    /// Struct declarations.
    pub structs: SymbolTable<Struct>,
    /// Enum declarations.
    pub enums: SymbolTable<Enum>,
    /// Bitmap declarations.
    pub bitmaps: SymbolTable<Bitmap>,
}

impl ClusterDef {
    /// Creates an empty cluster.
    #[must_use]
    pub fn new(id_literal: impl Into<String>, name: impl Into<String>) -> Self {
        let id_literal = id_literal.into();
        Self {
            id: parse_int(&id_literal)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0),
            id_literal,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns true if the cluster declares any attribute.
    #[must_use]
    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }
}
