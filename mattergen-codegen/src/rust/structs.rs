//! Struct code generation.

use mattergen_schema::{Field, Struct};

use super::codec::Codec;

/// Derives on every generated payload struct.
const STRUCT_DERIVES: &str = "#[derive(Debug, Clone, Default, serde::Serialize)]";

/// Generator for struct definitions.
pub struct StructGenerator<'a> {
    codec: Codec<'a>,
}

impl<'a> StructGenerator<'a> {
    /// Creates a new struct generator.
    #[must_use]
    pub fn new(codec: Codec<'a>) -> Self {
        Self { codec }
    }

    /// Generates a cluster struct declaration.
    #[must_use]
    pub fn generate_struct(&self, struct_def: &Struct) -> String {
        self.definition(&struct_def.rust_name(), Some(&struct_def.name), &struct_def.fields)
    }

    /// Generates a struct named `rust_name` with one optional field per
    /// emittable entry of `fields`.
    ///
    /// `owner` is the source struct name used for recursion checks; payload
    /// structs of responses and events have none.
    #[must_use]
    pub fn definition(&self, rust_name: &str, owner: Option<&str>, fields: &[Field]) -> String {
        let mut output = String::new();
        output.push_str(STRUCT_DERIVES);
        output.push('\n');
        output.push_str(&format!("pub struct {rust_name} {{\n"));
        for (field, shape) in self.codec.fields(owner, fields) {
            let Some(rust_type) = shape.rust_type() else {
                continue;
            };
            if let Some(helper) = shape.hex_helper() {
                output.push_str(&format!("    #[serde(serialize_with = \"{helper}\")]\n"));
            }
            output.push_str(&format!("    pub {}: Option<{rust_type}>,\n", field.rust_name()));
        }
        output.push_str("}\n");
        output
    }
}
