//! Enum and bitmap code generation.

use std::collections::HashSet;

use mattergen_schema::{Bitmap, ClusterIr, Enum, EnumItem, IntType};

use super::doc_text;

/// Generator for enum and bitmap definitions.
pub struct EnumGenerator<'a> {
    ir: &'a ClusterIr,
}

impl<'a> EnumGenerator<'a> {
    /// Creates a new enum generator.
    #[must_use]
    pub fn new(ir: &'a ClusterIr) -> Self {
        Self { ir }
    }

    /// Generates an enum with checked conversions from and to its integer
    /// representation.
    #[must_use]
    pub fn generate_enum(&self, enum_def: &Enum) -> String {
        let rust_name = enum_def.rust_name();
        let items = self.distinct_items(enum_def);
        if items.is_empty() {
            return generate_empty_enum(&rust_name);
        }

        let mut output = String::new();
        let repr = enum_def.repr();

        output.push_str(
            "#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]\n",
        );
        output.push_str(&format!("#[repr({repr})]\n"));
        output.push_str(&format!("pub enum {rust_name} {{\n"));
        for item in &items {
            let summary = doc_text(&item.summary);
            if !summary.is_empty() {
                output.push_str(&format!("    /// {summary}\n"));
            }
            output.push_str(&format!("    {} = {},\n", item.variant, item.value));
        }
        output.push_str("}\n\n");

        output.push_str(&format!("impl {rust_name} {{\n"));
        if repr == IntType::U8 {
            output.push_str("    /// Convert from u8 value\n");
            output.push_str("    pub fn from_u8(value: u8) -> Option<Self> {\n");
            output.push_str(&from_value_match(&items));
            output.push_str("    }\n\n");
        } else {
            output.push_str(&format!("    /// Convert from u8 value (promoted to {repr})\n"));
            output.push_str("    pub fn from_u8(value: u8) -> Option<Self> {\n");
            output.push_str(&format!("        Self::from_{repr}({repr}::from(value))\n"));
            output.push_str("    }\n\n");

            output.push_str(&format!("    /// Convert from {repr} value\n"));
            output.push_str(&format!(
                "    pub fn from_{repr}(value: {repr}) -> Option<Self> {{\n"
            ));
            output.push_str(&from_value_match(&items));
            output.push_str("    }\n\n");
        }

        if repr == IntType::U8 {
            output.push_str("    /// Convert to u8 value\n");
        } else {
            output.push_str("    /// Convert to u8 value (truncated if value > 255)\n");
        }
        output.push_str("    pub fn to_u8(self) -> u8 {\n");
        output.push_str("        self as u8\n");
        output.push_str("    }\n");

        if repr != IntType::U8 {
            output.push_str(&format!("\n    /// Convert to {repr} value\n"));
            output.push_str(&format!("    pub fn to_{repr}(self) -> {repr} {{\n"));
            output.push_str(&format!("        self as {repr}\n"));
            output.push_str("    }\n");
        }
        output.push_str("}\n\n");

        output.push_str(&format!("impl From<{rust_name}> for {repr} {{\n"));
        output.push_str(&format!("    fn from(val: {rust_name}) -> Self {{\n"));
        output.push_str(&format!("        val as {repr}\n"));
        output.push_str("    }\n");
        output.push_str("}\n");

        output
    }

    /// Generates a bitmap as an integer alias plus a module of flag masks.
    #[must_use]
    pub fn generate_bitmap(&self, bitmap: &Bitmap) -> String {
        let mut output = String::new();
        let rust_name = bitmap.rust_name();
        let base = bitmap.base_type();

        output.push_str(&format!("/// {rust_name} bitmap type\n"));
        output.push_str(&format!("pub type {rust_name} = {base};\n"));

        let mut constants = String::new();
        for field in &bitmap.bitfields {
            let Some(mask) = field.mask() else {
                tracing::debug!(
                    "{}: bit {} of {} does not fit in 64 bits",
                    self.ir.cluster.name,
                    field.bit,
                    bitmap.name
                );
                continue;
            };
            let summary = doc_text(&field.summary);
            if !summary.is_empty() {
                constants.push_str(&format!("    /// {summary}\n"));
            }
            constants.push_str(&format!(
                "    pub const {}: {base} = 0x{mask:02X};\n",
                field.constant
            ));
        }

        if !constants.is_empty() {
            output.push_str(&format!("\n/// Constants for {rust_name}\n"));
            output.push_str(&format!("pub mod {} {{\n", bitmap.module_name()));
            output.push_str(&constants);
            output.push_str("}\n");
        }

        output
    }

    /// Items with distinct values; a repeated value would be a duplicate
    /// discriminant.
    fn distinct_items<'e>(&self, enum_def: &'e Enum) -> Vec<&'e EnumItem> {
        let mut seen = HashSet::new();
        enum_def
            .items
            .iter()
            .filter(|item| {
                let fresh = seen.insert(item.value);
                if !fresh {
                    tracing::debug!(
                        "{}: {} repeats value {} as {}, skipped",
                        self.ir.cluster.name,
                        enum_def.name,
                        item.value,
                        item.name
                    );
                }
                fresh
            })
            .collect()
    }
}

fn from_value_match(items: &[&EnumItem]) -> String {
    let mut output = String::new();
    output.push_str("        match value {\n");
    for item in items {
        output.push_str(&format!(
            "            {} => Some(Self::{}),\n",
            item.value, item.variant
        ));
    }
    output.push_str("            _ => None,\n");
    output.push_str("        }\n");
    output
}

fn generate_empty_enum(rust_name: &str) -> String {
    let mut output = String::new();
    output.push_str(
        "#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]\n",
    );
    output.push_str(&format!("pub enum {rust_name} {{}}\n\n"));

    output.push_str(&format!("impl {rust_name} {{\n"));
    output.push_str("    /// Convert from u8 value\n");
    output.push_str("    pub fn from_u8(_value: u8) -> Option<Self> {\n");
    output.push_str("        None\n");
    output.push_str("    }\n\n");
    output.push_str("    /// Convert to u8 value\n");
    output.push_str("    pub fn to_u8(self) -> u8 {\n");
    output.push_str("        match self {}\n");
    output.push_str("    }\n");
    output.push_str("}\n\n");

    output.push_str(&format!("impl From<{rust_name}> for u8 {{\n"));
    output.push_str(&format!("    fn from(val: {rust_name}) -> Self {{\n"));
    output.push_str("        match val {}\n");
    output.push_str("    }\n");
    output.push_str("}\n");
    output
}
