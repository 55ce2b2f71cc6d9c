//! Attribute decoder generation.
//!
//! Besides one decoder per attribute, every cluster with attributes gets a
//! `decode_attribute_json` dispatcher rendering any of its attributes as a
//! JSON string and a `get_attribute_list` name table.

use std::collections::HashSet;

use mattergen_schema::AttributeField;

use super::codec::{Codec, FieldShape, Omission, Shape};
use super::{indent, indent_tail};
use crate::config::CodegenConfig;

/// Name of the per-cluster JSON dispatcher.
pub const JSON_DISPATCHER: &str = "decode_attribute_json";

/// Name of the per-cluster attribute name table.
pub const ATTRIBUTE_LIST: &str = "get_attribute_list";

/// Closure turning a byte slice into a lowercase hex string.
const HEX_STRING: &str = "bytes.iter().map(|b| format!(\"{:02x}\", b)).collect::<String>()";

/// Decoder signature chosen for an attribute.
#[derive(Debug, Clone)]
pub enum DecoderKind<'a> {
    /// `Option<T>`; a wire mismatch decodes to `None`.
    Optional(Shape<'a>),
    /// Bare `T`; a wire mismatch is an error.
    Required(Shape<'a>),
    /// `Vec<T>`; mismatched elements are dropped.
    List(Shape<'a>),
    /// Placeholder that always fails.
    Stub(Omission),
}

/// Generator for attribute decoders.
pub struct AttributeGenerator<'a> {
    codec: Codec<'a>,
    config: &'a CodegenConfig,
}

impl<'a> AttributeGenerator<'a> {
    /// Creates a new attribute generator.
    #[must_use]
    pub fn new(codec: Codec<'a>, config: &'a CodegenConfig) -> Self {
        Self { codec, config }
    }

    /// Decoder kind for an attribute, or `None` when its type lives in
    /// another cluster.
    #[must_use]
    pub fn decoder_kind(&self, attr: &AttributeField) -> Option<DecoderKind<'a>> {
        match self.codec.field_shape(None, &attr.field) {
            FieldShape::List(shape) => Some(DecoderKind::List(shape)),
            FieldShape::Single(shape) if self.config.strict_attributes && !attr.field.nullable => {
                Some(DecoderKind::Required(shape))
            }
            FieldShape::Single(shape) => Some(DecoderKind::Optional(shape)),
            FieldShape::Omitted(reason @ (Omission::MissingEntryType | Omission::NestedList)) => {
                Some(DecoderKind::Stub(reason))
            }
            FieldShape::Omitted(reason) => {
                tracing::debug!("no decoder for attribute {} ({reason})", attr.name());
                None
            }
        }
    }

    /// Generates the decoder for an attribute.
    #[must_use]
    pub fn generate_decoder(&self, attr: &AttributeField) -> Option<String> {
        let kind = self.decoder_kind(attr)?;
        let mut output = String::new();
        output.push_str(&format!("/// Decode {} attribute ({})\n", attr.name(), attr.id));

        let (return_type, body) = match &kind {
            DecoderKind::Optional(shape) => (
                format!("Option<{}>", shape.rust_type()),
                self.single_body(*shape, false),
            ),
            DecoderKind::Required(shape) => (shape.rust_type(), self.single_body(*shape, true)),
            DecoderKind::List(shape) => (
                format!("Vec<{}>", shape.rust_type()),
                self.list_body(*shape),
            ),
            DecoderKind::Stub(reason) => {
                output.push_str("///\n");
                output.push_str(&format!("/// Not decodable: {reason}.\n"));
                output.push_str(&format!(
                    "pub fn {}(_inp: &tlv::TlvItemValue) -> anyhow::Result<()> {{\n",
                    attr.decoder_name()
                ));
                output.push_str(&format!(
                    "    Err(anyhow::anyhow!(\"{}: {reason}\"))\n",
                    attr.name().escape_default()
                ));
                output.push_str("}\n");
                return Some(output);
            }
        };

        output.push_str(&format!(
            "pub fn {}(inp: &tlv::TlvItemValue) -> anyhow::Result<{return_type}> {{\n",
            attr.decoder_name()
        ));
        output.push_str(&indent(&body, 1));
        output.push_str("}\n");
        Some(output)
    }

    fn single_body(&self, shape: Shape<'a>, required: bool) -> String {
        if let Shape::Struct(target) = shape {
            return self.codec.decode_compound(
                &target.rust_name(),
                Some(&target.name),
                &target.fields,
                required,
            );
        }
        let Some((pattern, value)) = shape.value_pattern() else {
            return String::new();
        };

        let (found, otherwise) = match (shape, required) {
            (Shape::Enum(_), true) => (
                format!("{value}.ok_or_else(|| anyhow::anyhow!(\"Invalid enum value\"))"),
                format!("Err(anyhow::anyhow!(\"Expected {}\"))", shape.wire()),
            ),
            (_, true) => (
                format!("Ok({value})"),
                format!("Err(anyhow::anyhow!(\"Expected {}\"))", shape.wire()),
            ),
            (Shape::Enum(_), false) => (format!("Ok({value})"), "Ok(None)".to_string()),
            (_, false) => (format!("Ok(Some({value}))"), "Ok(None)".to_string()),
        };

        let mut output = String::new();
        output.push_str(&format!("if let {pattern} = inp {{\n"));
        output.push_str(&format!("    {found}\n"));
        output.push_str("} else {\n");
        output.push_str(&format!("    {otherwise}\n"));
        output.push_str("}\n");
        output
    }

    fn list_body(&self, shape: Shape<'a>) -> String {
        let mut output = String::new();
        output.push_str("if let tlv::TlvItemValue::List(list) = inp {\n");
        output.push_str("    Ok(list\n");
        output.push_str("        .iter()\n");
        output.push_str(&indent(&self.codec.decode_elements(shape, 0), 2));
        output.push_str("        .collect())\n");
        output.push_str("} else {\n");
        output.push_str("    Ok(Vec::new())\n");
        output.push_str("}\n");
        output
    }

    /// Generates the per-cluster JSON dispatcher over the attributes that
    /// have decoders. Repeated attribute ids are routed once.
    #[must_use]
    pub fn generate_json_dispatcher(&self, attributes: &[&AttributeField]) -> String {
        let cluster_id = self.codec.ir().cluster.id;
        let mut output = String::new();

        output.push_str("/// Decode attribute value and return as JSON string\n");
        output.push_str("///\n");
        output.push_str("/// # Parameters\n");
        output.push_str(&format!(
            "/// * `cluster_id` - The cluster identifier; must be {cluster_id:#06x}\n"
        ));
        output.push_str("/// * `attribute_id` - The attribute identifier\n");
        output.push_str("/// * `tlv_value` - The TLV value to decode\n");
        output.push_str("///\n");
        output.push_str("/// # Returns\n");
        output.push_str("/// JSON string representation of the decoded value or error\n");
        output.push_str(&format!(
            "pub fn {JSON_DISPATCHER}(cluster_id: u32, attribute_id: u32, tlv_value: &tlv::TlvItemValue) -> String {{\n"
        ));
        output.push_str(&format!("    if cluster_id != {cluster_id:#06x} {{\n"));
        output.push_str(&format!(
            "        return format!(\"{{{{\\\"error\\\": \\\"Invalid cluster ID. Expected {cluster_id:#06x}, got {{}}\\\"}}}}\", cluster_id);\n"
        ));
        output.push_str("    }\n\n");
        output.push_str("    match attribute_id {\n");

        let mut seen = HashSet::new();
        for attr in attributes {
            let Some(id) = attr.numeric_id() else {
                tracing::warn!("attribute {} has non-numeric id '{}'", attr.name(), attr.id);
                continue;
            };
            if !seen.insert(id) {
                continue;
            }
            let Some(kind) = self.decoder_kind(attr) else {
                continue;
            };
            output.push_str(&indent(&json_arm(id, &attr.decoder_name(), &kind), 2));
        }

        output.push_str(
            "        _ => format!(\"{{\\\"error\\\": \\\"Unknown attribute ID: {}\\\"}}\", attribute_id),\n",
        );
        output.push_str("    }\n");
        output.push_str("}\n");
        output
    }

    /// Generates the `(id, name)` table of every attribute with a numeric
    /// id, decodable or not.
    #[must_use]
    pub fn generate_attribute_list(&self, attributes: &[AttributeField]) -> String {
        let mut output = String::new();
        output.push_str("/// Get list of all attributes supported by this cluster\n");
        output.push_str("///\n");
        output.push_str("/// # Returns\n");
        output.push_str("/// Vector of tuples containing (attribute_id, attribute_name)\n");
        output.push_str(&format!(
            "pub fn {ATTRIBUTE_LIST}() -> Vec<(u32, &'static str)> {{\n"
        ));
        output.push_str("    vec![\n");
        let mut seen = HashSet::new();
        for attr in attributes {
            let Some(id) = attr.numeric_id() else {
                continue;
            };
            if seen.insert(id) {
                output.push_str(&format!("        ({id:#06x}, {:?}),\n", attr.name()));
            }
        }
        output.push_str("    ]\n");
        output.push_str("}\n");
        output
    }
}

/// Match arm routing `id` to `decoder`, hex-encoding octet strings.
fn json_arm(id: u32, decoder: &str, kind: &DecoderKind<'_>) -> String {
    let ok = match kind {
        DecoderKind::Optional(Shape::Bytes) => format!(
            "serde_json::to_string(&value.map(|bytes| {HEX_STRING})).unwrap_or_else(|_| \"null\".to_string())"
        ),
        DecoderKind::Required(Shape::Bytes) => {
            let hex = HEX_STRING.replacen("bytes.iter()", "value.iter()", 1);
            format!("serde_json::to_string(&{hex}).unwrap_or_else(|_| \"null\".to_string())")
        }
        DecoderKind::List(Shape::Bytes) => format!(
            "serde_json::to_string(&value.iter().map(|bytes| {HEX_STRING}).collect::<Vec<_>>()).unwrap_or_else(|_| \"null\".to_string())"
        ),
        _ => "serde_json::to_string(&value).unwrap_or_else(|_| \"null\".to_string())".to_string(),
    };

    let mut output = String::new();
    output.push_str(&format!("{id:#06x} => match {decoder}(tlv_value) {{\n"));
    output.push_str(&format!("    Ok(value) => {},\n", indent_tail(&ok, 1)));
    output.push_str("    Err(e) => format!(\"{{\\\"error\\\": \\\"{}\\\"}}\", e),\n");
    output.push_str("},\n");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use mattergen_schema::{ClusterIr, parse_cluster};

    const CLUSTER: &str = r#"<cluster id="0x0006" name="On/Off">
  <dataTypes>
    <enum name="ModeEnum">
      <item value="0" name="Low"/>
      <item value="1" name="High"/>
    </enum>
    <struct name="ConfigStruct">
      <field id="0" name="Level" type="uint8"/>
    </struct>
  </dataTypes>
  <attributes>
    <attribute id="0x0000" name="Level" type="uint16"/>
    <attribute id="0x0001" name="Mode" type="ModeEnum"/>
    <attribute id="0x0002" name="Config" type="ConfigStruct"/>
    <attribute id="0x0003" name="Modes" type="list">
      <entry type="ModeEnum"/>
    </attribute>
    <attribute id="0x0004" name="Key" type="octstr"/>
    <attribute id="0x0005" name="Remote" type="RemoteStruct"/>
    <attribute id="0x0006" name="Raw" type="list"/>
    <attribute id="0x0000" name="LevelAgain" type="uint16"/>
  </attributes>
</cluster>"#;

    fn ir() -> ClusterIr {
        ClusterIr::from_cluster(&parse_cluster(CLUSTER).expect("parse"))
    }

    fn attr<'a>(ir: &'a ClusterIr, name: &str) -> &'a AttributeField {
        ir.cluster
            .attributes
            .iter()
            .find(|a| a.name() == name)
            .expect("attribute")
    }

    #[test]
    fn test_optional_decoders() {
        let ir = ir();
        let config = CodegenConfig::default();
        let generator = AttributeGenerator::new(Codec::new(&ir), &config);

        let level = generator.generate_decoder(attr(&ir, "Level")).expect("decoder");
        assert!(level.contains(
            "pub fn decode_level(inp: &tlv::TlvItemValue) -> anyhow::Result<Option<u16>> {"
        ));
        assert!(level.contains("    if let tlv::TlvItemValue::Int(v) = inp {\n        Ok(Some(*v as u16))\n"));
        assert!(level.contains("        Ok(None)\n"));

        let mode = generator.generate_decoder(attr(&ir, "Mode")).expect("decoder");
        assert!(mode.contains("anyhow::Result<Option<Mode>>"));
        assert!(mode.contains("Ok(Mode::from_u8(*v as u8))"));

        let config_attr = generator.generate_decoder(attr(&ir, "Config")).expect("decoder");
        assert!(config_attr.contains("anyhow::Result<Option<Config>>"));
        assert!(config_attr.contains("let item = tlv::TlvItem { tag: 0, value: inp.clone() };"));
        assert!(config_attr.contains("Ok(Some(Config {"));
    }

    #[test]
    fn test_strict_decoders() {
        let ir = ir();
        let config = CodegenConfig::new().strict_attributes(true);
        let generator = AttributeGenerator::new(Codec::new(&ir), &config);

        let level = generator.generate_decoder(attr(&ir, "Level")).expect("decoder");
        assert!(level.contains("anyhow::Result<u16>"));
        assert!(level.contains("Err(anyhow::anyhow!(\"Expected UInt16\"))"));

        let mode = generator.generate_decoder(attr(&ir, "Mode")).expect("decoder");
        assert!(mode.contains("Mode::from_u8(*v as u8).ok_or_else(|| anyhow::anyhow!(\"Invalid enum value\"))"));

        let config_attr = generator.generate_decoder(attr(&ir, "Config")).expect("decoder");
        assert!(config_attr.contains("Err(anyhow::anyhow!(\"Expected struct fields\"))"));
    }

    #[test]
    fn test_list_and_stub_decoders() {
        let ir = ir();
        let config = CodegenConfig::default();
        let generator = AttributeGenerator::new(Codec::new(&ir), &config);

        let modes = generator.generate_decoder(attr(&ir, "Modes")).expect("decoder");
        assert!(modes.contains("anyhow::Result<Vec<Mode>>"));
        assert!(modes.contains("if let tlv::TlvItemValue::List(list) = inp {"));
        assert!(modes.contains(".filter_map(|e_0| if let tlv::TlvItemValue::Int(v) = &e_0.value { Mode::from_u8(*v as u8) } else { None })"));
        assert!(modes.contains("Ok(Vec::new())"));

        let raw = generator.generate_decoder(attr(&ir, "Raw")).expect("stub");
        assert!(raw.contains("pub fn decode_raw(_inp: &tlv::TlvItemValue) -> anyhow::Result<()> {"));
        assert!(raw.contains("Err(anyhow::anyhow!(\"Raw: list without entry type\"))"));

        assert_eq!(generator.generate_decoder(attr(&ir, "Remote")), None);
    }

    #[test]
    fn test_json_dispatcher() {
        let ir = ir();
        let config = CodegenConfig::default();
        let generator = AttributeGenerator::new(Codec::new(&ir), &config);
        let attrs: Vec<&AttributeField> = ir.cluster.attributes.iter().collect();
        let code = generator.generate_json_dispatcher(&attrs);

        assert!(code.contains("    if cluster_id != 0x0006 {\n"));
        assert!(code.contains(
            "return format!(\"{{\\\"error\\\": \\\"Invalid cluster ID. Expected 0x0006, got {}\\\"}}\", cluster_id);"
        ));
        assert!(code.contains("        0x0000 => match decode_level(tlv_value) {\n"));
        assert_eq!(code.matches("0x0000 =>").count(), 1);
        assert!(!code.contains("decode_level_again"));
        assert!(!code.contains("decode_remote"));
        assert!(code.contains("0x0004 => match decode_key(tlv_value) {"));
        assert!(code.contains("value.map(|bytes| bytes.iter().map(|b| format!(\"{:02x}\", b)).collect::<String>())"));
        assert!(code.contains("Unknown attribute ID: {}"));
    }

    #[test]
    fn test_attribute_list() {
        let ir = ir();
        let config = CodegenConfig::default();
        let generator = AttributeGenerator::new(Codec::new(&ir), &config);
        let code = generator.generate_attribute_list(&ir.cluster.attributes);

        assert!(code.contains("pub fn get_attribute_list() -> Vec<(u32, &'static str)> {"));
        assert!(code.contains("        (0x0000, \"Level\"),\n"));
        assert!(code.contains("        (0x0005, \"Remote\"),\n"));
        assert!(!code.contains("LevelAgain"));
    }
}
