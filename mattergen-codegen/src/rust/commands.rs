//! Command encoder generation.

use mattergen_schema::{Command, Field};

use super::codec::{Codec, FieldShape};
use super::indent_tail;
use crate::config::CodegenConfig;

/// Generator for client command encoders.
pub struct CommandGenerator<'a> {
    codec: Codec<'a>,
    config: &'a CodegenConfig,
}

/// One encoder parameter.
struct Param<'f, 'a> {
    field: &'f Field,
    shape: FieldShape<'a>,
    name: String,
    rust_type: String,
}

impl<'a> CommandGenerator<'a> {
    /// Creates a new command generator.
    #[must_use]
    pub fn new(codec: Codec<'a>, config: &'a CodegenConfig) -> Self {
        Self { codec, config }
    }

    /// Returns true if the encoder takes a generated params struct.
    #[must_use]
    pub fn uses_params_struct(&self, command: &Command) -> bool {
        self.params(command).len() > self.config.max_positional_params
    }

    /// Generates the encoder for a command. Commands without fields have
    /// nothing to encode and produce `None`.
    #[must_use]
    pub fn generate_command(&self, command: &Command) -> Option<String> {
        if command.fields.is_empty() {
            tracing::debug!("command {} has no fields, no encoder generated", command.name);
            return None;
        }

        let params = self.params(command);
        let mut output = String::new();

        let (signature, prefix) = if self.uses_params_struct(command) {
            let struct_name = command.params_struct_name();
            output.push_str(&format!("/// Parameters for {} command\n", command.name));
            output.push_str("#[derive(Debug, Clone)]\n");
            output.push_str(&format!("pub struct {struct_name} {{\n"));
            for param in &params {
                output.push_str(&format!("    pub {}: {},\n", param.name, param.rust_type));
            }
            output.push_str("}\n\n");
            (format!("params: {struct_name}"), "params.")
        } else {
            let signature = params
                .iter()
                .map(|p| format!("{}: {}", p.name, p.rust_type))
                .collect::<Vec<_>>()
                .join(", ");
            (signature, "")
        };

        output.push_str(&format!("/// Encode {} command ({})\n", command.name, command.id));
        output.push_str(&format!(
            "pub fn {}({signature}) -> anyhow::Result<Vec<u8>> {{\n",
            command.encoder_name()
        ));
        output.push_str("    let tlv = tlv::TlvItemEnc {\n");
        output.push_str("        tag: 0,\n");
        output.push_str("        value: tlv::TlvItemValueEnc::StructInvisible(vec![\n");
        for param in &params {
            let access = format!("{prefix}{}", param.name);
            let Some(expr) = self.codec.encode_param(param.field, &param.shape, &access) else {
                continue;
            };
            output.push_str(&format!(
                "            ({}, {}).into(),\n",
                param.field.id,
                indent_tail(&expr, 3)
            ));
        }
        output.push_str("        ]),\n");
        output.push_str("    };\n");
        output.push_str("    Ok(tlv.encode()?)\n");
        output.push_str("}\n");

        Some(output)
    }

    fn params<'f>(&self, command: &'f Command) -> Vec<Param<'f, 'a>> {
        self.codec
            .fields(None, &command.fields)
            .into_iter()
            .filter_map(|(field, shape)| {
                let rust_type = shape.rust_type()?;
                let rust_type = if field.nullable {
                    format!("Option<{rust_type}>")
                } else {
                    rust_type
                };
                Some(Param {
                    field,
                    name: field.rust_name(),
                    shape,
                    rust_type,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mattergen_schema::{ClusterIr, parse_cluster};

    const CLUSTER: &str = r#"<cluster id="0x0008" name="Level Control">
  <dataTypes>
    <bitmap name="OptionsBitmap">
      <bitfield name="ExecuteIfOff" bit="0"/>
    </bitmap>
  </dataTypes>
  <commands>
    <command id="0x00" name="MoveToLevel" direction="commandToServer">
      <field id="0" name="Level" type="uint8"/>
      <field id="1" name="TransitionTime" type="uint16">
        <quality nullable="true"/>
      </field>
      <field id="2" name="OptionsMask" type="OptionsBitmap"/>
    </command>
    <command id="0x01" name="Big" direction="commandToServer">
      <field id="0" name="A" type="uint8"/>
      <field id="1" name="B" type="uint8"/>
      <field id="2" name="C" type="uint8"/>
      <field id="3" name="D" type="string"/>
    </command>
    <command id="0x02" name="Stop" direction="commandToServer"/>
  </commands>
</cluster>"#;

    fn ir() -> ClusterIr {
        ClusterIr::from_cluster(&parse_cluster(CLUSTER).expect("parse"))
    }

    #[test]
    fn test_positional_encoder() {
        let ir = ir();
        let config = CodegenConfig::default();
        let generator = CommandGenerator::new(Codec::new(&ir), &config);
        let code = generator
            .generate_command(&ir.cluster.commands[0])
            .expect("encoder");

        assert!(code.contains("/// Encode MoveToLevel command (0x00)\n"));
        assert!(code.contains(
            "pub fn encode_move_to_level(level: u8, transition_time: Option<u16>, options_mask: Options) -> anyhow::Result<Vec<u8>> {"
        ));
        assert!(code.contains("            (0, tlv::TlvItemValueEnc::UInt8(level)).into(),\n"));
        assert!(code.contains(
            "            (1, tlv::TlvItemValueEnc::UInt16(transition_time.unwrap_or_default())).into(),\n"
        ));
        assert!(code.contains("            (2, tlv::TlvItemValueEnc::UInt8(options_mask)).into(),\n"));
        assert!(code.contains("    Ok(tlv.encode()?)\n"));
    }

    #[test]
    fn test_params_struct_encoder() {
        let ir = ir();
        let config = CodegenConfig::new().max_positional_params(3);
        let generator = CommandGenerator::new(Codec::new(&ir), &config);
        let command = &ir.cluster.commands[1];
        assert!(generator.uses_params_struct(command));

        let code = generator.generate_command(command).expect("encoder");
        assert!(code.contains("pub struct BigParams {\n    pub a: u8,\n"));
        assert!(code.contains("    pub d: String,\n"));
        assert!(code.contains("pub fn encode_big(params: BigParams) -> anyhow::Result<Vec<u8>> {"));
        assert!(code.contains("(3, tlv::TlvItemValueEnc::String(params.d)).into(),"));
    }

    #[test]
    fn test_fieldless_command_skipped() {
        let ir = ir();
        let config = CodegenConfig::default();
        let generator = CommandGenerator::new(Codec::new(&ir), &config);
        assert_eq!(generator.generate_command(&ir.cluster.commands[2]), None);
    }
}
