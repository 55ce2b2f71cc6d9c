//! Event and command response decoder generation.
//!
//! Both carry a field list decoded from a compound TLV value into a
//! generated payload struct.

use mattergen_schema::{CommandResponse, Event, Field};

use super::codec::Codec;
use super::indent;
use super::structs::StructGenerator;

/// Generator for event and command response payloads.
pub struct EventGenerator<'a> {
    codec: Codec<'a>,
    structs: StructGenerator<'a>,
}

impl<'a> EventGenerator<'a> {
    /// Creates a new event generator.
    #[must_use]
    pub fn new(codec: Codec<'a>) -> Self {
        Self {
            codec,
            structs: StructGenerator::new(codec),
        }
    }

    /// Generates the payload struct and decoder of an event.
    #[must_use]
    pub fn generate_event(&self, event: &Event) -> Option<String> {
        if event.fields.is_empty() {
            return None;
        }
        let doc = format!(
            "/// Decode {} event ({}, priority: {})\n",
            event.name, event.id, event.priority
        );
        Some(self.generate_payload(
            &event.rust_name(),
            &event.decoder_name(),
            &doc,
            &event.fields,
        ))
    }

    /// Generates the payload struct and decoder of a command response.
    #[must_use]
    pub fn generate_response(&self, response: &CommandResponse) -> Option<String> {
        if response.fields.is_empty() {
            return None;
        }
        let doc = format!(
            "/// Decode {} command response ({})\n",
            response.name, response.id
        );
        Some(self.generate_payload(
            &response.rust_name(),
            &response.decoder_name(),
            &doc,
            &response.fields,
        ))
    }

    fn generate_payload(&self, rust_name: &str, decoder: &str, doc: &str, fields: &[Field]) -> String {
        let mut output = self.structs.definition(rust_name, None, fields);
        output.push('\n');
        output.push_str(doc);
        output.push_str(&format!(
            "pub fn {decoder}(inp: &tlv::TlvItemValue) -> anyhow::Result<{rust_name}> {{\n"
        ));
        output.push_str(&indent(
            &self.codec.decode_compound(rust_name, None, fields, true),
            1,
        ));
        output.push_str("}\n");
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mattergen_schema::{ClusterIr, parse_cluster};

    const CLUSTER: &str = r#"<cluster id="0x0004" name="Groups">
  <commands>
    <command id="0x00" name="AddGroupResponse" direction="responseFromServer">
      <field id="0" name="Status" type="enum8"/>
      <field id="1" name="GroupID" type="uint16"/>
    </command>
    <command id="0x01" name="EmptyResponse" direction="responseFromServer"/>
  </commands>
  <events>
    <event id="0x00" name="StateChange" priority="critical">
      <field id="0" name="NewState" type="bool"/>
    </event>
    <event id="0x01" name="Ping" priority="info"/>
  </events>
</cluster>"#;

    fn ir() -> ClusterIr {
        ClusterIr::from_cluster(&parse_cluster(CLUSTER).expect("parse"))
    }

    #[test]
    fn test_generate_response() {
        let ir = ir();
        let generator = EventGenerator::new(Codec::new(&ir));
        let code = generator
            .generate_response(&ir.cluster.responses[0])
            .expect("decoder");

        assert!(code.contains("pub struct AddGroupResponse {\n    pub status: Option<u8>,\n    pub group_id: Option<u16>,\n}"));
        assert!(code.contains("/// Decode AddGroupResponse command response (0x00)\n"));
        assert!(code.contains(
            "pub fn decode_add_group_response(inp: &tlv::TlvItemValue) -> anyhow::Result<AddGroupResponse> {"
        ));
        assert!(code.contains("            group_id: item.get_int(&[1]).map(|v| v as u16),\n"));
        assert!(code.contains("        Err(anyhow::anyhow!(\"Expected struct fields\"))\n"));
    }

    #[test]
    fn test_generate_event() {
        let ir = ir();
        let generator = EventGenerator::new(Codec::new(&ir));
        let code = generator.generate_event(&ir.cluster.events[0]).expect("decoder");

        assert!(code.contains("pub struct StateChangeEvent {\n    pub new_state: Option<bool>,\n}"));
        assert!(code.contains("/// Decode StateChange event (0x00, priority: critical)\n"));
        assert!(code.contains(
            "pub fn decode_state_change_event(inp: &tlv::TlvItemValue) -> anyhow::Result<StateChangeEvent> {"
        ));
        assert!(code.contains("new_state: item.get_bool(&[0]),"));
    }

    #[test]
    fn test_fieldless_payloads_skipped() {
        let ir = ir();
        let generator = EventGenerator::new(Codec::new(&ir));
        assert_eq!(generator.generate_response(&ir.cluster.responses[1]), None);
        assert_eq!(generator.generate_event(&ir.cluster.events[1]), None);
    }
}
