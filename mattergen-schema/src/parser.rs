//! Matter cluster XML parser.
//!
//! This module extracts the structure of one cluster document into a
//! [`ClusterDef`]. Only direct children of each section element are
//! considered; unknown elements are skipped. No cross-reference resolution
//! happens here.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event as XmlEvent};

use crate::elements::{
    AttributeField, ClusterDef, Command, CommandDirection, CommandResponse, Event, parse_int,
};
use crate::error::ParseError;
use crate::types::{Bitmap, Enum, Field, Struct};

const UNKNOWN_NAME: &str = "Unknown";
const DEFAULT_TYPE: &str = "uint8";
const INHERITED_SUFFIX: &str = "WithOnOff";

/// Parses a cluster document from a string.
///
/// # Errors
/// Returns `ParseError` if the XML is malformed, contains no root element,
/// or carries a field id that is not a valid tag.
pub fn parse_cluster(xml: &str) -> Result<ClusterDef, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(XmlEvent::Start(ref e)) => {
                let mut cluster = parse_cluster_header(e)?;
                parse_cluster_body(&mut reader, &mut cluster)?;
                return Ok(cluster);
            }
            Ok(XmlEvent::Empty(ref e)) => return parse_cluster_header(e),
            Ok(XmlEvent::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Err(ParseError::missing_element("cluster"))
}

/// Reads and parses a cluster document from disk.
///
/// # Errors
/// Returns `ParseError` if the file cannot be read or parsed.
pub fn parse_cluster_file(path: impl AsRef<Path>) -> Result<ClusterDef, ParseError> {
    let xml = std::fs::read_to_string(path)?;
    parse_cluster(&xml)
}

/// Reads the root element attributes.
fn parse_cluster_header(e: &BytesStart<'_>) -> Result<ClusterDef, ParseError> {
    let name_bytes = e.name().as_ref().to_vec();
    let tag = std::str::from_utf8(&name_bytes)?;
    if tag != "cluster" {
        tracing::debug!("root element is <{tag}>, treating it as a cluster");
    }

    let mut id = String::from("0x0000");
    let mut name = UNKNOWN_NAME.to_string();

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr_value(&attr)?;

        match key {
            "id" => id = value.to_string(),
            "name" => name = value.to_string(),
            _ => {}
        }
    }

    Ok(ClusterDef::new(id, name))
}

/// Parses the sections of the cluster element.
fn parse_cluster_body(
    reader: &mut Reader<&[u8]>,
    cluster: &mut ClusterDef,
) -> Result<(), ParseError> {
    for_each_child(reader, |reader, e, has_body| {
        if !has_body {
            return Ok(false);
        }
        match tag_name(e)?.as_str() {
            "dataTypes" => parse_data_types(reader, cluster)?,
            "attributes" => cluster.attributes = parse_attributes(reader)?,
            "commands" => parse_commands(reader, cluster)?,
            "events" => cluster.events = parse_events(reader)?,
            _ => return Ok(false),
        }
        Ok(true)
    })
}

/// Parses the dataTypes section.
fn parse_data_types(
    reader: &mut Reader<&[u8]>,
    cluster: &mut ClusterDef,
) -> Result<(), ParseError> {
    for_each_child(reader, |reader, e, has_body| {
        match tag_name(e)?.as_str() {
            "enum" => cluster.enums.insert(parse_enum(reader, e, has_body)?),
            "bitmap" => cluster.bitmaps.insert(parse_bitmap(reader, e, has_body)?),
            "struct" => cluster.structs.insert(parse_struct(reader, e, has_body)?),
            _ => return Ok(false),
        }
        Ok(true)
    })
}

/// Parses an enum declaration and its items.
fn parse_enum(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    has_body: bool,
) -> Result<Enum, ParseError> {
    let name = attribute(e, "name")?.unwrap_or_else(|| UNKNOWN_NAME.to_string());
    let mut enum_def = Enum::new(name);

    if has_body {
        for_each_child(reader, |_, item, _| {
            if tag_name(item)? == "item" {
                let value = attribute(item, "value")?
                    .and_then(|v| parse_int(&v))
                    .unwrap_or(0);
                let name = attribute(item, "name")?.unwrap_or_else(|| UNKNOWN_NAME.to_string());
                let summary = attribute(item, "summary")?.unwrap_or_default();
                enum_def.add_item(value, name, summary);
            }
            Ok(false)
        })?;
    }

    Ok(enum_def)
}

/// Parses a bitmap declaration.
///
/// Bit ranges (`from`/`to`) and unparseable positions are skipped.
fn parse_bitmap(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    has_body: bool,
) -> Result<Bitmap, ParseError> {
    let name = attribute(e, "name")?.unwrap_or_else(|| UNKNOWN_NAME.to_string());
    let mut bitmap = Bitmap::new(name);

    if has_body {
        for_each_child(reader, |_, field, _| {
            if tag_name(field)? != "bitfield" {
                return Ok(false);
            }
            let Some(bit) = attribute(field, "bit")? else {
                return Ok(false);
            };
            let Some(bit) = parse_int(&bit).and_then(|b| u32::try_from(b).ok()) else {
                tracing::debug!("skipping bitfield with invalid bit '{bit}' in {}", bitmap.name);
                return Ok(false);
            };
            let name = attribute(field, "name")?.unwrap_or_else(|| UNKNOWN_NAME.to_string());
            let summary = attribute(field, "summary")?.unwrap_or_default();
            bitmap.add_bitfield(bit, name, summary);
            Ok(false)
        })?;
    }

    Ok(bitmap)
}

/// Parses a struct declaration.
fn parse_struct(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    has_body: bool,
) -> Result<Struct, ParseError> {
    let name = attribute(e, "name")?.unwrap_or_else(|| UNKNOWN_NAME.to_string());
    let mut struct_def = Struct::new(name);
    if has_body {
        struct_def.fields = parse_fields(reader)?;
    }
    Ok(struct_def)
}

/// Parses the attributes section.
fn parse_attributes(reader: &mut Reader<&[u8]>) -> Result<Vec<AttributeField>, ParseError> {
    let mut attributes = Vec::new();

    for_each_child(reader, |reader, e, has_body| {
        if tag_name(e)? != "attribute" {
            return Ok(false);
        }

        let mut id = String::from("0x0000");
        let mut field = Field::new(0, UNKNOWN_NAME, DEFAULT_TYPE);
        field.mandatory = true;

        for attr in e.attributes().flatten() {
            let key = std::str::from_utf8(attr.key.as_ref())?;
            let value = attr_value(&attr)?;

            match key {
                "id" => id = value.to_string(),
                "name" => field.name = value.to_string(),
                "type" => field.type_name = value.to_string(),
                "default" => field.default = Some(value.to_string()),
                _ => {}
            }
        }

        if has_body {
            parse_qualifiers(reader, &mut field)?;
        }
        attributes.push(AttributeField::new(id, field));
        Ok(true)
    })?;

    Ok(attributes)
}

/// Parses the commands section, splitting requests from responses.
///
/// A request named `<Base>WithOnOff` that declares no fields inherits the
/// fields of `<Base>`.
fn parse_commands(
    reader: &mut Reader<&[u8]>,
    cluster: &mut ClusterDef,
) -> Result<(), ParseError> {
    let mut declared: Vec<(CommandDirection, Command)> = Vec::new();

    for_each_child(reader, |reader, e, has_body| {
        if tag_name(e)? != "command" {
            return Ok(false);
        }

        let mut command = Command::new("0x00", UNKNOWN_NAME);
        let mut direction = CommandDirection::ToServer;

        for attr in e.attributes().flatten() {
            let key = std::str::from_utf8(attr.key.as_ref())?;
            let value = attr_value(&attr)?;

            match key {
                "id" => command.id = value.to_string(),
                "name" => command.name = value.to_string(),
                "direction" => direction = CommandDirection::parse(&value),
                _ => {}
            }
        }

        if has_body {
            command.fields = parse_fields(reader)?;
        }
        declared.push((direction, command));
        Ok(true)
    })?;

    for (direction, command) in &declared {
        match direction {
            CommandDirection::ToServer => {
                let mut command = command.clone();
                if command.fields.is_empty() && command.name.ends_with(INHERITED_SUFFIX) {
                    let base = command.name.replace(INHERITED_SUFFIX, "");
                    if let Some((_, base_cmd)) = declared.iter().find(|(_, c)| c.name == base) {
                        command.fields = base_cmd.fields.clone();
                    }
                }
                cluster.commands.push(command);
            }
            CommandDirection::ResponseFromServer => {
                let mut response = CommandResponse::new(command.id.clone(), command.name.clone());
                response.fields = command.fields.clone();
                cluster.responses.push(response);
            }
            CommandDirection::Other(other) => {
                tracing::debug!("skipping command {} with direction '{other}'", command.name);
            }
        }
    }

    Ok(())
}

/// Parses the events section.
fn parse_events(reader: &mut Reader<&[u8]>) -> Result<Vec<Event>, ParseError> {
    let mut events = Vec::new();

    for_each_child(reader, |reader, e, has_body| {
        if tag_name(e)? != "event" {
            return Ok(false);
        }

        let mut event = Event::new("0x00", UNKNOWN_NAME, "info");

        for attr in e.attributes().flatten() {
            let key = std::str::from_utf8(attr.key.as_ref())?;
            let value = attr_value(&attr)?;

            match key {
                "id" => event.id = value.to_string(),
                "name" => event.name = value.to_string(),
                "priority" => event.priority = value.to_string(),
                _ => {}
            }
        }

        if has_body {
            event.fields = parse_fields(reader)?;
        }
        events.push(event);
        Ok(true)
    })?;

    Ok(events)
}

/// Parses the `<field>` children of the current element.
fn parse_fields(reader: &mut Reader<&[u8]>) -> Result<Vec<Field>, ParseError> {
    let mut fields = Vec::new();

    for_each_child(reader, |reader, e, has_body| {
        if tag_name(e)? != "field" {
            return Ok(false);
        }
        fields.push(parse_field(reader, e, has_body)?);
        Ok(true)
    })?;

    Ok(fields)
}

/// Parses a single field element.
fn parse_field(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    has_body: bool,
) -> Result<Field, ParseError> {
    let mut id = None;
    let mut name = UNKNOWN_NAME.to_string();
    let mut type_name = DEFAULT_TYPE.to_string();
    let mut default = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr_value(&attr)?;

        match key {
            "id" => {
                id = Some(
                    parse_int(&value)
                        .and_then(|v| u8::try_from(v).ok())
                        .ok_or_else(|| ParseError::invalid_attr("field", "id", value.as_str()))?,
                )
            }
            "name" => name = value.to_string(),
            "type" => type_name = value.to_string(),
            "default" => default = Some(value.to_string()),
            _ => {}
        }
    }

    let mut field = Field::new(id.unwrap_or(0), name, type_name);
    field.default = default;

    if has_body {
        parse_qualifiers(reader, &mut field)?;
    }

    Ok(field)
}

/// Reads `entry`, `quality` and `mandatoryConform` children of a field or
/// attribute.
fn parse_qualifiers(reader: &mut Reader<&[u8]>, field: &mut Field) -> Result<(), ParseError> {
    for_each_child(reader, |_, e, _| {
        match tag_name(e)?.as_str() {
            "entry" => field.entry_type = attribute(e, "type")?,
            "quality" => {
                field.nullable =
                    attribute(e, "nullable")?.is_some_and(|v| v.eq_ignore_ascii_case("true"));
            }
            "mandatoryConform" => field.mandatory = true,
            _ => {}
        }
        Ok(false)
    })
}

/// Visits the direct children of the element whose start tag was just read.
///
/// `visit` receives the child's start tag and whether it has a body. It
/// returns `true` if it consumed the body; otherwise the body is skipped.
/// Returns after the parent's end tag.
fn for_each_child<'x, F>(reader: &mut Reader<&'x [u8]>, mut visit: F) -> Result<(), ParseError>
where
    F: FnMut(&mut Reader<&'x [u8]>, &BytesStart<'_>, bool) -> Result<bool, ParseError>,
{
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(XmlEvent::Start(ref e)) => {
                if !visit(reader, e, true)? {
                    skip_to_end(reader)?;
                }
            }
            Ok(XmlEvent::Empty(ref e)) => {
                visit(reader, e, false)?;
            }
            Ok(XmlEvent::End(_)) => break,
            Ok(XmlEvent::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Skips to the end of the current element.
fn skip_to_end(reader: &mut Reader<&[u8]>) -> Result<(), ParseError> {
    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(XmlEvent::Start(_)) => depth += 1,
            Ok(XmlEvent::End(_)) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(XmlEvent::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn tag_name(e: &BytesStart<'_>) -> Result<String, ParseError> {
    let name_bytes = e.name().as_ref().to_vec();
    Ok(std::str::from_utf8(&name_bytes)?.to_string())
}

/// Attribute value with entity and character references resolved.
fn attr_value(attr: &Attribute<'_>) -> Result<String, ParseError> {
    Ok(attr.unescape_value()?.into_owned())
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Result<Option<String>, ParseError> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key.as_bytes() {
            return attr_value(&attr).map(Some);
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL_CLUSTER: &str = r#"<?xml version="1.0"?>
<cluster xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" id="0x0008" name="Level Control" revision="5">
  <revisionHistory>
    <revision revision="1" summary="Initial"/>
  </revisionHistory>
  <classification hierarchy="base" role="application" picsCode="LVL" scope="Endpoint"/>
  <dataTypes>
    <enum name="MoveModeEnum">
      <item value="0" name="Up" summary="Increase the level"/>
      <item value="0x01" name="Down" summary="Decrease the level"/>
    </enum>
    <bitmap name="OptionsBitmap">
      <bitfield name="ExecuteIfOff" bit="0" summary="Dependency on On/Off cluster"/>
      <bitfield name="CoupleColorTempToLevel" bit="1" summary="Dependency on Color Control cluster"/>
      <bitfield name="Range" from="2" to="3" summary="Ranges are skipped"/>
    </bitmap>
    <struct name="StepStruct">
      <field id="0" name="StepSize" type="uint8">
        <mandatoryConform/>
      </field>
      <field id="1" name="Modes" type="list">
        <entry type="MoveModeEnum"/>
      </field>
    </struct>
  </dataTypes>
  <attributes>
    <attribute id="0x0000" name="CurrentLevel" type="uint8" default="null">
      <access read="true" readPrivilege="view"/>
      <quality changeOmitted="false" nullable="true" scene="true" persistence="nonVolatile"/>
      <mandatoryConform/>
    </attribute>
    <attribute id="0x0010" name="OnOffTransitionTime" type="uint16" default="0"/>
  </attributes>
  <commands>
    <command id="0x00" name="MoveToLevel" direction="commandToServer" response="Y">
      <access invokePrivilege="operate"/>
      <mandatoryConform/>
      <field id="0" name="Level" type="uint8">
        <mandatoryConform/>
      </field>
      <field id="1" name="TransitionTime" type="uint16" default="0">
        <quality nullable="true"/>
        <mandatoryConform/>
      </field>
    </command>
    <command id="0x04" name="MoveToLevelWithOnOff" direction="commandToServer" response="Y">
      <mandatoryConform/>
    </command>
    <command id="0x05" name="StepResponse" direction="responseFromServer">
      <field id="0" name="Status" type="uint8"/>
    </command>
  </commands>
  <events>
    <event id="0x00" name="LevelChanged" priority="critical">
      <field id="0" name="NewLevel" type="uint8"/>
    </event>
  </events>
</cluster>"#;

    #[test]
    fn test_parse_cluster_header() {
        let cluster = parse_cluster(LEVEL_CLUSTER).expect("Failed to parse cluster");

        assert_eq!(cluster.id, 8);
        assert_eq!(cluster.id_literal, "0x0008");
        assert_eq!(cluster.name, "Level Control");
    }

    #[test]
    fn test_parse_data_types() {
        let cluster = parse_cluster(LEVEL_CLUSTER).expect("Failed to parse cluster");

        let mode = cluster.enums.get("MoveModeEnum").expect("enum parsed");
        assert_eq!(mode.items.len(), 2);
        assert_eq!(mode.items[1].value, 1);
        assert_eq!(mode.items[1].summary, "Decrease the level");

        let options = cluster.bitmaps.get("OptionsBitmap").expect("bitmap parsed");
        assert_eq!(options.bitfields.len(), 2);
        assert_eq!(options.bitfields[1].bit, 1);

        let step = cluster.structs.get("StepStruct").expect("struct parsed");
        assert_eq!(step.fields.len(), 2);
        assert!(step.fields[0].mandatory);
        assert_eq!(step.fields[1].entry_type.as_deref(), Some("MoveModeEnum"));
    }

    #[test]
    fn test_parse_attributes() {
        let cluster = parse_cluster(LEVEL_CLUSTER).expect("Failed to parse cluster");

        assert_eq!(cluster.attributes.len(), 2);
        let current = &cluster.attributes[0];
        assert_eq!(current.name(), "CurrentLevel");
        assert!(current.field.nullable);
        assert_eq!(current.field.default.as_deref(), Some("null"));
        assert_eq!(cluster.attributes[1].numeric_id(), Some(0x10));
    }

    #[test]
    fn test_parse_commands_and_responses() {
        let cluster = parse_cluster(LEVEL_CLUSTER).expect("Failed to parse cluster");

        assert_eq!(cluster.commands.len(), 2);
        let move_to_level = &cluster.commands[0];
        assert_eq!(move_to_level.fields.len(), 2);
        assert!(move_to_level.fields[1].nullable);
        assert_eq!(move_to_level.fields[1].default.as_deref(), Some("0"));

        let with_on_off = &cluster.commands[1];
        assert_eq!(with_on_off.name, "MoveToLevelWithOnOff");
        assert_eq!(with_on_off.fields, move_to_level.fields);

        assert_eq!(cluster.responses.len(), 1);
        assert_eq!(cluster.responses[0].name, "StepResponse");
    }

    #[test]
    fn test_parse_events() {
        let cluster = parse_cluster(LEVEL_CLUSTER).expect("Failed to parse cluster");

        assert_eq!(cluster.events.len(), 1);
        assert_eq!(cluster.events[0].priority, "critical");
        assert_eq!(cluster.events[0].fields[0].name, "NewLevel");
    }

    #[test]
    fn test_parse_empty_cluster() {
        let cluster = parse_cluster(r#"<cluster id="0x0003" name="Identify"/>"#)
            .expect("Failed to parse cluster");

        assert_eq!(cluster.id, 3);
        assert!(cluster.attributes.is_empty());
        assert!(cluster.commands.is_empty());
        assert!(cluster.structs.is_empty());
    }

    #[test]
    fn test_parse_defaults_for_missing_attributes() {
        let xml = r#"<cluster>
  <attributes><attribute/></attributes>
  <dataTypes><struct name="S"><field/></struct></dataTypes>
</cluster>"#;
        let cluster = parse_cluster(xml).expect("Failed to parse cluster");

        assert_eq!(cluster.id, 0);
        assert_eq!(cluster.name, "Unknown");
        assert_eq!(cluster.attributes[0].field.type_name, "uint8");
        let field = &cluster.structs.get("S").expect("struct parsed").fields[0];
        assert_eq!(field.id, 0);
        assert_eq!(field.type_name, "uint8");
    }

    #[test]
    fn test_entity_references_resolved() {
        let xml = r#"<cluster id="0x0001" name="Fan &amp; Light">
  <dataTypes>
    <enum name="SpeedEnum">
      <item value="0" name="Low" summary="Speed &lt; 10&#37;"/>
    </enum>
    <struct name="S">
      <field id="0" name="Label" type="string" default="&quot;on&quot;"/>
    </struct>
  </dataTypes>
  <attributes>
    <attribute id="0x0000" name="Speed&amp;Mode" type="uint8"/>
  </attributes>
</cluster>"#;
        let cluster = parse_cluster(xml).expect("Failed to parse cluster");

        assert_eq!(cluster.name, "Fan & Light");
        assert_eq!(cluster.attributes[0].name(), "Speed&Mode");
        assert!(!cluster.attributes[0].field.rust_name().contains("amp"));
        let item = &cluster.enums.get("SpeedEnum").expect("enum parsed").items[0];
        assert_eq!(item.summary, "Speed < 10%");
        let field = &cluster.structs.get("S").expect("struct parsed").fields[0];
        assert_eq!(field.default.as_deref(), Some("\"on\""));
    }

    #[test]
    fn test_only_direct_children_are_read() {
        let xml = r#"<cluster id="1" name="X">
  <attributes>
    <attribute id="0x0001" name="Outer" type="uint8">
      <otherwiseConform>
        <attribute id="0x0002" name="Nested" type="uint8"/>
      </otherwiseConform>
    </attribute>
  </attributes>
</cluster>"#;
        let cluster = parse_cluster(xml).expect("Failed to parse cluster");

        assert_eq!(cluster.attributes.len(), 1);
        assert_eq!(cluster.attributes[0].name(), "Outer");
    }

    #[test]
    fn test_invalid_field_id() {
        let xml = r#"<cluster id="1" name="X">
  <dataTypes><struct name="S"><field id="300" name="Big" type="uint8"/></struct></dataTypes>
</cluster>"#;

        assert!(matches!(
            parse_cluster(xml),
            Err(ParseError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn test_missing_root() {
        assert!(matches!(
            parse_cluster("<?xml version=\"1.0\"?>"),
            Err(ParseError::MissingElement { .. })
        ));
    }

    #[test]
    fn test_parse_cluster_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("LevelControl.xml");
        std::fs::write(&path, LEVEL_CLUSTER).expect("Failed to write fixture");

        let cluster = parse_cluster_file(&path).expect("Failed to parse cluster");
        assert_eq!(cluster.name, "Level Control");

        assert!(matches!(
            parse_cluster_file(dir.path().join("missing.xml")),
            Err(ParseError::Io(_))
        ));
    }
}
