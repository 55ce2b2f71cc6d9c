//! Join artifacts spanning every generated cluster module.

use std::collections::HashSet;

use super::attributes::{ATTRIBUTE_LIST, JSON_DISPATCHER};
use crate::config::CodegenConfig;
use crate::orchestrator::ManifestEntry;

/// Module holding the global attribute JSON dispatcher.
pub const ATTRIBUTE_JSON_MODULE: &str = "attribute_json";

/// Module holding the global attribute name dispatcher.
pub const ATTRIBUTE_NAMES_MODULE: &str = "attribute_names";

/// Generator for the global dispatchers and `mod.rs`.
pub struct DispatchGenerator<'a> {
    manifest: &'a [ManifestEntry],
    config: &'a CodegenConfig,
}

impl<'a> DispatchGenerator<'a> {
    /// Creates a dispatch generator over a batch manifest.
    #[must_use]
    pub fn new(manifest: &'a [ManifestEntry], config: &'a CodegenConfig) -> Self {
        Self { manifest, config }
    }

    /// Clusters with attributes, one per cluster id, ordered by id.
    fn routed(&self) -> Vec<&'a ManifestEntry> {
        let mut entries: Vec<&ManifestEntry> =
            self.manifest.iter().filter(|e| e.has_attributes).collect();
        entries.sort_by(|a, b| {
            a.cluster_id
                .cmp(&b.cluster_id)
                .then_with(|| a.module_name.cmp(&b.module_name))
        });
        let mut seen = HashSet::new();
        entries.retain(|e| seen.insert(e.cluster_id));
        entries
    }

    /// Generates `attribute_json.rs`.
    #[must_use]
    pub fn attribute_json(&self) -> String {
        let mut output = String::new();
        output.push_str("//! Attribute JSON dispatcher across all generated clusters\n");
        output.push_str("//!\n");
        output.push_str("//! This file is automatically generated.\n\n");
        output.push_str(&self.config.tlv_import());
        output.push_str("\n\n");

        output.push_str("/// Decode an attribute of any generated cluster and return it as a JSON string\n");
        output.push_str("///\n");
        output.push_str("/// # Parameters\n");
        output.push_str("/// * `cluster_id` - The cluster identifier\n");
        output.push_str("/// * `attribute_id` - The attribute identifier\n");
        output.push_str("/// * `tlv_value` - The TLV value to decode\n");
        output.push_str(&format!(
            "pub fn {JSON_DISPATCHER}(cluster_id: u32, attribute_id: u32, tlv_value: &tlv::TlvItemValue) -> String {{\n"
        ));
        output.push_str("    match cluster_id {\n");
        for entry in self.routed() {
            output.push_str(&format!(
                "        {:#06x} => super::{}::{JSON_DISPATCHER}(cluster_id, attribute_id, tlv_value),\n",
                entry.cluster_id, entry.module_name
            ));
        }
        output.push_str(
            "        _ => format!(\"{{\\\"error\\\": \\\"Unsupported cluster ID: {}\\\"}}\", cluster_id),\n",
        );
        output.push_str("    }\n");
        output.push_str("}\n");
        output
    }

    /// Generates `attribute_names.rs`.
    #[must_use]
    pub fn attribute_names(&self) -> String {
        let mut output = String::new();
        output.push_str("//! Attribute name tables across all generated clusters\n");
        output.push_str("//!\n");
        output.push_str("//! This file is automatically generated.\n\n");

        output.push_str("/// Get the `(attribute_id, attribute_name)` list of a generated cluster\n");
        output.push_str("///\n");
        output.push_str("/// Unknown clusters yield an empty list.\n");
        output.push_str(&format!(
            "pub fn {ATTRIBUTE_LIST}(cluster_id: u32) -> Vec<(u32, &'static str)> {{\n"
        ));
        output.push_str("    match cluster_id {\n");
        for entry in self.routed() {
            output.push_str(&format!(
                "        {:#06x} => super::{}::{ATTRIBUTE_LIST}(),\n",
                entry.cluster_id, entry.module_name
            ));
        }
        output.push_str("        _ => vec![],\n");
        output.push_str("    }\n");
        output.push_str("}\n");
        output
    }

    /// Generates `mod.rs` declaring every cluster module and both
    /// dispatchers.
    #[must_use]
    pub fn mod_file(&self) -> String {
        let mut modules: Vec<&str> = self
            .manifest
            .iter()
            .map(|e| e.module_name.as_str())
            .chain([ATTRIBUTE_JSON_MODULE, ATTRIBUTE_NAMES_MODULE])
            .collect();
        modules.sort_unstable();
        modules.dedup();

        let mut output = String::new();
        output.push_str("//! Generated Matter cluster TLV encoders and decoders\n");
        output.push_str("//!\n");
        output.push_str("//! This file is automatically generated.\n\n");
        for module in modules {
            output.push_str(&format!("pub mod {module};\n"));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(cluster_id: u32, module: &str, has_attributes: bool) -> ManifestEntry {
        ManifestEntry {
            cluster_id,
            cluster_name: module.to_string(),
            module_name: module.to_string(),
            source_file: format!("{module}.xml"),
            has_attributes,
        }
    }

    fn manifest() -> Vec<ManifestEntry> {
        vec![
            entry(0x0008, "level_control", true),
            entry(0x0006, "on_off", true),
            entry(0x0006, "on_off_copy", true),
            entry(0x0003, "identify_commands", false),
        ]
    }

    #[test]
    fn test_attribute_json() {
        let manifest = manifest();
        let config = CodegenConfig::default();
        let code = DispatchGenerator::new(&manifest, &config).attribute_json();

        assert!(code.contains("use crate::tlv;\n"));
        assert!(code.contains(
            "        0x0006 => super::on_off::decode_attribute_json(cluster_id, attribute_id, tlv_value),\n"
        ));
        assert!(!code.contains("on_off_copy"));
        assert!(!code.contains("identify_commands"));
        let on_off = code.find("0x0006 =>").expect("on_off arm");
        let level = code.find("0x0008 =>").expect("level arm");
        assert!(on_off < level);
        assert!(code.contains("Unsupported cluster ID: {}"));
    }

    #[test]
    fn test_attribute_names() {
        let manifest = manifest();
        let config = CodegenConfig::default();
        let code = DispatchGenerator::new(&manifest, &config).attribute_names();

        assert!(code.contains("pub fn get_attribute_list(cluster_id: u32) -> Vec<(u32, &'static str)> {"));
        assert!(code.contains("        0x0008 => super::level_control::get_attribute_list(),\n"));
        assert!(code.contains("        _ => vec![],\n"));
    }

    #[test]
    fn test_mod_file() {
        let manifest = manifest();
        let config = CodegenConfig::default();
        let code = DispatchGenerator::new(&manifest, &config).mod_file();
        let declared: Vec<&str> = code.lines().filter(|l| l.starts_with("pub mod")).collect();
        assert_eq!(
            declared,
            vec![
                "pub mod attribute_json;",
                "pub mod attribute_names;",
                "pub mod identify_commands;",
                "pub mod level_control;",
                "pub mod on_off;",
                "pub mod on_off_copy;",
            ]
        );
    }
}
