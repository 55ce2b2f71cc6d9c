//! Per-cluster module generation.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use mattergen_schema::{AttributeField, ClusterIr};

use crate::config::CodegenConfig;
use crate::error::CodegenError;
use crate::rust::attributes::{ATTRIBUTE_LIST, JSON_DISPATCHER};
use crate::rust::codec::{HEX_HELPER, HEX_LIST_HELPER};
use crate::rust::{
    ATTRIBUTE_SECTION, AttributeGenerator, Codec, CommandGenerator, EnumGenerator,
    EventGenerator, Item, SECTIONS, StructGenerator, doc_text,
};

/// A definition left out because one of its generated names was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    /// Kind of the dropped definition, e.g. `struct`.
    pub kind: &'static str,
    /// Name of the dropped definition in the XML.
    pub source: String,
    /// Generated name that collided.
    pub name: String,
    /// Definition that already owns `name`.
    pub owner: String,
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' skipped: '{}' is already defined by {}",
            self.kind, self.source, self.name, self.owner
        )
    }
}

/// Names already taken in the module being generated, with their owners.
#[derive(Debug, Default)]
struct Claimed {
    types: HashMap<String, String>,
    functions: HashMap<String, String>,
    skipped: Vec<Skipped>,
}

impl Claimed {
    fn reserve_functions(&mut self, names: &[&str]) {
        for name in names {
            self.functions
                .insert((*name).to_string(), "a generated helper".to_string());
        }
    }

    /// Claims every name or none of them.
    fn claim(&mut self, cluster: &str, item: Item<'_>, types: &[String], functions: &[String]) -> bool {
        let taken = types
            .iter()
            .find_map(|t| self.types.get(t).map(|owner| (t, owner)))
            .or_else(|| {
                functions
                    .iter()
                    .find_map(|f| self.functions.get(f).map(|owner| (f, owner)))
            });
        if let Some((name, owner)) = taken {
            let skipped = Skipped {
                kind: item.kind(),
                source: item.name().to_string(),
                name: name.clone(),
                owner: owner.clone(),
            };
            tracing::warn!("{cluster}: {skipped}");
            self.skipped.push(skipped);
            return false;
        }
        let owner = format!("{} '{}'", item.kind(), item.name());
        for t in types {
            self.types.insert(t.clone(), owner.clone());
        }
        for f in functions {
            self.functions.insert(f.clone(), owner.clone());
        }
        true
    }
}

/// Generator for one cluster module.
pub struct Generator<'a> {
    ir: &'a ClusterIr,
    config: &'a CodegenConfig,
    source: &'a str,
}

impl<'a> Generator<'a> {
    /// Creates a new generator.
    #[must_use]
    pub fn new(ir: &'a ClusterIr, config: &'a CodegenConfig) -> Self {
        Self {
            ir,
            config,
            source: "",
        }
    }

    /// Sets the source file name recorded in the module header.
    #[must_use]
    pub fn with_source(mut self, source: &'a str) -> Self {
        self.source = source;
        self
    }

    /// Every emittable entity of the cluster, in output order.
    #[must_use]
    pub fn items(&self) -> Vec<Item<'a>> {
        let cluster = &self.ir.cluster;
        let mut items = Vec::new();
        items.extend(cluster.enums.iter().map(Item::Enum));
        items.extend(cluster.bitmaps.iter().map(Item::Bitmap));
        items.extend(cluster.structs.iter().map(Item::Struct));
        items.extend(cluster.commands.iter().map(Item::Command));
        items.extend(cluster.attributes.iter().map(Item::Attribute));
        items.extend(cluster.responses.iter().map(Item::Response));
        items.extend(cluster.events.iter().map(Item::Event));
        items
    }

    /// Generates the complete module source.
    #[must_use]
    pub fn generate(&self) -> String {
        self.generate_with_skipped().0
    }

    /// Generates the module source along with every definition that was left
    /// out because its name was already taken.
    #[must_use]
    pub fn generate_with_skipped(&self) -> (String, Vec<Skipped>) {
        let codec = Codec::new(self.ir);
        let emitters = Emitters {
            enums: EnumGenerator::new(self.ir),
            structs: StructGenerator::new(codec),
            commands: CommandGenerator::new(codec, self.config),
            attributes: AttributeGenerator::new(codec, self.config),
            events: EventGenerator::new(codec),
        };

        let cluster = &self.ir.cluster;
        let mut claimed = Claimed::default();
        claimed.reserve_functions(&[HEX_HELPER, HEX_LIST_HELPER]);
        if cluster.has_attributes() {
            claimed.reserve_functions(&[JSON_DISPATCHER, ATTRIBUTE_LIST]);
        }

        let mut sections: Vec<(usize, String)> = Vec::new();
        let mut decoders: HashSet<String> = HashSet::new();
        let mut decoded: Vec<&AttributeField> = Vec::new();

        for item in self.items() {
            let code = self.emit(&emitters, item, &mut claimed);
            if let Item::Attribute(attr) = item {
                let name = attr.decoder_name();
                if code.is_some() {
                    decoders.insert(name.clone());
                }
                if decoders.contains(&name) {
                    decoded.push(attr);
                }
            }
            let Some(code) = code else {
                tracing::debug!("{}: nothing generated for {}", cluster.name, item.name());
                continue;
            };
            match sections.last_mut() {
                Some((section, text)) if *section == item.section() => {
                    text.push_str(&code);
                    text.push('\n');
                }
                _ => sections.push((item.section(), format!("{code}\n"))),
            }
        }

        if cluster.has_attributes() {
            let dispatch = self.attribute_dispatch(&emitters, &decoded);
            match sections.iter_mut().find(|(s, _)| *s == ATTRIBUTE_SECTION) {
                Some((_, text)) => text.push_str(&dispatch),
                None => {
                    let at = sections
                        .iter()
                        .take_while(|(s, _)| *s < ATTRIBUTE_SECTION)
                        .count();
                    sections.insert(at, (ATTRIBUTE_SECTION, dispatch));
                }
            }
        }

        let mut body = String::new();
        for (section, text) in &sections {
            body.push_str(&format!("// {}\n\n", SECTIONS[*section]));
            body.push_str(text);
        }

        let mut output = self.header();
        let imports = self.imports(&body);
        if !imports.is_empty() {
            output.push_str(&imports);
            output.push('\n');
        }
        output.push_str(&body);
        while output.ends_with("\n\n") {
            output.pop();
        }
        (output, claimed.skipped)
    }

    fn emit(&self, emitters: &Emitters<'a>, item: Item<'a>, claimed: &mut Claimed) -> Option<String> {
        let cluster = &self.ir.cluster.name;
        match item {
            Item::Enum(e) => claimed
                .claim(cluster, item, &[e.rust_name()], &[])
                .then(|| emitters.enums.generate_enum(e)),
            Item::Bitmap(b) => claimed
                .claim(cluster, item, &[b.rust_name(), b.module_name()], &[])
                .then(|| emitters.enums.generate_bitmap(b)),
            Item::Struct(s) => claimed
                .claim(cluster, item, &[s.rust_name()], &[])
                .then(|| emitters.structs.generate_struct(s)),
            Item::Command(c) => {
                if c.fields.is_empty() {
                    return emitters.commands.generate_command(c);
                }
                let types = if emitters.commands.uses_params_struct(c) {
                    vec![c.params_struct_name()]
                } else {
                    Vec::new()
                };
                claimed
                    .claim(cluster, item, &types, &[c.encoder_name()])
                    .then(|| emitters.commands.generate_command(c))
                    .flatten()
            }
            Item::Attribute(a) => {
                emitters.attributes.decoder_kind(a)?;
                claimed
                    .claim(cluster, item, &[], &[a.decoder_name()])
                    .then(|| emitters.attributes.generate_decoder(a))
                    .flatten()
            }
            Item::Response(r) => {
                if r.fields.is_empty() {
                    return None;
                }
                claimed
                    .claim(cluster, item, &[r.rust_name()], &[r.decoder_name()])
                    .then(|| emitters.events.generate_response(r))
                    .flatten()
            }
            Item::Event(e) => {
                if e.fields.is_empty() {
                    return None;
                }
                claimed
                    .claim(cluster, item, &[e.rust_name()], &[e.decoder_name()])
                    .then(|| emitters.events.generate_event(e))
                    .flatten()
            }
        }
    }

    fn attribute_dispatch(&self, emitters: &Emitters<'a>, decoded: &[&AttributeField]) -> String {
        let mut output = emitters.attributes.generate_json_dispatcher(decoded);
        output.push('\n');
        output.push_str(
            &emitters
                .attributes
                .generate_attribute_list(&self.ir.cluster.attributes),
        );
        output.push('\n');
        output
    }

    fn header(&self) -> String {
        let cluster = &self.ir.cluster;
        let mut output = String::new();
        output.push_str(&format!(
            "//! Matter TLV encoders and decoders for {}\n",
            doc_text(&cluster.name)
        ));
        output.push_str(&format!("//! Cluster ID: {}\n", doc_text(&cluster.id_literal)));
        output.push_str("//!\n");
        if self.source.is_empty() {
            output.push_str("//! This file is automatically generated.\n\n");
        } else {
            output.push_str(&format!(
                "//! This file is automatically generated from {}\n\n",
                self.source
            ));
        }
        output
    }

    /// `use` lines for what the body references.
    fn imports(&self, body: &str) -> String {
        let mut output = String::new();
        if body.contains("tlv::") {
            output.push_str(&self.config.tlv_import());
            output.push('\n');
        }

        let helpers: Vec<&str> = [HEX_HELPER, HEX_LIST_HELPER]
            .into_iter()
            .filter(|h| body.contains(&format!("\"{h}\"")))
            .collect();
        match helpers.as_slice() {
            [] => {}
            [one] => output.push_str(&format!("use {}::{one};\n", self.config.helpers_path)),
            many => output.push_str(&format!(
                "use {}::{{{}}};\n",
                self.config.helpers_path,
                many.join(", ")
            )),
        }
        output
    }
}

/// Per-entity emitters sharing one codec.
struct Emitters<'a> {
    enums: EnumGenerator<'a>,
    structs: StructGenerator<'a>,
    commands: CommandGenerator<'a>,
    attributes: AttributeGenerator<'a>,
    events: EventGenerator<'a>,
}

/// Checks that generated source tokenizes as Rust.
///
/// # Errors
/// Returns `CodegenError::Lexical` if tokenization fails.
pub fn check_tokens(module: &str, code: &str) -> Result<(), CodegenError> {
    proc_macro2::TokenStream::from_str(code)
        .map(drop)
        .map_err(|e| CodegenError::Lexical {
            module: module.to_string(),
            message: e.to_string(),
        })
}
