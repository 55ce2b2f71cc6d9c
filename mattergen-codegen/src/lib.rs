//! # mattergen codegen
//!
//! Rust TLV encoder/decoder generation from Matter cluster XML.
//!
//! This crate provides:
//! - Enum, bitmap and struct generation
//! - Command encoder generation
//! - Attribute, command response and event decoder generation
//! - Per-cluster and global attribute dispatchers
//! - Batch generation over a directory of cluster files

pub mod config;
pub mod error;
pub mod generator;
pub mod orchestrator;
pub mod rust;

pub use config::CodegenConfig;
pub use error::CodegenError;
pub use generator::{Generator, Skipped};
pub use orchestrator::{BatchReport, GeneratedModule, ManifestEntry, Orchestrator};

/// Generates a Rust module from a cluster XML string.
///
/// # Arguments
/// * `xml` - Cluster XML content
///
/// # Returns
/// Generated Rust code as a string.
///
/// # Errors
/// Returns `CodegenError` if parsing fails or the generated module does not
/// tokenize.
pub fn generate_from_xml(xml: &str) -> Result<String, CodegenError> {
    let cluster = mattergen_schema::parse_cluster(xml)?;
    let ir = mattergen_schema::ClusterIr::from_cluster(&cluster);
    let config = CodegenConfig::default();
    let code = Generator::new(&ir, &config).generate();
    generator::check_tokens(&ir.cluster.name, &code)?;
    Ok(code)
}

/// Generates a Rust module from a cluster XML file.
///
/// # Arguments
/// * `path` - Path to the cluster XML file
///
/// # Returns
/// Generated Rust code as a string.
///
/// # Errors
/// Returns `CodegenError` if reading, parsing, or generation fails.
pub fn generate_from_file(path: &std::path::Path) -> Result<String, CodegenError> {
    let xml = std::fs::read_to_string(path)?;
    generate_from_xml(&xml)
}
