//! # mattergen
//!
//! Generates Rust TLV encoders and decoders from Matter cluster XML.
//!
//! Each cluster document becomes one Rust module holding its enums,
//! bitmaps, structs, command encoders and attribute, command response and
//! event decoders. A batch run also emits global dispatchers that route a
//! cluster id to the matching module.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mattergen::codegen::{CodegenConfig, Orchestrator};
//!
//! let report = Orchestrator::new(CodegenConfig::default())
//!     .run("xml".as_ref(), "src/clusters/codec".as_ref())?;
//! println!("{} clusters generated", report.processed);
//! ```
//!
//! ## Crate Organization
//!
//! - [`schema`] - Cluster XML parsing, type mapping and symbol resolution
//! - [`codegen`] - Rust code generation and batch orchestration

/// Cluster XML parsing and symbol model.
pub mod schema {
    pub use mattergen_schema::*;
}

/// Code generation from cluster XML.
pub mod codegen {
    pub use mattergen_codegen::*;
}

pub use mattergen_codegen::{
    BatchReport, CodegenConfig, CodegenError, Orchestrator, Skipped, generate_from_file,
    generate_from_xml,
};
pub use mattergen_schema::{ClusterDef, ParseError, parse_cluster};
