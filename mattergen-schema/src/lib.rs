//! # mattergen schema
//!
//! Matter cluster XML parser and symbol model.
//!
//! This crate provides:
//! - Identifier normalization for generated Rust code
//! - The Matter type to TLV wire type mapping table
//! - Data model for clusters (attributes, commands, events, enums, bitmaps, structs)
//! - Cluster XML parsing
//! - Per-cluster symbol resolution (shared struct injection, name collisions)

pub mod elements;
pub mod error;
pub mod ir;
pub mod mapping;
pub mod naming;
pub mod parser;
pub mod types;

pub use elements::{AttributeField, ClusterDef, Command, CommandDirection, CommandResponse, Event};
pub use error::ParseError;
pub use ir::ClusterIr;
pub use mapping::{IntType, NativeType, ScalarType, WireTag};
pub use parser::{parse_cluster, parse_cluster_file};
pub use types::{BitField, Bitmap, Enum, EnumItem, Field, Named, Struct, SymbolTable, TypeRef};
