//! Matter type to TLV wire type mapping.
//!
//! A single table drives both directions: which `TlvItemValueEnc` variant a
//! value is written with, and which Rust type carries it. Types not listed
//! here fall back to `UInt8`/`u8`; the orchestrator never fails on an
//! unknown type name.

use std::fmt;

use crate::types::{BITMAP_SUFFIX, Bitmap, ENUM_SUFFIX, Enum, LIST_TYPE, SymbolTable};

/// Fixed-width integer types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntType {
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
}

impl IntType {
    /// Returns the Rust type name.
    #[must_use]
    pub const fn rust_name(&self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
        }
    }

    /// Returns true for signed types.
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    /// Smallest unsigned type able to hold `value`.
    #[must_use]
    pub const fn unsigned_for(value: u64) -> Self {
        if value <= u8::MAX as u64 {
            Self::U8
        } else if value <= u16::MAX as u64 {
            Self::U16
        } else if value <= u32::MAX as u64 {
            Self::U32
        } else {
            Self::U64
        }
    }
}

impl fmt::Display for IntType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rust_name())
    }
}

/// TLV encoder variant used to write a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireTag {
    /// Unsigned 8-bit integer.
    UInt8,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Unsigned 64-bit integer.
    UInt64,
    /// Signed 8-bit integer.
    Int8,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    String,
    /// Octet string.
    OctetString,
    /// Anonymous structure; used for lists.
    StructAnon,
}

impl WireTag {
    /// Name of the `TlvItemValueEnc` variant.
    #[must_use]
    pub const fn variant(&self) -> &'static str {
        match self {
            Self::UInt8 => "UInt8",
            Self::UInt16 => "UInt16",
            Self::UInt32 => "UInt32",
            Self::UInt64 => "UInt64",
            Self::Int8 => "Int8",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Bool => "Bool",
            Self::String => "String",
            Self::OctetString => "OctetString",
            Self::StructAnon => "StructAnon",
        }
    }

    /// Integer type carried by this variant, if any.
    #[must_use]
    pub const fn int_type(&self) -> Option<IntType> {
        match self {
            Self::UInt8 => Some(IntType::U8),
            Self::UInt16 => Some(IntType::U16),
            Self::UInt32 => Some(IntType::U32),
            Self::UInt64 => Some(IntType::U64),
            Self::Int8 => Some(IntType::I8),
            Self::Int16 => Some(IntType::I16),
            Self::Int32 => Some(IntType::I32),
            Self::Int64 => Some(IntType::I64),
            _ => None,
        }
    }

    /// Variant that carries the given integer type.
    #[must_use]
    pub const fn from_int(int: IntType) -> Self {
        match int {
            IntType::U8 => Self::UInt8,
            IntType::U16 => Self::UInt16,
            IntType::U32 => Self::UInt32,
            IntType::U64 => Self::UInt64,
            IntType::I8 => Self::Int8,
            IntType::I16 => Self::Int16,
            IntType::I32 => Self::Int32,
            IntType::I64 => Self::Int64,
        }
    }
}

impl fmt::Display for WireTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.variant())
    }
}

/// Rust scalar carried by a mapped Matter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// Fixed-width integer.
    Int(IntType),
    /// `bool`
    Bool,
    /// `String`
    String,
    /// `Vec<u8>`
    Bytes,
}

impl ScalarType {
    /// Returns the Rust type name.
    #[must_use]
    pub const fn rust_name(&self) -> &'static str {
        match self {
            Self::Int(int) => int.rust_name(),
            Self::Bool => "bool",
            Self::String => "String",
            Self::Bytes => "Vec<u8>",
        }
    }
}

/// Rust type of a value after mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeType {
    /// A built-in scalar.
    Scalar(ScalarType),
    /// A generated enum or bitmap type.
    Named(String),
    /// A list of the inner type.
    List(Box<NativeType>),
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => f.write_str(scalar.rust_name()),
            Self::Named(name) => f.write_str(name),
            Self::List(inner) => write!(f, "Vec<{inner}>"),
        }
    }
}

/// One row of the mapping table.
#[derive(Debug, Clone, Copy)]
pub struct TypeMapping {
    /// Matter type name as written in cluster XML.
    pub matter: &'static str,
    /// Wire encoding.
    pub wire: WireTag,
    /// Rust scalar; `None` for `list`, whose element decides the type.
    pub native: Option<ScalarType>,
}

const fn row(matter: &'static str, wire: WireTag, native: Option<ScalarType>) -> TypeMapping {
    TypeMapping {
        matter,
        wire,
        native,
    }
}

const fn int(matter: &'static str, wire: WireTag, native: IntType) -> TypeMapping {
    row(matter, wire, Some(ScalarType::Int(native)))
}

/// Mapping table for every Matter type the generator understands.
pub const TYPE_MAP: &[TypeMapping] = &[
    int("uint8", WireTag::UInt8, IntType::U8),
    int("uint16", WireTag::UInt16, IntType::U16),
    int("uint32", WireTag::UInt32, IntType::U32),
    int("uint64", WireTag::UInt64, IntType::U64),
    int("int8", WireTag::Int8, IntType::I8),
    int("int16", WireTag::Int16, IntType::I16),
    int("int32", WireTag::Int32, IntType::I32),
    int("int64", WireTag::Int64, IntType::I64),
    row("bool", WireTag::Bool, Some(ScalarType::Bool)),
    row("string", WireTag::String, Some(ScalarType::String)),
    int("epoch-s", WireTag::UInt64, IntType::U64),
    int("epoch-us", WireTag::UInt64, IntType::U64),
    int("elapsed-s", WireTag::UInt32, IntType::U32),
    int("power-mW", WireTag::UInt32, IntType::U32),
    int("energy-mWh", WireTag::UInt64, IntType::U64),
    int("temperature", WireTag::Int16, IntType::I16),
    row("octstr", WireTag::OctetString, Some(ScalarType::Bytes)),
    row(LIST_TYPE, WireTag::StructAnon, None),
    int("devtype-id", WireTag::UInt32, IntType::U32),
    int("cluster-id", WireTag::UInt32, IntType::U32),
    int("endpoint-no", WireTag::UInt16, IntType::U16),
    int("node-id", WireTag::UInt64, IntType::U64),
    int("vendor-id", WireTag::UInt16, IntType::U16),
    int("subject-id", WireTag::UInt64, IntType::U64),
    int("SubjectID", WireTag::UInt64, IntType::U64),
    int("attribute-id", WireTag::UInt32, IntType::U32),
    int("enum8", WireTag::UInt8, IntType::U8),
    int("enum16", WireTag::UInt16, IntType::U16),
    int("bitmap8", WireTag::UInt8, IntType::U8),
    int("bitmap16", WireTag::UInt16, IntType::U16),
    int("bitmap32", WireTag::UInt32, IntType::U32),
];

/// Wire encoding for types absent from the table.
pub const FALLBACK_WIRE: WireTag = WireTag::UInt8;

/// Rust type for types absent from the table.
pub const FALLBACK_NATIVE: ScalarType = ScalarType::Int(IntType::U8);

/// Looks up a Matter type in the table.
#[must_use]
pub fn lookup(matter_type: &str) -> Option<&'static TypeMapping> {
    TYPE_MAP.iter().find(|m| m.matter == matter_type)
}

/// Wire encoding for a Matter type.
///
/// Enums are always written as `UInt8`. Bitmaps use the width of their
/// declared bit positions when `bitmaps` resolves them.
#[must_use]
pub fn wire_type(matter_type: &str, bitmaps: Option<&SymbolTable<Bitmap>>) -> WireTag {
    if matter_type.ends_with(ENUM_SUFFIX) {
        return WireTag::UInt8;
    }
    if matter_type.ends_with(BITMAP_SUFFIX) {
        return bitmaps
            .and_then(|b| b.get(matter_type))
            .map(Bitmap::wire_tag)
            .unwrap_or(WireTag::UInt8);
    }
    lookup(matter_type).map_or(FALLBACK_WIRE, |m| m.wire)
}

/// Rust type for a Matter type.
///
/// Enums and bitmaps resolve to their generated type name when the
/// corresponding table knows them and to `u8` otherwise. `is_list` (or the
/// bare `list` type) wraps the result in `Vec`.
#[must_use]
pub fn native_type(
    matter_type: &str,
    is_list: bool,
    enums: Option<&SymbolTable<Enum>>,
    bitmaps: Option<&SymbolTable<Bitmap>>,
) -> NativeType {
    let base = if matter_type.ends_with(ENUM_SUFFIX) {
        enums
            .and_then(|e| e.get(matter_type))
            .map_or(NativeType::Scalar(FALLBACK_NATIVE), |e| {
                NativeType::Named(e.rust_name())
            })
    } else if matter_type.ends_with(BITMAP_SUFFIX) {
        bitmaps
            .and_then(|b| b.get(matter_type))
            .map_or(NativeType::Scalar(FALLBACK_NATIVE), |b| {
                NativeType::Named(b.rust_name())
            })
    } else {
        NativeType::Scalar(
            lookup(matter_type)
                .and_then(|m| m.native)
                .unwrap_or(FALLBACK_NATIVE),
        )
    };

    if is_list || matter_type == LIST_TYPE {
        NativeType::List(Box::new(base))
    } else {
        base
    }
}
