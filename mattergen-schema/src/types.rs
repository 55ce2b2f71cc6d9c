//! Cluster data type definitions.
//!
//! This module contains the data structures for the type declarations found
//! under `<dataTypes>` (enums, bitmaps, structs), the field model shared by
//! structs, commands, responses and events, and the ordered symbol table
//! that stores them.

use std::collections::HashMap;

use crate::mapping::{IntType, WireTag};
use crate::naming::{constant_ident, field_ident, type_ident, variant_ident};

/// Suffix marking an enum type reference.
pub const ENUM_SUFFIX: &str = "Enum";
/// Suffix marking a bitmap type reference.
pub const BITMAP_SUFFIX: &str = "Bitmap";
/// Suffix marking a struct type reference.
pub const STRUCT_SUFFIX: &str = "Struct";
/// Matter type name of a list.
pub const LIST_TYPE: &str = "list";

/// A named declaration stored in a [`SymbolTable`].
pub trait Named {
    /// Name as written in the cluster XML.
    fn name(&self) -> &str;
}

/// Name-keyed table preserving declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for SymbolTable<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Named> SymbolTable<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a declaration. A later declaration with the same name
    /// replaces the earlier one in place.
    pub fn insert(&mut self, item: T) {
        match self.index.get(item.name()) {
            Some(&idx) => self.items[idx] = item,
            None => {
                self.index.insert(item.name().to_string(), self.items.len());
                self.items.push(item);
            }
        }
    }

    /// Looks up a declaration by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&T> {
        self.index.get(name).map(|&idx| &self.items[idx])
    }

    /// Returns true if a declaration with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterates in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Named> FromIterator<T> for SymbolTable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut table = Self::new();
        for item in iter {
            table.insert(item);
        }
        table
    }
}

impl<'a, T> IntoIterator for &'a SymbolTable<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Field of a struct, command, response or event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Context tag on the wire.
    pub id: u8,
    /// Field name.
    pub name: String,
    /// Matter type name.
    pub type_name: String,
    /// Element type when `type_name` is `list`.
    pub entry_type: Option<String>,
    /// Declared default literal.
    pub default: Option<String>,
    /// Whether the value may be null.
    pub nullable: bool,
    /// Whether the field carries a `mandatoryConform` marker.
    pub mandatory: bool,
}

impl Field {
    /// Creates a new field.
    #[must_use]
    pub fn new(id: u8, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            type_name: type_name.into(),
            entry_type: None,
            default: None,
            nullable: false,
            mandatory: false,
        }
    }

    /// Sets the list element type.
    #[must_use]
    pub fn with_entry_type(mut self, entry_type: impl Into<String>) -> Self {
        self.entry_type = Some(entry_type.into());
        self
    }

    /// Sets the default literal.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Marks the field nullable.
    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Returns true if the field is a list.
    #[must_use]
    pub fn is_list(&self) -> bool {
        self.type_name == LIST_TYPE
    }

    /// Classifies the field's type.
    #[must_use]
    pub fn type_ref(&self) -> TypeRef {
        if self.is_list() {
            TypeRef::List(self.entry_type.as_deref().map(|t| Box::new(TypeRef::classify(t))))
        } else {
            TypeRef::classify(&self.type_name)
        }
    }

    /// Rust identifier for the field.
    #[must_use]
    pub fn rust_name(&self) -> String {
        field_ident(&self.name)
    }
}

/// Category of a type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// Built-in or table-mapped type.
    Scalar(String),
    /// Reference to an enum.
    Enum(String),
    /// Reference to a bitmap.
    Bitmap(String),
    /// Reference to a struct.
    Struct(String),
    /// List with an optional element type.
    List(Option<Box<TypeRef>>),
}

impl TypeRef {
    /// Classifies a type name by its category suffix.
    #[must_use]
    pub fn classify(type_name: &str) -> Self {
        if type_name == LIST_TYPE {
            Self::List(None)
        } else if type_name.ends_with(ENUM_SUFFIX) {
            Self::Enum(type_name.to_string())
        } else if type_name.ends_with(BITMAP_SUFFIX) {
            Self::Bitmap(type_name.to_string())
        } else if type_name.ends_with(STRUCT_SUFFIX) {
            Self::Struct(type_name.to_string())
        } else {
            Self::Scalar(type_name.to_string())
        }
    }

    /// Struct named by this reference, directly or as list element.
    #[must_use]
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            Self::Struct(name) => Some(name),
            Self::List(Some(inner)) => inner.struct_name(),
            _ => None,
        }
    }
}

/// Single value of an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumItem {
    /// Numeric value.
    pub value: u64,
    /// Name as written in the XML.
    pub name: String,
    /// Rust variant identifier.
    pub variant: String,
    /// Summary text.
    pub summary: String,
}

/// Enum declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enum {
    /// Enum name.
    pub name: String,
    /// Items in declaration order.
    pub items: Vec<EnumItem>,
    /// Keep the `Enum` suffix in the Rust name.
    pub force_suffix: bool,
}

impl Enum {
    /// Creates a new empty enum.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
            force_suffix: false,
        }
    }

    /// Adds an item.
    pub fn add_item(&mut self, value: u64, name: impl Into<String>, summary: impl Into<String>) {
        let name = name.into();
        self.items.push(EnumItem {
            value,
            variant: variant_ident(&name),
            name,
            summary: summary.into(),
        });
    }

    /// Rust type name.
    #[must_use]
    pub fn rust_name(&self) -> String {
        type_ident(&self.name, ENUM_SUFFIX, self.force_suffix)
    }

    /// Smallest unsigned representation that holds every value.
    #[must_use]
    pub fn repr(&self) -> IntType {
        let max = self.items.iter().map(|i| i.value).max().unwrap_or(0);
        IntType::unsigned_for(max)
    }
}

impl Named for Enum {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Single flag of a bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitField {
    /// Bit position.
    pub bit: u32,
    /// Name as written in the XML.
    pub name: String,
    /// Rust constant identifier.
    pub constant: String,
    /// Summary text.
    pub summary: String,
}

impl BitField {
    /// Mask value, or `None` if the bit does not fit in 64 bits.
    #[must_use]
    pub fn mask(&self) -> Option<u64> {
        1u64.checked_shl(self.bit)
    }
}

/// Bitmap declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// Bitmap name.
    pub name: String,
    /// Flags in declaration order.
    pub bitfields: Vec<BitField>,
    /// Keep the `Bitmap` suffix in the Rust name.
    pub force_suffix: bool,
}

impl Bitmap {
    /// Creates a new empty bitmap.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bitfields: Vec::new(),
            force_suffix: false,
        }
    }

    /// Adds a flag.
    pub fn add_bitfield(&mut self, bit: u32, name: impl Into<String>, summary: impl Into<String>) {
        let name = name.into();
        self.bitfields.push(BitField {
            bit,
            constant: constant_ident(&name),
            name,
            summary: summary.into(),
        });
    }

    /// Rust type alias name.
    #[must_use]
    pub fn rust_name(&self) -> String {
        type_ident(&self.name, BITMAP_SUFFIX, self.force_suffix)
    }

    /// Name of the module holding the flag constants.
    #[must_use]
    pub fn module_name(&self) -> String {
        field_ident(&self.rust_name())
    }

    /// Underlying integer type, chosen from the highest bit position.
    #[must_use]
    pub fn base_type(&self) -> IntType {
        let max_bit = self.bitfields.iter().map(|b| b.bit).max().unwrap_or(0);
        if max_bit < 8 {
            IntType::U8
        } else if max_bit < 16 {
            IntType::U16
        } else if max_bit < 32 {
            IntType::U32
        } else {
            IntType::U64
        }
    }

    /// Wire encoding of the underlying integer.
    #[must_use]
    pub fn wire_tag(&self) -> WireTag {
        WireTag::from_int(self.base_type())
    }
}

impl Named for Bitmap {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Struct declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Struct {
    /// Struct name.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<Field>,
}

impl Struct {
    /// Creates a new empty struct.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field.
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Rust type name. Structs always drop the `Struct` suffix.
    #[must_use]
    pub fn rust_name(&self) -> String {
        type_ident(&self.name, STRUCT_SUFFIX, false)
    }
}

impl Named for Struct {
    fn name(&self) -> &str {
        &self.name
    }
}
