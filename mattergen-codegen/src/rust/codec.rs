//! Field-level TLV codec emission.
//!
//! Every generated field is `Option<T>` because the wire format is sparse:
//! decoding turns a missing or mistyped tag into `None` and encoding skips
//! `None` fields. Struct-typed fields are expanded inline, with bindings
//! suffixed by nesting depth so an inner scope never shadows an outer one.
//!
//! Snippets returned here start at column zero; continuation lines are
//! indented relative to the line the snippet is spliced into.

use std::collections::HashSet;
use std::fmt;

use mattergen_schema::elements::parse_int;
use mattergen_schema::mapping::{self, NativeType, ScalarType};
use mattergen_schema::{Bitmap, ClusterIr, Enum, Field, IntType, Struct, TypeRef, WireTag};

use super::{indent, indent_tail};

/// Tag written for anonymous list elements.
const LIST_ELEMENT_TAG: u8 = 0;

/// Helper serializing `Option<Vec<u8>>` as a hex string.
pub const HEX_HELPER: &str = "serialize_opt_bytes_as_hex";

/// Helper serializing `Option<Vec<Vec<u8>>>` as a list of hex strings.
pub const HEX_LIST_HELPER: &str = "serialize_opt_vec_bytes_as_hex";

/// Resolved representation of a single value.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    /// Fixed-width integer.
    Int {
        /// Rust type.
        native: IntType,
        /// Wire encoding.
        wire: WireTag,
    },
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Str,
    /// Octet string.
    Bytes,
    /// Locally declared enum.
    Enum(&'a Enum),
    /// Locally declared bitmap.
    Bitmap(&'a Bitmap),
    /// Locally declared struct.
    Struct(&'a Struct),
}

impl Shape<'_> {
    /// Rust type of the value.
    #[must_use]
    pub fn rust_type(&self) -> String {
        match self {
            Self::Int { native, .. } => native.rust_name().to_string(),
            Self::Bool => ScalarType::Bool.rust_name().to_string(),
            Self::Str => ScalarType::String.rust_name().to_string(),
            Self::Bytes => ScalarType::Bytes.rust_name().to_string(),
            Self::Enum(e) => e.rust_name(),
            Self::Bitmap(b) => b.rust_name(),
            Self::Struct(s) => s.rust_name(),
        }
    }

    /// Wire encoding of the value.
    #[must_use]
    pub fn wire(&self) -> WireTag {
        match self {
            Self::Int { wire, .. } => *wire,
            Self::Bool => WireTag::Bool,
            Self::Str => WireTag::String,
            Self::Bytes => WireTag::OctetString,
            Self::Enum(_) => WireTag::UInt8,
            Self::Bitmap(b) => b.wire_tag(),
            Self::Struct(_) => WireTag::StructAnon,
        }
    }

    /// Pattern matching this shape on a `tlv::TlvItemValue` and the
    /// expression extracting it from the binding `v`.
    ///
    /// The expression yields `T`, except for enums where it yields
    /// `Option<T>`. Structs have no single-pattern form.
    #[must_use]
    pub fn value_pattern(&self) -> Option<(&'static str, String)> {
        let pattern = match self {
            Self::Int { native, .. } => ("tlv::TlvItemValue::Int(v)", cast("*v", *native)),
            Self::Bool => ("tlv::TlvItemValue::Bool(v)", "*v".to_string()),
            Self::Str => ("tlv::TlvItemValue::String(v)", "v.clone()".to_string()),
            Self::Bytes => ("tlv::TlvItemValue::OctetString(v)", "v.clone()".to_string()),
            Self::Enum(e) => ("tlv::TlvItemValue::Int(v)", enum_from(e, "*v")),
            Self::Bitmap(b) => ("tlv::TlvItemValue::Int(v)", cast("*v", b.base_type())),
            Self::Struct(_) => return None,
        };
        Some(pattern)
    }
}

/// Shape of a field, or why it is left out.
#[derive(Debug, Clone)]
pub enum FieldShape<'a> {
    /// Single value.
    Single(Shape<'a>),
    /// List of values.
    List(Shape<'a>),
    /// Field omitted from the type and both codec directions.
    Omitted(Omission),
}

impl FieldShape<'_> {
    /// Rust type of the field value, without the `Option`.
    #[must_use]
    pub fn rust_type(&self) -> Option<String> {
        match self {
            Self::Single(shape) => Some(shape.rust_type()),
            Self::List(shape) => Some(format!("Vec<{}>", shape.rust_type())),
            Self::Omitted(_) => None,
        }
    }

    /// Serde helper rendering octet strings as hex.
    #[must_use]
    pub fn hex_helper(&self) -> Option<&'static str> {
        match self {
            Self::Single(Shape::Bytes) => Some(HEX_HELPER),
            Self::List(Shape::Bytes) => Some(HEX_LIST_HELPER),
            _ => None,
        }
    }
}

/// Reason a field has no generated representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Omission {
    /// Struct declared in another cluster.
    CrossCluster(String),
    /// Struct whose inline expansion would never terminate.
    Recursive(String),
    /// List without an `entry` type.
    MissingEntryType,
    /// List of lists.
    NestedList,
}

impl fmt::Display for Omission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CrossCluster(name) => write!(f, "{name} is not declared in this cluster"),
            Self::Recursive(name) => write!(f, "{name} refers back to its owner"),
            Self::MissingEntryType => f.write_str("list without entry type"),
            Self::NestedList => f.write_str("nested list"),
        }
    }
}

/// Struct container used when encoding a struct value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// Fields written in place of the value.
    Invisible,
    /// Anonymous struct; used for list elements.
    Anonymous,
}

impl Container {
    const fn variant(self) -> &'static str {
        match self {
            Self::Invisible => "StructInvisible",
            Self::Anonymous => "StructAnon",
        }
    }
}

/// Rust expression naming a value to encode.
#[derive(Debug, Clone)]
pub struct ValueRef {
    expr: String,
    by_ref: bool,
}

impl ValueRef {
    /// Value held by value (a parameter or a field of one).
    #[must_use]
    pub fn owned(expr: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            by_ref: false,
        }
    }

    /// Value held through a reference binding.
    #[must_use]
    pub fn borrowed(expr: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            by_ref: true,
        }
    }

    fn copied(&self) -> String {
        if self.by_ref {
            format!("*{}", self.expr)
        } else {
            self.expr.clone()
        }
    }

    fn cloned(&self) -> String {
        if self.by_ref {
            format!("{}.clone()", self.expr)
        } else {
            self.expr.clone()
        }
    }

    fn field(&self, name: &str) -> String {
        format!("{}.{}", self.expr, name)
    }
}

/// Emits decode and encode expressions for fields of one cluster.
#[derive(Debug, Clone, Copy)]
pub struct Codec<'a> {
    ir: &'a ClusterIr,
}

impl<'a> Codec<'a> {
    /// Creates a codec over a resolved cluster.
    #[must_use]
    pub fn new(ir: &'a ClusterIr) -> Self {
        Self { ir }
    }

    /// The resolved cluster.
    #[must_use]
    pub fn ir(&self) -> &'a ClusterIr {
        self.ir
    }

    /// Resolves the shape of `field`, declared inside struct `owner` if any.
    #[must_use]
    pub fn field_shape(&self, owner: Option<&str>, field: &Field) -> FieldShape<'a> {
        let resolved = match field.type_ref() {
            TypeRef::List(None) => Err(Omission::MissingEntryType),
            TypeRef::List(Some(entry)) => self.shape(owner, &entry).map(FieldShape::List),
            single => self.shape(owner, &single).map(FieldShape::Single),
        };
        resolved.unwrap_or_else(FieldShape::Omitted)
    }

    /// Fields that get a generated representation, with their shapes.
    ///
    /// Omitted fields and fields whose identifier repeats an earlier one are
    /// dropped, so struct definitions and both codec directions agree.
    #[must_use]
    pub fn fields<'f>(
        &self,
        owner: Option<&str>,
        fields: &'f [Field],
    ) -> Vec<(&'f Field, FieldShape<'a>)> {
        let mut seen = HashSet::new();
        let mut output = Vec::with_capacity(fields.len());
        for field in fields {
            let shape = self.field_shape(owner, field);
            if let FieldShape::Omitted(reason) = &shape {
                tracing::debug!(
                    "{}: omitting field '{}' ({reason})",
                    self.ir.cluster.name,
                    field.name
                );
                continue;
            }
            if !seen.insert(field.rust_name()) {
                tracing::debug!(
                    "{}: skipping duplicate field '{}'",
                    self.ir.cluster.name,
                    field.name
                );
                continue;
            }
            output.push((field, shape));
        }
        output
    }

    fn shape(&self, owner: Option<&str>, type_ref: &TypeRef) -> Result<Shape<'a>, Omission> {
        match type_ref {
            TypeRef::Scalar(name) => Ok(scalar_shape(name)),
            TypeRef::Enum(name) => Ok(self
                .ir
                .enums()
                .get(name)
                .map_or_else(|| fallback_shape(name), Shape::Enum)),
            TypeRef::Bitmap(name) => Ok(self
                .ir
                .bitmaps()
                .get(name)
                .map_or_else(|| fallback_shape(name), Shape::Bitmap)),
            TypeRef::Struct(name) => {
                let target = self
                    .ir
                    .structs()
                    .get(name)
                    .ok_or_else(|| Omission::CrossCluster(name.clone()))?;
                if owner.is_some_and(|owner| self.ir.is_recursive_edge(owner, name)) {
                    return Err(Omission::Recursive(name.clone()));
                }
                Ok(Shape::Struct(target))
            }
            TypeRef::List(_) => Err(Omission::NestedList),
        }
    }

    /// Struct-literal initializers (`name: expr,` lines) decoding `fields`
    /// out of the `tlv::TlvItem` binding `item`.
    #[must_use]
    pub fn decode_fields(
        &self,
        owner: Option<&str>,
        fields: &[Field],
        item: &str,
        depth: usize,
    ) -> String {
        let mut output = String::new();
        for (field, shape) in self.fields(owner, fields) {
            let expr = match shape {
                FieldShape::Single(shape) => self.decode_single(shape, item, field.id, depth),
                FieldShape::List(shape) => self.decode_list(shape, item, field.id, depth),
                FieldShape::Omitted(_) => continue,
            };
            output.push_str(&format!("{}: {},\n", field.rust_name(), expr));
        }
        output
    }

    /// Function body decoding the compound value `inp` into `rust_name`.
    ///
    /// A required decode returns `T` and fails on a non-compound value; an
    /// optional one returns `Option<T>` and yields `None` instead.
    #[must_use]
    pub fn decode_compound(
        &self,
        rust_name: &str,
        owner: Option<&str>,
        fields: &[Field],
        required: bool,
    ) -> String {
        let decoded = self.decode_fields(owner, fields, "item", 0);
        let (open, close, otherwise) = if required {
            ("Ok(", ")", "Err(anyhow::anyhow!(\"Expected struct fields\"))")
        } else {
            ("Ok(Some(", "))", "Ok(None)")
        };

        let mut output = String::new();
        output.push_str("if let tlv::TlvItemValue::List(_fields) = inp {\n");
        if !decoded.is_empty() {
            output.push_str("    let item = tlv::TlvItem { tag: 0, value: inp.clone() };\n");
        }
        output.push_str(&format!("    {open}{rust_name} {{\n"));
        output.push_str(&indent(&decoded, 2));
        output.push_str(&format!("    }}{close}\n"));
        output.push_str("} else {\n");
        output.push_str(&format!("    {otherwise}\n"));
        output.push_str("}\n");
        output
    }

    /// `Option<T>` expression reading tag `id` of `item`.
    fn decode_single(&self, shape: Shape<'a>, item: &str, id: u8, depth: usize) -> String {
        match shape {
            Shape::Int { native, .. } => {
                format!("{item}.get_int(&[{id}]){}", cast_map(native))
            }
            Shape::Bool => format!("{item}.get_bool(&[{id}])"),
            Shape::Str => format!("{item}.get_string_owned(&[{id}])"),
            Shape::Bytes => format!("{item}.get_octet_string_owned(&[{id}])"),
            Shape::Enum(e) => format!(
                "{item}.get_int(&[{id}]).and_then(|v| {})",
                enum_from(e, "v")
            ),
            Shape::Bitmap(b) => {
                format!("{item}.get_int(&[{id}]){}", cast_map(b.base_type()))
            }
            Shape::Struct(s) => self.decode_nested(s, item, id, depth),
        }
    }

    fn decode_nested(&self, target: &Struct, item: &str, id: u8, depth: usize) -> String {
        let value = format!("nested_tlv_{depth}");
        let nested = format!("nested_item_{depth}");
        let fields = self.decode_fields(Some(&target.name), &target.fields, &nested, depth + 1);

        let mut output = String::new();
        output.push_str(&format!("match {item}.get(&[{id}]) {{\n"));
        output.push_str(&format!(
            "    Some({value}) if matches!({value}, tlv::TlvItemValue::List(_)) => {{\n"
        ));
        if !fields.is_empty() {
            output.push_str(&format!(
                "        let {nested} = tlv::TlvItem {{ tag: {id}, value: {value}.clone() }};\n"
            ));
        }
        output.push_str(&format!("        Some({} {{\n", target.rust_name()));
        output.push_str(&indent(&fields, 3));
        output.push_str("        })\n");
        output.push_str("    }\n");
        output.push_str("    _ => None,\n");
        output.push('}');
        output
    }

    fn decode_list(&self, shape: Shape<'a>, item: &str, id: u8, depth: usize) -> String {
        let list = format!("list_{depth}");
        let mut output = String::new();
        output.push_str(&format!("match {item}.get(&[{id}]) {{\n"));
        output.push_str(&format!(
            "    Some(tlv::TlvItemValue::List({list})) => Some(\n"
        ));
        output.push_str(&format!("        {list}\n"));
        output.push_str("            .iter()\n");
        output.push_str(&indent(&self.decode_elements(shape, depth), 3));
        output.push_str("            .collect(),\n");
        output.push_str("    ),\n");
        output.push_str("    _ => None,\n");
        output.push('}');
        output
    }

    /// Iterator adaptor lines turning `&tlv::TlvItem` elements into values.
    ///
    /// Elements of the wrong shape are dropped.
    #[must_use]
    pub fn decode_elements(&self, shape: Shape<'a>, depth: usize) -> String {
        let elem = format!("e_{depth}");
        match shape {
            Shape::Struct(target) => {
                let fields =
                    self.decode_fields(Some(&target.name), &target.fields, &elem, depth + 1);
                let mut output = String::new();
                output.push_str(&format!(
                    ".filter(|{elem}| matches!({elem}.value, tlv::TlvItemValue::List(_)))\n"
                ));
                output.push_str(&format!(".map(|{elem}| {} {{\n", target.rust_name()));
                output.push_str(&indent(&fields, 1));
                output.push_str("})\n");
                output
            }
            other => format!(".filter_map(|{elem}| {})\n", element_decode(other, &elem)),
        }
    }

    /// `TlvItemValueEnc` expression for a value of the given shape.
    #[must_use]
    pub fn encode_value(
        &self,
        shape: Shape<'a>,
        value: &ValueRef,
        depth: usize,
        container: Container,
    ) -> String {
        match shape {
            Shape::Int { native, wire } => format!(
                "tlv::TlvItemValueEnc::{}({})",
                wire.variant(),
                wire_cast(&value.copied(), native, wire)
            ),
            Shape::Bool => format!("tlv::TlvItemValueEnc::Bool({})", value.copied()),
            Shape::Str => format!("tlv::TlvItemValueEnc::String({})", value.cloned()),
            Shape::Bytes => format!("tlv::TlvItemValueEnc::OctetString({})", value.cloned()),
            Shape::Enum(_) => format!("tlv::TlvItemValueEnc::UInt8({}.to_u8())", value.expr),
            Shape::Bitmap(b) => format!(
                "tlv::TlvItemValueEnc::{}({})",
                b.wire_tag().variant(),
                value.copied()
            ),
            Shape::Struct(target) => self.encode_struct(target, value, depth, container),
        }
    }

    /// `TlvItemValueEnc` expression for a field of the given shape.
    #[must_use]
    pub fn encode_field(&self, shape: &FieldShape<'a>, value: &ValueRef, depth: usize) -> Option<String> {
        match shape {
            FieldShape::Single(shape) => {
                Some(self.encode_value(*shape, value, depth, Container::Invisible))
            }
            FieldShape::List(shape) => Some(self.encode_list(*shape, value, depth)),
            FieldShape::Omitted(_) => None,
        }
    }

    fn encode_struct(
        &self,
        target: &Struct,
        value: &ValueRef,
        depth: usize,
        container: Container,
    ) -> String {
        let vec = format!("fields_{depth}");
        let pushes = self.encode_fields(target, value, &vec, depth);
        if pushes.is_empty() {
            return format!("tlv::TlvItemValueEnc::{}(Vec::new())", container.variant());
        }

        let mut output = String::new();
        output.push_str(&format!("tlv::TlvItemValueEnc::{}({{\n", container.variant()));
        output.push_str(&format!(
            "    let mut {vec}: Vec<tlv::TlvItemEnc> = Vec::new();\n"
        ));
        output.push_str(&indent(&pushes, 1));
        output.push_str(&format!("    {vec}\n"));
        output.push_str("})");
        output
    }

    /// Statements pushing every present field of the struct `value` onto
    /// the `Vec<tlv::TlvItemEnc>` binding `vec`.
    #[must_use]
    pub fn encode_fields(&self, target: &Struct, value: &ValueRef, vec: &str, depth: usize) -> String {
        let binding = format!("x_{depth}");
        let inner = ValueRef::borrowed(binding.clone());
        let mut output = String::new();
        for (field, shape) in self.fields(Some(&target.name), &target.fields) {
            let Some(expr) = self.encode_field(&shape, &inner, depth + 1) else {
                continue;
            };
            output.push_str(&format!(
                "if let Some({binding}) = &{} {{\n",
                value.field(&field.rust_name())
            ));
            output.push_str(&format!(
                "    {vec}.push(({}, {}).into());\n",
                field.id,
                indent_tail(&expr, 1)
            ));
            output.push_str("}\n");
        }
        output
    }

    fn encode_list(&self, shape: Shape<'a>, value: &ValueRef, depth: usize) -> String {
        let binding = format!("x_{depth}");
        let element = self.encode_value(
            shape,
            &ValueRef::borrowed(binding.clone()),
            depth + 1,
            Container::Anonymous,
        );

        let mut output = String::new();
        output.push_str("tlv::TlvItemValueEnc::StructAnon(\n");
        output.push_str(&format!("    {}\n", value.expr));
        output.push_str("        .iter()\n");
        output.push_str(&format!(
            "        .map(|{binding}| ({LIST_ELEMENT_TAG}, {}).into())\n",
            indent_tail(&element, 2)
        ));
        output.push_str("        .collect(),\n");
        output.push(')');
        output
    }

    /// `TlvItemValueEnc` expression for the command parameter `param`.
    ///
    /// Nullable parameters are `Option<T>`: scalars fall back to the
    /// declared default (or the type's zero value), structs and lists to an
    /// empty container.
    #[must_use]
    pub fn encode_param(&self, field: &Field, shape: &FieldShape<'a>, param: &str) -> Option<String> {
        if !field.nullable {
            return self.encode_field(shape, &ValueRef::owned(param), 0);
        }
        match shape {
            FieldShape::Single(Shape::Struct(target)) => Some(match_optional(
                param,
                &self.encode_struct(target, &ValueRef::borrowed("x_0"), 1, Container::Invisible),
                "StructInvisible(Vec::new())",
            )),
            FieldShape::Single(shape) => Some(encode_defaulted(*shape, param, field.default.as_deref())),
            FieldShape::List(shape) => Some(match_optional(
                param,
                &self.encode_list(*shape, &ValueRef::borrowed("x_0"), 1),
                "StructAnon(Vec::new())",
            )),
            FieldShape::Omitted(_) => None,
        }
    }
}

fn scalar_shape(matter_type: &str) -> Shape<'static> {
    if mapping::lookup(matter_type).is_none() {
        tracing::debug!("unregistered Matter type '{matter_type}', falling back to u8");
    }
    let wire = mapping::wire_type(matter_type, None);
    match mapping::native_type(matter_type, false, None, None) {
        NativeType::Scalar(ScalarType::Int(native)) => Shape::Int { native, wire },
        NativeType::Scalar(ScalarType::Bool) => Shape::Bool,
        NativeType::Scalar(ScalarType::String) => Shape::Str,
        NativeType::Scalar(ScalarType::Bytes) => Shape::Bytes,
        NativeType::Named(_) | NativeType::List(_) => fallback_shape(matter_type),
    }
}

/// Raw integer used for enum and bitmap names the cluster does not declare.
fn fallback_shape(name: &str) -> Shape<'static> {
    tracing::debug!("unresolved type '{name}', using u8");
    Shape::Int {
        native: IntType::U8,
        wire: mapping::FALLBACK_WIRE,
    }
}

/// `.map(..)` narrowing the `u64` returned by `get_int`.
fn cast_map(native: IntType) -> String {
    if native == IntType::U64 {
        String::new()
    } else {
        format!(".map(|v| v as {native})")
    }
}

fn cast(expr: &str, native: IntType) -> String {
    if native == IntType::U64 {
        expr.to_string()
    } else {
        format!("{expr} as {native}")
    }
}

/// Checked conversion of the `u64` expression `expr` into enum `e`.
fn enum_from(e: &Enum, expr: &str) -> String {
    let repr = e.repr();
    format!("{}::from_{repr}({})", e.rust_name(), cast(expr, repr))
}

fn wire_cast(expr: &str, native: IntType, wire: WireTag) -> String {
    match wire.int_type() {
        Some(int) if int != native => format!("{expr} as {int}"),
        _ => expr.to_string(),
    }
}

/// `Option<T>` expression decoding the `&tlv::TlvItem` binding `elem`.
fn element_decode(shape: Shape<'_>, elem: &str) -> String {
    let Some((pattern, value)) = shape.value_pattern() else {
        return "None".to_string();
    };
    let value = if matches!(shape, Shape::Enum(_)) {
        value
    } else {
        format!("Some({value})")
    };
    format!("if let {pattern} = &{elem}.value {{ {value} }} else {{ None }}")
}

fn match_optional(param: &str, some: &str, none: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("match &{param} {{\n"));
    output.push_str(&format!("    Some(x_0) => {},\n", indent_tail(some, 1)));
    output.push_str(&format!("    None => tlv::TlvItemValueEnc::{none},\n"));
    output.push('}');
    output
}

fn encode_defaulted(shape: Shape<'_>, param: &str, default: Option<&str>) -> String {
    let literal = default_literal(shape, default);
    let or_default = |literal: Option<String>| match literal {
        Some(literal) => format!("{param}.unwrap_or({literal})"),
        None => format!("{param}.unwrap_or_default()"),
    };
    match shape {
        Shape::Int { native, wire } => format!(
            "tlv::TlvItemValueEnc::{}({})",
            wire.variant(),
            wire_cast(&or_default(literal), native, wire)
        ),
        Shape::Bool => format!("tlv::TlvItemValueEnc::Bool({})", or_default(literal)),
        Shape::Str => match literal {
            Some(literal) => {
                format!("tlv::TlvItemValueEnc::String({param}.unwrap_or_else(|| {literal}))")
            }
            None => format!("tlv::TlvItemValueEnc::String({param}.unwrap_or_default())"),
        },
        Shape::Bytes => match literal {
            Some(literal) => format!(
                "tlv::TlvItemValueEnc::OctetString({param}.unwrap_or_else(|| {literal}))"
            ),
            None => format!("tlv::TlvItemValueEnc::OctetString({param}.unwrap_or_default())"),
        },
        Shape::Enum(_) => format!(
            "tlv::TlvItemValueEnc::UInt8({param}.map(|e| e.to_u8()).unwrap_or({}))",
            literal.as_deref().unwrap_or("0")
        ),
        Shape::Bitmap(b) => format!(
            "tlv::TlvItemValueEnc::{}({})",
            b.wire_tag().variant(),
            or_default(literal)
        ),
        Shape::Struct(_) => "tlv::TlvItemValueEnc::StructInvisible(Vec::new())".to_string(),
    }
}

/// Rust literal for a declared default, or `None` for the zero value.
fn default_literal(shape: Shape<'_>, default: Option<&str>) -> Option<String> {
    let raw = default.map(str::trim).filter(|d| !d.is_empty())?;
    if ["null", "none", "empty"]
        .iter()
        .any(|zero| raw.eq_ignore_ascii_case(zero))
    {
        return None;
    }
    match shape {
        Shape::Int { native, .. } => int_literal(raw, native),
        Shape::Bitmap(b) => int_literal(raw, b.base_type()),
        Shape::Enum(_) => int_literal(raw, IntType::U8),
        Shape::Bool => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" => Some("true".to_string()),
            "false" | "0" => Some("false".to_string()),
            _ => None,
        },
        Shape::Str => Some(format!("{raw:?}.to_string()")),
        Shape::Bytes => Some(format!("{raw:?}.as_bytes().to_vec()")),
        Shape::Struct(_) => None,
    }
}

/// Integer literal if `raw` parses and fits `native`.
fn int_literal(raw: &str, native: IntType) -> Option<String> {
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest.trim()),
        None => (false, raw),
    };
    let magnitude = i128::from(parse_int(digits)?);
    let value = if negative { -magnitude } else { magnitude };
    let (min, max) = int_range(native);
    if value < min || value > max {
        tracing::debug!("default {raw} does not fit {native}, using 0");
        return None;
    }
    match digits.get(2..) {
        Some(hex) if !negative && (digits.starts_with("0x") || digits.starts_with("0X")) => {
            Some(format!("0x{hex}"))
        }
        _ => Some(value.to_string()),
    }
}

fn int_range(native: IntType) -> (i128, i128) {
    match native {
        IntType::U8 => (0, i128::from(u8::MAX)),
        IntType::U16 => (0, i128::from(u16::MAX)),
        IntType::U32 => (0, i128::from(u32::MAX)),
        IntType::U64 => (0, i128::from(u64::MAX)),
        IntType::I8 => (i128::from(i8::MIN), i128::from(i8::MAX)),
        IntType::I16 => (i128::from(i16::MIN), i128::from(i16::MAX)),
        IntType::I32 => (i128::from(i32::MIN), i128::from(i32::MAX)),
        IntType::I64 => (i128::from(i64::MIN), i128::from(i64::MAX)),
    }
}
