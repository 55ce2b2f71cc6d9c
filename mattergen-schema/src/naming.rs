//! Identifier normalization.
//!
//! Matter XML uses free-form names (`OnOff`, `WiFiNetworkManagement`,
//! `Reserved for future use`, `2.4GHz`). Everything emitted into Rust source
//! goes through the functions in this module so that the output is always a
//! valid, stable identifier.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::mapping::{ScalarType, TYPE_MAP};

/// Abbreviations collapsed before case splitting, applied in order.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("WiFi", "Wifi"),
    ("RFID", "Rfid"),
    ("HTTP", "Http"),
    ("HTTPS", "Https"),
    ("XML", "Xml"),
    ("JSON", "Json"),
    ("API", "Api"),
    ("URL", "Url"),
    ("URI", "Uri"),
    ("UUID", "Uuid"),
    ("TCP", "Tcp"),
    ("UDP", "Udp"),
    ("MAC", "Mac"),
    ("DNS", "Dns"),
    ("SSL", "Ssl"),
    ("TLS", "Tls"),
    ("PIN", "Pin"),
    ("ACL", "Acl"),
    ("ICD", "Icd"),
    ("OTA", "Ota"),
    ("PKI", "Pki"),
    ("CO", "Co"),
];

/// Words that cannot be used as bare identifiers.
pub const RESERVED_WORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use", "where",
    "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "union", "gen",
];

static NUMERIC_OR_ID_TYPES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    TYPE_MAP
        .iter()
        .filter(|m| matches!(m.native, Some(ScalarType::Int(_))))
        .map(|m| m.matter)
        .collect()
});

/// Converts a CamelCase name to snake_case.
///
/// Known abbreviations are collapsed first so that `ClearRFIDCode` becomes
/// `clear_rfid_code` rather than `clear_r_f_i_d_code`. The conversion is
/// idempotent.
pub fn to_snake_case(name: &str) -> String {
    let mut name = name.to_string();
    for (from, to) in ABBREVIATIONS {
        name = name.replace(from, to);
    }

    // XMLHttp -> XML_Http
    let chars: Vec<char> = name.chars().collect();
    let mut split = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0
            && c.is_ascii_uppercase()
            && chars[i - 1].is_ascii_uppercase()
            && chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase())
        {
            split.push('_');
        }
        split.push(c);
    }

    // getHttp -> get_Http
    let chars: Vec<char> = split.chars().collect();
    let mut out = String::with_capacity(split.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0
            && c.is_ascii_uppercase()
            && (chars[i - 1].is_ascii_lowercase() || chars[i - 1].is_ascii_digit())
        {
            out.push('_');
        }
        out.push(c);
    }

    let mut result = String::with_capacity(out.len());
    for c in out.chars() {
        if c == '_' && result.ends_with('_') {
            continue;
        }
        result.extend(c.to_lowercase());
    }
    result.trim_matches('_').to_string()
}

/// Converts a snake_case name to PascalCase.
///
/// Names that already start with an uppercase letter are returned unchanged.
pub fn to_pascal_case(name: &str) -> String {
    if name.chars().next().is_some_and(char::is_uppercase) {
        return name.to_string();
    }
    name.split('_').map(capitalize).collect()
}

/// Appends `_` to names that collide with a reserved word.
pub fn escape_reserved_word(name: &str) -> String {
    if RESERVED_WORDS.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// Returns true if the Matter type maps to a fixed-width integer.
pub fn is_numeric_or_id_type(matter_type: &str) -> bool {
    NUMERIC_OR_ID_TYPES.contains(matter_type)
}

/// Identifier for a struct field, function parameter or function name suffix.
pub fn field_ident(name: &str) -> String {
    let snake = to_snake_case(name);
    let mut ident = String::with_capacity(snake.len());
    for c in snake.chars() {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else {
            '_'
        };
        if c == '_' && ident.ends_with('_') {
            continue;
        }
        ident.push(c);
    }
    let ident = ident.trim_matches('_');
    if ident.is_empty() {
        return "field".to_string();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("_{ident}");
    }
    escape_reserved_word(ident)
}

/// Identifier for a generated enum, bitmap or struct type.
///
/// The trailing category `suffix` (`Enum`, `Bitmap`, `Struct`) is stripped
/// unless `keep_suffix` is set or nothing would remain. Characters that
/// cannot appear in an identifier act as word separators.
pub fn type_ident(name: &str, suffix: &str, keep_suffix: bool) -> String {
    let base = match name.strip_suffix(suffix) {
        Some(stripped) if !keep_suffix && !stripped.is_empty() => stripped,
        _ => name,
    };
    let ident: String = base
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(upper_first)
        .collect();
    if ident.is_empty() {
        return "Unknown".to_string();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("_{ident}");
    }
    escape_reserved_word(&ident)
}

/// Identifier for an enum variant.
///
/// Parts are joined with their first letter uppercased and the remainder
/// left alone, so `Reserved for future use` becomes `ReservedForFutureUse`.
pub fn variant_ident(name: &str) -> String {
    let ident: String = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(upper_first)
        .collect();
    if ident.is_empty() {
        return "Unknown".to_string();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("_{ident}");
    }
    escape_reserved_word(&ident)
}

/// Identifier for a bitmap flag constant (`SCREAMING_SNAKE_CASE`).
pub fn constant_ident(name: &str) -> String {
    let mut ident = String::with_capacity(name.len() + 4);
    for c in to_snake_case(name).chars() {
        let c = if c.is_ascii_alphanumeric() {
            c.to_ascii_uppercase()
        } else {
            '_'
        };
        if c == '_' && ident.ends_with('_') {
            continue;
        }
        ident.push(c);
    }
    let ident = ident.trim_matches('_');
    if ident.is_empty() {
        return "UNKNOWN".to_string();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("BIT_{ident}");
    }
    ident.to_string()
}

/// Module name for a generated cluster file, derived from the XML file stem.
///
/// The stem is snake-cased, characters outside `[a-z0-9_]` become `_`, and
/// a name that does not start with a letter or `_` gets a `cluster_` prefix.
pub fn module_ident(stem: &str) -> String {
    let mut ident = String::with_capacity(stem.len() + 8);
    for c in to_snake_case(stem).chars() {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else {
            '_'
        };
        if c == '_' && ident.ends_with('_') {
            continue;
        }
        ident.push(c);
    }
    let ident = ident.trim_matches('_');
    if ident.is_empty() {
        return "cluster".to_string();
    }
    if !ident.starts_with(|c: char| c.is_ascii_lowercase()) {
        return format!("cluster_{ident}");
    }
    escape_reserved_word(ident)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case_abbreviations() {
        assert_eq!(to_snake_case("ClearRFIDCode"), "clear_rfid_code");
        assert_eq!(to_snake_case("SetPINCode"), "set_pin_code");
        assert_eq!(to_snake_case("OnOff"), "on_off");
        assert_eq!(to_snake_case("XMLHttpRequest"), "xml_http_request");
        assert_eq!(to_snake_case("WiFiNetworkManagement"), "wifi_network_management");
        assert_eq!(to_snake_case("COConcentration"), "co_concentration");
    }

    #[test]
    fn test_snake_case_idempotent() {
        for name in [
            "ClearRFIDCode",
            "WiFiNetworkManagement",
            "Wifi5GHzBand",
            "HTTPS2Proxy",
            "OnOff",
            "ABCDef",
            "level_control",
            "Node2Node",
            "__x__",
        ] {
            let once = to_snake_case(name);
            assert_eq!(to_snake_case(&once), once, "not idempotent for {name}");
        }
    }

    #[test]
    fn test_snake_case_digits_and_underscores() {
        assert_eq!(to_snake_case("Level2Control"), "level2_control");
        assert_eq!(to_snake_case("__Double__Under__"), "double_under");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(to_pascal_case("SolicitOffer"), "SolicitOffer");
        assert_eq!(to_pascal_case("solicit_offer"), "SolicitOffer");
        assert_eq!(to_pascal_case("move_TO_level"), "MoveToLevel");
    }

    #[test]
    fn test_escape_reserved_word() {
        assert_eq!(escape_reserved_word("type"), "type_");
        assert_eq!(escape_reserved_word("match"), "match_");
        assert_eq!(escape_reserved_word("Self"), "Self_");
        assert_eq!(escape_reserved_word("gen"), "gen_");
        assert_eq!(escape_reserved_word("level"), "level");
    }

    #[test]
    fn test_numeric_or_id_types() {
        assert!(is_numeric_or_id_type("uint16"));
        assert!(is_numeric_or_id_type("int8"));
        assert!(is_numeric_or_id_type("node-id"));
        assert!(is_numeric_or_id_type("bitmap32"));
        assert!(is_numeric_or_id_type("temperature"));
        assert!(!is_numeric_or_id_type("string"));
        assert!(!is_numeric_or_id_type("octstr"));
        assert!(!is_numeric_or_id_type("bool"));
        assert!(!is_numeric_or_id_type("list"));
        assert!(!is_numeric_or_id_type("ModeEnum"));
    }

    #[test]
    fn test_field_ident() {
        assert_eq!(field_ident("Type"), "type_");
        assert_eq!(field_ident("OptionsMask"), "options_mask");
        assert_eq!(field_ident("2.4GHz"), "_2_4_g_hz");
        assert_eq!(field_ident("Temp (C)"), "temp_c");
        assert_eq!(field_ident("???"), "field");
    }

    #[test]
    fn test_type_ident_strips_suffix() {
        assert_eq!(type_ident("ModeEnum", "Enum", false), "Mode");
        assert_eq!(type_ident("ModeEnum", "Enum", true), "ModeEnum");
        assert_eq!(type_ident("Enum", "Enum", false), "Enum");
        assert_eq!(type_ident("FeatureBitmap", "Bitmap", false), "Feature");
        assert_eq!(type_ident("LevelEnumStruct", "Struct", false), "LevelEnum");
        assert_eq!(type_ident("Door-Lock Struct", "Struct", false), "DoorLock");
        assert_eq!(type_ident("3DModeEnum", "Enum", false), "_3DMode");
    }

    #[test]
    fn test_variant_ident() {
        assert_eq!(variant_ident("Reserved for future use"), "ReservedForFutureUse");
        assert_eq!(variant_ident("ReservedForFutureUse"), "ReservedForFutureUse");
        assert_eq!(variant_ident("on_off"), "OnOff");
        assert_eq!(variant_ident("2.4GHz"), "_24GHz");
        assert_eq!(variant_ident(""), "Unknown");
        assert_eq!(variant_ident("Self"), "Self_");
    }

    #[test]
    fn test_constant_ident() {
        assert_eq!(constant_ident("OnOff"), "ON_OFF");
        assert_eq!(constant_ident("Lighting"), "LIGHTING");
        assert_eq!(constant_ident("5GHz"), "BIT_5_G_HZ");
        assert_eq!(constant_ident("--"), "UNKNOWN");
    }

    #[test]
    fn test_module_ident() {
        assert_eq!(module_ident("OnOff"), "on_off");
        assert_eq!(module_ident("Door-Lock"), "door_lock");
        assert_eq!(module_ident("Level Control"), "level_control");
        assert_eq!(module_ident("3DPrinter"), "cluster_3_d_printer");
        assert_eq!(module_ident("Match"), "match_");
    }
}
