//! Resolved per-cluster representation for code generation.
//!
//! [`ClusterIr::from_cluster`] runs the resolution passes on a parsed
//! cluster without mutating it:
//!
//! 1. Shared structs referenced but not declared locally are injected.
//! 2. Enums and bitmaps whose Rust name collides with a struct (bitmaps also
//!    with an enum) keep their category suffix. Structs always win.
//! 3. Enum variants and bitmap constants that normalize to the same
//!    identifier are made unique.
//! 4. Struct-to-struct edges that close a cycle are recorded so the emitter
//!    can leave them out of the generated types.

use std::collections::{HashMap, HashSet};

use crate::elements::ClusterDef;
use crate::types::{Bitmap, Enum, Field, Struct, SymbolTable};

/// Name of the location descriptor shared by several clusters.
pub const LOCATION_DESCRIPTOR_STRUCT: &str = "LocationDescriptorStruct";

/// Built-in definition for a struct shared across clusters.
#[must_use]
pub fn shared_struct(name: &str) -> Option<Struct> {
    match name {
        LOCATION_DESCRIPTOR_STRUCT => {
            let mut s = Struct::new(LOCATION_DESCRIPTOR_STRUCT);
            s.add_field(Field::new(0, "LocationName", "string"));
            s.add_field(Field::new(1, "FloorNumber", "uint16"));
            s.add_field(Field::new(2, "AreaType", "uint8"));
            Some(s)
        }
        _ => None,
    }
}

/// Returns the cluster's struct table with shared structs added where an
/// attribute or struct field references one that is not declared locally.
#[must_use]
pub fn inject_shared_structs(cluster: &ClusterDef) -> SymbolTable<Struct> {
    let mut structs = cluster.structs.clone();

    let referenced: Vec<&str> = cluster
        .attributes
        .iter()
        .map(|a| &a.field)
        .chain(cluster.structs.iter().flat_map(|s| s.fields.iter()))
        .flat_map(|f| std::iter::once(f.type_name.as_str()).chain(f.entry_type.as_deref()))
        .collect();

    for name in referenced {
        if structs.contains(name) {
            continue;
        }
        if let Some(shared) = shared_struct(name) {
            tracing::debug!("injecting shared struct {name} into {}", cluster.name);
            structs.insert(shared);
        }
    }

    structs
}

/// Forces the category suffix on enums and bitmaps whose Rust name collides
/// with a higher-priority declaration.
#[must_use]
pub fn resolve_collisions(
    enums: &SymbolTable<Enum>,
    bitmaps: &SymbolTable<Bitmap>,
    structs: &SymbolTable<Struct>,
) -> (SymbolTable<Enum>, SymbolTable<Bitmap>) {
    let struct_names: HashSet<String> = structs.iter().map(Struct::rust_name).collect();
    let enum_names: HashSet<String> = enums.iter().map(Enum::rust_name).collect();

    let enums = enums
        .iter()
        .map(|e| {
            let mut e = e.clone();
            if struct_names.contains(&e.rust_name()) {
                e.force_suffix = true;
            }
            e
        })
        .collect();

    let bitmaps = bitmaps
        .iter()
        .map(|b| {
            let mut b = b.clone();
            let name = b.rust_name();
            if struct_names.contains(&name) || enum_names.contains(&name) {
                b.force_suffix = true;
            }
            b
        })
        .collect();

    (enums, bitmaps)
}

/// Appends the item value to the second and later variants that share an
/// identifier.
#[must_use]
pub fn disambiguate_enum_items(enum_def: &Enum) -> Enum {
    let mut resolved = enum_def.clone();
    let mut seen = HashSet::new();
    for item in &mut resolved.items {
        if !seen.insert(item.variant.clone()) {
            item.variant = format!("{}{}", item.variant, item.value);
            seen.insert(item.variant.clone());
        }
    }
    resolved
}

/// Appends the bit position to the second and later constants that share
/// an identifier.
#[must_use]
pub fn disambiguate_bitfields(bitmap: &Bitmap) -> Bitmap {
    let mut resolved = bitmap.clone();
    let mut seen = HashSet::new();
    for field in &mut resolved.bitfields {
        if !seen.insert(field.constant.clone()) {
            field.constant = format!("{}_{}", field.constant, field.bit);
            seen.insert(field.constant.clone());
        }
    }
    resolved
}

/// Cluster with all per-cluster resolution applied.
#[derive(Debug, Clone)]
pub struct ClusterIr {
    /// Resolved cluster.
    pub cluster: ClusterDef,
    /// `(owner, target)` struct edges that would make a type infinitely sized.
    recursive_edges: HashSet<(String, String)>,
}

impl ClusterIr {
    /// Resolves a parsed cluster.
    #[must_use]
    pub fn from_cluster(cluster: &ClusterDef) -> Self {
        let structs = inject_shared_structs(cluster);
        let (enums, bitmaps) = resolve_collisions(&cluster.enums, &cluster.bitmaps, &structs);

        let resolved = ClusterDef {
            enums: enums.iter().map(disambiguate_enum_items).collect(),
            bitmaps: bitmaps.iter().map(disambiguate_bitfields).collect(),
            structs,
            ..cluster.clone()
        };

        let recursive_edges = find_recursive_edges(&resolved.structs);
        for (owner, target) in &recursive_edges {
            tracing::debug!("{}: omitting recursive field {owner} -> {target}", resolved.name);
        }

        Self {
            cluster: resolved,
            recursive_edges,
        }
    }

    /// Returns true if a field of type `target` inside struct `owner` would
    /// close a cycle.
    #[must_use]
    pub fn is_recursive_edge(&self, owner: &str, target: &str) -> bool {
        self.recursive_edges
            .contains(&(owner.to_string(), target.to_string()))
    }

    /// Enum table.
    #[must_use]
    pub fn enums(&self) -> &SymbolTable<Enum> {
        &self.cluster.enums
    }

    /// Bitmap table.
    #[must_use]
    pub fn bitmaps(&self) -> &SymbolTable<Bitmap> {
        &self.cluster.bitmaps
    }

    /// Struct table.
    #[must_use]
    pub fn structs(&self) -> &SymbolTable<Struct> {
        &self.cluster.structs
    }
}

/// Edges `owner -> target` where `target` is `owner` or can reach it.
fn find_recursive_edges(structs: &SymbolTable<Struct>) -> HashSet<(String, String)> {
    let graph: HashMap<&str, Vec<&str>> = structs
        .iter()
        .map(|s| {
            let targets = s
                .fields
                .iter()
                .filter_map(|f| {
                    let type_ref = f.type_ref();
                    type_ref
                        .struct_name()
                        .and_then(|n| structs.get(n))
                        .map(|t| t.name.as_str())
                })
                .collect();
            (s.name.as_str(), targets)
        })
        .collect();

    let mut edges = HashSet::new();
    for (&owner, targets) in &graph {
        for &target in targets {
            if target == owner || reaches(&graph, target, owner) {
                edges.insert((owner.to_string(), target.to_string()));
            }
        }
    }
    edges
}

fn reaches(graph: &HashMap<&str, Vec<&str>>, from: &str, to: &str) -> bool {
    let mut stack = vec![from];
    let mut visited = HashSet::new();
    while let Some(node) = stack.pop() {
        if node == to {
            return true;
        }
        if !visited.insert(node) {
            continue;
        }
        if let Some(next) = graph.get(node) {
            stack.extend(next.iter().copied());
        }
    }
    false
}
