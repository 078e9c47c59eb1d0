//! Field lookup by JSON key, and discovery of fragment branches.

use alloc::vec::Vec;

use shapeql_core::{Field, Poke, Reflect};
use tracing::trace;

use crate::path::{Path, PathStep, deref_mut};

/// Finds the field a JSON key addresses.
///
/// A field with an explicit GraphQL name only matches that name, exactly.
/// Other fields match their declared name, ignoring ASCII case. Skipped,
/// fragment and embedded fields never match; fragments and embedded
/// structs receive keys through branches of their own.
pub fn field_index(fields: &[Field], key: &str) -> Option<usize> {
    fields.iter().position(|field| {
        if field.is_skipped() || field.is_fragment() || field.is_embedded() {
            return false;
        }
        match field.graphql_name {
            Some(name) => name == key,
            None => field.name.eq_ignore_ascii_case(key),
        }
    })
}

/// Finds the fragment and embedded fields reachable from objects that were
/// just opened at `seeds`.
///
/// The search is breadth-first and transitive: a fragment inside a fragment
/// is found in the same call. Unset optional fields are allocated on the way
/// so that their branch has somewhere to write. An `Option` fragment is
/// therefore `Some` whenever its enclosing object is present; only pruning,
/// once `__typename` confirms the type, sets it back to `None`.
pub(crate) fn discover(root: &mut dyn Reflect, seeds: &[Path]) -> Vec<Path> {
    let mut frontier: Vec<Path> = seeds.to_vec();
    let mut found = Vec::new();
    let mut next = 0;

    while let Some(path) = frontier.get(next).cloned() {
        next += 1;

        let Some(node) = path.resolve(root).and_then(deref_mut) else {
            continue;
        };
        let Poke::Struct(st) = node.poke() else {
            continue;
        };

        for (index, field) in st.fields().iter().enumerate() {
            if !field.is_spread() {
                continue;
            }
            if let Some(Poke::Option(opt)) = st.field_mut(index).map(|f| f.poke()) {
                opt.get_or_insert_default();
            }

            let child = path.child(PathStep::Field(index));
            trace!(
                field = field.name,
                condition = ?field.type_condition,
                "discovered branch at {child}"
            );
            frontier.push(child.clone());
            found.push(child);
        }
    }

    found
}
