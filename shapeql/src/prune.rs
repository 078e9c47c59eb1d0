//! Resets fragments that don't match the type reported by the server.
//!
//! A query on an interface or union selects one fragment per possible type,
//! and the server answers with the fields of all of them that apply. Once
//! `__typename` is known, only the fragment conditioned on that type is
//! meaningful. The others are reset to their default value.

use alloc::vec::Vec;

use shapeql_core::{Poke, Reflect, ReflectStruct, peek_str};
use tracing::debug;

/// Prunes `value` and everything below it, in place.
///
/// For each struct with a discriminator (`__typename`) field:
///
/// - if at least one direct fragment is conditioned on exactly the observed
///   type, every fragment conditioned on another type is reset;
/// - otherwise nothing is reset.
///
/// Unconditional fragments are never reset. Fields that survive are visited
/// recursively, including the elements of sequences. Pruning an already
/// pruned tree changes nothing.
pub fn prune(value: &mut dyn Reflect) {
    match value.poke() {
        Poke::Struct(st) => prune_struct(st),
        Poke::Option(opt) => {
            if let Some(inner) = opt.value_mut() {
                prune(inner);
            }
        }
        Poke::List(list) => {
            for index in 0..list.len() {
                if let Some(item) = list.item_mut(index) {
                    prune(item);
                }
            }
        }
        Poke::Scalar(_) => {}
    }
}

fn prune_struct(st: &mut dyn ReflectStruct) {
    let fields = st.fields();
    let cleared = fragments_to_clear(st);

    for (index, field) in fields.iter().enumerate() {
        if field.is_skipped() {
            continue;
        }
        let Some(child) = st.field_mut(index) else {
            continue;
        };
        if cleared.contains(&index) {
            debug!(
                field = field.name,
                condition = ?field.type_condition,
                "clearing fragment"
            );
            child.reset();
        } else {
            prune(child);
        }
    }
}

/// Indices of the fragments that don't match the observed type.
fn fragments_to_clear(st: &dyn ReflectStruct) -> Vec<usize> {
    let fields = st.fields();

    let observed = fields
        .iter()
        .position(|f| f.is_typename() && !f.is_skipped())
        .and_then(|index| st.field(index))
        .and_then(peek_str)
        .unwrap_or_default();
    if observed.is_empty() {
        return Vec::new();
    }

    let fragments = || {
        fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_fragment() && !f.is_skipped())
    };

    let confirmed = fragments().any(|(_, f)| f.type_condition == Some(observed));
    if !confirmed {
        return Vec::new();
    }

    fragments()
        .filter(|(_, f)| f.type_condition.is_some_and(|cond| cond != observed))
        .map(|(index, _)| index)
        .collect()
}
