//! Addressing values inside a result tree.
//!
//! A destination is stored as the list of steps leading to it from the
//! root, and resolved again every time it is used. Branches therefore never
//! hold references into the tree.

use alloc::vec::Vec;
use core::fmt;

use shapeql_core::{Poke, Reflect};

/// One step from a value to one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PathStep {
    /// Field of a struct, by index
    Field(usize),
    /// Element of a sequence
    Index(usize),
}

/// Location of a value, relative to the root of the result tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Path(Vec<PathStep>);

impl Path {
    /// The root itself.
    pub(crate) fn root() -> Self {
        Self(Vec::new())
    }

    /// This path extended by one step.
    pub(crate) fn child(&self, step: PathStep) -> Self {
        let mut steps = Vec::with_capacity(self.0.len() + 1);
        steps.extend_from_slice(&self.0);
        steps.push(step);
        Self(steps)
    }

    /// Finds the value at this path, looking through `Some` options on the
    /// way. Returns `None` if a step leads nowhere.
    pub(crate) fn resolve<'a>(&self, mut node: &'a mut dyn Reflect) -> Option<&'a mut dyn Reflect> {
        for step in &self.0 {
            node = deref_mut(node)?;
            node = match (node.poke(), *step) {
                (Poke::Struct(st), PathStep::Field(index)) => st.field_mut(index)?,
                (Poke::List(list), PathStep::Index(index)) => list.item_mut(index)?,
                _ => return None,
            };
        }
        Some(node)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for step in &self.0 {
            match step {
                PathStep::Field(index) => write!(f, ".{index}")?,
                PathStep::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Looks through options. Returns `None` for an option that is unset.
pub(crate) fn deref_mut(mut node: &mut dyn Reflect) -> Option<&mut dyn Reflect> {
    while node.shape().is_option() {
        match node.poke() {
            Poke::Option(opt) => node = opt.value_mut()?,
            _ => return None,
        }
    }
    Some(node)
}
