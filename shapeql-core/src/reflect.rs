use crate::{Field, Leaf, ScalarError, Shape};

/// Object-safe access to a value whose layout is described by a [`Shape`].
///
/// The decoder only ever talks to the result tree through this trait, so
/// everything reachable from a decode target must implement it. It is
/// implemented for scalars, `Option<T>`, `Vec<T>`, `Box<T>` and every type
/// deriving `Selection`.
pub trait Reflect {
    /// Static description of this value's type.
    fn shape(&self) -> &'static Shape;

    /// Read-only view of the value.
    fn peek(&self) -> Peek<'_>;

    /// Mutable view of the value.
    fn poke(&mut self) -> Poke<'_>;

    /// Resets the value to its default (zero) state.
    fn reset(&mut self);
}

/// A type that can be the target of a GraphQL response decode.
pub trait Selection: Reflect + Default + 'static {
    /// Static description of this type.
    const SHAPE: &'static Shape;
}

/// Read-only view of a reflected value.
pub enum Peek<'a> {
    /// A leaf value
    Scalar(&'a dyn ReflectScalar),
    /// A struct with fields
    Struct(&'a dyn ReflectStruct),
    /// A sequence
    List(&'a dyn ReflectList),
    /// An optional value, with its contents if present
    Option(Option<&'a dyn Reflect>),
}

/// Mutable view of a reflected value.
pub enum Poke<'a> {
    /// A leaf value
    Scalar(&'a mut dyn ReflectScalar),
    /// A struct with fields
    Struct(&'a mut dyn ReflectStruct),
    /// A sequence
    List(&'a mut dyn ReflectList),
    /// An optional value
    Option(&'a mut dyn ReflectOption),
}

/// Leaf values, written from a single JSON scalar.
pub trait ReflectScalar {
    /// Converts `leaf` to this type and stores it.
    fn set_leaf(&mut self, leaf: &Leaf<'_>) -> Result<(), ScalarError>;

    /// The value as a string, for string-like scalars.
    fn as_str(&self) -> Option<&str> {
        None
    }
}

/// Struct access by field index.
pub trait ReflectStruct {
    /// Field metadata, in declaration order.
    fn fields(&self) -> &'static [Field];

    /// The field at `index`, or `None` if it is skipped or out of range.
    fn field(&self, index: usize) -> Option<&dyn Reflect>;

    /// Mutable access to the field at `index`.
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

/// Sequence access.
pub trait ReflectList {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Returns true if there are no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element at `index`.
    fn item(&self, index: usize) -> Option<&dyn Reflect>;

    /// Mutable access to the element at `index`.
    fn item_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Appends a default element and returns its index.
    fn push_default(&mut self) -> usize;

    /// Removes all elements.
    fn clear(&mut self);
}

/// Optional value access.
pub trait ReflectOption {
    /// Shape of the wrapped type.
    fn inner_shape(&self) -> &'static Shape;

    /// The wrapped value, if present.
    fn value(&self) -> Option<&dyn Reflect>;

    /// Mutable access to the wrapped value, if present.
    fn value_mut(&mut self) -> Option<&mut dyn Reflect>;

    /// Returns the wrapped value, allocating a default one if absent.
    fn get_or_insert_default(&mut self) -> &mut dyn Reflect;

    /// Sets the value to `None`.
    fn set_none(&mut self);
}

/// Returns the value as a string, looking through optional wrappers.
///
/// Used to read discriminators, which may be declared as `String` or
/// `Option<String>`.
pub fn peek_str(value: &dyn Reflect) -> Option<&str> {
    match value.peek() {
        Peek::Scalar(scalar) => scalar.as_str(),
        Peek::Option(Some(inner)) => peek_str(inner),
        Peek::Option(None) | Peek::Struct(_) | Peek::List(_) => None,
    }
}
