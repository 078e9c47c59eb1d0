use core::fmt;

use bitflags::bitflags;

/// Static description of a type that can receive a GraphQL result.
///
/// Shapes are computed once per type (by `#[derive(Selection)]` or by the
/// impls in this crate) and live in `'static` memory.
#[derive(Clone, Copy, Debug)]
pub struct Shape {
    /// Name of the type, without generic arguments (`Vec`, `Option`, `User`)
    pub type_identifier: &'static str,

    /// What kind of value this is
    pub def: Def,
}

impl Shape {
    /// Fields of a struct shape, or an empty slice for anything else.
    pub fn fields(&self) -> &'static [Field] {
        match self.def {
            Def::Struct(st) => st.fields,
            _ => &[],
        }
    }

    /// Returns true if this shape is a sequence.
    pub fn is_list(&self) -> bool {
        matches!(self.def, Def::List(_))
    }

    /// Returns true if this shape is an optional wrapper.
    pub fn is_option(&self) -> bool {
        matches!(self.def, Def::Option(_))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.def {
            Def::List(list) => write!(f, "{}<{}>", self.type_identifier, list.item),
            Def::Option(opt) => write!(f, "{}<{}>", self.type_identifier, opt.inner),
            Def::Scalar | Def::Struct(_) => f.write_str(self.type_identifier),
        }
    }
}

/// The kind of value a [`Shape`] describes.
#[derive(Clone, Copy, Debug)]
pub enum Def {
    /// A leaf, decoded from a single JSON scalar
    Scalar,
    /// A struct with GraphQL-annotated fields
    Struct(StructType),
    /// A growable sequence (`Vec<T>`)
    List(ListDef),
    /// A nullable value (`Option<T>`)
    Option(OptionDef),
}

/// Fields of a struct.
#[derive(Clone, Copy, Debug)]
pub struct StructType {
    /// Fields in declaration order; indices are used by paths
    pub fields: &'static [Field],
}

/// Sequence definition.
#[derive(Clone, Copy, Debug)]
pub struct ListDef {
    /// Shape of each element
    pub item: &'static Shape,
}

/// Optional wrapper definition.
#[derive(Clone, Copy, Debug)]
pub struct OptionDef {
    /// Shape of the wrapped value
    pub inner: &'static Shape,
}

bitflags! {
    /// Structural role of a field.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u8 {
        /// `... on Type` or `...Spread`: receives keys of the enclosing object
        const FRAGMENT = 1 << 0;
        /// Receives the `__typename` reported by the server
        const TYPENAME = 1 << 1;
        /// Embedded substructure sharing the enclosing object's keys
        const EMBEDDED = 1 << 2;
        /// Never read from or written to
        const SKIP = 1 << 3;
    }
}

/// Describes one field of a struct shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    /// Declared name, after any `rename_all` rule
    pub name: &'static str,

    /// Name given explicitly in the GraphQL tag, matched exactly
    pub graphql_name: Option<&'static str>,

    /// Type condition of a fragment (`User` in `... on User`)
    pub type_condition: Option<&'static str>,

    /// Structural role of the field
    pub flags: FieldFlags,
}

impl Field {
    /// A plain field matched by its declared name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            graphql_name: None,
            type_condition: None,
            flags: FieldFlags::empty(),
        }
    }

    /// Sets the explicit GraphQL name (an alias or the selected field).
    pub const fn graphql_name(mut self, graphql_name: &'static str) -> Self {
        self.graphql_name = Some(graphql_name);
        self
    }

    /// Marks the field as an inline fragment, optionally type-conditioned.
    ///
    /// An `Option` fragment is allocated as soon as its enclosing object
    /// opens, so `None` only ever comes from pruning: it means the observed
    /// `__typename` matched another fragment's condition.
    pub const fn fragment(mut self, type_condition: Option<&'static str>) -> Self {
        self.type_condition = type_condition;
        self.flags = self.flags.union(FieldFlags::FRAGMENT);
        self
    }

    /// Marks the field as the `__typename` receiver.
    pub const fn typename(mut self) -> Self {
        self.graphql_name = Some(TYPENAME);
        self.flags = self.flags.union(FieldFlags::TYPENAME);
        self
    }

    /// Marks the field as an embedded substructure.
    pub const fn embedded(mut self) -> Self {
        self.flags = self.flags.union(FieldFlags::EMBEDDED);
        self
    }

    /// Excludes the field from decoding and pruning.
    pub const fn skip(mut self) -> Self {
        self.flags = self.flags.union(FieldFlags::SKIP);
        self
    }

    /// Returns true for `...` fields.
    #[inline]
    pub fn is_fragment(&self) -> bool {
        self.flags.contains(FieldFlags::FRAGMENT)
    }

    /// Returns true for the `__typename` receiver.
    #[inline]
    pub fn is_typename(&self) -> bool {
        self.flags.contains(FieldFlags::TYPENAME)
    }

    /// Returns true for embedded substructures.
    #[inline]
    pub fn is_embedded(&self) -> bool {
        self.flags.contains(FieldFlags::EMBEDDED)
    }

    /// Returns true for skipped fields.
    #[inline]
    pub fn is_skipped(&self) -> bool {
        self.flags.contains(FieldFlags::SKIP)
    }

    /// Returns true if the field opens a branch of its own instead of being
    /// addressed by a JSON key.
    #[inline]
    pub fn is_spread(&self) -> bool {
        !self.is_skipped() && (self.is_fragment() || self.is_embedded())
    }
}

/// Name of the GraphQL discriminator field.
pub const TYPENAME: &str = "__typename";
