//! Leaf decoding.
//!
//! Leaves are handed to `serde_json`: numbers are deserialized from their
//! exact source text, so no precision is lost on the way, everything else
//! goes through a [`serde_json::Value`].

use alloc::borrow::Cow;
use core::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// A single JSON scalar, as produced by a token source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Leaf<'a> {
    /// `null`
    Null,
    /// `true` or `false`
    Bool(bool),
    /// A number, in its original textual form
    Number(Cow<'a, str>),
    /// A string, with escapes already decoded
    String(Cow<'a, str>),
}

impl Leaf<'_> {
    /// Deserializes the leaf into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ScalarError> {
        let value = match self {
            Leaf::Number(text) => return serde_json::from_str(text).map_err(ScalarError::from),
            Leaf::Null => Value::Null,
            Leaf::Bool(b) => Value::Bool(*b),
            Leaf::String(s) => Value::String(s.clone().into_owned()),
        };
        serde_json::from_value(value).map_err(ScalarError::from)
    }

    /// Returns true for `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Leaf::Null)
    }

    /// JSON type name of the leaf, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Leaf::Null => "null",
            Leaf::Bool(_) => "boolean",
            Leaf::Number(_) => "number",
            Leaf::String(_) => "string",
        }
    }
}

impl fmt::Display for Leaf<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leaf::Null => f.write_str("null"),
            Leaf::Bool(b) => write!(f, "{b}"),
            Leaf::Number(n) => f.write_str(n),
            Leaf::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// A leaf could not be converted to the destination type.
///
/// Wraps the `serde_json` error unchanged.
#[derive(Debug)]
pub struct ScalarError {
    inner: serde_json::Error,
}

impl ScalarError {
    /// The underlying `serde_json` error.
    pub fn inner(&self) -> &serde_json::Error {
        &self.inner
    }
}

impl From<serde_json::Error> for ScalarError {
    fn from(inner: serde_json::Error) -> Self {
        Self { inner }
    }
}

impl fmt::Display for ScalarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl core::error::Error for ScalarError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(&self.inner)
    }
}

/// Implements [`Selection`](crate::Selection) for leaf types decoded with
/// `serde`.
///
/// The types must implement `serde::Deserialize` and `Default`. Use it to
/// register custom GraphQL scalars and enums:
///
/// ```
/// #[derive(Debug, Default, PartialEq, serde::Deserialize)]
/// #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// enum State {
///     #[default]
///     Open,
///     Closed,
/// }
///
/// shapeql_core::impl_scalar!(State);
/// ```
#[macro_export]
macro_rules! impl_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Selection for $ty {
                const SHAPE: &'static $crate::Shape = &$crate::Shape {
                    type_identifier: ::core::stringify!($ty),
                    def: $crate::Def::Scalar,
                };
            }

            impl $crate::Reflect for $ty {
                fn shape(&self) -> &'static $crate::Shape {
                    <Self as $crate::Selection>::SHAPE
                }

                fn peek(&self) -> $crate::Peek<'_> {
                    $crate::Peek::Scalar(self)
                }

                fn poke(&mut self) -> $crate::Poke<'_> {
                    $crate::Poke::Scalar(self)
                }

                fn reset(&mut self) {
                    *self = <Self as ::core::default::Default>::default();
                }
            }

            impl $crate::ReflectScalar for $ty {
                fn set_leaf(
                    &mut self,
                    leaf: &$crate::Leaf<'_>,
                ) -> ::core::result::Result<(), $crate::ScalarError> {
                    *self = leaf.deserialize::<Self>()?;
                    ::core::result::Result::Ok(())
                }
            }
        )+
    };
}
