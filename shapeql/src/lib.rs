#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![doc = include_str!("../README.md")]

extern crate alloc;

// Lets `#[derive(Selection)]` refer to `::shapeql` from inside this crate.
extern crate self as shapeql;

pub use shapeql_core::*;
pub use shapeql_macros::Selection;

mod error;
pub use error::*;

mod options;
pub use options::*;

mod tokenizer;
pub use tokenizer::*;

mod deserialize;
pub use deserialize::Decoder;

mod path;

mod prune;
pub use prune::prune;

mod resolve;
pub use resolve::field_index;

/// Decodes a GraphQL response body from a string.
pub fn from_str<T: Selection>(input: &str) -> Result<T> {
    from_slice(input.as_bytes())
}

/// Decodes a GraphQL response body from a string, with options.
pub fn from_str_with_options<T: Selection>(input: &str, options: &DecodeOptions) -> Result<T> {
    from_slice_with_options(input.as_bytes(), options)
}

/// Decodes a GraphQL response body from bytes.
pub fn from_slice<T: Selection>(input: &[u8]) -> Result<T> {
    from_slice_with_options(input, &DecodeOptions::default())
}

/// Decodes a GraphQL response body from bytes, with options.
pub fn from_slice_with_options<T: Selection>(input: &[u8], options: &DecodeOptions) -> Result<T> {
    let mut value = T::default();
    from_slice_into_with_options(input, &mut value, options)?;
    Ok(value)
}

/// Decodes a GraphQL response body into an existing value.
///
/// Sequences in `target` are replaced, options are reused when set, and
/// fields the document doesn't mention are left alone.
pub fn from_str_into<T: Reflect>(input: &str, target: &mut T) -> Result<()> {
    from_slice_into(input.as_bytes(), target)
}

/// Decodes a GraphQL response body into an existing value, with options.
pub fn from_str_into_with_options<T: Reflect>(
    input: &str,
    target: &mut T,
    options: &DecodeOptions,
) -> Result<()> {
    from_slice_into_with_options(input.as_bytes(), target, options)
}

/// Decodes a GraphQL response body from bytes into an existing value.
pub fn from_slice_into<T: Reflect>(input: &[u8], target: &mut T) -> Result<()> {
    from_slice_into_with_options(input, target, &DecodeOptions::default())
}

/// Decodes a GraphQL response body from bytes into an existing value, with
/// options.
///
/// The document must hold exactly one JSON value. Trailing data is reported
/// only once that value has been decoded, and pruning runs last.
pub fn from_slice_into_with_options<T: Reflect>(
    input: &[u8],
    target: &mut T,
    options: &DecodeOptions,
) -> Result<()> {
    let mut decoder = Decoder::from_slice(input).with_options(options.clone());
    decoder.drive(target)?;
    decoder.finish()?;
    if options.prune {
        prune(target);
    }
    Ok(())
}
