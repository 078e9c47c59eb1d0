#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![doc = include_str!("../README.md")]

extern crate alloc;

mod shape;
pub use shape::*;

pub mod tag;
pub use tag::Tag;

mod reflect;
pub use reflect::*;

mod scalar;
pub use scalar::*;

// Definitions for `core::` and `alloc::` types
mod impls;
