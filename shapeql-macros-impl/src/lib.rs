#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

mod rename;
pub use rename::RenameRule;

mod parsed;
pub use parsed::*;

mod derive;
pub use derive::*;
