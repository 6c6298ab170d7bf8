//! Core error types, type names, and persistent namespaces for Adder.
//!
//! This crate provides:
//! - [`Error`] - The ambient error type for everything outside the language itself
//! - [`Type`] - Runtime type names shared by the interpreter and the REPL
//! - [`Namespace`] - Persistent name-to-value mappings with O(1) snapshots

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod namespace;
mod types;

pub use error::{Error, ErrorKind};
pub use namespace::Namespace;
pub use types::Type;

/// Result type alias using the Adder error type.
pub type Result<T> = std::result::Result<T, Error>;
