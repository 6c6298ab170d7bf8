//! Adder - Interactive shell for a small Python-flavoured scripting language
//!
//! This crate re-exports all layers of the Adder system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: adder_runtime    - Classification, continuation, completion, REPL, CLI
//! Layer 1: adder_language   - Lexer, parser, compiler, interpreter, builtins
//! Layer 0: adder_foundation - Core types (Error, Type, Namespace)
//! ```

pub use adder_foundation as foundation;
pub use adder_language as language;
pub use adder_runtime as runtime;
