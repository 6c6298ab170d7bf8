//! Integration tests for the language layer
//!
//! Tests for the lexer, the compiler, and the tree-walking interpreter.

mod compiler;
mod interpreter;
mod lexer;
