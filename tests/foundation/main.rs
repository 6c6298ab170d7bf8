//! Integration tests for the foundation layer
//!
//! Tests for the ambient error type, runtime type names, and namespaces.

mod errors;
mod namespaces;
mod types;
