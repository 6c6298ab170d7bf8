//! Integration tests for the REPL front-end
//!
//! Tests for classification, continuation, completion, sessions, and the
//! interactive loop.

mod classify;
mod completion;
mod continuation;
mod repl;
mod session;
