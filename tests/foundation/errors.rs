//! Integration tests for error handling

use adder_foundation::{Error, ErrorKind, Result};

// =============================================================================
// Display
// =============================================================================

#[test]
fn io_error_reads_as_read_error() {
    assert_eq!(Error::io("EOF").to_string(), "read error: EOF");
}

#[test]
fn other_kinds_are_labelled() {
    assert_eq!(
        Error::editor("terminal closed").to_string(),
        "line editor error: terminal closed"
    );
    assert_eq!(
        Error::config("unknown option: -x").to_string(),
        "configuration error: unknown option: -x"
    );
    assert_eq!(Error::internal("oops").to_string(), "internal error: oops");
}

// =============================================================================
// Conversion
// =============================================================================

fn read_byte(mut input: &[u8]) -> Result<u8> {
    let mut byte = [0u8; 1];
    std::io::Read::read_exact(&mut input, &mut byte)?;
    Ok(byte[0])
}

#[test]
fn question_mark_converts_io_errors() {
    assert_eq!(read_byte(b"n").unwrap(), b'n');

    let err = read_byte(b"").unwrap_err();
    assert!(err.is_io());
    assert!(matches!(err.kind, ErrorKind::Io(_)));
}
