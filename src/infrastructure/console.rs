//! Operator-facing console output.
//!
//! The monitor spends its life in raw mode, where a bare `\n` no longer
//! implies a carriage return, so every line is written with an explicit
//! `\r\n`. Diagnostics go through `tracing`; these helpers are only for
//! the lines an operator is meant to read at the rig.

use std::io::{self, Write};

/// Print one status line
pub fn message(text: &str) {
    let mut stdout = io::stdout();
    let _ = write!(stdout, "{}\r\n", text);
    let _ = stdout.flush();
}

/// Print a loud error banner set off by blank lines
pub fn alert(text: &str) {
    let mut stdout = io::stdout();
    let _ = write!(stdout, "\r\nERROR: {}\r\n\r\n", text);
    let _ = stdout.flush();
}
