//! Operator-facing output for the release pipeline.
//!
//! Every stage reports progress as plain lines on an injected writer so the
//! binary can target stdout while tests capture the text. Problems are
//! prefixed with severity tokens (`ERROR:`, `WARNING:`); there is no
//! structured format.

use std::fmt::Display;
use std::io::Write;

/// Line printed after every stage completed.
pub const SUCCESS_LINE: &str = "SUCCESS!";

/// Write a single line, ignoring write failures.
///
/// Progress output is best effort; a closed stdout must not turn a good
/// release into a failed one.
pub fn write_line(out: &mut dyn Write, message: impl Display) {
    if writeln!(out, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}

/// Write an `ERROR:` line.
pub fn write_error_line(out: &mut dyn Write, message: impl Display) {
    write_line(out, format_args!("ERROR: {message}"));
}

/// Write a `WARNING:` line.
pub fn write_warning_line(out: &mut dyn Write, message: impl Display) {
    write_line(out, format_args!("WARNING: {message}"));
}
