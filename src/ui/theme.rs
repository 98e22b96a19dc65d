// qdebug - ui/theme.rs
//
// Terminal colour scheme for the log file. The log is meant to be read with
// `tail -f` or `qtail`, so colours are plain ANSI SGR sequences.

/// An ANSI escape sequence that switches the terminal colour or weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colour(&'static str);

/// Argument names.
pub const BOLD: Colour = Colour("\x1b[1m");
/// Elapsed-time stamps.
pub const YELLOW: Colour = Colour("\x1b[33m");
/// Argument values.
pub const CYAN: Colour = Colour("\x1b[36m");
/// Reset everything.
pub const RESET: Colour = Colour("\x1b[0m");

/// Wrap `text` in `colour` followed by a reset.
pub fn colourise(text: &str, colour: Colour) -> String {
    let mut out = String::with_capacity(text.len() + colour.0.len() + RESET.0.len());
    out.push_str(colour.0);
    out.push_str(text);
    out.push_str(RESET.0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colourise_wraps_and_resets() {
        assert_eq!(colourise("x", CYAN), "\x1b[36mx\x1b[0m");
    }

    #[test]
    fn test_colourise_empty_text() {
        assert_eq!(colourise("", BOLD), "\x1b[1m\x1b[0m");
    }
}
