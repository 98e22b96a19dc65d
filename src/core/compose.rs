// qdebug - core/compose.rs
//
// Lays blobs out behind the elapsed-time stamp, wrapping at a maximum width.
//
//   0.000s a=1 b=2 c=Config {
//              name: "x",
//          }
//
// Continuation lines, both from wrapping and from newlines inside a blob,
// are indented to the column just after the stamp.

use crate::core::render::display_width;
use crate::ui::theme::{self, YELLOW};

/// Compose one log entry: `timestamp blob blob ...\n`, wrapped at
/// `max_width` display columns.
///
/// The first blob on a physical line is never moved to the next line, so a
/// single oversized blob still gets written.
pub fn compose(timestamp: &str, blobs: &[String], max_width: usize) -> String {
    // +1 for the space after the stamp.
    let stamp_width = display_width(timestamp) + 1;
    let indent = " ".repeat(stamp_width);
    let newline_indent = format!("\n{indent}");

    let mut out = theme::colourise(timestamp, YELLOW);
    out.push(' ');

    let mut line_width = stamp_width;
    let mut line_blobs = 0usize;
    for blob in blobs {
        let blob_width = display_width(blob);
        let separator = usize::from(line_blobs > 0);

        if line_blobs > 0 && line_width + separator + blob_width > max_width {
            out.push_str(&newline_indent);
            line_width = stamp_width;
            line_blobs = 0;
        } else if line_blobs > 0 {
            out.push(' ');
            line_width += 1;
        }

        out.push_str(&blob.replace('\n', &newline_indent));
        line_width += blob_width;
        line_blobs += 1;
    }

    out.push('\n');
    out
}
