// qdebug - core/render.rs
//
// Turns runtime values into display text and measures it.
//
// Values are rendered through their `Debug` impls, which already dispatch on
// shape: structs go through `debug_struct`, lists and tuples through
// `debug_list`/`debug_tuple`, maps through `debug_map`, references print
// their referent, strings are quoted and escaped. Short values stay on one
// line; anything longer uses the expanded `{:#?}` layout. A `Debug` impl
// that reports an error is rendered as DEBUG_ERROR_PLACEHOLDER.

use crate::core::model::RenderedArgument;
use crate::ui::theme::{self, BOLD, CYAN};
use crate::util::constants::{COMPACT_RENDER_MAX_WIDTH, DEBUG_ERROR_PLACEHOLDER};
use regex::Regex;
use std::fmt::{Debug, Write};
use std::sync::OnceLock;
use unicode_width::UnicodeWidthStr;

/// Plain-text rendering of `value`.
pub fn render_value(value: &dyn Debug) -> String {
    let compact = write_debug(value, false);
    if !compact.contains('\n') && compact.width() <= COMPACT_RENDER_MAX_WIDTH {
        compact
    } else {
        write_debug(value, true)
    }
}

/// `{:?}` or `{:#?}` of `value`; partial output is discarded on error.
fn write_debug(value: &dyn Debug, pretty: bool) -> String {
    let mut out = String::new();
    let result = if pretty {
        write!(out, "{value:#?}")
    } else {
        write!(out, "{value:?}")
    };
    match result {
        Ok(()) => out,
        Err(_) => {
            tracing::debug!(partial = %out, "Debug impl returned an error");
            DEBUG_ERROR_PLACEHOLDER.to_string()
        }
    }
}

/// Pair each value with its recovered name.
///
/// `names` is either empty (names unknown) or has one entry per value.
pub fn render_arguments(names: &[String], values: &[&dyn Debug]) -> Vec<RenderedArgument> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| RenderedArgument {
            name: names.get(i).cloned().unwrap_or_default(),
            value: render_value(*value),
        })
        .collect()
}

/// Coloured blob for one argument: `name=value`, or the bare value when the
/// name is unknown or is just the value's own literal text (`q!(1)`).
pub fn to_blob(arg: &RenderedArgument) -> String {
    let value = theme::colourise(&arg.value, CYAN);
    if arg.name.is_empty() || arg.name == arg.value {
        value
    } else {
        format!("{}={value}", theme::colourise(&arg.name, BOLD))
    }
}

/// Display width of `text`: the widest line once escape sequences are
/// removed.
pub fn display_width(text: &str) -> usize {
    strip_ansi(text)
        .split('\n')
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0)
}

/// Remove ANSI SGR escape sequences.
pub fn strip_ansi(text: &str) -> std::borrow::Cow<'_, str> {
    static SGR: OnceLock<Regex> = OnceLock::new();
    let re = SGR.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").expect("strip_ansi: invalid regex"));
    re.replace_all(text, "")
}
