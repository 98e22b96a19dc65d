// qdebug - core/model.rs
//
// Core data model types shared by the locator, renderer, session tracker
// and composer. Pure data definitions, no I/O.

use std::path::Path;

// =============================================================================
// Call site
// =============================================================================

/// Where a logging call was written, captured at compile time by
/// `call_site!()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// `file!()` of the call, usually relative to the crate or workspace root.
    pub file: &'static str,

    /// 1-based line of the macro invocation.
    pub line: u32,

    /// Path of the enclosing function, e.g. `demo::main`.
    pub function: &'static str,

    /// `CARGO_MANIFEST_DIR` of the calling crate, when built by cargo.
    pub manifest_dir: Option<&'static str>,
}

impl CallSite {
    /// Base name of the source file, as shown in session headers.
    pub fn file_name(&self) -> &str {
        Path::new(self.file)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(self.file)
    }
}

/// Turn the `type_name` of a helper item nested in a function into that
/// function's path.
///
/// `demo::main::__f` becomes `demo::main`; closure segments are dropped so
/// calls inside closures report the function that contains them.
pub fn trim_function_name(raw: &'static str) -> &'static str {
    let mut name = raw.strip_suffix("::__f").unwrap_or(raw);
    while let Some(outer) = name.strip_suffix("::{{closure}}") {
        name = outer;
    }
    name
}

// =============================================================================
// Parsed source
// =============================================================================

/// One invocation of the logging macro found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroCall {
    /// Line on which the macro name appears.
    pub line: u32,

    /// Source text of each top-level argument, exactly as written.
    pub args: Vec<String>,
}

// =============================================================================
// Rendered argument
// =============================================================================

/// A value rendered for display, with the expression text it came from.
///
/// Built fresh for each call and consumed by the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArgument {
    /// Source expression, or empty when it could not be recovered.
    pub name: String,

    /// Plain (uncoloured) rendering of the value.
    pub value: String,
}
