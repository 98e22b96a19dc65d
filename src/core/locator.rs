// qdebug - core/locator.rs
//
// Recovers the source text of each argument passed to the logging macro.
//
// The file named by `file!()` is tokenised once, every invocation of the
// macro is recorded with its starting line and argument text, and the
// result is cached for the life of the process. Lookups then pick the one
// invocation that starts on the call-site line.
//
// The tokeniser is deliberately small: it knows enough Rust lexical syntax
// (comments, string/char/raw literals, lifetimes, brackets, turbofish) to
// split arguments at the right commas. It does not build a full syntax tree.

use crate::core::model::{CallSite, MacroCall};
use crate::platform::fs;
use crate::util::error::QError;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// =============================================================================
// SourceLocator
// =============================================================================

/// Per-process cache of parsed source files.
///
/// Entries are never evicted: there is one per source file that ever logs.
#[derive(Debug)]
pub struct SourceLocator {
    macro_name: String,
    /// `(manifest_dir, file!())` -> resolved path.
    resolved: HashMap<(Option<&'static str>, &'static str), PathBuf>,
    /// Resolved path -> every macro invocation in that file.
    parsed: HashMap<PathBuf, Arc<[MacroCall]>>,
}

impl SourceLocator {
    pub fn new(macro_name: impl Into<String>) -> Self {
        Self {
            macro_name: macro_name.into(),
            resolved: HashMap::new(),
            parsed: HashMap::new(),
        }
    }

    /// Source text of each argument written at `site`, left to right.
    pub fn arg_names(&mut self, site: &CallSite) -> Result<Vec<String>, QError> {
        let path = self.resolve(site)?;
        let calls = self.calls_in(&path)?;

        let mut on_line = calls.iter().filter(|call| call.line == site.line);
        match (on_line.next(), on_line.next()) {
            (Some(call), None) => Ok(call.args.clone()),
            _ => Err(QError::AmbiguousCallSite {
                matches: calls.iter().filter(|call| call.line == site.line).count(),
                path,
                line: site.line,
            }),
        }
    }

    /// Number of distinct source files parsed so far.
    pub fn cached_files(&self) -> usize {
        self.parsed.len()
    }

    fn resolve(&mut self, site: &CallSite) -> Result<PathBuf, QError> {
        let key = (site.manifest_dir, site.file);
        if let Some(path) = self.resolved.get(&key) {
            return Ok(path.clone());
        }
        let path = resolve_source_path(site)?;
        self.resolved.insert(key, path.clone());
        Ok(path)
    }

    fn calls_in(&mut self, path: &Path) -> Result<Arc<[MacroCall]>, QError> {
        if let Some(calls) = self.parsed.get(path) {
            return Ok(Arc::clone(calls));
        }

        let source = fs::read_file_lossy(path).map_err(|source| QError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let calls: Arc<[MacroCall]> = find_calls(&source, &self.macro_name).into();
        tracing::trace!(
            path = %path.display(),
            calls = calls.len(),
            "Parsed source file for argument names"
        );
        self.parsed.insert(path.to_path_buf(), Arc::clone(&calls));
        Ok(calls)
    }
}

/// Find the file on disk that `site.file` refers to.
///
/// `file!()` is relative to the crate root for a standalone crate and to the
/// workspace root for a workspace member, so the manifest directory and each
/// of its ancestors are tried before the working directory.
pub fn resolve_source_path(site: &CallSite) -> Result<PathBuf, QError> {
    let file = Path::new(site.file);
    if file.is_absolute() {
        return if file.is_file() {
            Ok(file.to_path_buf())
        } else {
            Err(unavailable(file))
        };
    }

    let from_manifest = site
        .manifest_dir
        .into_iter()
        .flat_map(|dir| Path::new(dir).ancestors())
        .map(|dir| dir.join(file));
    let from_cwd = std::env::current_dir().ok().map(|dir| dir.join(file));

    from_manifest
        .chain(from_cwd)
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| unavailable(file))
}

fn unavailable(file: &Path) -> QError {
    QError::SourceUnavailable {
        path: file.to_path_buf(),
        source: io::Error::new(io::ErrorKind::NotFound, "no matching source file on disk"),
    }
}

// =============================================================================
// Invocation search
// =============================================================================

/// Every `macro_name!(...)` invocation in `source`, in source order.
///
/// Invocations nested inside another invocation's arguments are included.
/// An invocation whose closing delimiter is missing is skipped.
pub fn find_calls(source: &str, macro_name: &str) -> Vec<MacroCall> {
    let tokens: Vec<Token> = Lexer::new(source).collect();
    let mut calls = Vec::new();

    for (i, window) in tokens.windows(3).enumerate() {
        let [name, bang, open] = window else { continue };
        if name.kind != Kind::Ident
            || &source[name.start..name.end] != macro_name
            || bang.kind != Kind::Bang
            || open.kind != Kind::Open
        {
            continue;
        }
        if let Some(args) = split_args(source, &tokens[i + 2..]) {
            calls.push(MacroCall {
                line: name.line,
                args,
            });
        }
    }
    calls
}

/// Split the delimited group starting at `tokens[0]` into top-level
/// arguments.
fn split_args(source: &str, tokens: &[Token]) -> Option<Vec<String>> {
    let open = tokens.first()?;
    let mut args = Vec::new();
    let mut arg_start = open.end;
    let mut depth = 0usize;
    let mut angle = 0usize;

    for (idx, tok) in tokens.iter().enumerate() {
        match tok.kind {
            Kind::Open => depth += 1,
            Kind::Close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    push_arg(&mut args, &source[arg_start..tok.start]);
                    return Some(args);
                }
            }
            Kind::Lt if angle > 0 || is_turbofish(tokens, idx) || starts_operand(tokens, idx) => {
                angle += 1
            }
            Kind::Gt if angle > 0 && !is_arrow(source, tok) => angle -= 1,
            Kind::Comma if depth == 1 && angle == 0 => {
                push_arg(&mut args, &source[arg_start..tok.start]);
                arg_start = tok.end;
            }
            _ => {}
        }
    }
    None
}

fn push_arg(args: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        args.push(text.to_string());
    }
}

/// `<` directly preceded by `::`.
fn is_turbofish(tokens: &[Token], idx: usize) -> bool {
    idx >= 2
        && tokens[idx - 1].kind == Kind::Colon
        && tokens[idx - 2].kind == Kind::Colon
        && tokens[idx - 2].end == tokens[idx - 1].start
}

/// `<` opening an argument or element, as in `<T as Trait>::f()`. A
/// comparison always has a left operand.
fn starts_operand(tokens: &[Token], idx: usize) -> bool {
    idx >= 1 && matches!(tokens[idx - 1].kind, Kind::Open | Kind::Comma)
}

/// The `>` of `->`.
fn is_arrow(source: &str, tok: &Token) -> bool {
    tok.start > 0 && source.as_bytes()[tok.start - 1] == b'-'
}

// =============================================================================
// Lexer
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Ident,
    Literal,
    Lifetime,
    Bang,
    Comma,
    Colon,
    Lt,
    Gt,
    Open,
    Close,
    Other,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: Kind,
    start: usize,
    end: usize,
    line: u32,
}

/// Byte-level tokeniser. Every token boundary falls on an ASCII byte, so
/// slicing the original `&str` at token offsets is always valid UTF-8.
struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: u32,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            src: source.as_bytes(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.src.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) {
        if let Some(b) = self.peek(0) {
            if b == b'\n' {
                self.line += 1;
            }
            self.pos += 1;
        }
    }

    fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(0), self.peek(1)) {
                (Some(b), _) if b.is_ascii_whitespace() => self.bump(),
                (Some(b'/'), Some(b'/')) => {
                    while self.peek(0).is_some_and(|b| b != b'\n') {
                        self.bump();
                    }
                }
                (Some(b'/'), Some(b'*')) => self.block_comment(),
                _ => return,
            }
        }
    }

    /// Block comments nest in Rust.
    fn block_comment(&mut self) {
        self.bump_n(2);
        let mut depth = 1usize;
        while depth > 0 {
            match (self.peek(0), self.peek(1)) {
                (None, _) => return,
                (Some(b'/'), Some(b'*')) => {
                    depth += 1;
                    self.bump_n(2);
                }
                (Some(b'*'), Some(b'/')) => {
                    depth -= 1;
                    self.bump_n(2);
                }
                _ => self.bump(),
            }
        }
    }

    /// Consume a quoted literal starting at its opening quote.
    fn quoted(&mut self, quote: u8) {
        self.bump();
        while let Some(b) = self.peek(0) {
            self.bump();
            if b == b'\\' {
                self.bump();
            } else if b == quote {
                return;
            }
        }
    }

    fn is_raw_string_at(&self, ahead: usize) -> bool {
        let mut i = self.pos + ahead + 1;
        while self.src.get(i) == Some(&b'#') {
            i += 1;
        }
        self.src.get(i) == Some(&b'"')
    }

    /// Consume `r"..."`, `r#"..."#` and so on, starting at the `r`.
    fn raw_string(&mut self) {
        self.bump();
        let mut hashes = 0;
        while self.peek(0) == Some(b'#') {
            hashes += 1;
            self.bump();
        }
        self.bump();
        while let Some(b) = self.peek(0) {
            self.bump();
            if b == b'"' && (0..hashes).all(|i| self.peek(i) == Some(b'#')) {
                self.bump_n(hashes);
                return;
            }
        }
    }

    /// `'a'`, `'\n'` and `'é'` are literals; `'a` is a lifetime.
    fn char_or_lifetime(&mut self) -> Kind {
        match self.peek(1) {
            Some(b'\\') => {
                self.quoted(b'\'');
                Kind::Literal
            }
            Some(first) => {
                let width = utf8_len(first);
                if self.peek(1 + width) == Some(b'\'') {
                    self.bump_n(2 + width);
                    Kind::Literal
                } else {
                    self.bump();
                    while self.peek(0).is_some_and(is_ident_continue) {
                        self.bump();
                    }
                    Kind::Lifetime
                }
            }
            None => {
                self.bump();
                Kind::Other
            }
        }
    }

    fn number(&mut self) {
        while let Some(b) = self.peek(0) {
            let fraction = b == b'.' && self.peek(1).is_some_and(|n| n.is_ascii_digit());
            if b.is_ascii_alphanumeric() || b == b'_' || fraction {
                self.bump();
            } else {
                return;
            }
        }
    }

    fn single(&mut self, kind: Kind) -> Kind {
        self.bump();
        kind
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.skip_trivia();
        let start = self.pos;
        let line = self.line;
        let b = self.peek(0)?;

        let kind = match b {
            b'"' => {
                self.quoted(b'"');
                Kind::Literal
            }
            b'\'' => self.char_or_lifetime(),
            b'b' | b'c' if self.peek(1) == Some(b'"') => {
                self.bump();
                self.quoted(b'"');
                Kind::Literal
            }
            b'b' if self.peek(1) == Some(b'\'') => {
                self.bump();
                self.quoted(b'\'');
                Kind::Literal
            }
            b'r' if self.is_raw_string_at(0) => {
                self.raw_string();
                Kind::Literal
            }
            b'b' | b'c' if self.peek(1) == Some(b'r') && self.is_raw_string_at(1) => {
                self.bump();
                self.raw_string();
                Kind::Literal
            }
            b'0'..=b'9' => {
                self.number();
                Kind::Literal
            }
            b if is_ident_start(b) => {
                while self.peek(0).is_some_and(is_ident_continue) {
                    self.bump();
                }
                Kind::Ident
            }
            b'(' | b'[' | b'{' => self.single(Kind::Open),
            b')' | b']' | b'}' => self.single(Kind::Close),
            b'!' => self.single(Kind::Bang),
            b',' => self.single(Kind::Comma),
            b':' => self.single(Kind::Colon),
            b'<' => self.single(Kind::Lt),
            b'>' => self.single(Kind::Gt),
            _ => self.single(Kind::Other),
        };

        Some(Token {
            kind,
            start,
            end: self.pos,
            line,
        })
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

fn utf8_len(first: u8) -> usize {
    match first {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    }
}
