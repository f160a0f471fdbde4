//! Indentation-aware text accumulator for emitted source.
//!
//! Deliberately small: `line`, `blank`, and `block` cover everything the
//! generators need, and the output is deterministic by construction.

/// Accumulates emitted source text with four-space indentation.
#[derive(Debug, Default)]
pub struct Printer {
    buffer: String,
    indent: usize,
}

impl Printer {
    /// Creates an empty printer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the standard generated-file preamble.
    pub fn preamble(&mut self) {
        self.line("// Generated by embergen; do not edit.");
        self.line("#![allow(non_camel_case_types, non_upper_case_globals, dead_code)]");
        self.blank();
        self.line("use std::ffi::c_void;");
        self.line("use std::sync::OnceLock;");
        self.blank();
        self.line("use crate::support::*;");
        self.blank();
    }

    /// Appends one line (or several, split on `\n`) at the current indent.
    pub fn line(&mut self, text: &str) {
        for part in text.split('\n') {
            if part.is_empty() {
                self.buffer.push('\n');
                continue;
            }
            for _ in 0..self.indent {
                self.buffer.push_str("    ");
            }
            self.buffer.push_str(part);
            self.buffer.push('\n');
        }
    }

    /// Appends an empty line.
    pub fn blank(&mut self) {
        self.buffer.push('\n');
    }

    /// Opens a `header {` block, runs `body` one level deeper, closes it.
    pub fn block(&mut self, header: &str, body: impl FnOnce(&mut Self)) {
        self.line(&format!("{header} {{"));
        self.indent += 1;
        body(self);
        self.indent -= 1;
        self.line("}");
    }

    /// Current indent depth, in levels.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.indent
    }

    /// Consumes the printer and returns the accumulated text.
    #[must_use]
    pub fn finish(self) -> String {
        self.buffer
    }

    /// Borrowed view of the accumulated text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}
