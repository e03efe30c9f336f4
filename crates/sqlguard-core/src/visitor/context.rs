//! Visitor context providing file information during AST traversal.

use swc_common::Span;

use crate::parser::ParsedFile;

pub struct VisitorContext<'a> {
    file: &'a ParsedFile,
}

impl<'a> VisitorContext<'a> {
    pub fn new(file: &'a ParsedFile) -> Self {
        Self { file }
    }

    pub fn file(&self) -> &ParsedFile {
        self.file
    }

    /// Map a span to 1-based (line, column).
    ///
    /// Each file is parsed against its own source map, so byte positions
    /// start at 1; dummy spans map to the start of the file.
    pub fn span_to_location(&self, span: Span) -> (usize, usize) {
        let source = self.file.source();
        let lo = (span.lo.0 as usize).saturating_sub(1);

        if source.is_empty() || lo >= source.len() {
            return (1, 1);
        }

        let prefix = &source[..lo];
        let line = prefix.matches('\n').count() + 1;
        let last_newline = prefix.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = lo - last_newline + 1;

        (line, column)
    }

    pub fn get_source_text(&self, span: Span) -> Option<&str> {
        let source = self.file.source();
        let lo = (span.lo.0 as usize).saturating_sub(1);
        let hi = (span.hi.0 as usize).saturating_sub(1);

        if lo <= hi && hi <= source.len() {
            Some(&source[lo..hi])
        } else {
            None
        }
    }
}
