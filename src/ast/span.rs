use std::fmt::Display;

/// A 1-based line/column position in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourcePos {
    pub line: usize,
    /// Column in characters, starting at 1
    pub column: usize,
}

impl Display for SourcePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Represents a span in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The source text covered by this span, or `""` when out of range.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }

    /// Position of the first byte of the span.
    pub fn start_pos(&self, source: &str) -> SourcePos {
        pos_at(source, self.start)
    }
}

fn pos_at(source: &str, offset: usize) -> SourcePos {
    let mut line = 1;
    let mut column = 1;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    SourcePos { line, column }
}

/// A value with associated span information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_one_based() {
        let source = "class A {\n  A();\n};";
        let span = Span::new(12, 13);
        assert_eq!(span.slice(source), "A");
        assert_eq!(span.start_pos(source), SourcePos { line: 2, column: 3 });
        assert_eq!(Span::new(0, 5).start_pos(source).to_string(), "1:1");
    }
}
