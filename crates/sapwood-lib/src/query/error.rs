//! Query compilation errors.

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryErrorKind {
    Syntax,
    NodeType,
    Field,
    Capture,
    /// Well-formed but impossible to match, like an anchor at the top level.
    Unknown,
}

impl std::fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QueryErrorKind::Syntax => "syntax error",
            QueryErrorKind::NodeType => "invalid node type",
            QueryErrorKind::Field => "invalid field",
            QueryErrorKind::Capture => "invalid capture",
            QueryErrorKind::Unknown => "invalid pattern",
        };
        f.write_str(name)
    }
}

/// The first problem found in a query source.
///
/// `row` is 1-based; `column` is a byte offset into that row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {row}:{column}: {message}")]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub offset: usize,
    pub row: usize,
    pub column: usize,
    pub message: String,
    /// Length of the offending text, at least one byte when the source allows.
    pub len: usize,
}

impl QueryError {
    pub(crate) fn new(
        kind: QueryErrorKind,
        source: &str,
        span: std::ops::Range<usize>,
        message: impl Into<String>,
    ) -> Self {
        let offset = span.start.min(source.len());
        let before = &source[..offset];
        let row = before.matches('\n').count() + 1;
        let column = before.rfind('\n').map_or(offset, |nl| offset - nl - 1);
        Self {
            kind,
            offset,
            row,
            column,
            message: message.into(),
            len: span.end.saturating_sub(span.start),
        }
    }

    /// Renders the error against the query source it came from.
    pub fn render(&self, source: &str, colored: bool) -> String {
        let renderer = if colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        let start = self.offset.min(source.len());
        let end = (start + self.len.max(1)).min(source.len());
        let snippet = Snippet::source(source)
            .line_start(1)
            .annotation(AnnotationKind::Primary.span(start..end).label(&self.message));
        let title = self.kind.to_string();
        let report = [Level::ERROR.primary_title(&title).element(snippet)];
        renderer.render(&report).to_string()
    }
}
