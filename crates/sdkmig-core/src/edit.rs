//! Span-based source code editing with format preservation

use thiserror::Error;

/// Errors that can occur during edit application
#[derive(Error, Debug)]
pub enum EditError {
    #[error("Overlapping edits detected at offset {0}")]
    OverlappingEdits(usize),

    #[error("Edit span {start}..{end} out of bounds for source length {len}")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },
}

/// A half-open byte range into a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span used for insertions
    pub fn empty(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if `other` lies entirely within this span
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True if the two spans share at least one byte
    pub fn overlaps(&self, other: Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The covering span of two spans
    pub fn join(&self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Slice the source text covered by this span
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start..self.end]
    }
}

/// Represents a single code edit operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// The source span to replace
    pub span: Span,
    /// The replacement text
    pub replacement: String,
    /// Human-readable description of the edit
    pub message: String,
}

impl Edit {
    /// Create a new edit
    pub fn new(span: Span, replacement: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
            message: message.into(),
        }
    }

    /// Insert text at an offset without replacing anything
    pub fn insert(offset: usize, text: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Span::empty(offset), text, message)
    }

    /// Remove the text covered by a span
    pub fn delete(span: Span, message: impl Into<String>) -> Self {
        Self::new(span, String::new(), message)
    }

    /// Get the byte offset where this edit starts
    pub fn start_offset(&self) -> usize {
        self.span.start
    }

    /// Get the byte offset where this edit ends
    pub fn end_offset(&self) -> usize {
        self.span.end
    }

    /// True if this edit conflicts with another one when applied together
    pub fn conflicts_with(&self, other: &Edit) -> bool {
        if self.span.is_empty() || other.span.is_empty() {
            // An insertion only conflicts with a replacement strictly around it
            let (ins, other) = if self.span.is_empty() {
                (self.span, other.span)
            } else {
                (other.span, self.span)
            };
            return other.start < ins.start && ins.start < other.end;
        }
        self.span.overlaps(other.span)
    }
}

/// Apply edits to source code, preserving surrounding formatting
///
/// Edits are applied in reverse order (from end to start) to maintain
/// valid offsets throughout the process. Insertions sharing an offset are
/// emitted in the order they were produced, and an insertion at the start
/// of a replaced range lands before the replacement.
///
/// # Arguments
/// * `source` - The original source code
/// * `edits` - Slice of edits to apply
///
/// # Returns
/// * `Ok(String)` - The modified source code
/// * `Err(EditError)` - If edits overlap or are out of bounds
pub fn apply_edits(source: &str, edits: &[Edit]) -> Result<String, EditError> {
    if edits.is_empty() {
        return Ok(source.to_string());
    }

    // Sort edits by start position (descending) for safe replacement
    let mut sorted_edits: Vec<(usize, &Edit)> = edits.iter().enumerate().collect();
    sorted_edits.sort_by(|(ia, a), (ib, b)| {
        b.start_offset()
            .cmp(&a.start_offset())
            .then(b.end_offset().cmp(&a.end_offset()))
            .then(ib.cmp(ia))
    });

    // Validate: check for overlapping edits and bounds
    let source_len = source.len();
    let mut prev_start: Option<usize> = None;

    for (_, edit) in &sorted_edits {
        let start = edit.start_offset();
        let end = edit.end_offset();

        if end > source_len || start > end {
            return Err(EditError::SpanOutOfBounds {
                start,
                end,
                len: source_len,
            });
        }

        if let Some(prev) = prev_start {
            if end > prev {
                return Err(EditError::OverlappingEdits(start));
            }
        }

        prev_start = Some(start);
    }

    // Apply edits from end to start
    let mut result = source.to_string();

    for (_, edit) in sorted_edits {
        let start = edit.start_offset();
        let end = edit.end_offset();

        let original = &source[start..end];
        let replacement = adjust_whitespace(original, &edit.replacement);

        result.replace_range(start..end, &replacement);
    }

    Ok(result)
}

/// Attempt to preserve whitespace patterns from original code
fn adjust_whitespace(original: &str, replacement: &str) -> String {
    // Deletions stay deletions
    if replacement.is_empty() {
        return String::new();
    }

    let leading_ws: String = original
        .chars()
        .take_while(|c| c.is_whitespace())
        .collect();

    if !leading_ws.is_empty() && !replacement.starts_with(&leading_ws) {
        format!("{}{}", leading_ws, replacement.trim_start())
    } else {
        replacement.to_string()
    }
}

/// Drop edits that conflict with an earlier edit in the list
///
/// Rules emit outer matches before inner ones, so keeping the first of each
/// conflicting pair keeps the outermost rewrite; the dropped edits are
/// picked up again when the rule re-runs on the rewritten text.
pub fn retain_non_conflicting(edits: Vec<Edit>) -> (Vec<Edit>, usize) {
    let mut kept: Vec<Edit> = Vec::with_capacity(edits.len());
    let mut dropped = 0;

    for edit in edits {
        if kept.iter().any(|k| k.conflicts_with(&edit) || k == &edit) {
            dropped += 1;
        } else {
            kept.push(edit);
        }
    }

    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_replacement() {
        let source = "new Foo();";
        let edit = Edit::new(Span::new(0, 9), "Foo.create()", "Replace constructor");

        let result = apply_edits(source, &[edit]).unwrap();
        assert_eq!(result, "Foo.create();");
    }

    #[test]
    fn test_multiple_edits() {
        let source = "a.getX(); b.getY();";
        let edits = vec![
            Edit::new(Span::new(2, 6), "x", "first"),
            Edit::new(Span::new(12, 16), "y", "second"),
        ];

        let result = apply_edits(source, &edits).unwrap();
        assert_eq!(result, "a.x(); b.y();");
    }

    #[test]
    fn test_empty_edits() {
        let source = "unchanged";
        let result = apply_edits(source, &[]).unwrap();
        assert_eq!(result, "unchanged");
    }

    #[test]
    fn test_out_of_bounds() {
        let source = "short";
        let edit = Edit::new(Span::new(0, 100), "replacement", "oob");

        let result = apply_edits(source, &[edit]);
        assert!(matches!(result, Err(EditError::SpanOutOfBounds { .. })));
    }

    #[test]
    fn test_overlap_rejected() {
        let source = "abcdefgh";
        let edits = vec![
            Edit::new(Span::new(0, 4), "x", "outer"),
            Edit::new(Span::new(2, 6), "y", "inner"),
        ];

        let result = apply_edits(source, &edits);
        assert!(matches!(result, Err(EditError::OverlappingEdits(_))));
    }

    #[test]
    fn test_insertions_keep_emission_order() {
        let source = "s3.putObject(req);";
        let edits = vec![
            Edit::insert(16, ", ", "comma"),
            Edit::insert(16, "RequestBody.empty()", "body"),
        ];

        let result = apply_edits(source, &edits).unwrap();
        assert_eq!(result, "s3.putObject(req, RequestBody.empty());");
    }

    #[test]
    fn test_insert_before_replacement() {
        let source = "foo(bar)";
        let edits = vec![
            Edit::new(Span::new(4, 7), "baz", "replace"),
            Edit::insert(4, "/*c*/", "comment"),
        ];

        let result = apply_edits(source, &edits).unwrap();
        assert_eq!(result, "foo(/*c*/baz)");
    }

    #[test]
    fn test_deletion() {
        let source = "x.a(1).b(2).build()";
        let edit = Edit::delete(Span::new(6, 11), "drop b");

        let result = apply_edits(source, &[edit]).unwrap();
        assert_eq!(result, "x.a(1).build()");
    }

    #[test]
    fn test_retain_non_conflicting_keeps_first() {
        let edits = vec![
            Edit::new(Span::new(0, 10), "outer", "outer"),
            Edit::new(Span::new(3, 5), "inner", "inner"),
            Edit::new(Span::new(12, 14), "other", "other"),
        ];

        let (kept, dropped) = retain_non_conflicting(edits);
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped, 1);
        assert_eq!(kept[0].replacement, "outer");
        assert_eq!(kept[1].replacement, "other");
    }

    #[test]
    fn test_insertion_at_boundary_does_not_conflict() {
        let replace = Edit::new(Span::new(4, 8), "x", "r");
        let at_start = Edit::insert(4, "a", "i");
        let at_end = Edit::insert(8, "b", "i");
        let inside = Edit::insert(6, "c", "i");

        assert!(!replace.conflicts_with(&at_start));
        assert!(!replace.conflicts_with(&at_end));
        assert!(replace.conflicts_with(&inside));
    }
}
