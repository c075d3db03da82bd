//! Diagnostic rendering: numbered errors with source snippets.

pub mod error;

pub use error::KraitError;

/// Renders a `KraitError` the way the CLI prints it: the `Display`
/// headline (and, for two-part messages, its detail paragraph), followed
/// by a caret-underlined source excerpt when the error carries one or more
/// spans, followed by any trailing commentary the diagnostic specifies.
///
/// The caller is expected to print the result with a single trailing
/// newline (e.g. `println!`); diagnostics that render a snippet bake in
/// one extra blank line after it, matching the reference fixtures.
#[must_use]
pub fn render(err: &KraitError, source: &str) -> String {
    let spans = err.snippet_spans();
    if spans.is_empty() {
        return err.to_string();
    }

    let caret_span = *spans.last().unwrap();
    let mut out = err.to_string();
    out.push_str("\n\n");
    out.push_str(&multi_line_snippet(source, &spans, caret_span));
    out.push('\n');

    if let Some(trailing) = err.trailing_text() {
        out.push('\n');
        out.push_str(trailing);
    }
    out
}

/// Renders one gutter line per span in `spans` (each showing the full
/// source line that span starts on), with a caret underline drawn only
/// under `caret_span`'s line.
#[must_use]
fn multi_line_snippet(source: &str, spans: &[crate::frontend::ast::Span], caret_span: crate::frontend::ast::Span) -> String {
    let rows: Vec<(usize, usize, &str)> = spans
        .iter()
        .map(|s| {
            let (line_no, line_start) = line_of(source, s.start);
            let text = source[line_start..].lines().next().unwrap_or_default();
            (line_no, line_start, text)
        })
        .collect();
    let gutter_width = rows.iter().map(|(n, _, _)| n.to_string().len()).max().unwrap_or(1);

    let mut lines = Vec::new();
    for (line_no, _, text) in &rows {
        lines.push(format!(
            "  {:>width$}  \u{2502} {text}",
            line_no,
            width = gutter_width
        ));
    }

    let (caret_line_no, caret_line_start) = line_of(source, caret_span.start);
    let col = caret_span.start.saturating_sub(caret_line_start);
    let width = caret_span.end.saturating_sub(caret_span.start).max(1);
    let pad = " ".repeat(gutter_width);
    lines.push(format!(
        "  {pad}  \u{2502} {}{}",
        " ".repeat(col),
        "^".repeat(width)
    ));
    let _ = caret_line_no;

    lines.join("\n")
}

/// Returns the 1-based line number and the byte offset of that line's
/// start for the given byte offset into `source`.
fn line_of(source: &str, offset: usize) -> (usize, usize) {
    let mut line_no = 1;
    let mut line_start = 0;
    for (i, ch) in source.as_bytes().iter().enumerate() {
        if i >= offset {
            break;
        }
        if *ch == b'\n' {
            line_no += 1;
            line_start = i + 1;
        }
    }
    (line_no, line_start)
}
