//! Diagnostic rendering for human-readable terminal output.

use crate::diagnostic::Diagnostic;
use crate::label::LabelStyle;
use tempo_source::SourceDb;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// Produces output like:
/// ```text
/// error[E101]: expected clock operand
///   --> core.tir:3:14
///    |
///  3 | %q = compreg %in : i8
///    |              ^^^ expected clock operand
/// ```
pub struct TerminalRenderer;

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let mut out = String::new();

        // Header line: severity[CODE]: message
        out.push_str(&format!(
            "{}[{}]: {}\n",
            diag.severity, diag.code, diag.message
        ));

        // Location line
        if !diag.primary_span.is_dummy() {
            let resolved = source_db.resolve_span(diag.primary_span);
            out.push_str(&format!("  --> {resolved}\n"));

            // Source line with underline
            let file = source_db.get_file(diag.primary_span.file);
            let (_, col) = file.line_col(diag.primary_span.start);
            let line_num = format!("{}", resolved.start_line);
            let padding = " ".repeat(line_num.len());

            let line_content = get_source_line(&file.content, diag.primary_span.start);

            out.push_str(&format!("{padding} |\n"));
            out.push_str(&format!("{line_num} | {line_content}\n"));

            // Underline
            let span_len = (diag.primary_span.end - diag.primary_span.start).max(1) as usize;
            let carets = "^".repeat(span_len);
            let col_padding = " ".repeat((col as usize).saturating_sub(1));

            let primary_msg = diag
                .labels
                .iter()
                .find(|l| l.style == LabelStyle::Primary)
                .map(|l| format!(" {}", l.message))
                .unwrap_or_default();

            out.push_str(&format!("{padding} | {col_padding}{carets}{primary_msg}\n"));
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }

        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }

        out
    }
}

/// Extracts the line of source text containing the given byte offset.
fn get_source_line(content: &str, byte_offset: u32) -> &str {
    let offset = byte_offset as usize;
    let start = content[..offset].rfind('\n').map_or(0, |pos| pos + 1);
    let end = content[offset..]
        .find('\n')
        .map_or(content.len(), |pos| offset + pos);
    &content[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};
    use crate::label::Label;

    #[test]
    fn render_error_with_span() {
        let mut source_db = SourceDb::new();
        let file_id = source_db.add_source("core.tir", "%q = compreg %in : i8\n".to_string());

        let code = DiagnosticCode::new(Category::Error, 101);
        let span = tempo_source::Span::new(file_id, 13, 16);
        let diag = Diagnostic::error(code, "expected clock operand", span)
            .with_label(Label::primary(span, "expected clock operand"));

        let renderer = TerminalRenderer::new();
        let output = renderer.render(&diag, &source_db);

        assert!(output.contains("error[E101]: expected clock operand"));
        assert!(output.contains("--> core.tir:1:14"));
        assert!(output.contains("%q = compreg %in : i8"));
        assert!(output.contains("^^^"));
    }

    #[test]
    fn render_with_notes_and_help() {
        let source_db = SourceDb::new();
        let code = DiagnosticCode::new(Category::Structure, 201);
        let diag = Diagnostic::error(
            code,
            "output port #1 has multiple uses",
            tempo_source::Span::DUMMY,
        )
        .with_note("a port handle is a single-use capability")
        .with_help("add another accessor node instead of aliasing the handle");

        let renderer = TerminalRenderer::new();
        let output = renderer.render(&diag, &source_db);

        assert!(output.contains("error[S201]: output port #1 has multiple uses"));
        assert!(output.contains("= note: a port handle is a single-use capability"));
        assert!(output.contains("= help: add another accessor node"));
    }

    #[test]
    fn render_dummy_span_no_source() {
        let source_db = SourceDb::new();
        let code = DiagnosticCode::new(Category::Error, 999);
        let diag = Diagnostic::error(code, "general error", tempo_source::Span::DUMMY);

        let renderer = TerminalRenderer::new();
        let output = renderer.render(&diag, &source_db);

        assert!(output.contains("error[E999]: general error"));
        assert!(!output.contains("-->"));
    }
}
