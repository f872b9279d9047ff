//! Error rendering for the terminal.
//!
//! Every error gets a `file:line:col: message` header line, followed by an
//! `ariadne` snippet of the offending source when a span is known.

use std::ops::Range;

use ariadne::{Label, Report, ReportKind, Source};
use goose_eval::EvalError;
use goose_ir::{ParseError, SourceFile, Span};

/// `file:line:col: message`, or `file: message` without a span.
pub fn header(file: &SourceFile, span: Option<Span>, message: &str) -> String {
    match span {
        Some(span) => {
            let pos = file.line_col(span.start);
            format!("{}:{}:{}: {message}", file.name(), pos.line, pos.col)
        }
        None => format!("{}: {message}", file.name()),
    }
}

/// ariadne counts characters, spans count bytes.
fn char_offset(text: &str, byte: usize) -> usize {
    text.char_indices().take_while(|&(i, _)| i < byte).count()
}

fn char_range(text: &str, span: Span) -> Range<usize> {
    let range = span.to_range();
    let start = char_offset(text, range.start);
    let end = char_offset(text, range.end).max(start + 1);
    start..end
}

/// Print one error with its snippet. `notes` with a span become secondary
/// labels; the rest are printed under the snippet.
fn emit(file: &SourceFile, span: Option<Span>, message: &str, notes: &[(&str, Option<Span>)]) {
    eprintln!("{}", header(file, span, message));
    let Some(span) = span else {
        for (note, _) in notes {
            eprintln!("  note: {note}");
        }
        return;
    };

    let name = file.name().to_string();
    let text = file.text();
    let range = char_range(text, span);
    let mut report = Report::build(ReportKind::Error, name.clone(), range.start)
        .with_message(message)
        .with_label(Label::new((name.clone(), range)).with_message(message));
    for (note, note_span) in notes {
        report = match note_span {
            Some(s) => report.with_label(Label::new((name.clone(), char_range(text, *s))).with_message(*note)),
            None => report.with_note(*note),
        };
    }
    if let Err(err) = report
        .finish()
        .eprint((name.clone(), Source::from(text.to_string())))
    {
        tracing::debug!(%err, "could not render source snippet");
    }
}

pub fn report_parse_errors(file: &SourceFile, errors: &[ParseError]) {
    for error in errors {
        emit(file, Some(error.span), &error.message, &[]);
    }
}

/// Render a runtime error. Its own file wins over `fallback` when the
/// error escaped from an imported module.
pub fn report_eval_error(error: &EvalError, fallback: &SourceFile) {
    let file = error.source.as_deref().unwrap_or(fallback);
    let notes: Vec<(&str, Option<Span>)> = error
        .notes
        .iter()
        .map(|note| (note.message.as_str(), note.span))
        .collect();
    emit(file, error.span, &error.message, &notes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn header_uses_one_based_positions() {
        let file = SourceFile::new("main.goose", "let a = 1\nlet b = c");
        let span = Span::new(18, 19);
        assert_eq!(
            header(&file, Some(span), "c is not defined"),
            "main.goose:2:9: c is not defined"
        );
        assert_eq!(header(&file, None, "boom"), "main.goose: boom");
    }

    #[test]
    fn char_range_counts_characters() {
        let text = "let é = x";
        // `x` starts at byte 9 but character 8.
        assert_eq!(char_range(text, Span::new(9, 10)), 8..9);
        // Empty spans still cover one character.
        assert_eq!(char_range(text, Span::new(0, 0)), 0..1);
    }
}
