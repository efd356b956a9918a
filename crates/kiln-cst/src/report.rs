//! Diagnostic rendering with ariadne.

use std::ops::Range;

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use kiln_tokenizer::{Diagnostic, Severity};

fn ariadne_config() -> Config {
    // Spans are byte offsets.
    let config = Config::default().with_index_type(IndexType::Byte);
    if std::env::var("NO_COLOR").is_ok() {
        config.with_color(false)
    } else {
        config
    }
}

/// Render diagnostics as ariadne reports, one after the other.
pub fn render<'d>(
    diagnostics: impl IntoIterator<Item = &'d Diagnostic>,
    filename: &str,
    source: &str,
) -> String {
    let mut output = Vec::new();
    for diagnostic in diagnostics {
        write_report(diagnostic, filename, source, &mut output);
    }
    String::from_utf8(output)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}

/// Write one diagnostic report to a writer.
pub fn write_report<W: std::io::Write>(
    diagnostic: &Diagnostic,
    filename: &str,
    source: &str,
    writer: W,
) {
    let report = build_report(diagnostic, filename);
    let _ = report
        .with_config(ariadne_config())
        .finish()
        .write((filename, Source::from(source)), writer);
}

fn build_report<'a>(
    diagnostic: &Diagnostic,
    filename: &'a str,
) -> ariadne::ReportBuilder<'static, (&'a str, Range<usize>)> {
    let range: Range<usize> = diagnostic.span.span().into();
    let kind = match diagnostic.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
    };

    let mut builder = Report::build(kind, (filename, range.clone()))
        .with_message(&diagnostic.message)
        .with_label(
            Label::new((filename, range))
                .with_message(&diagnostic.message)
                .with_color(Color::Red),
        );
    if let Some((span, label)) = &diagnostic.related {
        builder = builder.with_label(
            Label::new((filename, span.span().into()))
                .with_message(label)
                .with_color(Color::Blue),
        );
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn stripped(rendered: &str) -> String {
        String::from_utf8(strip_ansi_escapes::strip(rendered)).unwrap()
    }

    #[test]
    fn test_duplicate_key_report() {
        let source = "a = 1\na = 2\n";
        let doc = parse(source);
        let text = stripped(&render(doc.diagnostics(), "test.toml", source));
        assert!(text.contains("the key `a` is already defined"), "{text}");
        assert!(text.contains("first defined here"), "{text}");
        assert!(text.contains("test.toml"), "{text}");
    }

    #[test]
    fn test_syntax_error_report() {
        let source = "a = [1 2]\n";
        let doc = parse(source);
        let text = stripped(&render(doc.diagnostics(), "test.toml", source));
        assert!(text.contains("Error"), "{text}");
        assert!(text.contains("expecting `,` or `]`"), "{text}");
    }

    #[test]
    fn test_no_diagnostics_renders_nothing() {
        let doc = parse("a = 1\n");
        assert_eq!(render(doc.diagnostics(), "test.toml", "a = 1\n"), "");
    }
}
