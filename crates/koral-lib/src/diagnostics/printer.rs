//! Rendering diagnostics for people.
//!
//! With the query text at hand every diagnostic is drawn as an annotated
//! snippet titled `[code] message`; hints label the primary annotation.
//! Without it each diagnostic is one plain line.

use std::fmt::Write;
use std::ops::Range;

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};
use rowan::TextRange;

use super::message::{DiagnosticMessage, Severity};
use super::Diagnostics;

pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: Option<&'s str>,
    path: Option<&'s str>,
    only: Option<Severity>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            source: None,
            path: None,
            only: None,
            colored: false,
        }
    }

    /// Query text the ranges point into.
    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    /// Origin shown in the snippet header, e.g. a file name or dialect.
    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    /// Skips diagnostics of any other severity.
    pub fn only(mut self, severity: Severity) -> Self {
        self.only = Some(severity);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let renderer = match (self.source, self.colored) {
            (None, _) => None,
            (Some(_), true) => Some(Renderer::styled()),
            (Some(_), false) => Some(Renderer::plain()),
        };
        let selected = self
            .diagnostics
            .iter()
            .filter(|d| self.only.is_none_or(|s| d.severity() == s));

        for (i, diag) in selected.enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            match (&renderer, self.source) {
                (Some(renderer), Some(source)) => self.snippet(renderer, source, diag, w)?,
                _ => write!(w, "{diag}")?,
            }
        }
        Ok(())
    }

    fn snippet(
        &self,
        renderer: &Renderer,
        source: &str,
        diag: &DiagnosticMessage,
        w: &mut impl Write,
    ) -> std::fmt::Result {
        let title = format!("[{}] {}", diag.code(), diag.message);
        let label = diag.hints.join("; ");

        let mut primary = AnnotationKind::Primary.span(clamp(diag.range, source.len()));
        if !label.is_empty() {
            primary = primary.label(&label);
        }
        let mut snippet = Snippet::source(source).line_start(1).annotation(primary);
        if let Some(path) = self.path {
            snippet = snippet.path(path);
        }
        for related in &diag.related {
            snippet = snippet.annotation(
                AnnotationKind::Context
                    .span(clamp(related.range, source.len()))
                    .label(&related.message),
            );
        }

        let level = match diag.severity() {
            Severity::Error => Level::ERROR,
            Severity::Warning => Level::WARNING,
        };
        let report = vec![level.primary_title(&title).element(snippet)];
        write!(w, "{}", renderer.render(&report))
    }
}

/// Fits a range into the source. Ranges of request-level problems such as a
/// missing version are empty; they are widened to one character.
fn clamp(range: TextRange, len: usize) -> Range<usize> {
    let end = usize::from(range.end()).min(len);
    let start = usize::from(range.start()).min(end);
    if start == end {
        return start..(start + 1).min(len);
    }
    start..end
}

impl Diagnostics {
    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }
}
