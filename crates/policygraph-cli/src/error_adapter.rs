//! Error adapter for converting PolicyGraphError to miette diagnostics.
//!
//! Snapshot decoding errors carry the rejected document, so they are shown
//! with a source snippet and a label at the reported position. Every other
//! variant is rendered as a plain message with an error code.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use policygraph::{PolicyGraphError, snapshot::ParseError};

/// Adapter for a snapshot decoding error.
pub struct SnapshotAdapter<'a> {
    err: &'a ParseError,
    src: &'a str,
}

impl<'a> SnapshotAdapter<'a> {
    pub fn new(err: &'a ParseError, src: &'a str) -> Self {
        Self { err, src }
    }
}

impl fmt::Debug for SnapshotAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotAdapter")
            .field("err", &self.err)
            .finish()
    }
}

impl fmt::Display for SnapshotAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid snapshot: {}", self.err.message())
    }
}

impl std::error::Error for SnapshotAdapter<'_> {}

impl MietteDiagnostic for SnapshotAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("policygraph::snapshot"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(
            "a snapshot is a JSON object with optional peers, groups, resources, networks, and policies arrays",
        ))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let offset = self.err.offset_in(self.src)?;
        let span = SourceSpan::new(offset.into(), 0);
        Some(Box::new(std::iter::once(LabeledSpan::new_primary_with_span(
            Some("here".to_string()),
            span,
        ))))
    }
}

/// Adapter for [`PolicyGraphError`] variants without source information.
pub struct ErrorAdapter<'a>(pub &'a PolicyGraphError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            PolicyGraphError::Io(_) => "policygraph::io",
            PolicyGraphError::Config(_) => "policygraph::config",
            PolicyGraphError::Snapshot { .. } => "policygraph::snapshot",
            PolicyGraphError::Style(_) => "policygraph::style",
            PolicyGraphError::Export(_) => "policygraph::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            PolicyGraphError::Style(_) => Some(Box::new(
                "colors accept any CSS color, e.g. `#16a34a` or `darkgreen`",
            )),
            _ => None,
        }
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A snapshot error with a source snippet.
    Snapshot(SnapshotAdapter<'a>),
    /// Any other error.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Snapshot(s) => fmt::Display::fmt(s, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Snapshot(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Snapshot(s) => s.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Snapshot(s) => s.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Snapshot(s) => s.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Snapshot(s) => s.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`PolicyGraphError`] into a reportable error.
pub fn to_reportable(err: &PolicyGraphError) -> Reportable<'_> {
    match err {
        PolicyGraphError::Snapshot { err, src } => Reportable::Snapshot(SnapshotAdapter::new(err, src)),
        _ => Reportable::Error(ErrorAdapter(err)),
    }
}

#[cfg(test)]
mod tests {
    use policygraph::ControlCenter;

    use super::*;

    fn snapshot_error(source: &str) -> PolicyGraphError {
        ControlCenter::default().parse(source).unwrap_err()
    }

    #[test]
    fn test_snapshot_error_has_label() {
        let source = "{\"peers\": [{\"id\": 1}]}";
        let err = snapshot_error(source);

        let reportable = to_reportable(&err);
        assert!(matches!(reportable, Reportable::Snapshot(_)));
        assert!(reportable.to_string().starts_with("Invalid snapshot:"));
        assert!(reportable.source_code().is_some());

        let labels: Vec<_> = reportable.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert!(labels[0].offset() <= source.len());
    }

    #[test]
    fn test_config_error_is_plain() {
        let err = PolicyGraphError::Config("bad".to_string());

        let reportable = to_reportable(&err);
        match &reportable {
            Reportable::Error(_) => {}
            Reportable::Snapshot(_) => panic!("Expected plain error"),
        }
        assert_eq!(
            reportable.code().unwrap().to_string(),
            "policygraph::config"
        );
        assert!(reportable.labels().is_none());
    }

    #[test]
    fn test_rendering_does_not_fail() {
        let source = "{\n  \"policies\": [\n    {\"id\": \"p\", \"rules\": 3}\n  ]\n}";
        let err = snapshot_error(source);

        let mut out = String::new();
        miette::GraphicalReportHandler::new_themed(miette::GraphicalTheme::unicode_nocolor())
            .render_report(&mut out, &to_reportable(&err))
            .unwrap();
        assert!(out.contains("policygraph::snapshot"));
    }
}
