//! Structured report model.
//!
//! Reports are built as an ordered list of line records and turned into
//! text by a single renderer (`cinfo_utils::format::render_report`), which
//! keeps aggregation and presentation apart.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum ReportLine {
    /// Report heading, first line of a report.
    Title(String),
    /// Group heading, e.g. one provider.
    Section(String),
    /// `label: value` row.
    Entry { label: String, value: String },
    /// Free text row.
    Text(String),
    Blank,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    lines: Vec<ReportLine>,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            lines: vec![ReportLine::Title(title.into())],
        }
    }

    pub fn section(&mut self, name: impl Into<String>) -> &mut Self {
        self.lines.push(ReportLine::Section(name.into()));
        self
    }

    pub fn entry(&mut self, label: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.lines.push(ReportLine::Entry {
            label: label.into(),
            value: value.into(),
        });
        self
    }

    pub fn text(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(ReportLine::Text(text.into()));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(ReportLine::Blank);
        self
    }

    /// Append another report, separated by a blank line.
    pub fn append(&mut self, other: Report) -> &mut Self {
        if !self.lines.is_empty() && !other.lines.is_empty() {
            self.lines.push(ReportLine::Blank);
        }
        self.lines.extend(other.lines);
        self
    }

    pub fn lines(&self) -> &[ReportLine] {
        &self.lines
    }
}
