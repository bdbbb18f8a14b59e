//! Document scan: find where the data starts, then split it into record
//! groups.
//!
//! The group boundary is an explicit two-state machine:
//!
//! ```text
//!             non-blank line                  line with CAS*rank token
//! AwaitingName ─────────────▶ AccumulatingData ────────────────────────▶ emit, AwaitingName
//!                                  │ other non-blank line: append
//!                                  │ end of input: emit unterminated
//! ```
//!
//! Blank lines never change state.

use super::cas::is_cas_relative;
use super::tokenizer::tokenize;

/// How the start of data was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartAnchor {
    /// A line exactly equal to the sentinel species name.
    Sentinel { line: usize },
    /// The line after a header starting with the header phrase.
    Header { line: usize },
    /// Neither anchor was found; scan from the first line.
    DocumentStart,
}

impl StartAnchor {
    /// 0-indexed line where scanning begins.
    pub fn start_line(&self) -> usize {
        match self {
            StartAnchor::Sentinel { line } => *line,
            StartAnchor::Header { line } => line + 1,
            StartAnchor::DocumentStart => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StartAnchor::Sentinel { .. } => "sentinel",
            StartAnchor::Header { .. } => "header",
            StartAnchor::DocumentStart => "document_start",
        }
    }
}

/// Locate the start of data: the first line equal to `sentinel` (trimmed),
/// else the line after the first header whose trimmed text starts with
/// `header_phrase`, else the document start.
pub fn find_data_start<S: AsRef<str>>(lines: &[S], sentinel: &str, header_phrase: &str) -> StartAnchor {
    if let Some(line) = lines.iter().position(|l| l.as_ref().trim() == sentinel) {
        return StartAnchor::Sentinel { line };
    }
    if let Some(line) = lines
        .iter()
        .position(|l| l.as_ref().trim().starts_with(header_phrase))
    {
        return StartAnchor::Header { line };
    }
    StartAnchor::DocumentStart
}

/// One species name plus its field-data text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordGroup {
    /// Trimmed species-name line.
    pub name: String,
    /// Trimmed data lines joined by single spaces.
    pub data: String,
    /// Whether a CAS*rank token closed the group.
    pub terminated: bool,
    /// 1-indexed line number of the name line.
    pub line: usize,
}

#[derive(Debug)]
enum ScanState {
    AwaitingName,
    AccumulatingData {
        name: String,
        line: usize,
        data: Vec<String>,
    },
}

/// Iterator over the record groups of a document, from a start line onward.
pub struct GroupScanner<'a, S> {
    lines: &'a [S],
    pos: usize,
    state: ScanState,
}

impl<'a, S: AsRef<str>> GroupScanner<'a, S> {
    pub fn new(lines: &'a [S], start: usize) -> Self {
        Self {
            lines,
            pos: start,
            state: ScanState::AwaitingName,
        }
    }

    fn take_group(&mut self, terminated: bool) -> Option<RecordGroup> {
        match std::mem::replace(&mut self.state, ScanState::AwaitingName) {
            ScanState::AwaitingName => None,
            ScanState::AccumulatingData { name, line, data } => Some(RecordGroup {
                name,
                data: data.join(" "),
                terminated,
                line,
            }),
        }
    }
}

impl<'a, S: AsRef<str>> Iterator for GroupScanner<'a, S> {
    type Item = RecordGroup;

    fn next(&mut self) -> Option<RecordGroup> {
        while let Some(raw) = self.lines.get(self.pos) {
            let line_no = self.pos + 1;
            self.pos += 1;
            let line = raw.as_ref().trim();
            if line.is_empty() {
                continue;
            }
            match &mut self.state {
                ScanState::AwaitingName => {
                    self.state = ScanState::AccumulatingData {
                        name: line.to_string(),
                        line: line_no,
                        data: Vec::new(),
                    };
                }
                ScanState::AccumulatingData { data, .. } => {
                    data.push(line.to_string());
                    if tokenize(line).iter().any(|t| is_cas_relative(t)) {
                        return self.take_group(true);
                    }
                }
            }
        }
        self.take_group(false)
    }
}
