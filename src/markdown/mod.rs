//! Line tokenizer pipeline for semi-structured text tables.
//!
//! ## Flow
//!
//! ```text
//! text ──▶ find_data_start ──▶ GroupScanner ──▶ tokenize ──▶ decode_tokens ──▶ Record
//!          (sentinel/header)   (name + data)    (± split)    (slot by slot)
//! ```
//!
//! Every group that decodes to nothing is dropped and noted in
//! [`ExtractionOutput::failures`]; the scan always runs to the end of the
//! document.

pub mod cas;
pub mod decoder;
pub mod scanner;
pub mod tokenizer;

use crate::config::ExtractionConfig;
use crate::error::StageError;
use crate::output::{ExtractionOutput, SourceKind};
use crate::record::Record;
use decoder::decode_tokens;
use scanner::{find_data_start, GroupScanner};
use tokenizer::tokenize;
use tracing::{debug, info};

/// Decode one species name and its field-data text.
///
/// Returns `None` when the name is blank or the data has no tokens.
pub fn parse_record(name: &str, data: &str) -> Option<Record> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let entry = decode_tokens(&tokenize(data))?;
    Some(entry.into_record(Some(name.to_string())))
}

/// Parse a whole document into records, in document order.
pub fn parse_document(text: &str, config: &ExtractionConfig) -> ExtractionOutput {
    let mut output = ExtractionOutput::new(SourceKind::Markdown);
    let lines: Vec<&str> = text.lines().collect();
    output.stats.units_scanned = lines.len();

    let anchor = find_data_start(&lines, &config.sentinel_species, &config.header_phrase);
    debug!(anchor = anchor.label(), start = anchor.start_line(), "data start located");
    output.note(format!("start_anchor={}", anchor.label()));
    output.note(format!("start_line={}", anchor.start_line() + 1));

    let mut groups = 0usize;
    let mut unterminated = 0usize;
    for group in GroupScanner::new(&lines, anchor.start_line()) {
        groups += 1;
        if !group.terminated {
            unterminated += 1;
            debug!(name = %group.name, line = group.line, "group ran to end of input");
        }
        match parse_record(&group.name, &group.data) {
            Some(record) => output.records.push(record),
            None => {
                debug!(name = %group.name, line = group.line, "group dropped");
                output.failures.push(StageError::GroupDropped {
                    name: group.name,
                    line: group.line,
                    reason: "no field data".into(),
                });
            }
        }
    }

    output.stats.records = output.records.len();
    output.stats.skipped = output.failures.len();
    output.note(format!("groups={groups}"));
    output.note(format!("unterminated_groups={unterminated}"));
    output.note(format!("records={}", output.records.len()));
    output.note(format!("dropped_groups={}", output.failures.len()));
    info!(
        "Parsed {} records from {} groups ({} dropped)",
        output.records.len(),
        groups,
        output.failures.len()
    );
    output
}
