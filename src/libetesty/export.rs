//! Reading the downloaded question folders and writing the Anki import file.

use crate::error::{Error, Result};
use crate::record::{normalize, NormalizedRow, QuestionRecord};
use log::{debug, info, warn};
use serde_json::Value;
use std::cmp::Ordering;
use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use walkdir::WalkDir;

pub const QUESTION_FILE: &str = "question.json";

pub const DIRECTIVES: [&str; 3] = ["#separator:tab", "#html:true", "#tags column:11"];

pub const HEADER: [&str; 11] = [
    "id",
    "questionText",
    "explanationNote",
    "mediaContent",
    "answer1",
    "answer2",
    "answer3",
    "is-correct-answer-1",
    "is-correct-answer-2",
    "is-correct-answer-3",
    "tags",
];

/// Loads every `<media_root>/*/question.json`, ordered by question id.
/// Unreadable files abort the load; files that are not JSON are skipped.
pub fn load_records(media_root: &Path) -> Result<Vec<QuestionRecord>> {
    if !media_root.is_dir() {
        return Err(Error::MissingDirectory(media_root.to_path_buf()));
    }

    let mut records = Vec::new();
    for entry in WalkDir::new(media_root).min_depth(2).max_depth(2) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(media_root).to_path_buf();
            Error::io(path, e.into())
        })?;
        if !entry.file_type().is_file() || entry.file_name() != QUESTION_FILE {
            continue;
        }

        let path = entry.path();
        let json = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        match serde_json::from_str::<Value>(&json) {
            Ok(value) => {
                debug!("[Export] Read {:?}", path);
                records.push(QuestionRecord::from_value(value));
            }
            Err(e) => warn!("[Export] Skipping {:?}: malformed JSON: {}", path, e),
        }
    }

    records.sort_by(|a, b| compare_ids(&a.id_text(), &b.id_text()));
    info!("[Export] Loaded {} questions from {:?}", records.len(), media_root);
    Ok(records)
}

/// Integer ids compare numerically and sort before anything else.
fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

pub fn write_document<W: Write>(rows: &[NormalizedRow], mut writer: W) -> std::io::Result<()> {
    for directive in DIRECTIVES {
        writeln!(writer, "{directive}")?;
    }
    writeln!(writer, "{}", HEADER.join("\t"))?;
    for row in rows {
        writeln!(writer, "{row}")?;
    }
    writer.flush()
}

/// Creates or truncates `destination` and writes the full document to it.
pub fn export(rows: &[NormalizedRow], destination: &Path) -> Result<()> {
    let file = File::create(destination).map_err(|e| Error::io(destination, e))?;
    write_document(rows, BufWriter::new(file)).map_err(|e| Error::io(destination, e))?;
    info!("[Export] Wrote {} rows to {:?}", rows.len(), destination);
    Ok(())
}

/// Load, normalize and export in one pass. Returns the number of rows.
pub fn convert(media_root: &Path, destination: &Path) -> Result<usize> {
    let rows: Vec<NormalizedRow> = load_records(media_root)?.iter().map(normalize).collect();
    export(&rows, destination)?;
    Ok(rows.len())
}
