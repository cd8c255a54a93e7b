//! Rewrites an older export so the three `true`/`false` correctness columns
//! collapse into one 1-based "correct choice" column.

use log::debug;

/// How the correctness columns are found in a data line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// The last three boolean tokens within the trailing `window` fields of
    /// any line with at least `min_fields` fields.
    Scan {
        choice_column: usize,
        min_fields: usize,
        window: usize,
    },
    /// Known positions in lines of exactly `field_count` fields.
    Fixed {
        choice_column: usize,
        correct_columns: [usize; 3],
        field_count: usize,
    },
}

impl Default for Layout {
    fn default() -> Self {
        Layout::scan(4)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    pub migrated: usize,
    pub passed_through: usize,
}

fn parse_flag(field: &str) -> Option<bool> {
    if field.eq_ignore_ascii_case("true") {
        Some(true)
    } else if field.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

impl Layout {
    /// Scanning layout that writes the choice into `choice_column`.
    pub fn scan(choice_column: usize) -> Self {
        Layout::Scan {
            choice_column,
            min_fields: 13,
            window: 6,
        }
    }

    fn choice_column(&self) -> usize {
        match self {
            Layout::Scan { choice_column, .. } | Layout::Fixed { choice_column, .. } => {
                *choice_column
            }
        }
    }

    /// Column indices and values of the three flags, if the line qualifies.
    fn locate(&self, fields: &[&str]) -> Option<[(usize, bool); 3]> {
        match *self {
            Layout::Scan {
                min_fields, window, ..
            } => {
                if fields.len() < min_fields {
                    return None;
                }
                let found: Vec<(usize, bool)> = (fields.len().saturating_sub(window)..fields.len())
                    .filter_map(|i| parse_flag(fields[i]).map(|flag| (i, flag)))
                    .collect();
                match found.as_slice() {
                    [.., a, b, c] => Some([*a, *b, *c]),
                    _ => None,
                }
            }
            Layout::Fixed {
                correct_columns,
                field_count,
                ..
            } => {
                if fields.len() != field_count || correct_columns.iter().any(|&c| c >= field_count) {
                    return None;
                }
                Some(correct_columns.map(|c| (c, parse_flag(fields[c]).unwrap_or(false))))
            }
        }
    }

    /// The rewritten line, or `None` when it does not match this layout.
    pub fn migrate_line(&self, line: &str) -> Option<String> {
        let fields: Vec<&str> = line.split('\t').collect();
        let flags = self.locate(&fields)?;
        let choice_column = self.choice_column();
        if choice_column >= fields.len() {
            return None;
        }

        let choice = flags
            .iter()
            .position(|&(_, correct)| correct)
            .map_or(1, |slot| slot + 1)
            .to_string();
        let rewritten: Vec<&str> = fields
            .iter()
            .enumerate()
            .map(|(column, &field)| {
                if flags.iter().any(|&(c, _)| c == column) {
                    ""
                } else if column == choice_column {
                    choice.as_str()
                } else {
                    field
                }
            })
            .collect();
        Some(rewritten.join("\t"))
    }
}

/// Migrates a whole document. Leading `#` lines and blank lines are kept
/// verbatim, as is any data line the layout does not recognise.
pub fn migrate(document: &str, layout: &Layout) -> (String, MigrationReport) {
    let mut report = MigrationReport::default();
    let mut out = String::with_capacity(document.len());
    let mut in_directives = true;

    for line in document.lines() {
        if in_directives && line.starts_with('#') {
            out.push_str(line);
            out.push('\n');
            continue;
        }
        in_directives = false;

        if line.trim().is_empty() {
            out.push_str(line);
        } else if let Some(fixed) = layout.migrate_line(line) {
            report.migrated += 1;
            out.push_str(&fixed);
        } else {
            debug!("[Migrate] Passing through line: {:?}", line);
            report.passed_through += 1;
            out.push_str(line);
        }
        out.push('\n');
    }

    (out, report)
}
