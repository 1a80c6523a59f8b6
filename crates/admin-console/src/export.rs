//! CSV export of the currently visible columns and loaded rows.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::columns::ColumnDef;

/// A finished export, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

impl CsvExport {
    /// Write the file into `dir` and return its path.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.content)?;
        info!(path = %path.display(), bytes = self.content.len(), "CSV export written");
        Ok(path)
    }
}

/// Quote a field when it contains a delimiter, quote, or line break.
pub fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Header of visible column titles, then one line per record.
pub fn to_csv<E>(columns: &[&ColumnDef<E>], records: &[E]) -> String {
    let mut csv = columns
        .iter()
        .map(|c| escape_field(c.title))
        .collect::<Vec<_>>()
        .join(",");
    csv.push('\n');
    for record in records {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| escape_field(&c.value(record).render()))
            .collect();
        csv.push_str(&cells.join(","));
        csv.push('\n');
    }
    csv
}

pub fn export_filename(plural: &str, today: NaiveDate) -> String {
    format!("{}_export_{}.csv", plural, today.format("%Y-%m-%d"))
}
