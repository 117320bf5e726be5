//! Workbook parsing via `calamine` (xlsx, xls).
//!
//! Each sheet becomes a list of row records keyed by the header row:
//! - the first non-empty row is the header;
//! - blank header cells are named `Unnamed: <column index>`;
//! - repeated header names get `.1`, `.2`, ... suffixes;
//! - fully blank data rows are skipped, blank cells become `""`.

use std::{collections::HashSet, io::Cursor};

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use tracing::{debug, info};

use super::DocumentParser;
use crate::{
    document::{ParsedDocument, Row, Sheet},
    error::{PipelineError, Result},
};

const FORMAT: &str = "spreadsheet";

/// Largest magnitude at which an integral float still prints as an integer.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Default, Clone, Copy)]
pub struct SpreadsheetParser;

impl DocumentParser for SpreadsheetParser {
    fn format_name(&self) -> &'static str {
        FORMAT
    }

    fn parse(&self, bytes: &[u8]) -> Result<ParsedDocument> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(failure)?;

        let names = workbook.sheet_names().to_vec();
        let mut sheets = Vec::with_capacity(names.len());

        for name in names {
            let range = workbook.worksheet_range(&name).map_err(failure)?;
            let rows = rows_from_range(&range);
            debug!(sheet = %name, rows = rows.len(), "sheet parsed");
            sheets.push(Sheet { name, rows });
        }

        info!(sheets = sheets.len(), "workbook parsed");
        Ok(ParsedDocument::Workbook(sheets))
    }
}

fn failure(e: impl std::fmt::Display) -> PipelineError {
    PipelineError::ParseFailure {
        format: FORMAT,
        reason: e.to_string(),
    }
}

fn rows_from_range(range: &Range<Data>) -> Vec<Row> {
    let first_col = range.start().map(|(_, c)| c as usize).unwrap_or(0);
    let mut rows = range.rows().skip_while(|r| is_blank(r));

    let Some(header_cells) = rows.next() else {
        return Vec::new();
    };
    let header = header_names(header_cells, first_col);

    rows.filter(|r| !is_blank(r))
        .map(|cells| {
            let pairs = header
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    let value = cells.get(i).map(cell_text).unwrap_or_default();
                    (column.clone(), value)
                })
                .collect();
            Row::new(pairs)
        })
        .collect()
}

fn is_blank(cells: &[Data]) -> bool {
    cells.iter().all(|c| cell_text(c).is_empty())
}

fn header_names(cells: &[Data], first_col: usize) -> Vec<String> {
    let mut seen = HashSet::with_capacity(cells.len());
    let mut names = Vec::with_capacity(cells.len());

    for (i, cell) in cells.iter().enumerate() {
        let raw = cell_text(cell);
        let base = if raw.is_empty() {
            format!("Unnamed: {}", first_col + i)
        } else {
            raw
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(name.clone());
        names.push(name);
    }
    names
}

/// Renders any cell as text; empty cells become `""`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => float_text(*f),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) if !dt.is_duration() => d.format("%Y-%m-%d %H:%M:%S").to_string(),
            _ => float_text(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

fn float_text(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < MAX_EXACT_INT {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_floats_drop_fraction() {
        assert_eq!(float_text(42.0), "42");
        assert_eq!(float_text(-3.0), "-3");
        assert_eq!(float_text(3.5), "3.5");
        assert_eq!(float_text(0.1), "0.1");
    }

    #[test]
    fn scalar_cells_render_as_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("x".into())), "x");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Bool(true)), "True");
        assert_eq!(cell_text(&Data::Bool(false)), "False");
        assert_eq!(
            cell_text(&Data::DateTimeIso("2024-03-05T10:00:00".into())),
            "2024-03-05T10:00:00"
        );
    }

    #[test]
    fn header_names_fill_blanks_and_dedupe() {
        let cells = vec![
            Data::String("a".into()),
            Data::Empty,
            Data::String("a".into()),
            Data::String("a".into()),
        ];
        assert_eq!(
            header_names(&cells, 0),
            vec!["a", "Unnamed: 1", "a.1", "a.2"]
        );
    }

    #[test]
    fn range_rows_become_records_with_empty_strings() {
        let mut range = Range::new((0, 0), (3, 2));
        range.set_value((0, 0), Data::String("Name".into()));
        range.set_value((0, 1), Data::String("Qty".into()));
        range.set_value((0, 2), Data::String("Note".into()));
        range.set_value((1, 0), Data::String("Bolt".into()));
        range.set_value((1, 1), Data::Float(12.0));
        // row 2 is left blank and must be skipped
        range.set_value((3, 0), Data::String("Nut".into()));
        range.set_value((3, 2), Data::String("spare".into()));

        let rows = rows_from_range(&range);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Qty"), Some("12"));
        assert_eq!(rows[0].get("Note"), Some(""));
        assert_eq!(rows[1].get("Qty"), Some(""));
        assert_eq!(rows[1].get("Note"), Some("spare"));
    }

    #[test]
    fn garbage_bytes_fail_without_partial_result() {
        let err = SpreadsheetParser.parse(b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, PipelineError::ParseFailure { format: FORMAT, .. }));
    }
}
