// ********* Input records ***********

use std::collections::HashMap;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub enum Underline {
    #[default]
    None,
    Single,
    Double,
}

/// Character formatting attached to a run of rich text.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct RunFormat {
    pub bold: bool,
    pub italic: bool,
    pub underline: Underline,
    pub strike: bool,
    pub superscript: bool,
    pub subscript: bool,
}

impl RunFormat {
    pub const PLAIN: RunFormat = RunFormat {
        bold: false,
        italic: false,
        underline: Underline::None,
        strike: false,
        superscript: false,
        subscript: false,
    };

    pub fn is_plain(&self) -> bool {
        *self == RunFormat::PLAIN
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct Run {
    pub text: String,
    pub format: RunFormat,
}

impl Run {
    pub fn plain(text: &str) -> Run {
        Run {
            text: text.to_string(),
            format: RunFormat::PLAIN,
        }
    }
}

/// The content of a cell with formatting runs. Newlines inside the runs
/// separate paragraphs.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RichText {
    pub runs: Vec<Run>,
}

impl RichText {
    pub fn plain(text: &str) -> RichText {
        RichText {
            runs: vec![Run::plain(text)],
        }
    }

    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }
}

/// A typed cell value. Empty cells are not stored in a record.
#[derive(PartialEq, Debug, Clone)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Rich(RichText),
}

impl CellValue {
    /// The text as displayed in a spreadsheet. Integral numbers are printed
    /// without a fractional part.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Rich(rt) => rt.plain_text(),
        }
    }

    /// The value as rich text. Plain cells become a single unformatted run.
    pub fn to_rich_text(&self) -> RichText {
        match self {
            CellValue::Rich(rt) => rt.clone(),
            other => RichText::plain(&other.display_text()),
        }
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// One row of the input sheet.
#[derive(PartialEq, Debug, Clone)]
pub struct Record {
    /// Position of the row in the sheet (1-based, like a spreadsheet).
    pub row: usize,
    pub(crate) cells: HashMap<String, CellValue>,
}

impl Record {
    pub fn new(row: usize, cells: HashMap<String, CellValue>) -> Record {
        Record { row, cells }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    /// The display text of a column, if the cell is present.
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).map(|v| v.display_text())
    }
}

/// The records of a sheet, with the titles of the header row in column order.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RecordSet {
    pub header: Vec<String>,
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn has_column(&self, title: &str) -> bool {
        self.header.iter().any(|h| h == title)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_display_like_a_spreadsheet() {
        assert_eq!(CellValue::Number(3.0).display_text(), "3");
        assert_eq!(CellValue::Number(-2.0).display_text(), "-2");
        assert_eq!(CellValue::Number(2.5).display_text(), "2.5");
    }

    #[test]
    fn rich_text_plain_text_joins_runs() {
        let rt = RichText {
            runs: vec![
                Run::plain("Hello "),
                Run {
                    text: "world".to_string(),
                    format: RunFormat {
                        bold: true,
                        ..RunFormat::PLAIN
                    },
                },
            ],
        };
        assert_eq!(rt.plain_text(), "Hello world");
        assert!(!rt.is_blank());
        assert!(RichText::plain(" \n ").is_blank());
    }
}
