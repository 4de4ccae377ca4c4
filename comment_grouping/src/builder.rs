use std::collections::{HashMap, HashSet};

use crate::record::{CellValue, Record, RecordSet};

/// A builder for assembling the records of a sheet, row by row.
///
/// ```
/// use comment_grouping::builder::Builder;
/// use comment_grouping::CellValue;
///
/// let mut builder = Builder::new(&["Heading 1".to_string(), "Comments".to_string()]);
/// builder.add_text_row(&["Noise", "Too loud at night."]);
/// builder.add_row(&[None, Some(CellValue::Text("No heading here.".to_string()))]);
///
/// let records = builder.build();
/// assert_eq!(records.len(), 2);
/// assert_eq!(records.records[0].row, 2);
/// assert!(records.records[1].get("Heading 1").is_none());
/// ```
pub struct Builder {
    pub(crate) _header: Vec<String>,
    // Column index -> title, for the columns that can be looked up.
    pub(crate) _columns: Vec<(usize, String)>,
    pub(crate) _first_row: usize,
    pub(crate) _records: Vec<Record>,
}

impl Builder {
    /// Starts a sheet with the given header row.
    ///
    /// Blank titles are ignored. When a title appears more than once, the
    /// first column with this title is used.
    pub fn new(header: &[String]) -> Builder {
        let mut seen: HashSet<String> = HashSet::new();
        let mut columns: Vec<(usize, String)> = Vec::new();
        for (idx, title) in header.iter().enumerate() {
            let t = title.trim();
            if !t.is_empty() && seen.insert(t.to_string()) {
                columns.push((idx, t.to_string()));
            }
        }
        Builder {
            _header: columns.iter().map(|(_, t)| t.clone()).collect(),
            _columns: columns,
            _first_row: 2,
            _records: Vec::new(),
        }
    }

    /// The sheet row number of the first record (2 by default, just below the
    /// header row).
    pub fn first_row(self, row: usize) -> Builder {
        Builder {
            _first_row: row,
            ..self
        }
    }

    /// Adds a row, just below the previous one. `None` is an empty cell.
    pub fn add_row(&mut self, cells: &[Option<CellValue>]) {
        let row = self
            ._records
            .last()
            .map(|r| r.row + 1)
            .unwrap_or(self._first_row);
        self.add_row_at(row, cells);
    }

    /// Adds a row with its sheet row number, when some rows are left out.
    pub fn add_row_at(&mut self, row: usize, cells: &[Option<CellValue>]) {
        let mut values: HashMap<String, CellValue> = HashMap::new();
        for (idx, title) in self._columns.iter() {
            if let Some(Some(v)) = cells.get(*idx) {
                values.insert(title.clone(), v.clone());
            }
        }
        self._records.push(Record::new(row, values));
    }

    /// Adds a row of text cells. Empty strings are empty cells.
    pub fn add_text_row(&mut self, cells: &[&str]) {
        let values: Vec<Option<CellValue>> = cells
            .iter()
            .map(|s| {
                if s.is_empty() {
                    None
                } else {
                    Some(CellValue::Text(s.to_string()))
                }
            })
            .collect();
        self.add_row(&values);
    }

    pub fn build(self) -> RecordSet {
        RecordSet {
            header: self._header,
            records: self._records,
        }
    }
}
