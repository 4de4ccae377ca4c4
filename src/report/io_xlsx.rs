use crate::report::*;

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use comment_grouping::builder::Builder;

/// Reads the records of a worksheet. The titles are read from the header row
/// (starting at 1), and every following row that is not entirely empty is a
/// record.
pub fn read_records(
    path: &str,
    worksheet_name: Option<&str>,
    header_row_index: usize,
) -> ReportResult<RecordSet> {
    let wrange = get_range(path, worksheet_name)?;
    // Sheet row of the first row of the range, starting at 1.
    let range_first_row = wrange.start().map(|(r, _)| r as usize + 1).unwrap_or(1);
    debug!(
        "read_records: path: {:?} range starts at row {:?}, header row {:?}",
        path, range_first_row, header_row_index
    );
    ensure!(
        header_row_index >= range_first_row,
        MissingHeaderSnafu {
            path,
            row: header_row_index
        }
    );

    let mut iter = wrange.rows().skip(header_row_index - range_first_row);
    let header_cells = iter.next().context(MissingHeaderSnafu {
        path,
        row: header_row_index,
    })?;
    let header: Vec<String> = header_cells
        .iter()
        .map(|c| read_cell(c).map(|v| v.display_text()).unwrap_or_default())
        .collect();
    debug!("read_records: header: {:?}", header);
    ensure!(
        header.iter().any(|t| !t.trim().is_empty()),
        MissingHeaderSnafu {
            path,
            row: header_row_index
        }
    );

    let mut builder = Builder::new(&header);
    let mut row_number = header_row_index;
    let mut skipped = 0;
    for row in iter {
        row_number += 1;
        let cells: Vec<Option<CellValue>> = row.iter().map(read_cell).collect();
        if cells.iter().all(|c| c.is_none()) {
            skipped += 1;
            continue;
        }
        builder.add_row_at(row_number, &cells);
    }
    let records = builder.build();
    info!(
        "Read {:?} records from {:?} ({:?} empty rows skipped)",
        records.len(),
        simplify_file_name(path),
        skipped
    );
    Ok(records)
}

fn get_range(path: &str, worksheet_name_o: Option<&str>) -> ReportResult<Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                path,
                name: worksheet_name,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptyExcelSnafu { path }.fail(),
            [(worksheet_name, wrange)] => {
                debug!(
                    "get_range: path: {:?} using the only worksheet: {:?}",
                    &path, &worksheet_name
                );
                Ok(wrange.clone())
            }
            _ => {
                let names: Vec<String> = all_worksheets.iter().map(|(n, _)| n.clone()).collect();
                AmbiguousWorksheetSnafu {
                    path,
                    names: names.join(", "),
                }
                .fail()
            }
        }
    }
}

// Only the value of a cell is available here, never its formatting runs.
fn read_cell(cell: &DataType) -> Option<CellValue> {
    match cell {
        DataType::String(s) if s.trim().is_empty() => None,
        DataType::String(s) => Some(CellValue::Text(s.clone())),
        DataType::Float(f) => Some(CellValue::Number(*f)),
        DataType::Int(i) => Some(CellValue::Number(*i as f64)),
        DataType::Bool(b) => Some(CellValue::Text(
            if *b { "TRUE" } else { "FALSE" }.to_string(),
        )),
        // Serial date number, as shown by a spreadsheet without date format.
        DataType::DateTime(f) => Some(CellValue::Number(*f)),
        DataType::Empty => None,
        other => {
            debug!("read_cell: ignoring cell {:?}", other);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use std::path::PathBuf;

    fn temp_xlsx(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "comment-response-{}-{}.xlsx",
            name,
            std::process::id()
        ))
    }

    // Header on the second row, with an empty row between the records.
    fn write_sample(path: &PathBuf, with_second_sheet: bool) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Comments").unwrap();
        sheet.write_string(0, 0, "Public comments").unwrap();
        for (col, title) in ["Order 1", "Heading 1", "Comments", "Response", "Tags"]
            .iter()
            .enumerate()
        {
            sheet.write_string(1, col as u16, *title).unwrap();
        }
        sheet.write_number(2, 0, 2.0).unwrap();
        sheet.write_string(2, 1, "Noise").unwrap();
        sheet.write_string(2, 2, "Too loud at night.").unwrap();
        sheet.write_string(2, 4, "Smith").unwrap();
        sheet.write_number(4, 0, 1.0).unwrap();
        sheet.write_string(4, 1, "Traffic").unwrap();
        sheet.write_string(4, 2, "More buses.").unwrap();
        sheet.write_string(4, 3, "We agree.").unwrap();
        if with_second_sheet {
            let other = workbook.add_worksheet();
            other.set_name("Notes").unwrap();
            other.write_string(0, 0, "nothing").unwrap();
        }
        workbook.save(path).unwrap();
    }

    #[test]
    fn reads_records_below_the_header_row() {
        let path = temp_xlsx("records");
        write_sample(&path, false);
        let p = path.display().to_string();

        let records = read_records(&p, None, 2).unwrap();
        assert_eq!(
            records.header,
            vec!["Order 1", "Heading 1", "Comments", "Response", "Tags"]
        );
        let rows: Vec<usize> = records.records.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![3, 5]);
        let first = &records.records[0];
        assert_eq!(first.get("Order 1"), Some(&CellValue::Number(2.0)));
        assert_eq!(first.text("Heading 1"), Some("Noise".to_string()));
        assert_eq!(first.get("Response"), None);
        assert_eq!(
            records.records[1].text("Response"),
            Some("We agree.".to_string())
        );
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn groups_records_read_from_a_sheet() {
        let path = temp_xlsx("grouping");
        write_sample(&path, false);
        let p = path.display().to_string();

        let records = read_records(&p, Some("Comments"), 2).unwrap();
        let config = SortConfig::new(vec![HeadingColumns::ordered("Order 1", "Heading 1")]);
        let grouping = group_records(&records, &config).unwrap();
        let titles: Vec<String> = grouping
            .tree
            .roots
            .iter()
            .filter_map(|n| match n {
                GroupNode::Branch(b) => Some(b.heading.title.clone()),
                GroupNode::Leaf(_) => None,
            })
            .collect();
        assert_eq!(titles, vec!["Traffic", "Noise"]);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn worksheet_selection() {
        let path = temp_xlsx("sheets");
        write_sample(&path, true);
        let p = path.display().to_string();

        assert!(matches!(
            read_records(&p, None, 2),
            Err(ReportError::AmbiguousWorksheet { .. })
        ));
        assert!(matches!(
            read_records(&p, Some("Missing"), 2),
            Err(ReportError::MissingWorksheet { .. })
        ));
        assert!(read_records(&p, Some("Comments"), 2).is_ok());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn header_row_past_the_data() {
        let path = temp_xlsx("header");
        write_sample(&path, false);
        let p = path.display().to_string();

        assert!(matches!(
            read_records(&p, None, 40),
            Err(ReportError::MissingHeader { .. })
        ));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read_records("/nonexistent/comments.xlsx", None, 1),
            Err(ReportError::OpeningExcel { .. })
        ));
    }
}
