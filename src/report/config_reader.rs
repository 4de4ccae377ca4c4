use crate::report::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    #[serde(rename = "reportTitle")]
    pub report_title: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "reportFile")]
    pub report_file: Option<String>,
    #[serde(rename = "automarkFile")]
    pub automark_file: Option<String>,
    #[serde(rename = "outlineLevelStart")]
    pub outline_level_start: Option<u32>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct InputSource {
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "headerRowIndex")]
    _header_row_index: Option<JSValue>,
}

impl InputSource {
    /// The row of the column titles, starting at 1. The first row by default.
    pub fn header_row_index(&self) -> ReportResult<usize> {
        match self._header_row_index {
            None => Ok(1),
            Some(_) => {
                let x = read_js_int(&self._header_row_index)?;
                ensure!(x >= 1, ParsingJsonNumberSnafu {});
                Ok(x)
            }
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct HeadingSource {
    #[serde(rename = "orderColumn")]
    pub order_column: Option<String>,
    #[serde(rename = "titleColumn")]
    pub title_column: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSettings {
    pub comment: Option<String>,
    pub response: Option<String>,
    pub tag: Option<String>,
    pub headings: Vec<HeadingSource>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct SortSettings {
    pub mode: Option<String>,
    #[serde(rename = "byCommentCount")]
    pub by_comment_count: Option<bool>,
    #[serde(rename = "countSortScope")]
    pub count_sort_scope: Option<String>,
    #[serde(rename = "blankHeadings")]
    pub blank_headings: Option<String>,
    #[serde(rename = "customOrder")]
    pub custom_order: Option<Vec<Vec<String>>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct TextSettings {
    pub clean: Option<bool>,
    #[serde(rename = "commentIntro")]
    pub comment_intro: Option<String>,
    #[serde(rename = "responseIntro")]
    pub response_intro: Option<String>,
    #[serde(rename = "introSeparator")]
    pub intro_separator: Option<String>,
    #[serde(rename = "commentIntroEveryComment")]
    pub comment_intro_every_comment: Option<bool>,
    #[serde(rename = "indicateQuantity")]
    pub indicate_quantity: Option<bool>,
    #[serde(rename = "multipleComments")]
    pub multiple_comments: Option<String>,
    #[serde(rename = "singleComment")]
    pub single_comment: Option<String>,
    #[serde(rename = "untitledHeading")]
    pub untitled_heading: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "inputSource", default)]
    pub input_source: InputSource,
    pub columns: ColumnSettings,
    #[serde(default)]
    pub sort: SortSettings,
    #[serde(default)]
    pub text: TextSettings,
}

pub fn read_config(path: &str) -> ReportResult<ReportConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> ReportResult<ReportConfig> {
    let config: ReportConfig = serde_json::from_str(contents).context(ParsingJsonSnafu {})?;
    debug!("parse_config: {:?}", config);
    Ok(config)
}

fn read_js_int(x: &Option<JSValue>) -> ReportResult<usize> {
    match x {
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| x as usize)
            .context(ParsingJsonNumberSnafu {}),
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<usize>()
            .ok()
            .context(ParsingJsonNumberSnafu {}),
        _ => None.context(ParsingJsonNumberSnafu {}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_only_needs_headings() {
        let config = parse_config(
            r#"{"columns": {"headings": [{"titleColumn": "Heading 1"}]}}"#,
        )
        .unwrap();
        assert_eq!(config.columns.headings[0].title_column, "Heading 1");
        assert_eq!(config.columns.headings[0].order_column, None);
        assert_eq!(config.sort, SortSettings::default());
        assert_eq!(config.input_source.header_row_index().unwrap(), 1);
    }

    #[test]
    fn full_config() {
        let config = parse_config(
            r#"{
              "outputSettings": {"reportTitle": "Responses", "outlineLevelStart": 2},
              "inputSource": {"filePath": "comments.xlsx", "excelWorksheetName": "sheet1", "headerRowIndex": "3"},
              "columns": {
                "comment": "Comments", "response": "Response", "tag": "Tags",
                "headings": [
                  {"orderColumn": "Order 1", "titleColumn": "Heading 1"},
                  {"titleColumn": "Heading 2"}
                ]
              },
              "sort": {"mode": "customOrder", "byCommentCount": true,
                       "customOrder": [["Group 1", "Group 2"]]},
              "text": {"indicateQuantity": true}
            }"#,
        )
        .unwrap();
        assert_eq!(config.output_settings.outline_level_start, Some(2));
        assert_eq!(config.input_source.header_row_index().unwrap(), 3);
        assert_eq!(config.columns.tag, Some("Tags".to_string()));
        assert_eq!(config.sort.mode, Some("customOrder".to_string()));
        assert_eq!(config.text.indicate_quantity, Some(true));
    }

    #[test]
    fn rejects_bad_header_row() {
        let config = parse_config(
            r#"{"inputSource": {"headerRowIndex": 0}, "columns": {"headings": []}}"#,
        )
        .unwrap();
        assert!(config.input_source.header_row_index().is_err());
    }

    #[test]
    fn missing_columns_section_is_an_error() {
        assert!(parse_config(r#"{"sort": {}}"#).is_err());
    }
}
