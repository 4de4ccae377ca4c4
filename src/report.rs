use log::{debug, info, warn};

use comment_grouping::extract::{CommentGroup, ExtractColumns};
use comment_grouping::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::report::config_reader::*;
use crate::report::io_common::*;
use crate::report::render::RenderSettings;

pub mod automark;
pub mod config_reader;
pub mod io_common;
pub mod io_xlsx;
pub mod render;

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {name:?} not found in {path}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display(
        "{path} has several worksheets ({names}), the worksheet name must be provided"
    ))]
    AmbiguousWorksheet { path: String, names: String },
    #[snafu(display("No column titles on row {row} of {path}"))]
    MissingHeader { path: String, row: usize },
    #[snafu(display("Error reading file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the configuration: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a row number (starting at 1) in the configuration"))]
    ParsingJsonNumber {},
    #[snafu(display("Error reading file {path}"))]
    ReadingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Cannot find the directory of {path}"))]
    MissingParentDir { path: String },
    #[snafu(display("{source}"))]
    Grouping { source: GroupingError },
    #[snafu(display("internal error: heading {heading:?} has no content"))]
    EmptySection { heading: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

/// Everything needed for a run, checked and with all the paths resolved.
#[derive(PartialEq, Debug, Clone)]
pub struct ReportSettings {
    pub input_path: String,
    pub worksheet: Option<String>,
    pub header_row_index: usize,
    pub sort: SortConfig,
    pub columns: ExtractColumns,
    pub render: RenderSettings,
    pub report_path: String,
    pub automark_path: Option<String>,
}

fn validate_sort(
    sort: &SortSettings,
    columns: &ColumnSettings,
    mode_override: Option<&str>,
) -> ReportResult<SortConfig> {
    let levels: Vec<HeadingColumns> = columns
        .headings
        .iter()
        .map(|h| HeadingColumns {
            order: h.order_column.clone().filter(|s| !s.trim().is_empty()),
            title: h.title_column.clone(),
        })
        .collect();
    let mut res = SortConfig::new(levels);
    res.mode = match mode_override.or(sort.mode.as_deref()) {
        None | Some("alphabetical") => SortMode::Alphabetical,
        Some("asFound") => SortMode::AsFound,
        Some("customOrder") => SortMode::CustomOrder,
        Some(x) => whatever!(
            "Unknown sort mode {:?}: expected alphabetical, asFound or customOrder",
            x
        ),
    };
    res.priorities = match (&sort.custom_order, mode_override) {
        // The mode given on the command line takes precedence over the lists.
        (Some(_), Some(_)) if res.mode != SortMode::CustomOrder => {
            debug!("validate_sort: ignoring the custom order lists");
            Vec::new()
        }
        (Some(lists), _) => lists.clone(),
        (None, _) => Vec::new(),
    };
    res.sort_leaves_by_count = sort.by_comment_count.unwrap_or(false);
    res.count_sort_scope = match sort.count_sort_scope.as_deref() {
        None | Some("leafGroups") => CountSortScope::LeafGroups,
        Some("allLevels") => CountSortScope::AllLevels,
        Some(x) => whatever!(
            "Unknown count sort scope {:?}: expected leafGroups or allLevels",
            x
        ),
    };
    res.blank_headings = match sort.blank_headings.as_deref() {
        None | Some("flatten") => BlankHeadingPolicy::Flatten,
        Some("trimSole") => BlankHeadingPolicy::TrimSole,
        Some(x) => whatever!(
            "Unknown blank heading policy {:?}: expected flatten or trimSole",
            x
        ),
    };
    Ok(res)
}

fn validate_text(text: &TextSettings, output: &OutputSettings) -> RenderSettings {
    let d = RenderSettings::default();
    RenderSettings {
        title: output
            .report_title
            .clone()
            .filter(|s| !s.trim().is_empty()),
        outline_level_start: output.outline_level_start.unwrap_or(d.outline_level_start),
        clean: text.clean.unwrap_or(d.clean),
        comment_intro: text.comment_intro.clone().unwrap_or(d.comment_intro),
        response_intro: text.response_intro.clone().unwrap_or(d.response_intro),
        intro_separator: text.intro_separator.clone().unwrap_or(d.intro_separator),
        comment_intro_every_comment: text
            .comment_intro_every_comment
            .unwrap_or(d.comment_intro_every_comment),
        indicate_quantity: text.indicate_quantity.unwrap_or(d.indicate_quantity),
        multiple_comments: text
            .multiple_comments
            .clone()
            .unwrap_or(d.multiple_comments),
        single_comment: text.single_comment.clone().unwrap_or(d.single_comment),
        untitled_heading: text.untitled_heading.clone().unwrap_or(d.untitled_heading),
    }
}

/// Checks the configuration and applies the command line overrides.
///
/// `root` is the directory of the configuration file: the relative paths of
/// the configuration are resolved from there.
pub fn validate_settings(
    config: &ReportConfig,
    root: &Path,
    args: &Args,
) -> ReportResult<ReportSettings> {
    ensure_whatever!(
        config.output_settings.outline_level_start != Some(0),
        "outlineLevelStart starts at 1"
    );
    let input_path = match (&args.input, &config.input_source.file_path) {
        (Some(p), _) => p.clone(),
        (None, Some(p)) => resolve_path(root, p),
        (None, None) => whatever!("No input file: use --input or set inputSource.filePath"),
    };
    let worksheet = args
        .excel_worksheet_name
        .clone()
        .or_else(|| config.input_source.excel_worksheet_name.clone());

    let columns = ExtractColumns {
        comment: config
            .columns
            .comment
            .clone()
            .unwrap_or_else(|| "Comments".to_string()),
        response: config
            .columns
            .response
            .clone()
            .unwrap_or_else(|| "Response".to_string()),
        tag: config.columns.tag.clone().filter(|s| !s.trim().is_empty()),
    };

    let output_dir = resolve_path(
        root,
        config
            .output_settings
            .output_directory
            .as_deref()
            .unwrap_or("output"),
    );
    let report_path = match &args.out {
        Some(p) => p.clone(),
        None => resolve_path(
            Path::new(&output_dir),
            config
                .output_settings
                .report_file
                .as_deref()
                .unwrap_or("section.md"),
        ),
    };
    let automark_path = match (&columns.tag, &args.automark) {
        (Some(_), Some(p)) => Some(p.clone()),
        (Some(_), None) => Some(resolve_path(
            Path::new(&output_dir),
            config
                .output_settings
                .automark_file
                .as_deref()
                .unwrap_or("automark.md"),
        )),
        (None, Some(_)) => whatever!("The automark index needs a tag column (columns.tag)"),
        (None, None) => None,
    };

    Ok(ReportSettings {
        input_path,
        worksheet,
        header_row_index: config.input_source.header_row_index()?,
        sort: validate_sort(&config.sort, &config.columns, args.sort_mode.as_deref())?,
        columns,
        render: validate_text(&config.text, &config.output_settings),
        report_path,
        automark_path,
    })
}

fn config_from_args(args: &Args) -> ReportResult<ReportConfig> {
    let headings: Vec<HeadingSource> = match &args.headings {
        Some(titles) if !titles.is_empty() => titles
            .iter()
            .map(|t| HeadingSource {
                order_column: None,
                title_column: t.clone(),
            })
            .collect(),
        _ => whatever!("Without configuration file, the heading columns must be given with --headings"),
    };
    Ok(ReportConfig {
        output_settings: OutputSettings::default(),
        input_source: InputSource::default(),
        columns: ColumnSettings {
            comment: None,
            response: None,
            tag: None,
            headings,
        },
        sort: SortSettings::default(),
        text: TextSettings::default(),
    })
}

fn check_columns(records: &RecordSet, columns: &ExtractColumns) -> ReportResult<()> {
    let mut required: Vec<&String> = vec![&columns.comment, &columns.response];
    required.extend(columns.tag.iter());
    for c in required {
        if !records.has_column(c) {
            whatever!(
                "Column {:?} is not in the header row {:?}",
                c,
                records.header
            );
        }
    }
    Ok(())
}

fn node_to_json(node: &GroupNode, columns: &ExtractColumns, clean: bool) -> JSValue {
    match node {
        GroupNode::Leaf(leaf) => {
            // The warnings were already collected by the renderer.
            let mut ws = Warnings::new();
            let group = CommentGroup::from_leaf(leaf, columns, clean, &mut ws);
            let rows: Vec<usize> = leaf.records.iter().map(|r| r.row).collect();
            json!({
                "rows": rows,
                "comments": group.comments.len(),
                "answered": !group.response.is_placeholder()
            })
        }
        GroupNode::Branch(b) => {
            let children: Vec<JSValue> = b
                .children
                .iter()
                .map(|c| node_to_json(c, columns, clean))
                .collect();
            let order: Option<String> = b.heading.order.map(|o| o.to_string());
            json!({
                "heading": b.heading.title,
                "order": order,
                "records": node.record_count(),
                "children": children
            })
        }
    }
}

fn build_summary_js(settings: &ReportSettings, tree: &GroupTree, warnings: &Warnings) -> JSValue {
    let outline: Vec<JSValue> = tree
        .roots
        .iter()
        .map(|n| node_to_json(n, &settings.columns, settings.render.clean))
        .collect();
    let headings: Vec<String> = settings.sort.levels.iter().map(|l| l.title.clone()).collect();
    let mut ws = Warnings::new();
    let unanswered = tree
        .leaves()
        .into_iter()
        .filter(|l| {
            CommentGroup::from_leaf(l, &settings.columns, settings.render.clean, &mut ws)
                .response
                .is_placeholder()
        })
        .count();
    json!({
        "config": {
            "input": simplify_file_name(&settings.input_path),
            "worksheet": settings.worksheet,
            "sortMode": format!("{:?}", settings.sort.mode),
            "headings": headings
        },
        "records": tree.record_count(),
        "commentGroups": tree.leaves().len(),
        "unanswered": unanswered,
        "outline": outline,
        "warnings": warnings.summary()
    })
}

fn check_reference(reference_path: &str, report: &str) -> ReportResult<()> {
    let reference = fs::read_to_string(reference_path).context(ReadingFileSnafu {
        path: reference_path,
    })?;
    debug!("check_reference: {:?} bytes", reference.len());
    if reference.trim_end() != report.trim_end() {
        warn!("Found differences with the reference report");
        print_diff(reference.trim_end(), report.trim_end(), "\n");
        whatever!(
            "Difference detected between the report and the reference {}",
            reference_path
        )
    }
    info!("The report matches the reference {:?}", reference_path);
    Ok(())
}

/// Reads the comments, groups them and writes the report, following the
/// configuration file and the command line.
pub fn run_report(args: &Args) -> ReportResult<()> {
    let (config, root): (ReportConfig, PathBuf) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .context(MissingParentDirSnafu { path: config_path })?
                .to_path_buf();
            (config, root)
        }
        None => (config_from_args(args)?, PathBuf::new()),
    };
    info!("config: {:?}", config);

    let settings = validate_settings(&config, &root, args)?;
    debug!("run_report: settings: {:?}", settings);

    let records = io_xlsx::read_records(
        &settings.input_path,
        settings.worksheet.as_deref(),
        settings.header_row_index,
    )?;
    settings
        .sort
        .validate(&records.header)
        .context(GroupingSnafu {})?;
    check_columns(&records, &settings.columns)?;

    let grouping = group_records(&records, &settings.sort).context(GroupingSnafu {})?;
    let tree = grouping.tree;
    let mut warnings = grouping.warnings;

    let report = render::render_report(&tree, &settings.columns, &settings.render, &mut warnings)?;
    write_output(&settings.report_path, &report)?;

    if let (Some(path), Some(tag)) = (&settings.automark_path, &settings.columns.tag) {
        let entries = automark_entries(&records, tag);
        info!("Writing {:?} index entries", entries.len());
        write_output(path, &automark::render_automark(&entries))?;
    }

    if let Some(summary_path) = &args.summary {
        let summary_js = build_summary_js(&settings, &tree, &warnings);
        let pretty_js = serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
        write_output(summary_path, &format!("{}\n", pretty_js))?;
    }

    if warnings.is_empty() {
        info!("No data problem found");
    } else {
        warnings.log_summary();
    }

    if let Some(reference_path) = &args.reference {
        check_reference(reference_path, &report)?;
    }
    Ok(())
}
