use clap::Parser;

/// Writes a comment-response report from a spreadsheet of public comments.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON configuration file. Relative paths in this file are read from the directory
    /// of the configuration file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The spreadsheet of comments (xlsx). Setting this option overrides the path that may be
    /// specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// When using an Excel file with several worksheets, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path or 'stdout') Where to write the report. Setting this option overrides the path that may be
    /// specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or 'stdout') Where to write the automark index table. It requires a tag column.
    #[clap(short, long, value_parser)]
    pub automark: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the outline of the report is written in JSON format to the
    /// given location.
    #[clap(short, long, value_parser)]
    pub summary: Option<String>,

    /// (file path) A reference report. If provided, the program checks that the report matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (alphabetical, asFound or customOrder) The order of the headings. Overrides the configuration.
    #[clap(long, value_parser)]
    pub sort_mode: Option<String>,

    /// (list of column titles) The heading columns, from the outermost level. Only used without
    /// configuration file.
    #[clap(long, value_parser)]
    pub headings: Option<Vec<String>>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
