// ******** Markdown report **********

use crate::report::*;

use comment_grouping::extract::{CommentGroup, ExtractColumns, Paragraph, Response};

/// How the report is laid out. The defaults match an empty `text` and
/// `outputSettings` configuration.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RenderSettings {
    pub title: Option<String>,
    pub outline_level_start: u32,
    pub clean: bool,
    pub comment_intro: String,
    pub response_intro: String,
    pub intro_separator: String,
    pub comment_intro_every_comment: bool,
    pub indicate_quantity: bool,
    pub multiple_comments: String,
    pub single_comment: String,
    pub untitled_heading: String,
}

impl Default for RenderSettings {
    fn default() -> RenderSettings {
        RenderSettings {
            title: None,
            outline_level_start: 1,
            clean: true,
            comment_intro: "Comment".to_string(),
            response_intro: "Response".to_string(),
            intro_separator: ": ".to_string(),
            comment_intro_every_comment: false,
            indicate_quantity: false,
            multiple_comments: "Multiple Comments: ".to_string(),
            single_comment: String::new(),
            untitled_heading: "General".to_string(),
        }
    }
}

struct MarkdownWriter<'c> {
    columns: &'c ExtractColumns,
    settings: &'c RenderSettings,
    out: String,
    warnings: Warnings,
}

/// Writes the grouped comments as a Markdown document.
///
/// The warnings found while pulling the comments and responses out of the
/// records are added to `warnings`.
pub fn render_report(
    tree: &GroupTree,
    columns: &ExtractColumns,
    settings: &RenderSettings,
    warnings: &mut Warnings,
) -> ReportResult<String> {
    let mut w = MarkdownWriter {
        columns,
        settings,
        out: String::new(),
        warnings: Warnings::new(),
    };
    let mut level = settings.outline_level_start.max(1);
    if let Some(title) = &settings.title {
        w.heading(level, title);
        level += 1;
    }
    w.nodes(&tree.roots, level)?;

    let len = w.out.trim_end().len();
    w.out.truncate(len);
    w.out.push('\n');
    debug!(
        "render_report: {:?} bytes, {:?} warnings",
        w.out.len(),
        w.warnings.len()
    );
    warnings.extend(w.warnings);
    Ok(w.out)
}

impl<'c> MarkdownWriter<'c> {
    fn nodes(&mut self, nodes: &[GroupNode], level: u32) -> ReportResult<()> {
        for node in nodes.iter() {
            match node {
                GroupNode::Leaf(leaf) => {
                    let group = self.extract(leaf);
                    self.group(&group);
                }
                GroupNode::Branch(b) => {
                    let title = if b.heading.title.is_empty() {
                        self.settings.untitled_heading.clone()
                    } else {
                        b.heading.title.clone()
                    };
                    ensure!(
                        !b.children.is_empty(),
                        EmptySectionSnafu { heading: title }
                    );
                    match node.leaf_group() {
                        Some(leaf) => {
                            let group = self.extract(leaf);
                            let prefix = self.quantity_prefix(&group);
                            self.heading(level, &format!("{}{}", prefix, title));
                            self.group(&group);
                        }
                        None => {
                            self.heading(level, &title);
                            self.nodes(&b.children, level + 1)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn extract(&mut self, leaf: &Leaf) -> CommentGroup {
        CommentGroup::from_leaf(leaf, self.columns, self.settings.clean, &mut self.warnings)
    }

    fn quantity_prefix(&self, group: &CommentGroup) -> String {
        if !self.settings.indicate_quantity {
            String::new()
        } else if group.comments.len() > 1 {
            self.settings.multiple_comments.clone()
        } else {
            self.settings.single_comment.clone()
        }
    }

    fn heading(&mut self, level: u32, text: &str) {
        let hashes = "#".repeat(level.clamp(1, 6) as usize);
        // A heading is a single line.
        let text: Vec<&str> = text.split_whitespace().collect();
        self.out.push_str(&format!(
            "{} {}\n\n",
            hashes,
            escape_markdown(&text.join(" "))
        ));
    }

    fn group(&mut self, group: &CommentGroup) {
        let with_intro = group.comments.len() > 1 || self.settings.comment_intro_every_comment;
        for comment in group.comments.iter() {
            let last = comment.paragraphs.len().saturating_sub(1);
            for (idx, p) in comment.paragraphs.iter().enumerate() {
                let mut line = String::new();
                if idx == 0 && with_intro && !self.settings.comment_intro.is_empty() {
                    line.push_str(&format!(
                        "<u>{}</u>{}",
                        escape_markdown(&self.settings.comment_intro),
                        escape_markdown(&self.settings.intro_separator)
                    ));
                }
                line.push_str(&render_paragraph(p));
                if idx == last {
                    if let Some(tag) = &comment.tag {
                        line.push_str(&format!(" ({})", escape_markdown(tag)));
                    }
                }
                self.paragraph(&line);
            }
        }
        self.response(&group.response);
    }

    fn response(&mut self, response: &Response) {
        let intro = if self.settings.response_intro.is_empty() {
            String::new()
        } else {
            format!(
                "***{}***{}",
                escape_markdown(&self.settings.response_intro),
                escape_markdown(&self.settings.intro_separator)
            )
        };
        let paras: Vec<String> = response.paragraphs.iter().map(render_paragraph).collect();
        let mut lines: Vec<String> = Vec::new();
        match paras.split_first() {
            Some((first, rest)) => {
                lines.push(format!("{}{}", intro, first));
                lines.extend(rest.iter().cloned());
            }
            None => lines.push(intro.trim_end().to_string()),
        }
        let quoted: Vec<String> = lines
            .iter()
            .map(|l| format!("> {}", l).trim_end().to_string())
            .collect();
        self.out.push_str(&quoted.join("\n>\n"));
        self.out.push_str("\n\n");
    }

    fn paragraph(&mut self, line: &str) {
        self.out.push_str(&protect_line_start(line));
        self.out.push_str("\n\n");
    }
}

fn render_paragraph(p: &Paragraph) -> String {
    p.runs.iter().map(render_run).collect()
}

// The markers are placed around the text without its surrounding spaces,
// otherwise they are not recognized.
fn render_run(run: &Run) -> String {
    let text = escape_markdown(&run.text);
    let core = text.trim();
    if run.format.is_plain() || core.is_empty() {
        return text;
    }
    let start = text.len() - text.trim_start().len();
    let lead = &text[..start];
    let trail = &text[start + core.len()..];

    let f = run.format;
    let mut s = core.to_string();
    if f.superscript {
        s = format!("<sup>{}</sup>", s);
    } else if f.subscript {
        s = format!("<sub>{}</sub>", s);
    }
    if f.underline != Underline::None {
        s = format!("<u>{}</u>", s);
    }
    if f.strike {
        s = format!("~~{}~~", s);
    }
    if f.italic {
        s = format!("*{}*", s);
    }
    if f.bold {
        s = format!("**{}**", s);
    }
    format!("{}{}{}", lead, s, trail)
}

fn escape_markdown(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '~' | '<' | '>' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// A paragraph starting with these would turn into a heading or a list item.
fn protect_line_start(line: &str) -> String {
    match line.chars().next() {
        Some('#') | Some('-') | Some('+') => format!("\\{}", line),
        Some(c) if c.is_ascii_digit() => {
            let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
            let number = &line[..line.len() - rest.len()];
            if rest.starts_with('.') || rest.starts_with(')') {
                format!("{}\\{}", number, rest)
            } else {
                line.to_string()
            }
        }
        _ => line.to_string(),
    }
}
