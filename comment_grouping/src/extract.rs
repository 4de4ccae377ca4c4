//! Comments and responses of a group of records, ready to be written out.

use crate::config::{Warning, Warnings};
use crate::record::{Record, RichText, Run};
use crate::tree::Leaf;

/// The columns holding the text of the comments and responses.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ExtractColumns {
    pub comment: String,
    pub response: String,
    pub tag: Option<String>,
}

/// A paragraph: a list of formatted runs, without newlines.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Paragraph {
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Splits rich text into paragraphs at the newlines.
///
/// With `clean`, runs of spaces and tabs are collapsed to a single space, and
/// each paragraph is trimmed at both ends. Empty paragraphs are dropped.
pub fn paragraphs(text: &RichText, clean: bool) -> Vec<Paragraph> {
    let mut res: Vec<Paragraph> = Vec::new();
    let mut current = Paragraph::default();
    for run in text.runs.iter() {
        for (idx, piece) in run.text.split('\n').enumerate() {
            if idx > 0 {
                res.push(std::mem::take(&mut current));
            }
            if !piece.is_empty() {
                current.runs.push(Run {
                    text: piece.to_string(),
                    format: run.format,
                });
            }
        }
    }
    res.push(current);

    res.into_iter()
        .filter_map(|p| {
            let p = if clean { clean_paragraph(p) } else { p };
            if p.runs.iter().all(|r| r.text.is_empty()) {
                None
            } else {
                Some(p)
            }
        })
        .collect()
}

fn clean_paragraph(p: Paragraph) -> Paragraph {
    let mut runs: Vec<Run> = p
        .runs
        .into_iter()
        .map(|r| Run {
            text: collapse_spaces(&r.text),
            format: r.format,
        })
        .collect();

    // Whitespace-only runs at the edges vanish entirely.
    while let Some(first) = runs.first_mut() {
        first.text = first.text.trim_start().to_string();
        if first.text.is_empty() {
            runs.remove(0);
        } else {
            break;
        }
    }
    while let Some(last) = runs.last_mut() {
        last.text = last.text.trim_end().to_string();
        if last.text.is_empty() {
            runs.pop();
        } else {
            break;
        }
    }
    runs.retain(|r| !r.text.is_empty());
    Paragraph { runs }
}

fn collapse_spaces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        if c.is_whitespace() && c != '\n' {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

#[derive(PartialEq, Debug, Clone)]
pub struct Comment {
    pub row: usize,
    pub paragraphs: Vec<Paragraph>,
    pub tag: Option<String>,
}

/// The single response of a comment group. It has no paragraph when nobody
/// answered the comments yet.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Response {
    pub row: Option<usize>,
    pub paragraphs: Vec<Paragraph>,
}

impl Response {
    pub fn placeholder() -> Response {
        Response::default()
    }

    pub fn is_placeholder(&self) -> bool {
        self.row.is_none()
    }
}

/// The comments of a group of records, and the one response to them.
#[derive(PartialEq, Debug, Clone)]
pub struct CommentGroup {
    pub comments: Vec<Comment>,
    pub response: Response,
}

impl CommentGroup {
    /// Pulls the comments and the response out of a group of records.
    ///
    /// Comments without any text are skipped. If several records carry a
    /// response, the first one is kept and a warning is recorded.
    pub fn from_leaf(
        leaf: &Leaf,
        columns: &ExtractColumns,
        clean: bool,
        warnings: &mut Warnings,
    ) -> CommentGroup {
        let mut comments: Vec<Comment> = Vec::new();
        let mut responses: Vec<Response> = Vec::new();
        for record in leaf.records.iter() {
            if let Some(rt) = non_blank(record, &columns.comment) {
                let paras = paragraphs(&rt, clean);
                if !paras.is_empty() {
                    let tag = columns
                        .tag
                        .as_ref()
                        .and_then(|c| record.text(c))
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty());
                    comments.push(Comment {
                        row: record.row,
                        paragraphs: paras,
                        tag,
                    });
                }
            }
            if let Some(rt) = non_blank(record, &columns.response) {
                let paras = paragraphs(&rt, clean);
                if !paras.is_empty() {
                    responses.push(Response {
                        row: Some(record.row),
                        paragraphs: paras,
                    });
                }
            }
        }

        if responses.len() > 1 {
            warnings.push(Warning::MultipleResponses {
                rows: responses.iter().filter_map(|r| r.row).collect(),
            });
        }
        let response = responses
            .into_iter()
            .next()
            .unwrap_or_else(Response::placeholder);
        CommentGroup { comments, response }
    }
}

// Whitespace-only cells count as empty, with or without cleaning.
fn non_blank(record: &Record, column: &str) -> Option<RichText> {
    record
        .get(column)
        .map(|v| v.to_rich_text())
        .filter(|rt| !rt.is_blank())
}
