// ********* Configuration **********

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

use log::warn;

/// The pair of columns that defines one level of headings.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct HeadingColumns {
    /// Optional column with an explicit sort number for the heading.
    pub order: Option<String>,
    /// Column with the heading text.
    pub title: String,
}

impl HeadingColumns {
    pub fn titled(title: &str) -> HeadingColumns {
        HeadingColumns {
            order: None,
            title: title.to_string(),
        }
    }

    pub fn ordered(order: &str, title: &str) -> HeadingColumns {
        HeadingColumns {
            order: Some(order.to_string()),
            title: title.to_string(),
        }
    }
}

/// How sibling headings are ordered.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SortMode {
    /// By order number (unnumbered last), then by title.
    Alphabetical,
    /// In the order in which the titles first appear in the sheet.
    AsFound,
    /// By position in a priority list of titles. Titles not listed come
    /// after, in the order in which they first appear.
    CustomOrder,
}

/// Where the comment-count sort applies.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum CountSortScope {
    /// Only sibling lists made of leaf groups (a heading directly above its
    /// comments). Other lists keep the heading order.
    LeafGroups,
    /// Every sibling list, using the total number of records beneath each
    /// child.
    AllLevels,
}

/// What to do with records that have no heading at some level.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum BlankHeadingPolicy {
    /// The blank level is always removed and its content is spliced into the
    /// parent.
    Flatten,
    /// The blank level is removed only when it is the only group at this
    /// level. Next to real headings, it is kept as an untitled heading.
    TrimSole,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SortConfig {
    /// One entry per level of headings, outermost first.
    pub levels: Vec<HeadingColumns>,
    pub mode: SortMode,
    /// Priority lists of titles, one per level, for `SortMode::CustomOrder`.
    pub priorities: Vec<Vec<String>>,
    pub sort_leaves_by_count: bool,
    pub count_sort_scope: CountSortScope,
    pub blank_headings: BlankHeadingPolicy,
}

impl SortConfig {
    pub fn new(levels: Vec<HeadingColumns>) -> SortConfig {
        SortConfig {
            levels,
            mode: SortMode::Alphabetical,
            priorities: Vec::new(),
            sort_leaves_by_count: false,
            count_sort_scope: CountSortScope::LeafGroups,
            blank_headings: BlankHeadingPolicy::Flatten,
        }
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Checks the configuration against the header row of the sheet.
    ///
    /// This runs once, before any record is looked at.
    pub fn validate(&self, header: &[String]) -> Result<(), GroupingError> {
        if self.levels.is_empty() {
            return Err(GroupingError::NoHeadingLevels);
        }
        for (idx, level) in self.levels.iter().enumerate() {
            let columns = level.order.iter().chain(std::iter::once(&level.title));
            for column in columns {
                if !header.iter().any(|h| h == column) {
                    return Err(GroupingError::UnknownColumn {
                        column: column.clone(),
                        level: idx + 1,
                    });
                }
            }
        }
        if !self.priorities.is_empty() && self.mode != SortMode::CustomOrder {
            return Err(GroupingError::PrioritiesWithoutCustomOrder);
        }
        if self.priorities.len() > self.levels.len() {
            return Err(GroupingError::TooManyPriorityLists {
                lists: self.priorities.len(),
                levels: self.levels.len(),
            });
        }
        Ok(())
    }
}

/// Errors that prevent the grouping from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum GroupingError {
    NoHeadingLevels,
    UnknownColumn { column: String, level: usize },
    TooManyPriorityLists { lists: usize, levels: usize },
    PrioritiesWithoutCustomOrder,
    /// A heading without any content. This is a defect of the engine.
    EmptyBranch { heading: String },
    /// A group without any record. This is a defect of the engine.
    EmptyLeaf,
}

impl Error for GroupingError {}

impl Display for GroupingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupingError::NoHeadingLevels => write!(f, "no heading level configured"),
            GroupingError::UnknownColumn { column, level } => write!(
                f,
                "heading level {}: column {:?} is not in the header row",
                level, column
            ),
            GroupingError::TooManyPriorityLists { lists, levels } => write!(
                f,
                "{} custom order lists given for {} heading levels",
                lists, levels
            ),
            GroupingError::PrioritiesWithoutCustomOrder => {
                write!(f, "custom order lists require the custom order sort mode")
            }
            GroupingError::EmptyBranch { heading } => {
                write!(f, "internal error: heading {:?} has no content", heading)
            }
            GroupingError::EmptyLeaf => write!(f, "internal error: empty comment group"),
        }
    }
}

// ******** Warnings *********

/// Data problems that do not stop the processing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Warning {
    /// An order cell that does not hold a number. The heading is treated as
    /// unnumbered.
    UnparsableOrder {
        row: usize,
        column: String,
        value: String,
    },
    /// More than one response in a comment group. The first one is kept.
    MultipleResponses { rows: Vec<usize> },
}

impl Warning {
    fn kind(&self) -> &'static str {
        match self {
            Warning::UnparsableOrder { .. } => "order values that are not numbers",
            Warning::MultipleResponses { .. } => "comment groups with multiple responses",
        }
    }

    fn rows(&self) -> Vec<usize> {
        match self {
            Warning::UnparsableOrder { row, .. } => vec![*row],
            Warning::MultipleResponses { rows } => rows.clone(),
        }
    }
}

/// Collects the warnings of a run, to report them together at the end.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Warnings {
    entries: Vec<Warning>,
}

impl Warnings {
    pub fn new() -> Warnings {
        Warnings::default()
    }

    pub fn push(&mut self, w: Warning) {
        self.entries.push(w);
    }

    pub fn extend(&mut self, other: Warnings) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.entries.iter()
    }

    /// One line per kind of warning, with the count and the rows involved.
    pub fn summary(&self) -> Vec<String> {
        let mut by_kind: BTreeMap<&'static str, (usize, Vec<usize>)> = BTreeMap::new();
        for w in self.entries.iter() {
            let e = by_kind.entry(w.kind()).or_insert((0, Vec::new()));
            e.0 += 1;
            e.1.extend(w.rows());
        }
        by_kind
            .into_iter()
            .map(|(kind, (count, mut rows))| {
                rows.sort_unstable();
                rows.dedup();
                let rows_s: Vec<String> = rows.iter().map(|r| r.to_string()).collect();
                format!("{} {} (rows {})", count, kind, rows_s.join(", "))
            })
            .collect()
    }

    /// Logs the summary, one line per kind of warning.
    pub fn log_summary(&self) {
        for line in self.summary() {
            warn!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        ["Order 1", "Heading 1", "Heading 2", "Comments"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn validate_accepts_known_columns() {
        let config = SortConfig::new(vec![
            HeadingColumns::ordered("Order 1", "Heading 1"),
            HeadingColumns::titled("Heading 2"),
        ]);
        assert_eq!(config.validate(&header()), Ok(()));
    }

    #[test]
    fn validate_names_the_unknown_column() {
        let config = SortConfig::new(vec![
            HeadingColumns::titled("Heading 1"),
            HeadingColumns::ordered("Order 2", "Heading 2"),
        ]);
        assert_eq!(
            config.validate(&header()),
            Err(GroupingError::UnknownColumn {
                column: "Order 2".to_string(),
                level: 2
            })
        );
    }

    #[test]
    fn validate_rejects_empty_levels() {
        let config = SortConfig::new(vec![]);
        assert_eq!(
            config.validate(&header()),
            Err(GroupingError::NoHeadingLevels)
        );
    }

    #[test]
    fn validate_checks_priority_lists() {
        let mut config = SortConfig::new(vec![HeadingColumns::titled("Heading 1")]);
        config.priorities = vec![vec!["A".to_string()]];
        assert_eq!(
            config.validate(&header()),
            Err(GroupingError::PrioritiesWithoutCustomOrder)
        );
        config.mode = SortMode::CustomOrder;
        assert_eq!(config.validate(&header()), Ok(()));
        config.priorities.push(vec!["B".to_string()]);
        assert_eq!(
            config.validate(&header()),
            Err(GroupingError::TooManyPriorityLists {
                lists: 2,
                levels: 1
            })
        );
    }

    #[test]
    fn summary_aggregates_by_kind() {
        let mut ws = Warnings::new();
        ws.push(Warning::UnparsableOrder {
            row: 4,
            column: "Order 1".to_string(),
            value: "first".to_string(),
        });
        ws.push(Warning::UnparsableOrder {
            row: 2,
            column: "Order 1".to_string(),
            value: "second".to_string(),
        });
        ws.push(Warning::MultipleResponses { rows: vec![5, 7] });
        assert_eq!(
            ws.summary(),
            vec![
                "1 comment groups with multiple responses (rows 5, 7)".to_string(),
                "2 order values that are not numbers (rows 2, 4)".to_string(),
            ]
        );
    }
}
