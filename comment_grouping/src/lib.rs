mod config;
mod heading;
mod index;
mod record;
mod tree;

pub mod builder;
pub mod extract;
pub mod manual;

use log::{debug, info};

use std::collections::HashMap;

pub use crate::config::*;
pub use crate::heading::*;
pub use crate::index::automark_entries;
pub use crate::record::*;
pub use crate::tree::*;

// **** Private structures ****

// Position of a heading among its siblings. Explicitly ordered headings come
// first.
#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord)]
enum Rank {
    Ordered(Order),
    Unordered,
}

// The sort key of a record at one level. Two records get the same sort key
// exactly when they get the same heading key, so that sorting puts each
// heading in a single contiguous run.
#[derive(Eq, PartialEq, Debug, Clone, PartialOrd, Ord)]
struct SortKey {
    rank: Rank,
    // Row where the title is first seen, for the headings that are placed in
    // sheet order. Zero otherwise.
    first_seen: usize,
    title: String,
}

struct Context<'c> {
    config: &'c SortConfig,
    // For each level, the position of each title in the custom order.
    priorities: Vec<HashMap<&'c str, usize>>,
}

/// The result of grouping records.
#[derive(PartialEq, Debug, Clone)]
pub struct Grouping<'a> {
    pub tree: GroupTree<'a>,
    /// Data problems found along the way. None of them stopped the grouping.
    pub warnings: Warnings,
}

/// Groups the records of a sheet under their headings.
///
/// The records are sorted and grouped level by level, following the heading
/// columns of the configuration. Records with no heading at a level are
/// placed directly under the heading of the level above.
///
/// Arguments:
/// * `records` the records of the sheet. They are borrowed by the groups of
/// the resulting tree.
/// * `config` the sort configuration. It is checked against the header row
/// before any record is looked at.
///
/// ```
/// use comment_grouping::builder::Builder;
/// use comment_grouping::*;
///
/// let header: Vec<String> = ["Topic", "Comments"].iter().map(|s| s.to_string()).collect();
/// let mut builder = Builder::new(&header);
/// builder.add_text_row(&["Traffic", "More buses."]);
/// builder.add_text_row(&["Noise", "Too loud."]);
/// builder.add_text_row(&["Traffic", "Fewer cars."]);
/// let records = builder.build();
///
/// let config = SortConfig::new(vec![HeadingColumns::titled("Topic")]);
/// let grouping = group_records(&records, &config)?;
/// let titles: Vec<String> = grouping
///     .tree
///     .roots
///     .iter()
///     .filter_map(|n| match n {
///         GroupNode::Branch(b) => Some(b.heading.title.clone()),
///         GroupNode::Leaf(_) => None,
///     })
///     .collect();
/// assert_eq!(titles, vec!["Noise", "Traffic"]);
/// # Ok::<(), GroupingError>(())
/// ```
pub fn group_records<'a>(
    records: &'a RecordSet,
    config: &SortConfig,
) -> Result<Grouping<'a>, GroupingError> {
    info!(
        "Grouping {:?} records over {:?} heading levels, mode: {:?}",
        records.len(),
        config.depth(),
        config.mode
    );
    config.validate(&records.header)?;

    let priorities: Vec<HashMap<&str, usize>> = config
        .priorities
        .iter()
        .map(|titles| {
            let mut m: HashMap<&str, usize> = HashMap::new();
            for (idx, t) in titles.iter().map(|t| t.trim()).enumerate() {
                if !t.is_empty() {
                    m.entry(t).or_insert(idx);
                }
            }
            m
        })
        .collect();
    let ctx = Context { config, priorities };

    let mut warnings = Warnings::new();
    let all: Vec<&Record> = records.records.iter().collect();
    let roots = group_level(&ctx, all, 0, &mut warnings);
    let mut tree = GroupTree { roots };

    if config.sort_leaves_by_count {
        debug!(
            "group_records: sorting by comment count, scope: {:?}",
            config.count_sort_scope
        );
        tree.sort_by_count(config.count_sort_scope);
    }

    tree.validate()?;
    info!(
        "Grouped {:?} records into {:?} comment groups",
        tree.record_count(),
        tree.leaves().len()
    );
    Ok(Grouping { tree, warnings })
}

/// Groups the records at one level, and recursively at the levels below.
fn group_level<'a>(
    ctx: &Context,
    records: Vec<&'a Record>,
    depth: usize,
    warnings: &mut Warnings,
) -> Vec<GroupNode<'a>> {
    let runs = sorted_runs(ctx, records, depth, warnings);
    let is_last = depth + 1 == ctx.config.levels.len();
    let is_sole = runs.len() == 1;
    debug!(
        "group_level: level {:?}: {:?} headings",
        depth + 1,
        runs.len()
    );

    let mut nodes: Vec<GroupNode<'a>> = Vec::new();
    for (heading, run) in runs {
        let children = if is_last {
            vec![GroupNode::Leaf(Leaf { records: run })]
        } else {
            group_level(ctx, run, depth + 1, warnings)
        };
        let keep_blank = ctx.config.blank_headings == BlankHeadingPolicy::TrimSole && !is_sole;
        if heading.is_blank() && !keep_blank {
            // No heading at this level: the content moves up one level.
            nodes.extend(children);
        } else {
            nodes.push(GroupNode::Branch(Branch { heading, children }));
        }
    }
    // Untitled records go first: after a heading, they would read as part of it.
    nodes.sort_by_key(|n| matches!(n, GroupNode::Branch(_)));
    nodes
}

/// Sorts the records by their heading at this level and splits them into
/// runs of the same heading. The sort is stable.
fn sorted_runs<'a>(
    ctx: &Context,
    records: Vec<&'a Record>,
    depth: usize,
    warnings: &mut Warnings,
) -> Vec<(HeadingKey, Vec<&'a Record>)> {
    let columns = &ctx.config.levels[depth];
    let priority = match ctx.config.mode {
        SortMode::CustomOrder => ctx.priorities.get(depth).filter(|m| !m.is_empty()),
        _ => None,
    };

    let mut first_seen: HashMap<String, usize> = HashMap::new();
    let mut keyed: Vec<(HeadingKey, &'a Record)> = Vec::with_capacity(records.len());
    for record in records {
        let title = heading::read_title(record, &columns.title);
        let order = match (ctx.config.mode, priority) {
            (SortMode::AsFound, _) => None,
            (SortMode::CustomOrder, Some(p)) => p.get(title.as_str()).map(|idx| Order(*idx as f64)),
            _ => read_order_or_warn(record, columns.order.as_deref(), warnings),
        };
        let e = first_seen.entry(title.clone()).or_insert(record.row);
        *e = (*e).min(record.row);
        keyed.push((HeadingKey { order, title }, record));
    }

    let sort_key = |heading: &HeadingKey| -> SortKey {
        let in_sheet_order = match ctx.config.mode {
            SortMode::Alphabetical => false,
            SortMode::AsFound => true,
            SortMode::CustomOrder => priority.is_some() && heading.order.is_none(),
        };
        SortKey {
            rank: heading.order.map(Rank::Ordered).unwrap_or(Rank::Unordered),
            first_seen: if in_sheet_order {
                first_seen.get(&heading.title).cloned().unwrap_or(0)
            } else {
                0
            },
            title: heading.title.clone(),
        }
    };
    let mut sorted: Vec<(SortKey, HeadingKey, &'a Record)> = keyed
        .into_iter()
        .map(|(h, r)| (sort_key(&h), h, r))
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut runs: Vec<(HeadingKey, Vec<&'a Record>)> = Vec::new();
    for (_, heading, record) in sorted {
        match runs.last_mut() {
            Some((h, run)) if *h == heading => run.push(record),
            _ => runs.push((heading, vec![record])),
        }
    }
    runs
}

fn read_order_or_warn(
    record: &Record,
    column: Option<&str>,
    warnings: &mut Warnings,
) -> Option<Order> {
    let column = column?;
    match heading::read_order(record, column) {
        Ok(order) => order,
        Err(value) => {
            debug!(
                "read_order_or_warn: row {:?}: order {:?} is not a number",
                record.row, value
            );
            warnings.push(Warning::UnparsableOrder {
                row: record.row,
                column: column.to_string(),
                value,
            });
            None
        }
    }
}
