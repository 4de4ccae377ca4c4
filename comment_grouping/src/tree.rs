use std::cmp::Reverse;

use crate::config::{CountSortScope, GroupingError};
use crate::heading::HeadingKey;
use crate::record::Record;

/// Records that share the same headings at every level.
#[derive(PartialEq, Debug, Clone)]
pub struct Leaf<'a> {
    pub records: Vec<&'a Record>,
}

/// One heading, and everything grouped beneath it.
///
/// Invariant: `children` is never empty.
#[derive(PartialEq, Debug, Clone)]
pub struct Branch<'a> {
    pub heading: HeadingKey,
    pub children: Vec<GroupNode<'a>>,
}

#[derive(PartialEq, Debug, Clone)]
pub enum GroupNode<'a> {
    Leaf(Leaf<'a>),
    Branch(Branch<'a>),
}

impl<'a> GroupNode<'a> {
    /// The number of records reachable from this node.
    pub fn record_count(&self) -> usize {
        match self {
            GroupNode::Leaf(l) => l.records.len(),
            GroupNode::Branch(b) => b.children.iter().map(|c| c.record_count()).sum(),
        }
    }

    /// For a heading that holds directly a single group of records (the
    /// innermost heading), returns that group.
    pub fn leaf_group(&self) -> Option<&Leaf<'a>> {
        match self {
            GroupNode::Branch(b) => match b.children.as_slice() {
                [GroupNode::Leaf(l)] => Some(l),
                _ => None,
            },
            GroupNode::Leaf(_) => None,
        }
    }

    /// The number of headings on the longest path below this node.
    pub fn depth(&self) -> usize {
        match self {
            GroupNode::Leaf(_) => 0,
            GroupNode::Branch(b) => 1 + b.children.iter().map(|c| c.depth()).max().unwrap_or(0),
        }
    }

    fn collect_leaves<'s>(&'s self, out: &mut Vec<&'s Leaf<'a>>) {
        match self {
            GroupNode::Leaf(l) => out.push(l),
            GroupNode::Branch(b) => {
                for c in b.children.iter() {
                    c.collect_leaves(out);
                }
            }
        }
    }

    fn validate(&self) -> Result<(), GroupingError> {
        match self {
            GroupNode::Leaf(l) if l.records.is_empty() => Err(GroupingError::EmptyLeaf),
            GroupNode::Leaf(_) => Ok(()),
            GroupNode::Branch(b) if b.children.is_empty() => Err(GroupingError::EmptyBranch {
                heading: b.heading.title.clone(),
            }),
            GroupNode::Branch(b) => b.children.iter().try_for_each(|c| c.validate()),
        }
    }
}

/// The grouped records, as a list of top-level nodes.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct GroupTree<'a> {
    pub roots: Vec<GroupNode<'a>>,
}

impl<'a> GroupTree<'a> {
    pub fn record_count(&self) -> usize {
        self.roots.iter().map(|n| n.record_count()).sum()
    }

    /// All the groups of records, in reading order.
    pub fn leaves(&self) -> Vec<&Leaf<'a>> {
        let mut res = Vec::new();
        for n in self.roots.iter() {
            n.collect_leaves(&mut res);
        }
        res
    }

    pub fn depth(&self) -> usize {
        self.roots.iter().map(|n| n.depth()).max().unwrap_or(0)
    }

    /// Checks the structural invariants: no heading without content and no
    /// empty group of records.
    pub fn validate(&self) -> Result<(), GroupingError> {
        self.roots.iter().try_for_each(|n| n.validate())
    }

    /// Puts the groups with the most comments first.
    ///
    /// This only permutes siblings. Ties keep their current order, so running
    /// it again does not change anything.
    pub fn sort_by_count(&mut self, scope: CountSortScope) {
        sort_siblings(&mut self.roots, scope);
    }
}

fn sort_siblings(nodes: &mut [GroupNode], scope: CountSortScope) {
    for n in nodes.iter_mut() {
        if let GroupNode::Branch(b) = n {
            sort_siblings(&mut b.children, scope);
        }
    }
    match scope {
        CountSortScope::LeafGroups => {
            let only_groups = nodes
                .iter()
                .all(|n| matches!(n, GroupNode::Leaf(_)) || n.leaf_group().is_some());
            let has_group = nodes.iter().any(|n| n.leaf_group().is_some());
            if only_groups && has_group {
                // Untitled records stay in front of the headings.
                nodes.sort_by_key(|n| match n.leaf_group() {
                    Some(l) => (1, Reverse(l.records.len())),
                    None => (0, Reverse(0)),
                });
            }
        }
        CountSortScope::AllLevels => {
            nodes.sort_by_key(|n| {
                (
                    matches!(n, GroupNode::Branch(_)),
                    Reverse(n.record_count()),
                )
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn records(n: usize) -> Vec<Record> {
        (0..n).map(|i| Record::new(i + 2, HashMap::new())).collect()
    }

    fn group<'a>(title: &str, recs: &'a [Record]) -> GroupNode<'a> {
        GroupNode::Branch(Branch {
            heading: HeadingKey::new(None, title),
            children: vec![GroupNode::Leaf(Leaf {
                records: recs.iter().collect(),
            })],
        })
    }

    fn titles(nodes: &[GroupNode]) -> Vec<String> {
        nodes
            .iter()
            .map(|n| match n {
                GroupNode::Branch(b) => b.heading.title.clone(),
                GroupNode::Leaf(_) => "<leaf>".to_string(),
            })
            .collect()
    }

    #[test]
    fn count_sort_orders_leaf_groups() {
        let recs = records(6);
        let mut tree = GroupTree {
            roots: vec![
                group("A", &recs[0..1]),
                group("B", &recs[1..4]),
                group("C", &recs[4..5]),
                GroupNode::Leaf(Leaf {
                    records: vec![&recs[5]],
                }),
            ],
        };
        tree.sort_by_count(CountSortScope::LeafGroups);
        assert_eq!(titles(&tree.roots), vec!["<leaf>", "B", "A", "C"]);
        let once = tree.clone();
        tree.sort_by_count(CountSortScope::LeafGroups);
        assert_eq!(tree, once);
    }

    #[test]
    fn count_sort_leaves_mixed_levels_alone() {
        let recs = records(4);
        let nested = GroupNode::Branch(Branch {
            heading: HeadingKey::new(None, "A"),
            children: vec![group("X", &recs[0..1])],
        });
        let mut tree = GroupTree {
            roots: vec![nested, group("B", &recs[1..4])],
        };
        tree.sort_by_count(CountSortScope::LeafGroups);
        assert_eq!(titles(&tree.roots), vec!["A", "B"]);

        tree.sort_by_count(CountSortScope::AllLevels);
        assert_eq!(titles(&tree.roots), vec!["B", "A"]);
    }

    #[test]
    fn count_sort_on_all_levels_keeps_leaves_in_front() {
        let recs = records(4);
        let mut tree = GroupTree {
            roots: vec![
                GroupNode::Leaf(Leaf {
                    records: vec![&recs[0]],
                }),
                group("B", &recs[1..4]),
            ],
        };
        tree.sort_by_count(CountSortScope::AllLevels);
        assert_eq!(titles(&tree.roots), vec!["<leaf>", "B"]);
    }

    #[test]
    fn validate_rejects_empty_branches() {
        let tree = GroupTree {
            roots: vec![GroupNode::Branch(Branch {
                heading: HeadingKey::new(None, "Lonely"),
                children: vec![],
            })],
        };
        assert_eq!(
            tree.validate(),
            Err(GroupingError::EmptyBranch {
                heading: "Lonely".to_string()
            })
        );
    }

    #[test]
    fn depth_and_counts() {
        let recs = records(3);
        let tree = GroupTree {
            roots: vec![
                GroupNode::Branch(Branch {
                    heading: HeadingKey::new(None, "A"),
                    children: vec![group("X", &recs[0..2])],
                }),
                GroupNode::Leaf(Leaf {
                    records: vec![&recs[2]],
                }),
            ],
        };
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.record_count(), 3);
        assert_eq!(tree.leaves().len(), 2);
    }
}
