use std::cmp::Ordering;
use std::fmt::Display;

use crate::config::HeadingColumns;
use crate::record::{format_number, CellValue, Record};

/// An explicit sort number for a heading.
///
/// Floats are compared with their total order, so that the keys can be
/// sorted.
#[derive(Debug, Clone, Copy)]
pub struct Order(pub f64);

impl PartialEq for Order {
    fn eq(&self, other: &Order) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Order {}

impl PartialOrd for Order {
    fn partial_cmp(&self, other: &Order) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Order {
    fn cmp(&self, other: &Order) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format_number(self.0))
    }
}

/// The heading of a record at one level.
///
/// Keys are ordered by order number first (unnumbered headings last), then
/// by title. A key with neither an order number nor a title is blank: the
/// record has no heading at this level.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct HeadingKey {
    pub order: Option<Order>,
    pub title: String,
}

impl HeadingKey {
    pub fn new(order: Option<f64>, title: &str) -> HeadingKey {
        HeadingKey {
            order: order.map(Order),
            title: title.to_string(),
        }
    }

    pub fn blank() -> HeadingKey {
        HeadingKey::default()
    }

    pub fn is_blank(&self) -> bool {
        self.order.is_none() && self.title.is_empty()
    }
}

impl PartialOrd for HeadingKey {
    fn partial_cmp(&self, other: &HeadingKey) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeadingKey {
    fn cmp(&self, other: &HeadingKey) -> Ordering {
        let by_order = match (self.order, other.order) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_order.then_with(|| self.title.cmp(&other.title))
    }
}

/// Reads the heading of a record for one level.
///
/// A missing or non-numeric order cell gives an unnumbered heading, a missing
/// title cell gives an empty title.
pub fn key_for(record: &Record, columns: &HeadingColumns) -> HeadingKey {
    let order = match &columns.order {
        Some(c) => read_order(record, c).unwrap_or(None),
        None => None,
    };
    HeadingKey {
        order,
        title: read_title(record, &columns.title),
    }
}

pub(crate) fn read_title(record: &Record, column: &str) -> String {
    record
        .text(column)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// The order number in a cell. Returns the raw text as an error if the cell
/// holds something that is not a number.
pub(crate) fn read_order(record: &Record, column: &str) -> Result<Option<Order>, String> {
    match record.get(column) {
        None => Ok(None),
        Some(CellValue::Number(n)) => Ok(Some(Order(*n))),
        Some(other) => {
            let raw = other.display_text();
            let s = raw.trim();
            if s.is_empty() {
                return Ok(None);
            }
            match s.parse::<f64>() {
                Ok(x) if x.is_finite() => Ok(Some(Order(x))),
                _ => Err(raw),
            }
        }
    }
}
