use std::collections::BTreeSet;

use crate::record::RecordSet;

/// The entries of the index table used to mark index entries automatically:
/// every distinct tag, sorted, paired with itself.
pub fn automark_entries(records: &RecordSet, tag_column: &str) -> Vec<(String, String)> {
    let tags: BTreeSet<String> = records
        .records
        .iter()
        .filter_map(|r| r.text(tag_column))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    tags.into_iter().map(|t| (t.clone(), t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CellValue, Record};
    use std::collections::HashMap;

    #[test]
    fn unique_sorted_pairs() {
        let tags = ["Smith", "", "Adams", "Smith ", "Jones"];
        let records: Vec<Record> = tags
            .iter()
            .enumerate()
            .map(|(idx, t)| {
                let mut cells = HashMap::new();
                cells.insert("Tags".to_string(), CellValue::Text(t.to_string()));
                Record::new(idx + 2, cells)
            })
            .collect();
        let rs = RecordSet {
            header: vec!["Tags".to_string()],
            records,
        };
        let entries = automark_entries(&rs, "Tags");
        let firsts: Vec<&str> = entries.iter().map(|(a, _)| a.as_str()).collect();
        assert_eq!(firsts, vec!["Adams", "Jones", "Smith"]);
        assert!(entries.iter().all(|(a, b)| a == b));
    }
}
