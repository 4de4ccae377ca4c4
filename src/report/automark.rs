/// Writes the index entries as a two-column Markdown table: the text to
/// mark, and the index entry for it.
pub fn render_automark(entries: &[(String, String)]) -> String {
    let mut out = String::from("| Text | Entry |\n| --- | --- |\n");
    for (text, entry) in entries.iter() {
        out.push_str(&format!("| {} | {} |\n", escape_cell(text), escape_cell(entry)));
    }
    out
}

fn escape_cell(s: &str) -> String {
    s.replace('\\', "\\\\").replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows() {
        let entries = vec![
            ("Adams".to_string(), "Adams".to_string()),
            ("Smith | Co".to_string(), "Smith | Co".to_string()),
        ];
        assert_eq!(
            render_automark(&entries),
            "| Text | Entry |\n| --- | --- |\n| Adams | Adams |\n| Smith \\| Co | Smith \\| Co |\n"
        );
    }

    #[test]
    fn no_entries_gives_the_header_only() {
        assert_eq!(render_automark(&[]), "| Text | Entry |\n| --- | --- |\n");
    }
}
