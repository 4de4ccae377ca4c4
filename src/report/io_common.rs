use crate::report::*;

use std::path::Path;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Resolves a path from the configuration file against the directory of this
/// file. Absolute paths are kept.
pub fn resolve_path(root: &Path, path: &str) -> String {
    let p = Path::new(path);
    if p.is_absolute() {
        path.to_string()
    } else {
        root.join(p).display().to_string()
    }
}

/// Writes an output to a file (creating the missing directories), or to the
/// standard output for `stdout`.
pub fn write_output(path: &str, contents: &str) -> ReportResult<()> {
    if path == "stdout" {
        print!("{}", contents);
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context(WritingFileSnafu { path })?;
        }
    }
    fs::write(path, contents).context(WritingFileSnafu { path })?;
    info!("Wrote {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_follow_the_config_dir() {
        let root = Path::new("/data/project");
        assert_eq!(
            resolve_path(root, "comments.xlsx"),
            "/data/project/comments.xlsx"
        );
        assert_eq!(resolve_path(root, "/tmp/x.xlsx"), "/tmp/x.xlsx");
        assert_eq!(simplify_file_name("/data/project/comments.xlsx"), "comments.xlsx");
    }

    #[test]
    fn creates_missing_directories() {
        let dir = std::env::temp_dir().join(format!("comment-response-out-{}", std::process::id()));
        let path = dir.join("nested").join("section.md").display().to_string();
        write_output(&path, "# Title\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Title\n");
        fs::remove_dir_all(&dir).ok();
    }
}
