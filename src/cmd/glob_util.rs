//! Glob pattern expansion for command inputs.
//!
//! Expands patterns like `*.csv` or `mappings/**/*.csv` into the list of
//! matching files, sorted so that record order is reproducible.

use std::path::{Path, PathBuf};

/// Result of expanding an input (either a literal path or glob pattern).
#[derive(Debug)]
pub struct ExpandedFiles {
    pub files: Vec<PathBuf>,
    pub pattern_was_glob: bool,
}

/// Check if a path string contains glob pattern characters.
pub fn is_glob_pattern(path: &str) -> bool {
    path.contains('*') || path.contains('?') || path.contains('[')
}

/// Expand a file path or glob pattern into a list of matching files.
///
/// A literal path is returned as is. A glob pattern is expanded to the
/// matching regular files in sorted path order.
///
/// # Errors
///
/// Returns an error if:
/// - The glob pattern is invalid
/// - No files match the pattern
/// - A literal path doesn't exist
pub fn expand_file_pattern(pattern: &Path) -> anyhow::Result<ExpandedFiles> {
    let pattern_str = pattern.to_string_lossy();

    if !is_glob_pattern(&pattern_str) {
        if !pattern.exists() {
            anyhow::bail!("input file does not exist: {}", pattern.display());
        }
        return Ok(ExpandedFiles {
            files: vec![pattern.to_path_buf()],
            pattern_was_glob: false,
        });
    }

    let entries = glob::glob(&pattern_str)
        .map_err(|e| anyhow::anyhow!("invalid glob pattern '{}': {}", pattern_str, e))?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => {
                anyhow::bail!("error reading path for pattern '{}': {}", pattern_str, e);
            }
        }
    }

    if files.is_empty() {
        anyhow::bail!("no files match pattern: {}", pattern_str);
    }

    files.sort();

    Ok(ExpandedFiles {
        files,
        pattern_was_glob: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_glob_pattern() {
        assert!(!is_glob_pattern("mapping.csv"));
        assert!(!is_glob_pattern("/path/to/mapping.csv"));
        assert!(is_glob_pattern("*.csv"));
        assert!(is_glob_pattern("mappings/**/*.csv"));
        assert!(is_glob_pattern("part?.csv"));
        assert!(is_glob_pattern("[ab].csv"));
    }

    #[test]
    fn test_expand_literal_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("mapping.csv");
        fs::write(&file, "target_table\n").unwrap();

        let result = expand_file_pattern(&file).unwrap();
        assert!(!result.pattern_was_glob);
        assert_eq!(result.files, vec![file]);
    }

    #[test]
    fn test_expand_literal_path_not_exists() {
        let result = expand_file_pattern(Path::new("/nonexistent/mapping.csv"));
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_expand_glob_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.csv"), "").unwrap();
        fs::write(dir.path().join("a.csv"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let result = expand_file_pattern(&dir.path().join("*.csv")).unwrap();
        assert!(result.pattern_was_glob);
        let names: Vec<_> = result
            .files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn test_expand_glob_no_matches() {
        let dir = TempDir::new().unwrap();
        let result = expand_file_pattern(&dir.path().join("*.csv"));
        assert!(result.unwrap_err().to_string().contains("no files match"));
    }

    #[test]
    fn test_expand_recursive_glob() {
        let dir = TempDir::new().unwrap();
        let subdir = dir.path().join("finance");
        fs::create_dir(&subdir).unwrap();
        fs::write(dir.path().join("a.csv"), "").unwrap();
        fs::write(subdir.join("b.csv"), "").unwrap();

        let result = expand_file_pattern(&dir.path().join("**/*.csv")).unwrap();
        assert_eq!(result.files.len(), 2);
    }
}
