use crate::error::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A discovered source file awaiting ingestion
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub file_size: u64,
}

/// Discover ingestable files under a directory tree.
///
/// Recursively walks the tree and keeps plain-text and Markdown files
/// (`.txt`, `.md`, `.markdown`, case-insensitive). Everything else —
/// binaries, data formats, source code — is skipped silently; richer
/// format extraction happens upstream of this pipeline.
pub fn discover_files(root: &Path) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        if !matches!(extension.as_str(), "md" | "markdown" | "txt") {
            continue;
        }

        let metadata = std::fs::metadata(path)?;

        let relative_path = path
            .strip_prefix(root)
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|_| path.to_string_lossy().to_string());

        files.push(SourceFile {
            relative_path,
            absolute_path: path.to_path_buf(),
            file_size: metadata.len(),
        });
    }

    log::info!("Discovered {} files in {}", files.len(), root.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_files_filters_extensions() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("theory/narrative")).unwrap();
        fs::write(root.join("README.md"), "# Docs").unwrap();
        fs::write(root.join("notes.txt"), "plain text note").unwrap();
        fs::write(root.join("theory/narrative/arcs.markdown"), "# Arcs").unwrap();
        fs::write(root.join("schema.json"), "{}").unwrap();
        fs::write(root.join("image.png"), b"\x89PNG\r\n\x1a\n").unwrap();

        let files = discover_files(root).unwrap();

        assert_eq!(files.len(), 3);
        assert!(files.iter().any(|f| f.relative_path.contains("README.md")));
        assert!(files.iter().any(|f| f.relative_path.contains("notes.txt")));
        assert!(files.iter().any(|f| f.relative_path.contains("arcs.markdown")));
        assert!(!files.iter().any(|f| f.relative_path.contains("schema.json")));
        assert!(!files.iter().any(|f| f.relative_path.contains("image.png")));
    }

    #[test]
    fn test_discover_files_empty() {
        let temp_dir = TempDir::new().unwrap();
        let files = discover_files(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 0);
    }
}
