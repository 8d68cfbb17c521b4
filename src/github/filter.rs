//! Path-based eligibility filter for repository ingestion.
//!
//! Deliberately coarse: the goal is to keep the corpus small and textual,
//! not to perfectly classify "code". Two independent exclusion rules, and
//! either one suffices to exclude a path.

/// Dependency, build, version-control, and virtual-env directories.
/// Matched against exact `/`-separated path segments.
const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    "__pycache__",
    "dist",
    "build",
    ".git",
    "venv",
    "env",
    ".venv",
    ".env",
];

/// Binary, media, archive, data, lock, and log suffixes, lowercase, without
/// the leading dot. A path with no dot is never excluded by this rule.
const EXCLUDED_EXTENSIONS: &[&str] = &[
    // Images and documents
    "jpg", "jpeg", "png", "gif", "bmp", "ico", "svg", "pdf", "doc", "docx", "ppt", "pptx", "xls",
    "xlsx",
    // Archives and binaries
    "zip", "tar", "gz", "rar", "7z", "exe", "dll", "so", "dylib",
    // Fonts and media
    "ttf", "otf", "woff", "woff2", "mp3", "mp4", "avi", "mov", "wav",
    // Data files
    "csv", "tsv", "json", "xml", "yaml", "yml", "db", "sqlite", "sqlite3", "mdb",
    // Other non-code files
    "log", "lock", "env", "bak", "tmp", "temp", "ds_store", "gitignore", "gitattributes",
];

/// Decide from the path alone whether a file belongs in the corpus.
pub fn is_eligible(path: &str) -> bool {
    if path
        .split('/')
        .any(|segment| EXCLUDED_DIRS.contains(&segment))
    {
        return false;
    }

    if let Some((_, suffix)) = path.rsplit_once('.') {
        if EXCLUDED_EXTENSIONS.contains(&suffix.to_ascii_lowercase().as_str()) {
            return false;
        }
    }

    true
}
