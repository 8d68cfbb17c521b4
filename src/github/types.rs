use serde::{Deserialize, Serialize};

use super::GitHubError;

/// Owner/name pair identifying the repository under analysis.
/// Derived once per session from a validated repository URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Parsed components of a GitHub commit URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRef {
    pub owner: String,
    pub name: String,
    pub hash: String,
}

impl CommitRef {
    /// Verification only makes sense against the repository currently under
    /// analysis. Rejected here, before any network call is made.
    pub fn ensure_matches(&self, repo: &RepoRef) -> Result<(), GitHubError> {
        if self.owner == repo.owner && self.name == repo.name {
            Ok(())
        } else {
            Err(GitHubError::CommitMismatch {
                hash: self.hash.clone(),
                expected: repo.to_string(),
                found: format!("{}/{}", self.owner, self.name),
            })
        }
    }
}

/// One ingested file: repo-relative path plus raw text content.
/// Serialize: the proposal prompt embeds the corpus as pretty-printed JSON.
#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    pub path: String,
    pub content: String,
}

/// One row of the GitHub contents-API listing.
#[derive(Debug, Clone, Deserialize)]
pub struct DirEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub path: String,
    /// Plain-fetch URL for file entries; null for directories.
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks and submodules; skipped by the crawler.
    #[serde(other)]
    Other,
}

/// A single file changed by a commit, as reported by the commit-detail
/// endpoint. The patch text passes through verbatim; GitHub omits it for
/// binary files, so it defaults to empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    pub status: String,
    pub additions: usize,
    pub deletions: usize,
    #[serde(default)]
    pub patch: String,
}

/// Everything a commit changed, made fresh per verification request and
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct CommitChangeSet {
    pub hash: String,
    pub message: String,
    pub author: String,
    pub date: String,
    pub changed_files: Vec<ChangedFile>,
}
