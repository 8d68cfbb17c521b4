use crate::github::{FileEntry, RepoRef};

/// Mutable state for one analysis session: the repository, its crawled
/// corpus, and the most recent suggested change.
///
/// Owned by the orchestrator and passed into the stages; starting a new
/// analysis replaces the whole value rather than merging into it.
#[derive(Debug)]
pub struct AnalysisSession {
    pub repo: RepoRef,
    pub token: String,
    pub files: Vec<FileEntry>,
    pub suggested_change: Option<String>,
}

impl AnalysisSession {
    pub fn new(repo: RepoRef, token: String) -> Self {
        Self {
            repo,
            token,
            files: Vec::new(),
            suggested_change: None,
        }
    }

    /// Record the proposal stage's suggested change, replacing any earlier
    /// one.
    pub fn record_suggestion(&mut self, suggested_change: String) {
        self.suggested_change = Some(suggested_change);
    }
}
