pub mod crawler;
pub mod filter;
pub mod types;

pub use types::{ChangedFile, CommitChangeSet, CommitRef, DirEntry, FileEntry, RepoRef};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, instrument};

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "repo-mentor";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("Invalid GitHub URL: {0}")]
    InvalidUrl(String),

    #[error("Commit {hash} belongs to {found}, not the analyzed repository {expected}")]
    CommitMismatch {
        hash: String,
        expected: String,
        found: String,
    },

    #[error("Failed to list repository contents ({status})")]
    RepositoryFetch { status: reqwest::StatusCode },

    #[error("Failed to fetch commit details ({status})")]
    CommitFetch { status: reqwest::StatusCode },

    #[error("GitHub API request failed: {0}")]
    Api(#[from] reqwest::Error),
}

/// Parse a GitHub repository URL into its owner/name pair.
///
/// Expected format: https://github.com/{owner}/{repo}, with any trailing
/// segments (e.g. /tree/main) tolerated. All failures are InvalidUrl.
pub fn parse_repo_url(url: &str) -> Result<RepoRef, GitHubError> {
    let segments = github_path_segments(url)?;

    if segments.len() < 2 {
        return Err(GitHubError::InvalidUrl(url.to_string()));
    }

    Ok(RepoRef {
        owner: segments[0].to_string(),
        name: segments[1].to_string(),
    })
}

/// Parse a GitHub commit URL into owner, name, and commit hash.
///
/// Expected format: https://github.com/{owner}/{repo}/commit/{hash}
pub fn parse_commit_url(url: &str) -> Result<CommitRef, GitHubError> {
    let segments = github_path_segments(url)?;

    if segments.len() < 4 || segments[2] != "commit" {
        return Err(GitHubError::InvalidUrl(url.to_string()));
    }

    Ok(CommitRef {
        owner: segments[0].to_string(),
        name: segments[1].to_string(),
        hash: segments[3].to_string(),
    })
}

/// Validate the host and split the path into non-empty segments.
fn github_path_segments(url: &str) -> Result<Vec<String>, GitHubError> {
    let parsed =
        reqwest::Url::parse(url).map_err(|_| GitHubError::InvalidUrl(url.to_string()))?;

    if parsed.host_str() != Some("github.com") {
        return Err(GitHubError::InvalidUrl(url.to_string()));
    }

    Ok(parsed
        .path_segments()
        .ok_or_else(|| GitHubError::InvalidUrl(url.to_string()))?
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect())
}

/// Remote file-tree access used by the crawler. The seam exists so the
/// traversal logic can be exercised against an in-memory tree in tests.
#[async_trait]
pub trait RepoSource: Send + Sync {
    /// List the entries of one directory. A failure here aborts the whole
    /// crawl.
    async fn list_dir(&self, repo: &RepoRef, path: &str) -> Result<Vec<DirEntry>, GitHubError>;

    /// Fetch one file's raw text via its download URL. Failures are
    /// swallowed by the crawler, which omits the file and continues.
    async fn fetch_file(&self, download_url: &str) -> Result<String, GitHubError>;
}

/// GitHub-backed RepoSource carrying the user's token.
pub struct GitHubSource {
    http: reqwest::Client,
    token: String,
}

impl GitHubSource {
    pub fn new(token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
        }
    }

    /// Fetch the changed-file set of one commit.
    #[instrument(skip(self), fields(repo = %repo, hash = %hash))]
    pub async fn fetch_commit_changes(
        &self,
        repo: &RepoRef,
        hash: &str,
    ) -> Result<CommitChangeSet, GitHubError> {
        #[derive(serde::Deserialize)]
        struct CommitAuthor {
            name: String,
            date: String,
        }

        #[derive(serde::Deserialize)]
        struct CommitInner {
            message: String,
            author: CommitAuthor,
        }

        #[derive(serde::Deserialize)]
        struct CommitResponse {
            commit: CommitInner,
            #[serde(default)]
            files: Vec<ChangedFile>,
        }

        let url = format!("{API_BASE}/repos/{}/{}/commits/{hash}", repo.owner, repo.name);

        debug!("fetching commit details from GitHub API");
        let response = self
            .http
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github.v3+json")
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GitHubError::CommitFetch {
                status: response.status(),
            });
        }

        let data = response.json::<CommitResponse>().await?;
        debug!(files = data.files.len(), "received commit details");

        Ok(CommitChangeSet {
            hash: hash.to_string(),
            message: data.commit.message,
            author: data.commit.author.name,
            date: data.commit.author.date,
            changed_files: data.files,
        })
    }
}

#[async_trait]
impl RepoSource for GitHubSource {
    async fn list_dir(&self, repo: &RepoRef, path: &str) -> Result<Vec<DirEntry>, GitHubError> {
        let url = format!("{API_BASE}/repos/{}/{}/contents/{path}", repo.owner, repo.name);

        debug!(%path, "listing directory contents");
        let response = self
            .http
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github.v3+json")
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GitHubError::RepositoryFetch {
                status: response.status(),
            });
        }

        Ok(response.json().await?)
    }

    async fn fetch_file(&self, download_url: &str) -> Result<String, GitHubError> {
        // Download URLs are plain unauthenticated fetches.
        let response = self
            .http
            .get(download_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }
}
