//! Bounded depth-first traversal of a remote repository tree.
//!
//! Traversal is strictly sequential: one directory listing or file fetch is
//! in flight at a time, trading throughput for a debuggable trace and
//! avoiding secondary rate limits on the remote API.

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, instrument};

use super::filter;
use super::types::{DirEntry, EntryKind, FileEntry, RepoRef};
use super::{GitHubError, RepoSource};

/// Root + two nested directory levels; deeper subtrees are silently
/// skipped rather than errored.
const MAX_DEPTH: u8 = 2;

/// Walk the repository tree and collect the contents of every eligible
/// file, in depth-first discovery order.
///
/// All-or-nothing at the directory-listing level: any listing failure
/// aborts the crawl. Best-effort at the file level: a failed content fetch
/// omits that one file and the traversal continues.
#[instrument(skip(source), fields(repo = %repo))]
pub async fn crawl(source: &dyn RepoSource, repo: &RepoRef) -> Result<Vec<FileEntry>, GitHubError> {
    let mut files = Vec::new();
    crawl_dir(source, repo, String::new(), 0, &mut files).await?;
    debug!(files = files.len(), "crawl complete");
    Ok(files)
}

// Boxed future because the recursion depth is only known at runtime.
fn crawl_dir<'a>(
    source: &'a dyn RepoSource,
    repo: &'a RepoRef,
    path: String,
    depth: u8,
    out: &'a mut Vec<FileEntry>,
) -> Pin<Box<dyn Future<Output = Result<(), GitHubError>> + Send + 'a>> {
    Box::pin(async move {
        if depth > MAX_DEPTH {
            debug!(%path, depth, "depth bound reached, skipping subtree");
            return Ok(());
        }

        let entries = source.list_dir(repo, &path).await?;

        for entry in entries {
            match entry.kind {
                EntryKind::File => fetch_into(source, entry, out).await,
                EntryKind::Dir => {
                    crawl_dir(source, repo, entry.path, depth + 1, out).await?;
                }
                EntryKind::Other => {}
            }
        }

        Ok(())
    })
}

/// Fetch one eligible file, appending it to the corpus. Fetch failures are
/// the single intentionally silent case: the file is omitted and the crawl
/// goes on.
async fn fetch_into(source: &dyn RepoSource, entry: DirEntry, out: &mut Vec<FileEntry>) {
    if !filter::is_eligible(&entry.path) {
        return;
    }

    let Some(url) = entry.download_url.as_deref() else {
        debug!(path = %entry.path, "file entry without download URL, omitting");
        return;
    };

    match source.fetch_file(url).await {
        Ok(content) => out.push(FileEntry {
            path: entry.path,
            content,
        }),
        Err(err) => {
            debug!(path = %entry.path, error = %err, "file fetch failed, omitting");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    /// In-memory repository tree with per-path failure injection.
    #[derive(Default)]
    struct FakeSource {
        listings: HashMap<String, Vec<DirEntry>>,
        contents: HashMap<String, String>,
        failing_listings: Vec<String>,
        listed: Mutex<Vec<String>>,
        fetched: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn file(path: &str) -> DirEntry {
            DirEntry {
                kind: EntryKind::File,
                path: path.to_string(),
                download_url: Some(format!("https://raw.test/{path}")),
            }
        }

        fn dir(path: &str) -> DirEntry {
            DirEntry {
                kind: EntryKind::Dir,
                path: path.to_string(),
                download_url: None,
            }
        }

        fn with_content(mut self, path: &str, content: &str) -> Self {
            self.contents
                .insert(format!("https://raw.test/{path}"), content.to_string());
            self
        }
    }

    #[async_trait]
    impl RepoSource for FakeSource {
        async fn list_dir(
            &self,
            _repo: &RepoRef,
            path: &str,
        ) -> Result<Vec<DirEntry>, GitHubError> {
            self.listed.lock().unwrap().push(path.to_string());
            if self.failing_listings.iter().any(|p| p == path) {
                return Err(GitHubError::RepositoryFetch {
                    status: reqwest::StatusCode::NOT_FOUND,
                });
            }
            Ok(self.listings.get(path).cloned().unwrap_or_default())
        }

        async fn fetch_file(&self, download_url: &str) -> Result<String, GitHubError> {
            self.fetched.lock().unwrap().push(download_url.to_string());
            self.contents
                .get(download_url)
                .cloned()
                .ok_or(GitHubError::RepositoryFetch {
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                })
        }
    }

    fn repo() -> RepoRef {
        RepoRef {
            owner: "acme".to_string(),
            name: "widgets".to_string(),
        }
    }

    #[tokio::test]
    async fn test_collects_eligible_files_in_discovery_order() {
        let mut source = FakeSource::default()
            .with_content("main.py", "print('hi')")
            .with_content("src/utils.py", "pass")
            .with_content("README", "hello");
        source.listings.insert(
            String::new(),
            vec![
                FakeSource::file("main.py"),
                FakeSource::dir("src"),
                FakeSource::file("README"),
            ],
        );
        source
            .listings
            .insert("src".to_string(), vec![FakeSource::file("src/utils.py")]);

        let files = crawl(&source, &repo()).await.unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        // Depth-first: src/utils.py is discovered before the later root file
        assert_eq!(paths, vec!["main.py", "src/utils.py", "README"]);
        assert_eq!(files[0].content, "print('hi')");
    }

    #[tokio::test]
    async fn test_ineligible_files_are_never_fetched() {
        let mut source = FakeSource::default().with_content("main.py", "print('hi')");
        source.listings.insert(
            String::new(),
            vec![FakeSource::file("main.py"), FakeSource::file("logo.png")],
        );

        let files = crawl(&source, &repo()).await.unwrap();
        assert_eq!(files.len(), 1);
        let fetched = source.fetched.lock().unwrap();
        assert!(!fetched.iter().any(|u| u.contains("logo.png")));
    }

    #[tokio::test]
    async fn test_excluded_directory_is_listed_but_contributes_nothing() {
        // Directories are recursed without filtering; the path filter
        // excludes every file found inside.
        let mut source = FakeSource::default().with_content("main.py", "print('hi')");
        source.listings.insert(
            String::new(),
            vec![FakeSource::file("main.py"), FakeSource::dir("node_modules")],
        );
        source.listings.insert(
            "node_modules".to_string(),
            vec![FakeSource::file("node_modules/dep/index.js")],
        );

        let files = crawl(&source, &repo()).await.unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["main.py"]);
    }

    #[tokio::test]
    async fn test_depth_bound_prunes_deep_subtrees() {
        let mut source = FakeSource::default()
            .with_content("a/one.py", "1")
            .with_content("a/b/two.py", "2")
            .with_content("a/b/c/three.py", "3");
        source
            .listings
            .insert(String::new(), vec![FakeSource::dir("a")]);
        source.listings.insert(
            "a".to_string(),
            vec![FakeSource::file("a/one.py"), FakeSource::dir("a/b")],
        );
        source.listings.insert(
            "a/b".to_string(),
            vec![FakeSource::file("a/b/two.py"), FakeSource::dir("a/b/c")],
        );
        source.listings.insert(
            "a/b/c".to_string(),
            vec![FakeSource::file("a/b/c/three.py")],
        );

        let files = crawl(&source, &repo()).await.unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["a/one.py", "a/b/two.py"]);
        // The third-level directory is pruned without even being listed
        let listed = source.listed.lock().unwrap();
        assert!(!listed.iter().any(|p| p == "a/b/c"));
    }

    #[tokio::test]
    async fn test_file_fetch_failure_omits_only_that_file() {
        // broken.py has no registered content, so its fetch fails
        let mut source = FakeSource::default().with_content("main.py", "print('hi')");
        source.listings.insert(
            String::new(),
            vec![FakeSource::file("broken.py"), FakeSource::file("main.py")],
        );

        let files = crawl(&source, &repo()).await.unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["main.py"]);
    }

    #[tokio::test]
    async fn test_listing_failure_aborts_the_crawl() {
        let mut source = FakeSource::default().with_content("main.py", "print('hi')");
        source.listings.insert(
            String::new(),
            vec![FakeSource::file("main.py"), FakeSource::dir("src")],
        );
        source.failing_listings.push("src".to_string());

        let result = crawl(&source, &repo()).await;
        assert!(matches!(
            result,
            Err(GitHubError::RepositoryFetch { .. })
        ));
    }
}
