use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use super::git::HistorySource;
use super::range::BranchRangeResolver;
use crate::error::HistoryError;
use crate::types::{CommitRange, DailySeries, HistoryScope, LogRequest, RepoQuery};
use crate::utils::aggregate_dates;

/// Answers "activity for repo/folder/branch" requests.
///
/// Stateless between calls; the only shared piece is the history source.
#[derive(Clone)]
pub struct HistoryQueryService {
    source: Arc<dyn HistorySource>,
}

impl HistoryQueryService {
    pub fn new(source: Arc<dyn HistorySource>) -> Self {
        Self { source }
    }

    /// Validate the request, fetch commit dates and bucket them by day
    pub fn query(&self, query: &RepoQuery) -> Result<DailySeries, HistoryError> {
        let repo = validate_repo(&query.repo)?;
        let folder = validate_folder(&repo, query.folder.as_deref())?;

        let request = LogRequest {
            scope: self.select_scope(&repo, query),
            path: folder,
        };

        log::info!("git log {:?} in {}", request, repo.display());
        let dates = self
            .source
            .fetch_log(&repo, &request)
            .map_err(|e| HistoryError::RangeQuery(e.message().to_string()))?;
        log::info!("Total commits: {}", dates.len());

        aggregate_dates(dates)
    }

    fn select_scope(&self, repo: &Path, query: &RepoQuery) -> HistoryScope {
        if query.all_branches {
            return HistoryScope::AllRefs;
        }

        let branch = match non_empty(query.branch.as_deref()) {
            Some(branch) => branch,
            None => return HistoryScope::Head,
        };

        let default_branch = match self.source.resolve_default_branch(repo) {
            Ok(default_branch) => default_branch,
            Err(e) => {
                log::warn!("Could not resolve default branch: {}", e.message());
                return HistoryScope::Range(CommitRange::full(branch));
            }
        };

        if default_branch == branch {
            return HistoryScope::Range(CommitRange::full(branch));
        }

        match BranchRangeResolver::new(self.source.as_ref(), repo).resolve(&default_branch, branch) {
            Ok(range) if !range.is_unbounded() => HistoryScope::Range(range),
            Ok(range) => {
                log::warn!(
                    "No divergence between {} and {}; logging the whole branch",
                    default_branch,
                    branch
                );
                HistoryScope::Range(range)
            }
            Err(e) => {
                log::warn!(
                    "Range resolution for {} failed ({}); logging the whole branch",
                    branch,
                    e.message()
                );
                HistoryScope::Range(CommitRange::full(branch))
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn validate_repo(repo: &str) -> Result<PathBuf, HistoryError> {
    let repo = repo.trim();
    if repo.is_empty() {
        return Err(HistoryError::Validation("repo".to_string()));
    }

    let path = PathBuf::from(repo);
    if !path.exists() {
        return Err(HistoryError::NotFound(repo.to_string()));
    }
    if !path.join(".git").exists() {
        return Err(HistoryError::NotARepository(repo.to_string()));
    }

    Ok(path)
}

/// Folder relative to the repository root, or `None` for the whole tree
fn validate_folder(repo: &Path, folder: Option<&str>) -> Result<Option<PathBuf>, HistoryError> {
    let folder = match non_empty(folder) {
        Some(folder) => folder,
        None => return Ok(None),
    };

    // Absolute or parent-relative folders would escape the repository
    let escapes = Path::new(folder).components().any(|component| {
        matches!(
            component,
            Component::RootDir | Component::Prefix(_) | Component::ParentDir
        )
    });
    if escapes || !repo.join(folder).exists() {
        return Err(HistoryError::NotFound(folder.to_string()));
    }

    let relative = folder.trim_start_matches("./").trim_end_matches('/');
    if relative.is_empty() || relative == "." {
        return Ok(None);
    }
    Ok(Some(PathBuf::from(relative)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Error;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeSource {
        dates: Vec<String>,
        default_branch: Option<String>,
        rev_lists: Vec<(String, Vec<String>)>,
        log_error: Option<String>,
        requests: Mutex<Vec<LogRequest>>,
    }

    impl HistorySource for FakeSource {
        fn fetch_log(&self, _: &Path, request: &LogRequest) -> Result<Vec<String>, Error> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.log_error {
                Some(message) => Err(Error::from_str(message)),
                None => Ok(self.dates.clone()),
            }
        }

        fn fetch_rev_list(&self, _: &Path, reference: &str) -> Result<Vec<String>, Error> {
            self.rev_lists
                .iter()
                .find(|(name, _)| name == reference)
                .map(|(_, revs)| revs.clone())
                .ok_or_else(|| Error::from_str("bad revision"))
        }

        fn resolve_default_branch(&self, _: &Path) -> Result<String, Error> {
            self.default_branch
                .clone()
                .ok_or_else(|| Error::from_str("no default branch"))
        }
    }

    impl FakeSource {
        fn last_scope(&self) -> HistoryScope {
            self.requests.lock().unwrap().last().unwrap().scope.clone()
        }
    }

    fn fake_repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        dir
    }

    fn repo_query(dir: &TempDir) -> RepoQuery {
        RepoQuery::new(dir.path().to_str().unwrap())
    }

    fn service(source: &Arc<FakeSource>) -> HistoryQueryService {
        HistoryQueryService::new(source.clone())
    }

    fn revs(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_validation_order() {
        let source = Arc::new(FakeSource::default());
        let service = service(&source);

        assert_eq!(
            service.query(&RepoQuery::new("  ")),
            Err(HistoryError::Validation("repo".to_string()))
        );
        assert_eq!(
            service.query(&RepoQuery::new("/nonexistent/path")),
            Err(HistoryError::NotFound("/nonexistent/path".to_string()))
        );

        let plain = TempDir::new().unwrap();
        let plain_path = plain.path().to_str().unwrap().to_string();
        assert_eq!(
            service.query(&RepoQuery::new(plain_path.clone()).with_folder("missing")),
            Err(HistoryError::NotARepository(plain_path))
        );

        let repo = fake_repo();
        assert_eq!(
            service.query(&repo_query(&repo).with_folder("missing")),
            Err(HistoryError::NotFound("missing".to_string()))
        );

        // Nothing reached the collaborator
        assert!(source.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_folder_outside_repository() {
        let source = Arc::new(FakeSource::default());
        let service = service(&source);
        let repo = fake_repo();
        fs::create_dir(repo.path().join("src").join("nested")).unwrap();

        for folder in ["/", "/tmp", "../x", "src/../../x"] {
            assert_eq!(
                service.query(&repo_query(&repo).with_folder(folder)),
                Err(HistoryError::NotFound(folder.to_string())),
                "folder {:?}",
                folder
            );
        }
        assert!(source.requests.lock().unwrap().is_empty());

        // Relative folders inside the repository are still accepted
        service
            .query(&repo_query(&repo).with_folder("./src/nested"))
            .unwrap();
        assert_eq!(
            source.requests.lock().unwrap()[0].path,
            Some(PathBuf::from("src/nested"))
        );
    }

    #[test]
    fn test_head_scope_and_folder() {
        let source = Arc::new(FakeSource {
            dates: revs(&["2024-01-05", "2024-01-05", "2024-01-07"]),
            ..Default::default()
        });
        let repo = fake_repo();

        let series = service(&source)
            .query(&repo_query(&repo).with_folder("src/"))
            .unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.total(), 3);

        let request = source.requests.lock().unwrap()[0].clone();
        assert_eq!(request.scope, HistoryScope::Head);
        assert_eq!(request.path, Some(PathBuf::from("src")));
    }

    #[test]
    fn test_all_branches_ignores_branch() {
        let source = Arc::new(FakeSource::default());
        let repo = fake_repo();

        service(&source)
            .query(&repo_query(&repo).with_branch("feature").all_branches(true))
            .unwrap();
        assert_eq!(source.last_scope(), HistoryScope::AllRefs);
    }

    #[test]
    fn test_branch_on_default_logs_whole_branch() {
        let source = Arc::new(FakeSource {
            default_branch: Some("main".to_string()),
            ..Default::default()
        });
        let repo = fake_repo();

        service(&source)
            .query(&repo_query(&repo).with_branch("main"))
            .unwrap();
        assert_eq!(
            source.last_scope(),
            HistoryScope::Range(CommitRange::full("main"))
        );
    }

    #[test]
    fn test_branch_scoped_to_divergence() {
        let source = Arc::new(FakeSource {
            default_branch: Some("main".to_string()),
            rev_lists: vec![
                ("main".to_string(), revs(&["c", "b", "a"])),
                ("feature".to_string(), revs(&["d", "b", "a"])),
            ],
            ..Default::default()
        });
        let repo = fake_repo();

        service(&source)
            .query(&repo_query(&repo).with_branch("feature"))
            .unwrap();
        assert_eq!(
            source.last_scope(),
            HistoryScope::Range(CommitRange::since("b", "feature"))
        );
    }

    #[test]
    fn test_branch_resolution_failures_degrade() {
        let repo = fake_repo();

        // Default branch unknown
        let source = Arc::new(FakeSource::default());
        service(&source)
            .query(&repo_query(&repo).with_branch("feature"))
            .unwrap();
        assert_eq!(
            source.last_scope(),
            HistoryScope::Range(CommitRange::full("feature"))
        );

        // Rev-list lookup fails
        let source = Arc::new(FakeSource {
            default_branch: Some("main".to_string()),
            ..Default::default()
        });
        service(&source)
            .query(&repo_query(&repo).with_branch("feature"))
            .unwrap();
        assert_eq!(
            source.last_scope(),
            HistoryScope::Range(CommitRange::full("feature"))
        );

        // One line is a prefix of the other
        let source = Arc::new(FakeSource {
            default_branch: Some("main".to_string()),
            rev_lists: vec![
                ("main".to_string(), revs(&["b", "a"])),
                ("feature".to_string(), revs(&["c", "b", "a"])),
            ],
            ..Default::default()
        });
        service(&source)
            .query(&repo_query(&repo).with_branch("feature"))
            .unwrap();
        assert_eq!(
            source.last_scope(),
            HistoryScope::Range(CommitRange::full("feature"))
        );
    }

    #[test]
    fn test_log_failure_is_range_query_error() {
        let source = Arc::new(FakeSource {
            log_error: Some("invalid revision range".to_string()),
            ..Default::default()
        });
        let repo = fake_repo();

        assert_eq!(
            service(&source).query(&repo_query(&repo)),
            Err(HistoryError::RangeQuery("invalid revision range".to_string()))
        );
    }

    #[test]
    fn test_malformed_log_entry() {
        let source = Arc::new(FakeSource {
            dates: revs(&["2024-01-05", "Unknown"]),
            ..Default::default()
        });
        let repo = fake_repo();

        assert_eq!(
            service(&source).query(&repo_query(&repo)),
            Err(HistoryError::MalformedDate("Unknown".to_string()))
        );
    }
}
