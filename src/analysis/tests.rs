use super::*;
use crate::types::{CommitRange, HistoryScope, LogRequest, RepoQuery};
use chrono::NaiveDate;
use git2::{Commit, Oid, Repository, RepositoryInitOptions, Signature, Time};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

struct TestRepo {
    dir: TempDir,
    repo: Repository,
}

impl TestRepo {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &opts).unwrap();
        Self { dir, repo }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn signature(date: &str) -> Signature<'static> {
        let seconds = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp();
        Signature::new("Test User", "test@example.com", &Time::new(seconds, 0)).unwrap()
    }

    fn tip(&self, reference: &str) -> Option<Commit<'_>> {
        self.repo
            .find_reference(reference)
            .ok()
            .and_then(|r| r.peel_to_commit().ok())
    }

    /// Write `file` and commit it onto `reference`
    fn commit(&self, reference: &str, file: &str, date: &str) -> Oid {
        let file_path = self.path().join(file);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&file_path, format!("{} {}\n", file, date)).unwrap();

        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();

        let signature = Self::signature(date);
        let parent = self.tip(reference);
        let parents: Vec<&Commit<'_>> = parent.iter().collect();
        self.repo
            .commit(
                Some(reference),
                &signature,
                &signature,
                &format!("Update {}", file),
                &tree,
                &parents,
            )
            .unwrap()
    }

    fn merge(&self, into: &str, from: &str, date: &str) -> Oid {
        let ours = self.tip(into).unwrap();
        let theirs = self.tip(from).unwrap();
        let tree = ours.tree().unwrap();
        let signature = Self::signature(date);
        self.repo
            .commit(
                Some(into),
                &signature,
                &signature,
                "Merge",
                &tree,
                &[&ours, &theirs],
            )
            .unwrap()
    }

    fn branch(&self, name: &str, at: Oid) {
        let commit = self.repo.find_commit(at).unwrap();
        self.repo.branch(name, &commit, false).unwrap();
    }
}

/// main: 01-01, 01-02, 01-05; feature forks at 01-02 with 01-10, 01-12
fn setup_branched_repo() -> (TestRepo, Oid) {
    let repo = TestRepo::new();
    repo.commit("HEAD", "README.md", "2024-01-01");
    let fork = repo.commit("HEAD", "src/lib.rs", "2024-01-02");
    repo.branch("feature", fork);
    repo.commit("HEAD", "README.md", "2024-01-05");
    repo.commit("refs/heads/feature", "src/feature.rs", "2024-01-10");
    repo.commit("refs/heads/feature", "src/feature.rs", "2024-01-12");
    (repo, fork)
}

fn sorted(mut dates: Vec<String>) -> Vec<String> {
    dates.sort();
    dates
}

#[test]
fn test_fetch_log_head() {
    let (repo, _) = setup_branched_repo();
    let dates = GitSource::new()
        .fetch_log(
            repo.path(),
            &LogRequest {
                scope: HistoryScope::Head,
                path: None,
            },
        )
        .unwrap();

    assert_eq!(sorted(dates), vec!["2024-01-01", "2024-01-02", "2024-01-05"]);
}

#[test]
fn test_fetch_log_skips_merges() {
    let (repo, _) = setup_branched_repo();
    repo.merge("HEAD", "refs/heads/feature", "2024-01-20");

    let dates = GitSource::new()
        .fetch_log(
            repo.path(),
            &LogRequest {
                scope: HistoryScope::Head,
                path: None,
            },
        )
        .unwrap();

    assert_eq!(dates.len(), 5);
    assert!(!dates.contains(&"2024-01-20".to_string()));
}

#[test]
fn test_fetch_log_all_refs_and_path() {
    let (repo, _) = setup_branched_repo();
    let source = GitSource::new();

    let all = source
        .fetch_log(
            repo.path(),
            &LogRequest {
                scope: HistoryScope::AllRefs,
                path: None,
            },
        )
        .unwrap();
    assert_eq!(all.len(), 5);

    let src_only = source
        .fetch_log(
            repo.path(),
            &LogRequest {
                scope: HistoryScope::AllRefs,
                path: Some(PathBuf::from("src")),
            },
        )
        .unwrap();
    assert_eq!(sorted(src_only), vec!["2024-01-02", "2024-01-10", "2024-01-12"]);
}

#[test]
fn test_fetch_log_range() {
    let (repo, fork) = setup_branched_repo();
    let dates = GitSource::new()
        .fetch_log(
            repo.path(),
            &LogRequest {
                scope: HistoryScope::Range(CommitRange::since(fork.to_string(), "feature")),
                path: None,
            },
        )
        .unwrap();

    assert_eq!(sorted(dates), vec!["2024-01-10", "2024-01-12"]);
}

#[test]
fn test_fetch_log_bad_range() {
    let (repo, _) = setup_branched_repo();
    let result = GitSource::new().fetch_log(
        repo.path(),
        &LogRequest {
            scope: HistoryScope::Range(CommitRange::since("nope", "feature")),
            path: None,
        },
    );
    assert!(result.is_err());
}

#[test]
fn test_fetch_log_empty_repo() {
    let repo = TestRepo::new();
    let dates = GitSource::new()
        .fetch_log(
            repo.path(),
            &LogRequest {
                scope: HistoryScope::Head,
                path: None,
            },
        )
        .unwrap();
    assert!(dates.is_empty());
}

#[test]
fn test_rev_list_is_first_parent_newest_first() {
    let (repo, fork) = setup_branched_repo();
    let merge = repo.merge("HEAD", "refs/heads/feature", "2024-01-20");

    let revs = GitSource::new().fetch_rev_list(repo.path(), "main").unwrap();
    assert_eq!(revs.len(), 4);
    assert_eq!(revs[0], merge.to_string());
    assert!(revs.contains(&fork.to_string()));
}

#[test]
fn test_resolve_default_branch_from_head() {
    let (repo, _) = setup_branched_repo();
    assert_eq!(
        GitSource::new().resolve_default_branch(repo.path()).unwrap(),
        "main"
    );
}

#[test]
fn test_resolver_against_real_history() {
    let (repo, fork) = setup_branched_repo();
    let source = GitSource::new();
    let range = BranchRangeResolver::new(&source, repo.path())
        .resolve("main", "feature")
        .unwrap();
    assert_eq!(range, CommitRange::since(fork.to_string(), "feature"));
}

#[test]
fn test_query_branch_activity() {
    let (repo, _) = setup_branched_repo();
    let service = HistoryQueryService::new(Arc::new(GitSource::new()));
    let query = RepoQuery::new(repo.path().to_str().unwrap());

    let head = service.query(&query).unwrap();
    assert_eq!(head.len(), 5);
    assert_eq!(head.total(), 3);

    let feature = service.query(&query.clone().with_branch("feature")).unwrap();
    assert_eq!(feature.len(), 3);
    assert_eq!(feature.total(), 2);

    let all = service.query(&query.all_branches(true)).unwrap();
    assert_eq!(all.len(), 12);
    assert_eq!(all.total(), 5);
}

#[test]
fn test_query_unknown_branch_is_range_error() {
    let (repo, _) = setup_branched_repo();
    let service = HistoryQueryService::new(Arc::new(GitSource::new()));
    let query = RepoQuery::new(repo.path().to_str().unwrap()).with_branch("nonexistent-branch");

    let err = service.query(&query).unwrap_err();
    assert_eq!(err.kind(), crate::error::ErrorKind::RangeQueryError);
}
