use chrono::{DateTime, FixedOffset, Utc};
use git2::{Commit, Error, ErrorCode, Oid, Repository, Revwalk, Sort};
use std::path::Path;

use crate::types::{HistoryScope, LogRequest, DATE_FORMAT};

/// Read access to a repository's history.
///
/// Every method opens the repository at `repo` itself, so implementations hold no
/// per-repository state and can be shared between concurrent queries.
pub trait HistorySource: Send + Sync {
    /// Author dates (`YYYY-MM-DD`) of every non-merge commit in scope, one per commit
    fn fetch_log(&self, repo: &Path, request: &LogRequest) -> Result<Vec<String>, Error>;

    /// Commit ids along the first-parent line of `reference`, newest first
    fn fetch_rev_list(&self, repo: &Path, reference: &str) -> Result<Vec<String>, Error>;

    /// Short name of the repository's default branch
    fn resolve_default_branch(&self, repo: &Path) -> Result<String, Error>;
}

/// [`HistorySource`] backed by libgit2
#[derive(Clone, Copy, Debug, Default)]
pub struct GitSource;

impl GitSource {
    pub fn new() -> Self {
        Self
    }
}

impl HistorySource for GitSource {
    fn fetch_log(&self, repo_path: &Path, request: &LogRequest) -> Result<Vec<String>, Error> {
        let repo = Repository::open(repo_path)?;
        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;

        match &request.scope {
            HistoryScope::Head => match repo.head() {
                Ok(_) => revwalk.push_head()?,
                // Nothing committed yet
                Err(e) if e.code() == ErrorCode::UnbornBranch => return Ok(Vec::new()),
                Err(e) => return Err(e),
            },
            HistoryScope::AllRefs => {
                revwalk.push_glob("*")?;
                if repo.head().is_ok() {
                    revwalk.push_head()?;
                }
            }
            HistoryScope::Range(range) => {
                if range.is_unbounded() {
                    let tip = repo.revparse_single(&range.branch)?.peel_to_commit()?;
                    revwalk.push(tip.id())?;
                } else {
                    revwalk.push_range(&range.rev_spec())?;
                }
            }
        }

        collect_commit_dates(&repo, revwalk, request.path.as_deref())
    }

    fn fetch_rev_list(&self, repo_path: &Path, reference: &str) -> Result<Vec<String>, Error> {
        let repo = Repository::open(repo_path)?;
        let tip = repo.revparse_single(reference)?.peel_to_commit()?;

        let mut revwalk = repo.revwalk()?;
        revwalk.simplify_first_parent()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL)?;
        revwalk.push(tip.id())?;

        revwalk
            .map(|oid| oid.map(|oid| oid.to_string()))
            .collect::<Result<Vec<_>, _>>()
    }

    fn resolve_default_branch(&self, repo_path: &Path) -> Result<String, Error> {
        let repo = Repository::open(repo_path)?;

        if let Ok(origin_head) = repo.find_reference("refs/remotes/origin/HEAD") {
            if let Some(target) = origin_head.symbolic_target() {
                return Ok(short_branch_name(target));
            }
        }

        let head = repo.find_reference("HEAD")?;
        head.symbolic_target()
            .map(short_branch_name)
            .ok_or_else(|| Error::from_str("HEAD is detached; no default branch"))
    }
}

fn collect_commit_dates(
    repo: &Repository,
    revwalk: Revwalk<'_>,
    path: Option<&Path>,
) -> Result<Vec<String>, Error> {
    let mut dates = Vec::new();

    for oid in revwalk {
        let commit = repo.find_commit(oid?)?;
        if commit.parent_count() > 1 {
            continue;
        }
        if let Some(path) = path {
            if !touches_path(&commit, path)? {
                continue;
            }
        }
        dates.push(author_date(&commit)?);
    }

    Ok(dates)
}

/// Whether the entry at `path` differs between the commit and its first parent
fn touches_path(commit: &Commit<'_>, path: &Path) -> Result<bool, Error> {
    let entry_id = |tree: &git2::Tree<'_>| -> Option<Oid> {
        tree.get_path(path).ok().map(|entry| entry.id())
    };

    let current = entry_id(&commit.tree()?);
    let previous = match commit.parent(0) {
        Ok(parent) => entry_id(&parent.tree()?),
        Err(_) => None,
    };

    Ok(current != previous)
}

/// Author date as a calendar day in the author's own UTC offset
fn author_date(commit: &Commit<'_>) -> Result<String, Error> {
    let when = commit.author().when();
    author_day(when.seconds(), when.offset_minutes()).ok_or_else(|| {
        Error::from_str(&format!(
            "commit {} has an out-of-range author date ({})",
            commit.id(),
            when.seconds()
        ))
    })
}

fn author_day(seconds: i64, offset_minutes: i32) -> Option<String> {
    let utc = DateTime::<Utc>::from_timestamp(seconds, 0)?;
    let day = match FixedOffset::east_opt(offset_minutes * 60) {
        Some(offset) => utc.with_timezone(&offset).date_naive(),
        None => utc.date_naive(),
    };
    Some(day.format(DATE_FORMAT).to_string())
}

fn short_branch_name(reference: &str) -> String {
    reference
        .strip_prefix("refs/remotes/origin/")
        .or_else(|| reference.strip_prefix("refs/heads/"))
        .unwrap_or(reference)
        .to_string()
}
