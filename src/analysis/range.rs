use git2::Error;
use std::path::Path;

use super::git::HistorySource;
use crate::types::CommitRange;

/// Finds the part of a branch's history that is not shared with the default branch.
pub struct BranchRangeResolver<'a> {
    source: &'a dyn HistorySource,
    repo: &'a Path,
}

impl<'a> BranchRangeResolver<'a> {
    pub fn new(source: &'a dyn HistorySource, repo: &'a Path) -> Self {
        Self { source, repo }
    }

    /// Range of commits unique to `target_branch`.
    ///
    /// Returns an unbounded range when no divergence point can be determined,
    /// which callers treat as "log the whole branch". Errors come only from
    /// fetching the rev-lists.
    pub fn resolve(&self, default_branch: &str, target_branch: &str) -> Result<CommitRange, Error> {
        let mut default_revs = self.source.fetch_rev_list(self.repo, default_branch)?;
        let mut target_revs = self.source.fetch_rev_list(self.repo, target_branch)?;
        default_revs.reverse();
        target_revs.reverse();

        Ok(match find_divergence(&default_revs, &target_revs) {
            Some(lower_bound) => CommitRange::since(lower_bound, target_branch),
            None => CommitRange::full(target_branch),
        })
    }
}

/// Last commit shared by two oldest-first first-parent lines.
///
/// `None` when either list is empty, when one list is a prefix of the other, or
/// when the lists differ at their very first commit (no shared history).
pub fn find_divergence<'r>(default_revs: &'r [String], target_revs: &[String]) -> Option<&'r str> {
    let index = default_revs
        .iter()
        .zip(target_revs)
        .position(|(default, target)| default != target)?;

    index
        .checked_sub(1)
        .map(|shared| default_revs[shared].as_str())
}
