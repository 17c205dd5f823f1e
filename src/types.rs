//! # Common Types
//!
//! This module contains the types passed between the history query layer and the
//! spiral layout: the gap-filled daily series, commit ranges and log scopes.

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Canonical calendar-day format used on the wire and in log output.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Daily commit counts in ascending date order.
///
/// A series built by [`crate::utils::aggregate_dates`] is gap-filled: every day
/// between the first and last commit date is present, with zero for days
/// without activity. The series is immutable once built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DailySeries {
    counts: BTreeMap<NaiveDate, usize>,
}

impl DailySeries {
    pub(crate) fn from_counts(counts: BTreeMap<NaiveDate, usize>) -> Self {
        Self { counts }
    }

    /// Number of days in the series
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Commit count for a given day, if that day is inside the series
    pub fn get(&self, date: &NaiveDate) -> Option<usize> {
        self.counts.get(date).copied()
    }

    /// Iterate `(date, count)` pairs in ascending date order
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, usize)> + '_ {
        self.counts.iter().map(|(date, count)| (*date, *count))
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.counts.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.counts.keys().next_back().copied()
    }

    /// Sum of all daily counts
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

impl Serialize for DailySeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (date, count) in &self.counts {
            map.serialize_entry(&date.format(DATE_FORMAT).to_string(), count)?;
        }
        map.end()
    }
}

/// Which commits of a branch to include.
///
/// An absent lower bound means "from the beginning of history". When present,
/// the lower bound commit and all of its ancestors are excluded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitRange {
    pub lower_bound: Option<String>,
    pub branch: String,
}

impl CommitRange {
    /// The whole history of `branch`
    pub fn full(branch: impl Into<String>) -> Self {
        Self {
            lower_bound: None,
            branch: branch.into(),
        }
    }

    /// Commits reachable from `branch` but not from `lower_bound`
    pub fn since(lower_bound: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            lower_bound: Some(lower_bound.into()),
            branch: branch.into(),
        }
    }

    /// True when no lower bound could be determined
    pub fn is_unbounded(&self) -> bool {
        self.lower_bound.is_none()
    }

    /// Revision expression in `lower..branch` form, or just the branch
    pub fn rev_spec(&self) -> String {
        match &self.lower_bound {
            Some(lower) => format!("{}..{}", lower, self.branch),
            None => self.branch.clone(),
        }
    }
}

/// The set of refs a log query walks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HistoryScope {
    /// The currently checked-out line
    Head,
    /// Every ref in the repository
    AllRefs,
    /// A branch, optionally cut at a lower bound
    Range(CommitRange),
}

/// A single request to the log collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRequest {
    pub scope: HistoryScope,
    /// Restrict to commits touching this path, relative to the repository root
    pub path: Option<PathBuf>,
}

/// Parameters of one "activity for repo/folder/branch" request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepoQuery {
    pub repo: String,
    pub folder: Option<String>,
    pub branch: Option<String>,
    pub all_branches: bool,
}

impl RepoQuery {
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            ..Default::default()
        }
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn all_branches(mut self, all: bool) -> Self {
        self.all_branches = all;
        self
    }
}
