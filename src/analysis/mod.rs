pub mod git;
pub mod query;
pub mod range;

#[cfg(test)]
mod tests;

pub use git::{GitSource, HistorySource};
pub use query::HistoryQueryService;
pub use range::{find_divergence, BranchRangeResolver};
