//! # Git Activity Spiral Library
//!
//! `gitspiral` turns a repository's commit history into a calendar of daily commit
//! counts and lays that calendar out along a Fermat-type spiral, whose radius grows
//! with the square root of the day index.
//!
//! ## Features
//!
//! - Query commit dates for the current branch, a feature branch (only the commits
//!   since it diverged from the default branch) or every branch
//! - Restrict the history to a folder
//! - Gap-filled daily series, ready for JSON
//! - Spiral layout with bar, heat-bar, circle and heat-circle encodings
//! - SVG rendering and 300 DPI PNG export
//! - HTTP endpoint serving the daily series
//!
//! ## Example
//!
//! ```no_run
//! use gitspiral::analysis::{GitSource, HistoryQueryService};
//! use gitspiral::plotting::{export_png, ChartConfig, ChartStyle, ChartTheme, SpiralLayoutEngine};
//! use gitspiral::types::RepoQuery;
//! use std::sync::Arc;
//!
//! let service = HistoryQueryService::new(Arc::new(GitSource::new()));
//! let series = service.query(&RepoQuery::new("/path/to/repo").with_folder("src"))?;
//!
//! let layout = SpiralLayoutEngine::new(ChartConfig::default()).layout(&series);
//! let png = export_png(&layout, &ChartTheme::default(), &ChartStyle::default())?;
//! std::fs::write("activity.png", png)?;
//! # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
//! ```

pub mod analysis;
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod plotting;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use analysis::{GitSource, HistoryQueryService};
pub use error::{ErrorKind, HistoryError};
pub use types::{DailySeries, RepoQuery};
