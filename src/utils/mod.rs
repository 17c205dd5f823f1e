pub mod aggregation;

pub use aggregation::aggregate_dates;
