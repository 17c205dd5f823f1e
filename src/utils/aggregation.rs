use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use crate::error::HistoryError;
use crate::types::{DailySeries, DATE_FORMAT};

/// Bucket commit dates into a gap-filled daily series.
///
/// Input lines are `YYYY-MM-DD` dates in any order, one per commit; duplicates
/// count as multiple commits on the same day. Blank lines (the trailing newline
/// of log output) are ignored. Every day between the earliest and latest date is
/// present in the result, with zero for days without commits.
pub fn aggregate_dates<I, S>(dates: I) -> Result<DailySeries, HistoryError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tally: HashMap<String, usize> = HashMap::new();
    for date in dates {
        let date = date.as_ref().trim();
        if date.is_empty() {
            continue;
        }
        *tally.entry(date.to_string()).or_insert(0) += 1;
    }

    let mut counts = BTreeMap::new();
    for (key, count) in tally {
        let day = NaiveDate::parse_from_str(&key, DATE_FORMAT)
            .map_err(|_| HistoryError::MalformedDate(key.clone()))?;
        counts.insert(day, count);
    }

    let bounds = counts
        .keys()
        .next()
        .copied()
        .zip(counts.keys().next_back().copied());
    if let Some((first, last)) = bounds {
        for day in first.iter_days().take_while(|day| *day <= last) {
            counts.entry(day).or_insert(0);
        }
    }

    Ok(DailySeries::from_counts(counts))
}
