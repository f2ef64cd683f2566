//! Stable chronological ordering of participation records.

use crate::domain::EventRecord;
use chrono::NaiveDate;

/// Ordering key for records: date first, then position in the input batch.
///
/// Two records on the same date keep their relative input order, which is
/// what makes diminishing returns deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecordOrderingKey {
    /// Event date (primary sort).
    pub date: NaiveDate,
    /// Position in the batch (tie-break).
    pub input_index: usize,
}

impl RecordOrderingKey {
    pub fn new(record: &EventRecord, input_index: usize) -> Self {
        Self {
            date: record.date,
            input_index,
        }
    }
}

/// Sort records oldest first, keeping input order for equal dates.
pub fn sort_records_chronological(records: &mut Vec<&EventRecord>) {
    let mut keyed: Vec<(RecordOrderingKey, &EventRecord)> = records
        .iter()
        .enumerate()
        .map(|(idx, r)| (RecordOrderingKey::new(r, idx), *r))
        .collect();
    keyed.sort_unstable_by_key(|(key, _)| *key);
    records.clear();
    records.extend(keyed.into_iter().map(|(_, r)| r));
}
