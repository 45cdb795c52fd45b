use crate::types::Record;

/// Keep only records whose fuel figure was written down. Everything else on
/// a kept record passes through untouched, and a recorded zero is kept.
pub fn retain_recorded(records: Vec<Record>) -> Vec<Record> {
    records.into_iter().filter(Record::is_valid).collect()
}
