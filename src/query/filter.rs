//! Filter predicate
//!
//! Selects the records a selection covers. Year, country and disease
//! predicates are ANDed; an empty country or disease set matches nothing.

use crate::dataset::DeathRecord;
use crate::query::selection::Selection;

/// Check whether a record passes every predicate of the selection
pub fn matches(record: &DeathRecord, selection: &Selection) -> bool {
    selection.year_filter.matches(record.year)
        && selection.countries.contains(&record.country)
        && selection.diseases.contains(&record.disease)
}

/// Records covered by the selection, in table order
pub fn filter<'a>(records: &'a [DeathRecord], selection: &Selection) -> Vec<&'a DeathRecord> {
    if selection.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|record| matches(record, selection))
        .collect()
}
