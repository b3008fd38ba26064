//! Record selection.
//!
//! A [`RecordFilter`] narrows a record set by branch, period and a
//! case-insensitive name search. It is deserialized straight from the query
//! string of the listing and reporting endpoints.

use serde::{Deserialize, Serialize};

use crate::models::WageRecord;

/// Optional criteria a wage record must satisfy.
///
/// Criteria that are absent impose no constraint; the supplied ones are
/// combined with logical AND. An empty `branch` or `date` counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Exact branch to match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Exact period token to match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Substring that must appear in the name, ignoring case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl RecordFilter {
    /// Returns true when no criterion constrains the selection.
    pub fn is_unconstrained(&self) -> bool {
        active(&self.branch).is_none()
            && active(&self.date).is_none()
            && self.search.as_deref().is_none_or(str::is_empty)
    }

    /// Returns true if `record` satisfies every supplied criterion.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_ledger::calculation::RecordFilter;
    /// use payroll_ledger::models::WageRecord;
    ///
    /// let record = WageRecord::parse("Alice Smith", "20", "40", "0", "north", "p1").unwrap();
    /// let filter = RecordFilter {
    ///     branch: Some("north".to_string()),
    ///     search: Some("SMITH".to_string()),
    ///     ..RecordFilter::default()
    /// };
    ///
    /// assert!(filter.matches(&record));
    /// ```
    pub fn matches(&self, record: &WageRecord) -> bool {
        let branch_matches = active(&self.branch).is_none_or(|branch| record.branch == branch);
        let date_matches = active(&self.date).is_none_or(|date| record.date == date);
        let name_matches = self.search.as_deref().is_none_or(|search| {
            record
                .name
                .to_lowercase()
                .contains(&search.to_lowercase())
        });

        branch_matches && date_matches && name_matches
    }

    /// Keeps the records that match, preserving their order.
    pub fn apply(&self, records: Vec<WageRecord>) -> Vec<WageRecord> {
        records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect()
    }
}

fn active(criterion: &Option<String>) -> Option<&str> {
    criterion.as_deref().filter(|value| !value.is_empty())
}
