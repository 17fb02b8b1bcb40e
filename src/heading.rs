// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Month and day section headings.
//!
//! Messages are grouped under `## {year} - {month}` and `### {date}`
//! headings. Input order is trusted as-is: a heading is emitted whenever the
//! day changes from the previous message, so unsorted input can repeat a
//! heading later in the document.

use crate::date::Timestamp;
use tracing::debug;

/// Grouping keys of the previous message in a conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingState {
    /// Year of the previous message, e.g. `2019`.
    pub last_year: Option<String>,
    /// Year and month of the previous message, e.g. `2019 - May`.
    pub last_month_key: Option<String>,
    /// Day of the previous message, e.g. `Wed 08 May 2019`.
    pub last_date_key: Option<String>,
}

/// Emits section headings on day boundaries.
///
/// Call [`HeadingGrouper::heading_for`] exactly once per message, in input
/// order.
///
/// # Example
///
/// ```
/// use dm2epub::date::Timestamp;
/// use dm2epub::heading::HeadingGrouper;
///
/// let mut grouper = HeadingGrouper::new();
/// let ts = Timestamp::parse("2019-05-08T08:27:07.472Z").unwrap();
///
/// assert_eq!(grouper.heading_for(&ts), "## 2019 - May\n\n### Wed 08 May 2019\n\n");
/// assert_eq!(grouper.heading_for(&ts), "");
/// ```
#[derive(Debug, Clone, Default)]
pub struct HeadingGrouper {
    state: GroupingState,
}

impl HeadingGrouper {
    /// Creates a grouper with empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The keys recorded so far.
    #[must_use]
    pub const fn state(&self) -> &GroupingState {
        &self.state
    }

    /// Returns the heading text to place before a message at `ts`.
    ///
    /// The text is empty unless the day differs from the previous message.
    /// A month change without a day change (only possible for unsorted
    /// input) updates the month key but emits nothing.
    pub fn heading_for(&mut self, ts: &Timestamp) -> String {
        let year = ts.year();
        if self.state.last_year.as_deref() != Some(year) {
            self.state.last_year = Some(year.to_owned());
        }

        let month_key = format!("{year} - {}", ts.month());
        let mut month_heading = String::new();
        if self.state.last_month_key.as_deref() != Some(month_key.as_str()) {
            month_heading = format!("## {month_key}\n\n");
            self.state.last_month_key = Some(month_key);
        }

        let date_key = ts.date();
        if self.state.last_date_key.as_deref() == Some(date_key.as_str()) {
            return String::new();
        }

        debug!(date = %date_key, new_month = !month_heading.is_empty(), "section heading");
        let heading = format!("{month_heading}### {date_key}\n\n");
        self.state.last_date_key = Some(date_key);
        heading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(raw: &str) -> Timestamp {
        Timestamp::parse(raw).unwrap()
    }

    #[test]
    fn first_message_gets_month_and_date() {
        let mut grouper = HeadingGrouper::new();
        assert_eq!(
            grouper.heading_for(&ts("2019-05-08T08:27:07.472Z")),
            "## 2019 - May\n\n### Wed 08 May 2019\n\n"
        );
    }

    #[test]
    fn same_day_gets_no_heading() {
        let mut grouper = HeadingGrouper::new();
        grouper.heading_for(&ts("2019-05-08T08:27:07.472Z"));
        assert_eq!(grouper.heading_for(&ts("2019-05-08T23:59:00.000Z")), "");
    }

    #[test]
    fn new_day_same_month_gets_date_only() {
        let mut grouper = HeadingGrouper::new();
        grouper.heading_for(&ts("2019-05-08T08:27:07.472Z"));
        assert_eq!(
            grouper.heading_for(&ts("2019-05-09T08:00:00.000Z")),
            "### Thu 09 May 2019\n\n"
        );
    }

    #[test]
    fn new_month_gets_both_headings() {
        let mut grouper = HeadingGrouper::new();
        grouper.heading_for(&ts("2019-05-31T08:00:00.000Z"));
        assert_eq!(
            grouper.heading_for(&ts("2019-06-01T08:00:00.000Z")),
            "## 2019 - Jun\n\n### Sat 01 Jun 2019\n\n"
        );
    }

    #[test]
    fn same_month_next_year_gets_month_heading() {
        let mut grouper = HeadingGrouper::new();
        grouper.heading_for(&ts("2019-05-08T08:00:00.000Z"));
        assert_eq!(
            grouper.heading_for(&ts("2020-05-08T08:00:00.000Z")),
            "## 2020 - May\n\n### Fri 08 May 2020\n\n"
        );
        assert_eq!(grouper.state().last_year.as_deref(), Some("2020"));
    }

    #[test]
    fn unsorted_input_repeats_heading() {
        let mut grouper = HeadingGrouper::new();
        grouper.heading_for(&ts("2019-05-08T08:00:00.000Z"));
        grouper.heading_for(&ts("2019-05-09T08:00:00.000Z"));
        assert_eq!(
            grouper.heading_for(&ts("2019-05-08T09:00:00.000Z")),
            "### Wed 08 May 2019\n\n"
        );
    }

    #[test]
    fn month_change_without_date_change_is_silent() {
        let mut grouper = HeadingGrouper {
            state: GroupingState {
                last_year: Some("2019".into()),
                last_month_key: Some("2019 - Apr".into()),
                last_date_key: Some("Wed 08 May 2019".into()),
            },
        };

        assert_eq!(grouper.heading_for(&ts("2019-05-08T08:00:00.000Z")), "");
        assert_eq!(
            grouper.state().last_month_key.as_deref(),
            Some("2019 - May")
        );
    }

    #[test]
    fn records_state_keys() {
        let mut grouper = HeadingGrouper::new();
        grouper.heading_for(&ts("2019-05-08T08:27:07.472Z"));

        assert_eq!(
            grouper.state(),
            &GroupingState {
                last_year: Some("2019".into()),
                last_month_key: Some("2019 - May".into()),
                last_date_key: Some("Wed 08 May 2019".into()),
            }
        );
    }
}
