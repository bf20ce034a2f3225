use std::collections::HashMap;
use std::hash::Hash;

use crate::model::attendance::AttendanceRecord;
use crate::model::summary::EmployeeSalarySummary;
use crate::timekeeping::classifier::classify;

const UNKNOWN_NAME: &str = "N/A";

/// Map that iterates in first-insertion order.
struct OrderedGroups<K, V> {
    index: HashMap<K, usize>,
    values: Vec<V>,
}

impl<K: Hash + Eq, V> OrderedGroups<K, V> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            values: Vec::new(),
        }
    }

    fn get_or_insert_with(&mut self, key: K, create: impl FnOnce() -> V) -> &mut V {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.values.len();
                self.values.push(create());
                self.index.insert(key, slot);
                slot
            }
        };
        &mut self.values[slot]
    }

    fn into_values(self) -> Vec<V> {
        self.values
    }
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    /// One entry per employee, in first-seen order.
    pub summaries: Vec<EmployeeSalarySummary>,
    /// Records dropped because they carry no employee reference.
    pub skipped: usize,
}

/// Groups records by employee and totals work days and late days.
///
/// Every record with an employee id counts as one work day, complete or not.
/// Records without an employee id are filtered out silently and only show up
/// in [`Aggregation::skipped`]; reporting them is the caller's job.
pub fn aggregate_with_report(
    records: &[AttendanceRecord],
    late_threshold_minutes: i32,
) -> Aggregation {
    let mut groups = OrderedGroups::new();
    let mut skipped = 0;

    for record in records {
        let Some(employee_id) = record.employee_id else {
            skipped += 1;
            continue;
        };

        // first record seen for an employee names the row
        let summary = groups.get_or_insert_with(employee_id, || {
            let name = record
                .full_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_NAME.to_string());
            EmployeeSalarySummary::new(employee_id, name)
        });

        summary.total_work_days += 1;
        if classify(record, late_threshold_minutes).is_late() {
            summary.late_days += 1;
        }
    }

    Aggregation {
        summaries: groups.into_values(),
        skipped,
    }
}

pub fn aggregate(
    records: &[AttendanceRecord],
    late_threshold_minutes: i32,
) -> Vec<EmployeeSalarySummary> {
    aggregate_with_report(records, late_threshold_minutes).summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timekeeping::classifier::tests::record;

    #[test]
    fn groups_by_employee_in_first_seen_order() {
        let records = vec![
            record(1, Some(1), Some("08:20"), Some("08:00"), false),
            record(2, Some(2), Some("08:00"), Some("08:00"), false),
            record(3, Some(1), Some("08:02"), Some("08:00"), false),
        ];

        let summaries = aggregate(&records, 5);

        assert_eq!(
            summaries,
            vec![
                EmployeeSalarySummary {
                    employee_id: 1,
                    full_name: "Employee 1".to_string(),
                    total_work_days: 2,
                    late_days: 1,
                },
                EmployeeSalarySummary {
                    employee_id: 2,
                    full_name: "Employee 2".to_string(),
                    total_work_days: 1,
                    late_days: 0,
                },
            ]
        );
    }

    #[test]
    fn first_name_wins() {
        let mut first = record(1, Some(9), Some("08:00"), Some("08:00"), false);
        first.full_name = Some("Original Name".to_string());
        let mut second = record(2, Some(9), Some("08:00"), Some("08:00"), false);
        second.full_name = Some("Renamed".to_string());

        let summaries = aggregate(&[first, second], 5);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].full_name, "Original Name");
    }

    #[test]
    fn missing_name_falls_back() {
        let mut r = record(1, Some(4), Some("08:00"), Some("08:00"), false);
        r.full_name = None;

        assert_eq!(aggregate(&[r], 5)[0].full_name, UNKNOWN_NAME);
    }

    #[test]
    fn records_without_employee_are_skipped() {
        let records = vec![
            record(1, None, Some("09:00"), Some("08:00"), false),
            record(2, Some(3), Some("09:00"), Some("08:00"), false),
            record(3, None, None, None, false),
        ];

        let report = aggregate_with_report(&records, 5);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.summaries.len(), 1);
        assert_eq!(report.summaries[0].total_work_days, 1);
        assert_eq!(report.summaries[0].late_days, 1);
    }

    #[test]
    fn malformed_check_in_counts_as_work_day_only() {
        let records = vec![record(1, Some(5), Some("abc"), Some("08:00"), false)];

        let summaries = aggregate(&records, 5);
        assert_eq!(summaries[0].total_work_days, 1);
        assert_eq!(summaries[0].late_days, 0);
    }

    #[test]
    fn oversized_times_do_not_abort_the_pass() {
        let records = vec![
            record(1, Some(5), Some("08:00"), Some("35791394:07"), false),
            record(2, Some(5), Some("99999999:00"), Some("08:00"), false),
            record(3, Some(5), Some("25:99"), Some("08:00"), false),
            record(4, Some(6), Some("08:10"), Some("08:00"), false),
        ];

        let summaries = aggregate(&records, 5);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].total_work_days, 3);
        assert_eq!(summaries[0].late_days, 1);
        assert_eq!(summaries[1].late_days, 1);
    }

    #[test]
    fn late_and_early_leave_counts_as_late() {
        let records = vec![record(1, Some(5), Some("08:30"), Some("08:00"), true)];
        assert_eq!(aggregate(&records, 5)[0].late_days, 1);
    }

    #[test]
    fn aggregation_is_repeatable() {
        let records: Vec<_> = (0..20)
            .map(|i| {
                let check_in = if i % 3 == 0 { "08:10" } else { "07:58" };
                record(i, Some(i % 4), Some(check_in), Some("08:00"), i % 5 == 0)
            })
            .collect();

        let once = aggregate(&records, 5);
        let twice = aggregate(&records, 5);
        assert_eq!(once, twice);

        // every employee appears once and totals match input counts
        assert_eq!(once.len(), 4);
        for summary in &once {
            let expected = records
                .iter()
                .filter(|r| r.employee_id == Some(summary.employee_id))
                .count() as u32;
            assert_eq!(summary.total_work_days, expected);
        }
        let ids: Vec<_> = once.iter().map(|s| s.employee_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let report = aggregate_with_report(&[], 5);
        assert!(report.summaries.is_empty());
        assert_eq!(report.skipped, 0);
    }
}
