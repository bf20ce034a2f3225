use chrono::Datelike;

use crate::error::TimekeepingError;
use crate::model::summary::EmployeeSalarySummary;
use crate::timekeeping::period::ReportPeriod;

/// Sink that renders aggregated summary rows into a downloadable document.
pub trait SummaryExporter {
    fn content_type(&self) -> &'static str;

    fn file_name(&self, period: &ReportPeriod) -> String;

    fn export(&self, rows: &[EmployeeSalarySummary]) -> Result<Vec<u8>, TimekeepingError>;
}

pub struct CsvExporter;

const HEADER: [&str; 4] = ["ID", "Full name", "Work days", "Late days"];

impl SummaryExporter for CsvExporter {
    fn content_type(&self) -> &'static str {
        "text/csv; charset=utf-8"
    }

    fn file_name(&self, period: &ReportPeriod) -> String {
        if period.is_whole_month() {
            format!("timesheet_{}_{}.csv", period.start.month(), period.start.year())
        } else {
            format!("timesheet_{}_{}.csv", period.start, period.end)
        }
    }

    fn export(&self, rows: &[EmployeeSalarySummary]) -> Result<Vec<u8>, TimekeepingError> {
        let failed = |e: &dyn std::fmt::Display| TimekeepingError::Export {
            reason: e.to_string(),
        };

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(HEADER).map_err(|e| failed(&e))?;

        // rows keep the aggregator's first-seen order
        for row in rows {
            writer
                .write_record([
                    row.employee_id.to_string(),
                    row.full_name.clone(),
                    row.total_work_days.to_string(),
                    row.late_days.to_string(),
                ])
                .map_err(|e| failed(&e))?;
        }

        let bytes = writer.into_inner().map_err(|e| failed(&e))?;
        tracing::debug!(rows = rows.len(), bytes = bytes.len(), "Summary exported");
        Ok(bytes)
    }
}
