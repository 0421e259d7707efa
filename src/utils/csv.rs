// src/utils/csv.rs

use crate::models::attempt::ExamResultRow;

/// Builds the results export for one exam.
///
/// Format is fixed: a header row followed by one comma-joined row per result.
/// Field values are written as-is (no quoting or escaping); names containing
/// commas will shift columns, matching the documented export format.
pub fn results_csv(rows: &[ExamResultRow]) -> String {
    let header = "Full Name,Matric No,Score,Status,End Time";

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(header.to_string());

    for row in rows {
        let end_time = row
            .end_time
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        lines.push(format!(
            "{},{},{},{},{}",
            row.full_name, row.matric_no, row.score, row.status, end_time
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_header_only_when_no_rows() {
        let csv = results_csv(&[]);
        assert_eq!(csv, "Full Name,Matric No,Score,Status,End Time");
    }

    #[test]
    fn test_single_row_export() {
        let end_time = Utc.with_ymd_and_hms(2026, 1, 15, 10, 30, 0).unwrap();
        let rows = vec![ExamResultRow {
            attempt_id: 1,
            full_name: "Jane Doe".to_string(),
            matric_no: "MAT001".to_string(),
            score: 8,
            status: "submitted".to_string(),
            start_time: end_time,
            end_time: Some(end_time),
        }];

        let csv = results_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Full Name,Matric No,Score,Status,End Time");
        assert!(lines[1].starts_with("Jane Doe,MAT001,8,submitted,"));
    }

    #[test]
    fn test_missing_end_time_is_empty_field() {
        let rows = vec![ExamResultRow {
            attempt_id: 2,
            full_name: "John Roe".to_string(),
            matric_no: "MAT002".to_string(),
            score: 0,
            status: "auto_submitted".to_string(),
            start_time: Utc::now(),
            end_time: None,
        }];

        let csv = results_csv(&rows);
        assert!(csv.ends_with("John Roe,MAT002,0,auto_submitted,"));
    }
}
