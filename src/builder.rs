use tracing::debug;

use crate::error::RowError;
use crate::models::{
    Direction, KpiRecord, RawRow, RowIssue, ACTUAL, BENCHMARK, CAMPAIGN_TYPE, DIRECTION, KPI_NAME,
};

/// Valid records in input order, plus every row that was rejected.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BuildOutcome {
    pub records: Vec<KpiRecord>,
    pub issues: Vec<RowIssue>,
}

impl BuildOutcome {
    /// Fail the whole batch on the first rejected row.
    pub fn into_strict(self) -> Result<Vec<KpiRecord>, RowIssue> {
        match self.issues.into_iter().next() {
            Some(issue) => Err(issue),
            None => Ok(self.records),
        }
    }
}

pub fn build_record(raw: &RawRow) -> Result<KpiRecord, RowError> {
    let campaign_type = required_text(raw.campaign_type.as_deref(), CAMPAIGN_TYPE)?;
    let kpi_name = required_text(raw.kpi_name.as_deref(), KPI_NAME)?;
    let benchmark = parse_number(raw.benchmark.as_deref(), BENCHMARK)?;
    let actual = parse_number(raw.actual.as_deref(), ACTUAL)?;
    let direction: Direction = required_text(raw.direction.as_deref(), DIRECTION)?.parse()?;

    KpiRecord::new(campaign_type, kpi_name, benchmark, actual, direction)
}

/// Build records from raw rows. Blank rows are dropped silently; any other
/// row that fails validation is reported and skipped.
pub fn build_records(rows: &[RawRow]) -> BuildOutcome {
    let mut outcome = BuildOutcome::default();

    for raw in rows {
        if raw.is_blank() {
            debug!(row = raw.row, "skipping blank row");
            continue;
        }

        match build_record(raw) {
            Ok(record) => outcome.records.push(record),
            Err(error) => {
                let issue = RowIssue {
                    row: raw.row,
                    kpi_name: raw
                        .kpi_name
                        .as_deref()
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(str::to_string),
                    error,
                };
                debug!(row = issue.row, error = %issue.error, "rejected KPI row");
                outcome.issues.push(issue);
            }
        }
    }

    outcome
}

fn required_text<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, RowError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(RowError::MissingField(field)),
    }
}

fn parse_number(value: Option<&str>, field: &'static str) -> Result<f64, RowError> {
    let text = required_text(value, field)?;
    let number: f64 = text.parse().map_err(|_| RowError::NotNumeric {
        field,
        value: text.to_string(),
    })?;
    if !number.is_finite() {
        return Err(RowError::NotFinite { field });
    }
    Ok(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;

    fn raw(row: usize, cells: [&str; 5]) -> RawRow {
        let cell = |text: &str| (!text.is_empty()).then(|| text.to_string());
        RawRow {
            row,
            campaign_type: cell(cells[0]),
            kpi_name: cell(cells[1]),
            benchmark: cell(cells[2]),
            actual: cell(cells[3]),
            direction: cell(cells[4]),
        }
    }

    #[test]
    fn builds_records_in_input_order() {
        let rows = vec![
            raw(2, ["Events", "Attendance", "500", "520", "HigherIsBetter"]),
            raw(3, ["Digital/Search", "CPC", "2.5", "2.6", "LowerIsBetter"]),
            raw(4, ["Social", "Engagement Rate", "4", "3", "HigherIsBetter"]),
        ];
        let outcome = build_records(&rows);
        assert!(outcome.issues.is_empty());
        let names: Vec<&str> = outcome.records.iter().map(|r| r.kpi_name()).collect();
        assert_eq!(names, vec!["Attendance", "CPC", "Engagement Rate"]);
        let statuses: Vec<Status> = outcome.records.iter().map(|r| r.status()).collect();
        assert_eq!(statuses, vec![Status::Green, Status::Yellow, Status::Red]);
    }

    #[test]
    fn trims_text_and_numbers() {
        let record = build_record(&raw(
            2,
            ["  Influencer ", " Reach ", " 1000 ", "900.5", " HigherIsBetter"],
        ))
        .unwrap();
        assert_eq!(record.campaign_type(), "Influencer");
        assert_eq!(record.kpi_name(), "Reach");
        assert_eq!(record.benchmark(), 1000.0);
        assert_eq!(record.actual(), 900.5);
    }

    #[test]
    fn reports_bad_rows_and_keeps_good_ones() {
        let rows = vec![
            raw(2, ["Events", "Leads", "100", "abc", "HigherIsBetter"]),
            raw(3, ["Events", "Signups", "100", "100", "Sideways"]),
            raw(4, ["", "", "", "", ""]),
            raw(5, ["Events", "Cost per Lead", "0", "12", "LowerIsBetter"]),
            raw(6, ["Events", "", "10", "12", "HigherIsBetter"]),
            raw(7, ["Commercial", "Impressions", "1e6", "1.2e6", "HigherIsBetter"]),
        ];
        let outcome = build_records(&rows);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].kpi_name(), "Impressions");

        let errors: Vec<(usize, RowError)> = outcome
            .issues
            .iter()
            .map(|issue| (issue.row, issue.error.clone()))
            .collect();
        assert_eq!(
            errors,
            vec![
                (
                    2,
                    RowError::NotNumeric {
                        field: ACTUAL,
                        value: "abc".to_string()
                    }
                ),
                (3, RowError::InvalidDirection("Sideways".to_string())),
                (5, RowError::NonPositiveBenchmark(0.0)),
                (6, RowError::MissingField(KPI_NAME)),
            ]
        );
        assert_eq!(outcome.issues[0].kpi_name.as_deref(), Some("Leads"));
        assert_eq!(outcome.issues[3].kpi_name, None);
    }

    #[test]
    fn rejects_nan_and_infinity_text() {
        assert_eq!(
            build_record(&raw(2, ["Social", "CTR", "NaN", "1", "HigherIsBetter"])),
            Err(RowError::NotFinite { field: BENCHMARK })
        );
        assert_eq!(
            build_record(&raw(2, ["Social", "CTR", "1", "inf", "HigherIsBetter"])),
            Err(RowError::NotFinite { field: ACTUAL })
        );
    }

    #[test]
    fn missing_direction_is_reported_not_defaulted() {
        assert_eq!(
            build_record(&raw(2, ["Social", "CTR", "1", "1", ""])),
            Err(RowError::MissingField(DIRECTION))
        );
    }

    #[test]
    fn strict_mode_returns_first_issue() {
        let rows = vec![
            raw(2, ["Events", "Leads", "100", "120", "HigherIsBetter"]),
            raw(3, ["Events", "Signups", "x", "100", "HigherIsBetter"]),
            raw(4, ["Events", "Spend", "100", "100", "Down"]),
        ];
        let issue = build_records(&rows).into_strict().unwrap_err();
        assert_eq!(issue.row, 3);

        let ok = build_records(&rows[..1]).into_strict().unwrap();
        assert_eq!(ok.len(), 1);
    }
}
