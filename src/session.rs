use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::builder;
use crate::config::Settings;
use crate::deck::{self, DeckInput};
use crate::error::DeckError;
use crate::models::{KpiRecord, RawRow, RowIssue, StatusCounts};

/// Everything one run of the tool works on: the settings it was started
/// with, the records accepted so far and the rows that were rejected.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    settings: Settings,
    records: Vec<KpiRecord>,
    issues: Vec<RowIssue>,
    submissions: usize,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        let id = Uuid::new_v4();
        debug!(session = %id, company = settings.company_name(), "session started");
        Self {
            id,
            settings,
            records: Vec::new(),
            issues: Vec::new(),
            submissions: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn company_name(&self) -> &str {
        self.settings.company_name()
    }

    pub fn records(&self) -> &[KpiRecord] {
        &self.records
    }

    pub fn issues(&self) -> &[RowIssue] {
        &self.issues
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts::tally(&self.records)
    }

    /// Add a batch of table rows. Valid rows are kept in order; the issues
    /// raised by this batch are returned.
    pub fn ingest(&mut self, rows: &[RawRow]) -> &[RowIssue] {
        let outcome = builder::build_records(rows);
        info!(
            session = %self.id,
            accepted = outcome.records.len(),
            rejected = outcome.issues.len(),
            "ingested rows"
        );
        let first_new = self.issues.len();
        self.records.extend(outcome.records);
        self.issues.extend(outcome.issues);
        &self.issues[first_new..]
    }

    /// Add a batch only if every row is valid; otherwise nothing is kept and
    /// the first rejected row is returned.
    pub fn ingest_strict(&mut self, rows: &[RawRow]) -> Result<usize, RowIssue> {
        let records = builder::build_records(rows).into_strict()?;
        info!(session = %self.id, accepted = records.len(), "ingested rows (strict)");
        let accepted = records.len();
        self.records.extend(records);
        Ok(accepted)
    }

    /// Validate one form submission. A rejected submission is handed back
    /// to the caller and not recorded as a session issue.
    pub fn add_manual(&mut self, mut raw: RawRow) -> Result<&KpiRecord, RowIssue> {
        self.submissions += 1;
        raw.row = self.submissions;

        match builder::build_record(&raw) {
            Ok(record) => {
                debug!(session = %self.id, kpi = record.kpi_name(), status = %record.status(), "added KPI");
                self.records.push(record);
                Ok(&self.records[self.records.len() - 1])
            }
            Err(error) => Err(RowIssue {
                row: raw.row,
                kpi_name: raw
                    .kpi_name
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty()),
                error,
            }),
        }
    }

    pub fn clear(&mut self) {
        debug!(session = %self.id, dropped = self.records.len(), "cleared session");
        self.records.clear();
        self.issues.clear();
        self.submissions = 0;
    }

    pub fn deck_file_name(&self) -> String {
        deck::file_name(self.company_name())
    }

    pub fn render_deck(&self, generated_at: DateTime<Utc>) -> Result<Vec<u8>, DeckError> {
        deck::render(&DeckInput {
            company_name: self.company_name(),
            records: &self.records,
            rows_per_slide: self.settings.rows_per_slide(),
            generated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RowError;
    use crate::models::Status;

    fn raw(row: usize, kpi: &str, benchmark: &str, actual: &str, direction: &str) -> RawRow {
        RawRow {
            row,
            campaign_type: Some("Social".to_string()),
            kpi_name: Some(kpi.to_string()),
            benchmark: Some(benchmark.to_string()),
            actual: Some(actual.to_string()),
            direction: Some(direction.to_string()),
        }
    }

    #[test]
    fn ingest_appends_and_reports_batch_issues() {
        let mut session = Session::new(Settings::default());
        let issues = session.ingest(&[
            raw(2, "Reach", "100", "100", "HigherIsBetter"),
            raw(3, "CPM", "ten", "9", "LowerIsBetter"),
        ]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].row, 3);

        let issues = session.ingest(&[raw(2, "CTR", "2", "1.5", "HigherIsBetter")]);
        assert!(issues.is_empty());
        assert_eq!(session.records().len(), 2);
        assert_eq!(session.issues().len(), 1);
        assert_eq!(
            session.counts(),
            StatusCounts {
                green: 1,
                yellow: 0,
                red: 1
            }
        );
    }

    #[test]
    fn strict_ingest_keeps_nothing_on_failure() {
        let mut session = Session::new(Settings::default());
        let issue = session
            .ingest_strict(&[
                raw(2, "Reach", "100", "120", "HigherIsBetter"),
                raw(3, "CPM", "5", "6", "Flat"),
            ])
            .unwrap_err();
        assert_eq!(issue.row, 3);
        assert!(session.records().is_empty());

        let accepted = session
            .ingest_strict(&[raw(2, "Reach", "100", "120", "HigherIsBetter")])
            .unwrap();
        assert_eq!(accepted, 1);
    }

    #[test]
    fn manual_entries_are_numbered_per_submission() {
        let mut session = Session::new(Settings::default());
        let added = session
            .add_manual(raw(0, "Followers", "1000", "950", "HigherIsBetter"))
            .unwrap();
        assert_eq!(added.status(), Status::Yellow);

        let rejected = session
            .add_manual(raw(0, " Shares ", "10", "12", "Upward"))
            .unwrap_err();
        assert_eq!(rejected.row, 2);
        assert_eq!(rejected.kpi_name.as_deref(), Some("Shares"));
        assert_eq!(
            rejected.error,
            RowError::InvalidDirection("Upward".to_string())
        );
        assert!(session.issues().is_empty());
        assert_eq!(session.records().len(), 1);
    }

    #[test]
    fn clear_drops_everything() {
        let mut session = Session::new(Settings::default());
        session.ingest(&[
            raw(2, "Reach", "100", "120", "HigherIsBetter"),
            raw(3, "Bad", "", "1", "HigherIsBetter"),
        ]);
        session.clear();
        assert!(session.records().is_empty());
        assert!(session.issues().is_empty());
        assert!(matches!(
            session.render_deck(Utc::now()),
            Err(DeckError::Empty)
        ));
    }

    #[test]
    fn clear_restarts_submission_numbering() {
        let mut session = Session::new(Settings::default());
        session
            .add_manual(raw(0, "Reach", "100", "120", "HigherIsBetter"))
            .unwrap();
        session
            .add_manual(raw(0, "CTR", "2", "3", "HigherIsBetter"))
            .unwrap();
        session.clear();

        let rejected = session
            .add_manual(raw(0, "CPM", "x", "3", "LowerIsBetter"))
            .unwrap_err();
        assert_eq!(rejected.row, 1);
    }

    #[test]
    fn deck_uses_session_branding() {
        let settings = Settings::default().with_company_name(Some("North Wind".to_string()));
        let mut session = Session::new(settings);
        session.ingest(&[raw(2, "Reach", "100", "120", "HigherIsBetter")]);

        assert_eq!(
            session.deck_file_name(),
            "Marketing_KPI_Dashboard_North_Wind.pptx"
        );
        let bytes = session.render_deck(Utc::now()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn sessions_get_distinct_ids() {
        let a = Session::new(Settings::default());
        let b = Session::new(Settings::default());
        assert_ne!(a.id(), b.id());
    }
}
