use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::RowError;
use crate::status;

pub const CAMPAIGN_TYPE: &str = "Campaign Type";
pub const KPI_NAME: &str = "KPI Name";
pub const BENCHMARK: &str = "Benchmark";
pub const ACTUAL: &str = "Actual";
pub const DIRECTION: &str = "Direction";

/// Column headers every input table must carry, in display order.
pub const REQUIRED_COLUMNS: [&str; 5] = [CAMPAIGN_TYPE, KPI_NAME, BENCHMARK, ACTUAL, DIRECTION];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::HigherIsBetter => "HigherIsBetter",
            Direction::LowerIsBetter => "LowerIsBetter",
        }
    }
}

impl FromStr for Direction {
    type Err = RowError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "HigherIsBetter" => Ok(Direction::HigherIsBetter),
            "LowerIsBetter" => Ok(Direction::LowerIsBetter),
            other => Err(RowError::InvalidDirection(other.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    Green,
    Yellow,
    Red,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Green => "Green",
            Status::Yellow => "Yellow",
            Status::Red => "Red",
        }
    }

    /// Fill colour used for the status cell in the deck (RGB hex).
    pub fn color_hex(&self) -> &'static str {
        match self {
            Status::Green => "228B22",
            Status::Yellow => "FFA500",
            Status::Red => "DC143C",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated KPI with its derived status.
///
/// Fields are read-only so the status can never drift from the inputs it was
/// classified from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiRecord {
    campaign_type: String,
    kpi_name: String,
    benchmark: f64,
    actual: f64,
    direction: Direction,
    status: Status,
}

impl KpiRecord {
    pub fn new(
        campaign_type: impl Into<String>,
        kpi_name: impl Into<String>,
        benchmark: f64,
        actual: f64,
        direction: Direction,
    ) -> Result<Self, RowError> {
        let status = status::classify(benchmark, actual, direction)?;
        Ok(Self {
            campaign_type: campaign_type.into(),
            kpi_name: kpi_name.into(),
            benchmark,
            actual,
            direction,
            status,
        })
    }

    pub fn campaign_type(&self) -> &str {
        &self.campaign_type
    }

    pub fn kpi_name(&self) -> &str {
        &self.kpi_name
    }

    pub fn benchmark(&self) -> f64 {
        self.benchmark
    }

    pub fn actual(&self) -> f64 {
        self.actual
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn status(&self) -> Status {
        self.status
    }
}

/// One untyped input row, either a spreadsheet line or a form submission.
///
/// `row` is the 1-based spreadsheet row (the header is row 1) or the
/// submission number for manual entry. `None` means the cell was empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub row: usize,
    pub campaign_type: Option<String>,
    pub kpi_name: Option<String>,
    pub benchmark: Option<String>,
    pub actual: Option<String>,
    pub direction: Option<String>,
}

impl RawRow {
    pub fn is_blank(&self) -> bool {
        [
            &self.campaign_type,
            &self.kpi_name,
            &self.benchmark,
            &self.actual,
            &self.direction,
        ]
        .iter()
        .all(|cell| cell.as_deref().map_or(true, |text| text.trim().is_empty()))
    }
}

/// A row that was rejected, with enough context to point the user at it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowIssue {
    pub row: usize,
    pub kpi_name: Option<String>,
    #[serde(rename = "message", serialize_with = "serialize_display")]
    pub error: RowError,
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kpi_name {
            Some(name) => write!(f, "row {} ({}): {}", self.row, name, self.error),
            None => write!(f, "row {}: {}", self.row, self.error),
        }
    }
}

fn serialize_display<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: fmt::Display,
{
    serializer.collect_str(value)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub green: usize,
    pub yellow: usize,
    pub red: usize,
}

impl StatusCounts {
    pub fn tally(records: &[KpiRecord]) -> Self {
        let mut counts = Self::default();
        for record in records {
            match record.status() {
                Status::Green => counts.green += 1,
                Status::Yellow => counts.yellow += 1,
                Status::Red => counts.red += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.green + self.yellow + self.red
    }
}

impl fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Green: {} · Yellow: {} · Red: {}",
            self.green, self.yellow, self.red
        )
    }
}
