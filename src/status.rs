use crate::error::RowError;
use crate::models::{Direction, Status, ACTUAL, BENCHMARK};

/// HigherIsBetter: actual at or above this share of the benchmark is Yellow.
pub const YELLOW_FLOOR_RATIO: f64 = 0.90;

/// LowerIsBetter: overshooting the benchmark by at most this share is Yellow.
pub const YELLOW_OVERSHOOT_LIMIT: f64 = 0.10;

pub fn classify(benchmark: f64, actual: f64, direction: Direction) -> Result<Status, RowError> {
    if !benchmark.is_finite() {
        return Err(RowError::NotFinite { field: BENCHMARK });
    }
    if !actual.is_finite() {
        return Err(RowError::NotFinite { field: ACTUAL });
    }
    if benchmark <= 0.0 {
        return Err(RowError::NonPositiveBenchmark(benchmark));
    }

    let status = match direction {
        Direction::HigherIsBetter => {
            if actual >= benchmark {
                Status::Green
            } else if actual >= benchmark * YELLOW_FLOOR_RATIO {
                Status::Yellow
            } else {
                Status::Red
            }
        }
        Direction::LowerIsBetter => {
            if actual <= benchmark {
                Status::Green
            } else if actual <= benchmark * (1.0 + YELLOW_OVERSHOOT_LIMIT) {
                Status::Yellow
            } else {
                Status::Red
            }
        }
    };

    Ok(status)
}
