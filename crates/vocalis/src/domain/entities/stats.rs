//! CallStats - Aggregate view over the call population

use serde::{Deserialize, Serialize};

/// Summary statistics over all recorded calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallStats {
    pub total_calls: i64,
    pub active_calls: i64,
    pub completed_calls: i64,
    /// Mean duration over completed calls, rounded to the nearest whole
    /// second; 0 when no call has completed.
    pub average_duration: i64,
}

impl CallStats {
    /// Assemble stats from store aggregates.
    ///
    /// `average` is the raw mean over completed calls, `None` when there
    /// are none. The published value is always a whole number of seconds.
    pub fn from_parts(
        total_calls: i64,
        active_calls: i64,
        completed_calls: i64,
        average: Option<f64>,
    ) -> Self {
        Self {
            total_calls,
            active_calls,
            completed_calls,
            average_duration: average.map(|avg| avg.round() as i64).unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_of_known_durations() {
        // completed durations [10, 20, 30] -> mean 20
        let stats = CallStats::from_parts(5, 2, 3, Some(20.0));
        assert_eq!(stats.average_duration, 20);
    }

    #[test]
    fn test_no_completed_calls_yields_zero() {
        let stats = CallStats::from_parts(2, 2, 0, None);
        assert_eq!(stats.average_duration, 0);
    }

    #[test]
    fn test_average_rounds_to_nearest_second() {
        assert_eq!(CallStats::from_parts(3, 0, 3, Some(10.5)).average_duration, 11);
        assert_eq!(CallStats::from_parts(3, 0, 3, Some(10.4)).average_duration, 10);
    }
}
