//! Summary figures over the completion history of one item.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::models::{ConformityResult, HistoryEntry};
use super::periodicity::Cadence;
use crate::shared::constants::TREND_LENGTH;

/// Mean delay above `expected × DELAY_TOLERANCE` raises an alert
const DELAY_TOLERANCE: f64 = 1.5;
/// Conformity rate (percent) under which an alert is raised
const LOW_CONFORMITY_RATE: f64 = 70.0;
/// Conformity alerts need more than this many controls
const LOW_CONFORMITY_MIN_TOTAL: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryAlert {
    /// Controls are spaced further apart than the periodicity allows
    DelayTooLong {
        mean_delay_days: f64,
        expected_days: u32,
    },
    LowConformity { rate: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistoryStats {
    pub total: usize,
    pub conforming: usize,
    pub non_conforming: usize,
    /// Percentage of conforming controls, 0 without history
    pub conformity_rate: f64,
    /// Mean number of days between consecutive controls
    pub mean_delay_days: f64,
    pub cadence: Cadence,
    pub alerts: Vec<HistoryAlert>,
    /// Results of the most recent controls, oldest first
    pub trend: Vec<ConformityResult>,
}

/// Compute statistics for `history`, in any order.
pub fn compute(history: &[HistoryEntry], cadence: Cadence) -> HistoryStats {
    let mut entries: Vec<&HistoryEntry> = history.iter().collect();
    // newest first
    entries.sort_by(|a, b| {
        b.completion_date
            .cmp(&a.completion_date)
            .then(b.created_at.cmp(&a.created_at))
    });

    let total = entries.len();
    let conforming = entries
        .iter()
        .filter(|e| e.result == ConformityResult::Conforme)
        .count();
    let non_conforming = total - conforming;

    let conformity_rate = if total > 0 {
        conforming as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    let mean_delay_days = match (entries.first(), entries.last()) {
        (Some(newest), Some(oldest)) if total > 1 => {
            let span = (newest.completion_date - oldest.completion_date).num_days();
            span as f64 / (total - 1) as f64
        }
        _ => 0.0,
    };

    let mut alerts = Vec::new();
    let expected_days = cadence.nominal_days();
    if mean_delay_days > f64::from(expected_days) * DELAY_TOLERANCE {
        alerts.push(HistoryAlert::DelayTooLong {
            mean_delay_days,
            expected_days,
        });
    }
    if conformity_rate < LOW_CONFORMITY_RATE && total > LOW_CONFORMITY_MIN_TOTAL {
        alerts.push(HistoryAlert::LowConformity {
            rate: conformity_rate,
        });
    }

    let trend = entries
        .iter()
        .take(TREND_LENGTH)
        .rev()
        .map(|e| e.result)
        .collect();

    HistoryStats {
        total,
        conforming,
        non_conforming,
        conformity_rate,
        mean_delay_days,
        cadence,
        alerts,
        trend,
    }
}
