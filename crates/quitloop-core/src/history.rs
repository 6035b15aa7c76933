//! Summary of the local urge log.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::EventLogEntry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCount {
    pub action: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogSummary {
    pub total: usize,
    /// Entries that carry an intensity.
    pub rated: usize,
    pub average_intensity: Option<f64>,
    pub first_at: Option<DateTime<Utc>>,
    pub last_at: Option<DateTime<Utc>>,
    /// Most used actions first; ties by name.
    pub top_actions: Vec<ActionCount>,
}

impl LogSummary {
    pub fn from_entries(entries: &[EventLogEntry]) -> Self {
        if entries.is_empty() {
            return Self::default();
        }

        let intensities: Vec<i64> = entries
            .iter()
            .filter_map(|e| e.intensity.map(i64::from))
            .collect();
        let average_intensity = (!intensities.is_empty())
            .then(|| intensities.iter().sum::<i64>() as f64 / intensities.len() as f64);

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for entry in entries {
            let action = entry.action.trim().to_lowercase();
            if !action.is_empty() {
                *counts.entry(action).or_default() += 1;
            }
        }
        let mut top_actions: Vec<ActionCount> = counts
            .into_iter()
            .map(|(action, count)| ActionCount { action, count })
            .collect();
        top_actions.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.action.cmp(&b.action)));

        Self {
            total: entries.len(),
            rated: intensities.len(),
            average_intensity,
            first_at: entries.iter().map(|e| e.timestamp).min(),
            last_at: entries.iter().map(|e| e.timestamp).max(),
            top_actions,
        }
    }
}
