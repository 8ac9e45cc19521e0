//! Per-link click breakdowns for the dashboard charts

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::analytics::UNKNOWN;
use crate::models::ClickEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionCount {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyClicks {
    pub date: NaiveDate,
    pub clicks: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub link_id: i64,
    pub total_clicks: u64,
    pub devices: Vec<DimensionCount>,
    pub countries: Vec<DimensionCount>,
    pub clicks_by_day: Vec<DailyClicks>,
}

impl AnalyticsSummary {
    pub fn from_events(link_id: i64, events: &[ClickEvent]) -> Self {
        let devices = count_by(events, |e| e.device.as_deref());
        let countries = count_by(events, |e| e.country.as_deref());

        let mut days: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for event in events {
            *days.entry(event.timestamp.date_naive()).or_default() += 1;
        }

        Self {
            link_id,
            total_clicks: events.len() as u64,
            devices,
            countries,
            clicks_by_day: days
                .into_iter()
                .map(|(date, clicks)| DailyClicks { date, clicks })
                .collect(),
        }
    }
}

/// Group by a textual dimension, most frequent first, ties by name
fn count_by<F>(events: &[ClickEvent], dimension: F) -> Vec<DimensionCount>
where
    F: Fn(&ClickEvent) -> Option<&str>,
{
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for event in events {
        let key = dimension(event).filter(|s| !s.is_empty()).unwrap_or(UNKNOWN);
        *counts.entry(key).or_default() += 1;
    }

    let mut result: Vec<DimensionCount> = counts
        .into_iter()
        .map(|(name, count)| DimensionCount {
            name: name.to_string(),
            count,
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    result
}
