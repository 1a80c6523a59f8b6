//! Request/response bodies that are not entity records.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Sparse filter object sent to list endpoints.
pub type Filter = serde_json::Map<String, serde_json::Value>;

// ─── Auth ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

// ─── Column preferences ────────────────────────────────────────────────────

/// Visible column keys persisted per user and per form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnPreference {
    pub form_name: String,
    #[serde(default)]
    pub columns: Vec<String>,
}

// ─── Dashboard ─────────────────────────────────────────────────────────────

/// Inclusive date range for dashboard analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        if from <= to {
            Self { from, to }
        } else {
            Self { from: to, to: from }
        }
    }

    /// The `days` days ending on `today`, inclusive.
    pub fn last_days(today: NaiveDate, days: i64) -> Self {
        Self::new(today - Duration::days(days.max(1) - 1), today)
    }

    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub conversions: u64,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub payout: f64,
    #[serde(default)]
    pub active_campaigns: u64,
    #[serde(default)]
    pub active_publishers: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub conversions: u64,
    #[serde(default)]
    pub revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    #[serde(default)]
    pub summary: DashboardSummary,
    #[serde(default)]
    pub series: Vec<TimeSeriesPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_date_range_normalizes_order() {
        let range = DateRange::new(date("2024-03-10"), date("2024-03-01"));
        assert_eq!(range.from, date("2024-03-01"));
        assert_eq!(range.days(), 10);
    }

    #[test]
    fn test_last_days_is_inclusive() {
        let range = DateRange::last_days(date("2024-03-07"), 7);
        assert_eq!(range.from, date("2024-03-01"));
        assert_eq!(range.days(), 7);
    }

    #[test]
    fn test_preference_wire_format() {
        let pref = ColumnPreference {
            form_name: "campaignList".into(),
            columns: vec!["id".into(), "title".into()],
        };
        let json = serde_json::to_value(&pref).unwrap();
        assert_eq!(json["formName"], "campaignList");
        assert_eq!(json["columns"][1], "title");
    }
}
