//! Dashboard analytics: summary cards and a daily series for a date range.

use std::sync::Arc;

use affiliate_api::{ConsoleApi, DashboardData, DashboardSummary, DateRange};
use affiliate_core::ConsoleResult;
use chrono::NaiveDate;
use tracing::info;

use crate::controller::surface_failure;
use crate::notifications::ToastCenter;
use crate::session::Session;

pub const DEFAULT_RANGE_DAYS: i64 = 7;

/// Conversions per click, as a percentage. Zero when there were no clicks.
pub fn conversion_rate(summary: &DashboardSummary) -> f64 {
    if summary.clicks == 0 {
        return 0.0;
    }
    summary.conversions as f64 / summary.clicks as f64 * 100.0
}

pub fn profit(summary: &DashboardSummary) -> f64 {
    summary.revenue - summary.payout
}

pub struct DashboardController<A> {
    session: Arc<Session<A>>,
    toasts: Arc<ToastCenter>,
    range: DateRange,
    loading: bool,
    error: Option<String>,
    data: Option<DashboardData>,
}

impl<A: ConsoleApi> DashboardController<A> {
    /// Starts on the last seven days ending `today`.
    pub fn new(session: Arc<Session<A>>, toasts: Arc<ToastCenter>, today: NaiveDate) -> Self {
        Self {
            session,
            toasts,
            range: DateRange::last_days(today, DEFAULT_RANGE_DAYS),
            loading: false,
            error: None,
            data: None,
        }
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn data(&self) -> Option<&DashboardData> {
        self.data.as_ref()
    }

    pub async fn load(&mut self, range: DateRange) -> ConsoleResult<()> {
        self.range = range;
        self.loading = true;
        self.error = None;
        let result = self.session.api().dashboard(&range).await;
        self.loading = false;
        match result {
            Ok(data) => {
                info!(
                    from = %range.from,
                    to = %range.to,
                    points = data.series.len(),
                    "Dashboard loaded"
                );
                self.data = Some(data);
                Ok(())
            }
            Err(e) => {
                let fallback = "Failed to load dashboard data";
                self.error = Some(e.user_message(fallback));
                Err(surface_failure(&self.session, &self.toasts, e, fallback))
            }
        }
    }

    /// Re-issue the last range.
    pub async fn retry(&mut self) -> ConsoleResult<()> {
        self.load(self.range).await
    }
}
