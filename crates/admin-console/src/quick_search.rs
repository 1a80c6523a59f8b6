//! Client-side quick search over the loaded list, with input debouncing.

use std::time::Duration;

use affiliate_core::types::Campaign;
use tokio::time::Instant;

/// Records that quick search can match against.
pub trait QuickSearchable {
    /// Text fields matched by case-insensitive substring.
    fn haystack(&self) -> Vec<String>;
}

impl QuickSearchable for Campaign {
    fn haystack(&self) -> Vec<String> {
        let mut fields = vec![self.id.to_string(), self.title.clone()];
        if let Some(advertiser) = &self.advertiser {
            fields.push(advertiser.name.clone());
        }
        if let Some(slug) = &self.tracking_slug {
            fields.push(slug.clone());
        }
        fields
    }
}

/// Stable filter: keeps matching records in their original order.
/// A blank query keeps everything.
pub fn quick_filter<'a, E: QuickSearchable>(records: &'a [E], query: &str) -> Vec<&'a E> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|r| r.haystack().iter().any(|f| f.to_lowercase().contains(&needle)))
        .collect()
}

/// Debounced quick-search input.
///
/// Keystrokes go through `input`; the query only takes effect once no new
/// input has arrived for the debounce interval.
#[derive(Debug, Clone)]
pub struct QuickSearch {
    delay: Duration,
    applied: String,
    pending: Option<(String, Instant)>,
}

impl QuickSearch {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            applied: String::new(),
            pending: None,
        }
    }

    /// Record a keystroke; restarts the debounce interval.
    pub fn input(&mut self, query: impl Into<String>, at: Instant) {
        self.pending = Some((query.into(), at));
    }

    /// Apply the pending query if its interval has elapsed. Returns whether
    /// the applied query changed.
    pub fn apply_due(&mut self, now: Instant) -> bool {
        let due = matches!(
            &self.pending,
            Some((_, typed_at)) if now.duration_since(*typed_at) >= self.delay
        );
        if !due {
            return false;
        }
        match self.pending.take() {
            Some((query, _)) => {
                let changed = query != self.applied;
                self.applied = query;
                changed
            }
            None => false,
        }
    }

    /// Wait out the remaining interval, then apply.
    pub async fn settle(&mut self) -> bool {
        if let Some((_, typed_at)) = &self.pending {
            tokio::time::sleep_until(*typed_at + self.delay).await;
        }
        self.apply_due(Instant::now())
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn query(&self) -> &str {
        &self.applied
    }

    pub fn filter<'a, E: QuickSearchable>(&self, records: &'a [E]) -> Vec<&'a E> {
        quick_filter(records, &self.applied)
    }
}
