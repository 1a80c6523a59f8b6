//! In-memory `ConsoleApi` backed by DashMap.
//!
//! Mirrors the backend's observable behaviour closely enough for demo mode
//! and tests: AND-combined list filters, partial PATCH-style status replies,
//! unsigned JWT-shaped tokens, and 401s for missing or expired tokens.

use std::collections::VecDeque;

use affiliate_core::types::{
    Advertiser, AdvertiserRef, Campaign, CampaignStatus, Money, PartnerStatus, Publisher, User,
    UserStatus, Visibility,
};
use affiliate_core::{ConsoleError, ConsoleResult, Entity, EntityId, EntityKind};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use tracing::info;

use crate::api::ConsoleApi;
use crate::models::{
    ColumnPreference, Credentials, DashboardData, DashboardSummary, DateRange, Filter,
    TimeSeriesPoint,
};
use crate::token::Claims;

/// One-shot failure to inject into the next backend call.
#[derive(Debug, Clone)]
pub enum Failure {
    Unauthorized,
    Timeout,
    Server { status: u16, message: Option<String> },
    Rejected { message: Option<String> },
}

impl Failure {
    fn into_error(self) -> ConsoleError {
        match self {
            Failure::Unauthorized => ConsoleError::Unauthorized,
            Failure::Timeout => ConsoleError::Timeout,
            Failure::Server { status, message } => ConsoleError::Http { status, message },
            Failure::Rejected { message } => ConsoleError::Rejected { message },
        }
    }
}

struct Account {
    password: String,
    claims: Claims,
}

pub struct MemoryApi {
    records: DashMap<EntityKind, Vec<Value>>,
    preferences: DashMap<String, Vec<String>>,
    accounts: DashMap<String, Account>,
    token: RwLock<Option<String>>,
    failures: Mutex<VecDeque<Failure>>,
    requests: Mutex<Vec<String>>,
    session_ttl: Duration,
}

impl Default for MemoryApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryApi {
    /// Empty backend with no accounts or records.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            preferences: DashMap::new(),
            accounts: DashMap::new(),
            token: RwLock::new(None),
            failures: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            session_ttl: Duration::hours(24),
        }
    }

    /// Backend seeded with demo accounts and a handful of records per entity.
    pub fn with_demo_data() -> Self {
        let api = Self::new();
        api.seed_demo_data();
        api
    }

    pub fn add_account(&self, password: &str, claims: Claims) {
        self.accounts.insert(
            claims.email.to_ascii_lowercase(),
            Account {
                password: password.to_string(),
                claims,
            },
        );
    }

    pub fn insert<E: Entity>(&self, record: &E) {
        let value = serde_json::to_value(record).unwrap_or(Value::Null);
        self.records.entry(E::KIND).or_default().push(value);
    }

    /// Current server-side rows for `E`, in storage order.
    pub fn records<E: Entity>(&self) -> Vec<E> {
        self.records
            .get(&E::KIND)
            .map(|rows| {
                rows.iter()
                    .filter_map(|row| serde_json::from_value(row.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn preference(&self, form_name: &str) -> Option<Vec<String>> {
        self.preferences.get(form_name).map(|p| p.value().clone())
    }

    /// Make the next call fail with `failure`. Failures queue in order.
    pub fn fail_next(&self, failure: Failure) {
        self.failures.lock().push_back(failure);
    }

    /// Log of calls received, e.g. `"list campaign"`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// Issue a token for `email` without a password check.
    pub fn issue_token(&self, email: &str) -> Option<String> {
        self.accounts.get(&email.to_ascii_lowercase()).map(|account| {
            let mut claims = account.claims.clone();
            claims.exp = (Utc::now() + self.session_ttl).timestamp();
            claims.encode_unsigned()
        })
    }

    fn record_request(&self, call: String) {
        self.requests.lock().push(call);
    }

    fn take_failure(&self) -> ConsoleResult<()> {
        match self.failures.lock().pop_front() {
            Some(failure) => Err(failure.into_error()),
            None => Ok(()),
        }
    }

    fn authorize(&self, call: String) -> ConsoleResult<()> {
        self.record_request(call);
        self.take_failure()?;
        let token = self.token.read().clone();
        let claims = token
            .as_deref()
            .map(Claims::decode)
            .transpose()
            .map_err(|_| ConsoleError::Unauthorized)?
            .ok_or(ConsoleError::Unauthorized)?;
        if claims.is_expired_at(Utc::now()) {
            return Err(ConsoleError::Unauthorized);
        }
        Ok(())
    }

    fn next_id(&self, kind: EntityKind) -> EntityId {
        let max = self
            .records
            .get(&kind)
            .map(|rows| rows.iter().filter_map(|r| r["id"].as_i64()).max().unwrap_or(0))
            .unwrap_or(0);
        EntityId::Number(max + 1)
    }

    fn seed_demo_data(&self) {
        let now = Utc::now();
        let exp = (now + self.session_ttl).timestamp();

        self.add_account(
            "admin",
            Claims {
                id: EntityId::from(1),
                name: "Platform Admin".into(),
                email: "admin@example.com".into(),
                role: "admin".into(),
                permissions: vec![
                    "VIEW_DASHBOARD".into(),
                    "VIEW_CAMPAIGNS".into(),
                    "VIEW_PUBLISHERS".into(),
                    "VIEW_ADVERTISERS".into(),
                    "MANAGE_USERS".into(),
                    "VIEW_REPORTS".into(),
                    "MANAGE_SETTINGS".into(),
                ],
                exp,
            },
        );
        self.add_account(
            "manager",
            Claims {
                id: EntityId::from(2),
                name: "Account Manager".into(),
                email: "manager@example.com".into(),
                role: "manager".into(),
                permissions: vec![
                    "VIEW_DASHBOARD".into(),
                    "VIEW_CAMPAIGNS".into(),
                    "VIEW_PUBLISHERS".into(),
                ],
                exp,
            },
        );

        let acme = AdvertiserRef {
            id: EntityId::from(10),
            name: "Acme Retail".into(),
        };
        let globex = AdvertiserRef {
            id: EntityId::from(11),
            name: "Globex Travel".into(),
        };
        let campaigns = [
            (1, "Spring Sale CPA", CampaignStatus::Active, &acme, "spring-sale", vec!["US", "CA"]),
            (2, "Travel Deals, Europe", CampaignStatus::Paused, &globex, "eu-travel", vec!["DE", "FR"]),
            (3, "App Install Android", CampaignStatus::Draft, &acme, "acme-app", vec!["IN"]),
        ];
        for (id, title, status, advertiser, slug, geo) in campaigns {
            self.insert(&Campaign {
                id: EntityId::from(id),
                title: title.into(),
                status,
                visibility: Visibility::Public,
                advertiser: Some(advertiser.clone()),
                category: vec!["retail".into()],
                geo: geo.into_iter().map(String::from).collect(),
                device: vec!["mobile".into(), "desktop".into()],
                operating_system: vec!["android".into(), "ios".into()],
                payout: Some(Money {
                    amount: 1.5 * id as f64,
                    currency: "USD".into(),
                }),
                revenue: Some(Money {
                    amount: 2.0 * id as f64,
                    currency: "USD".into(),
                }),
                tracking_slug: Some(slug.into()),
                tracking_url: Some(format!("https://trk.example.com/{slug}")),
                created_date: Some(now - Duration::days(30 - id)),
                start_date: Some(now - Duration::days(20)),
                expiry_date: Some(now + Duration::days(60)),
            });
        }

        for (id, name, status) in [
            (10, "Acme Retail", PartnerStatus::Active),
            (11, "Globex Travel", PartnerStatus::Active),
            (12, "Initech Finance", PartnerStatus::Pending),
        ] {
            self.insert(&Advertiser {
                id: EntityId::from(id),
                name: name.into(),
                email: format!("contact{id}@example.com"),
                company: Some(name.into()),
                website: Some(format!("https://{}.example.com", id)),
                country: Some("US".into()),
                status,
                created_date: Some(now - Duration::days(90)),
            });
        }

        for (id, name, status) in [
            (20, "CouponCorner", PartnerStatus::Active),
            (21, "DealHunter Media", PartnerStatus::Blocked),
        ] {
            self.insert(&Publisher {
                id: EntityId::from(id),
                name: name.into(),
                email: format!("pub{id}@example.com"),
                company: Some(name.into()),
                country: Some("GB".into()),
                status,
                manager: Some("Account Manager".into()),
                created_date: Some(now - Duration::days(45)),
            });
        }

        for (id, name, role) in [(1, "Platform Admin", "admin"), (2, "Account Manager", "manager")] {
            self.insert(&User {
                id: EntityId::from(id),
                name: name.into(),
                email: format!("{role}@example.com"),
                role: role.into(),
                status: UserStatus::Active,
                permissions: Vec::new(),
                created_date: Some(now - Duration::days(120)),
            });
        }

        info!("Memory backend seeded with demo data");
    }
}

/// Fields matched by substring; everything else must match exactly.
const TEXT_FIELDS: &[&str] = &["title", "name", "email", "company", "website", "trackingSlug"];

/// AND-combine every filter field against a stored row.
fn matches_filter(row: &Value, filter: &Filter) -> bool {
    filter.iter().all(|(key, wanted)| match (row.get(key), wanted) {
        (None, _) | (Some(Value::Null), _) => false,
        (Some(Value::String(have)), Value::String(want)) => {
            if TEXT_FIELDS.contains(&key.as_str()) {
                have.to_lowercase().contains(&want.to_lowercase())
            } else {
                have.eq_ignore_ascii_case(want)
            }
        }
        (Some(Value::Array(have)), Value::Array(want)) => want.iter().any(|w| have.contains(w)),
        (Some(Value::Array(have)), want) => have.contains(want),
        (Some(have), Value::Array(want)) => want.contains(have),
        (Some(Value::Object(obj)), want) => {
            obj.get("id").map_or(false, |id| id_eq(id, want))
                || obj.get("name").map_or(false, |name| name == want)
        }
        (Some(have), want) => id_eq(have, want),
    })
}

fn id_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x == y,
        (Value::String(s), other) | (other, Value::String(s)) => *s == other.to_string(),
        _ => a == b,
    }
}

fn row_has_id(row: &Value, id: &EntityId) -> bool {
    serde_json::from_value::<EntityId>(row["id"].clone()).map_or(false, |row_id| &row_id == id)
}

fn not_found(kind: EntityKind, id: &EntityId) -> ConsoleError {
    ConsoleError::Http {
        status: 404,
        message: Some(format!("{} {} not found", kind.singular(), id)),
    }
}

#[async_trait]
impl ConsoleApi for MemoryApi {
    fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    async fn login(&self, credentials: &Credentials) -> ConsoleResult<String> {
        self.record_request("login".to_string());
        self.take_failure()?;
        let account = self
            .accounts
            .get(&credentials.email.to_ascii_lowercase())
            .filter(|a| a.password == credentials.password)
            .ok_or_else(|| ConsoleError::Http {
                status: 400,
                message: Some("Invalid email or password".to_string()),
            })?;
        let mut claims = account.claims.clone();
        claims.exp = (Utc::now() + self.session_ttl).timestamp();
        Ok(claims.encode_unsigned())
    }

    async fn list<E: Entity>(&self, filter: &Filter) -> ConsoleResult<Vec<E>> {
        self.authorize(format!("list {}", E::KIND))?;
        let rows: Vec<Value> = self
            .records
            .get(&E::KIND)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches_filter(row, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        rows.into_iter()
            .map(|row| {
                serde_json::from_value(row)
                    .map_err(|e| ConsoleError::UnexpectedResponse(e.to_string()))
            })
            .collect()
    }

    async fn create<E: Entity>(&self, values: &Value) -> ConsoleResult<E> {
        self.authorize(format!("create {}", E::KIND))?;
        let mut row = values.as_object().cloned().ok_or_else(|| ConsoleError::Http {
            status: 422,
            message: Some("Request body must be an object".to_string()),
        })?;
        row.insert("id".into(), json!(self.next_id(E::KIND)));
        row.entry("createdDate").or_insert_with(|| json!(Utc::now()));
        let row = Value::Object(row);

        let record: E = serde_json::from_value(row.clone()).map_err(|e| ConsoleError::Http {
            status: 422,
            message: Some(format!("Invalid {}: {e}", E::KIND.singular())),
        })?;
        self.records.entry(E::KIND).or_default().insert(0, row);
        info!(entity = %E::KIND, id = %record.id(), "Record created");
        Ok(record)
    }

    async fn update<E: Entity>(&self, id: &EntityId, values: &Value) -> ConsoleResult<Value> {
        self.authorize(format!("update {} {}", E::KIND, id))?;
        let mut rows = self.records.entry(E::KIND).or_default();
        let row = rows
            .iter_mut()
            .find(|row| row_has_id(row, id))
            .ok_or_else(|| not_found(E::KIND, id))?;
        let patch = values.as_object().ok_or_else(|| ConsoleError::Http {
            status: 422,
            message: Some("Request body must be an object".to_string()),
        })?;

        // Validate against a copy so a rejected update leaves the row alone.
        let mut updated = row.clone();
        if let Some(target) = updated.as_object_mut() {
            for (key, value) in patch {
                if key != "id" {
                    target.insert(key.clone(), value.clone());
                }
            }
        }
        serde_json::from_value::<E>(updated.clone()).map_err(|e| ConsoleError::Http {
            status: 422,
            message: Some(format!("Invalid {}: {e}", E::KIND.singular())),
        })?;
        *row = updated.clone();
        info!(entity = %E::KIND, id = %id, "Record updated");
        Ok(updated)
    }

    async fn delete<E: Entity>(&self, id: &EntityId) -> ConsoleResult<()> {
        self.authorize(format!("delete {} {}", E::KIND, id))?;
        let mut rows = self.records.entry(E::KIND).or_default();
        let before = rows.len();
        rows.retain(|row| !row_has_id(row, id));
        if rows.len() == before {
            return Err(not_found(E::KIND, id));
        }
        info!(entity = %E::KIND, id = %id, "Record deleted");
        Ok(())
    }

    async fn set_status<E: Entity>(
        &self,
        id: &EntityId,
        status: E::Status,
    ) -> ConsoleResult<Value> {
        self.authorize(format!("status {} {}", E::KIND, id))?;
        let mut rows = self.records.entry(E::KIND).or_default();
        let row = rows
            .iter_mut()
            .find(|row| row_has_id(row, id))
            .ok_or_else(|| not_found(E::KIND, id))?;
        row["status"] = json!(status);
        // PATCH-style reply: only the fields that changed.
        Ok(json!({ "id": row["id"].clone(), "status": status }))
    }

    async fn save_preference(&self, preference: &ColumnPreference) -> ConsoleResult<()> {
        self.authorize(format!("save preference {}", preference.form_name))?;
        self.preferences
            .insert(preference.form_name.clone(), preference.columns.clone());
        Ok(())
    }

    async fn load_preference(&self, form_name: &str) -> ConsoleResult<Option<ColumnPreference>> {
        self.authorize(format!("load preference {form_name}"))?;
        Ok(self.preferences.get(form_name).map(|columns| ColumnPreference {
            form_name: form_name.to_string(),
            columns: columns.value().clone(),
        }))
    }

    async fn dashboard(&self, range: &DateRange) -> ConsoleResult<DashboardData> {
        self.authorize("dashboard".to_string())?;
        let campaigns = self.records::<Campaign>();
        let active = campaigns
            .iter()
            .filter(|c| c.status == CampaignStatus::Active)
            .count() as u64;
        let publishers = self
            .records::<Publisher>()
            .iter()
            .filter(|p| p.status == PartnerStatus::Active)
            .count() as u64;

        let series: Vec<TimeSeriesPoint> = range
            .from
            .iter_days()
            .take_while(|d| *d <= range.to)
            .enumerate()
            .map(|(i, date)| {
                let clicks = 100 + 10 * i as u64;
                let conversions = clicks / 20;
                TimeSeriesPoint {
                    date,
                    clicks,
                    conversions,
                    revenue: conversions as f64 * 4.0,
                }
            })
            .collect();

        let summary = DashboardSummary {
            clicks: series.iter().map(|p| p.clicks).sum(),
            conversions: series.iter().map(|p| p.conversions).sum(),
            revenue: series.iter().map(|p| p.revenue).sum(),
            payout: series.iter().map(|p| p.conversions as f64 * 2.5).sum(),
            active_campaigns: active,
            active_publishers: publishers,
        };
        Ok(DashboardData { summary, series })
    }
}
