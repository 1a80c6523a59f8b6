//! List-screen controller shared by every entity page.
//!
//! Owns the column picker state and the last submitted search, and drives
//! the entity slice through the pending/fulfilled/rejected cycle for each
//! backend call. Every failure produces exactly one error toast; a 401 also
//! ends the session.

use std::marker::PhantomData;
use std::sync::Arc;

use affiliate_api::{ConsoleApi, Filter};
use affiliate_core::{ConsoleError, ConsoleResult, EntityId, EntityKind};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::columns::{visible_table_columns, ColumnDef, ColumnOption, ColumnVisibility};
use crate::export::{export_filename, to_csv, CsvExport};
use crate::notifications::ToastCenter;
use crate::preferences;
use crate::quick_search::{QuickSearch, QuickSearchable};
use crate::search::SearchFilter;
use crate::session::Session;
use crate::slice::{shallow_merge, SliceAction, SliceStatus, Thunk};
use crate::store::StoreEntity;

/// Sent values overlaid with whatever the server echoed back. The server
/// reply wins for keys present in both.
fn merge_patch(sent: &Value, returned: &Value) -> Value {
    let mut patch = sent.as_object().cloned().unwrap_or_default();
    if let Some(returned) = returned.as_object() {
        for (key, value) in returned {
            patch.insert(key.clone(), value.clone());
        }
    }
    Value::Object(patch)
}

pub struct EntityListController<E, A> {
    session: Arc<Session<A>>,
    toasts: Arc<ToastCenter>,
    registry: Vec<ColumnDef<E>>,
    visibility: ColumnVisibility,
    last_search: SearchFilter,
    _entity: PhantomData<E>,
}

impl<E: StoreEntity, A: ConsoleApi> EntityListController<E, A> {
    pub fn new(session: Arc<Session<A>>, toasts: Arc<ToastCenter>) -> Self {
        let registry = E::columns();
        let visibility = ColumnVisibility::from_registry(&registry);
        Self {
            session,
            toasts,
            registry,
            visibility,
            last_search: SearchFilter::default(),
            _entity: PhantomData,
        }
    }

    pub fn kind(&self) -> EntityKind {
        E::KIND
    }

    // ─── Reads ─────────────────────────────────────────────────────────

    /// Initial load with no filters.
    pub async fn mount(&mut self) -> ConsoleResult<()> {
        self.search(Filter::new()).await
    }

    /// Submit the advanced search form. The response replaces the list.
    pub async fn search(&mut self, form: Filter) -> ConsoleResult<()> {
        self.last_search = SearchFilter::from_form(form);
        self.fetch().await
    }

    /// Re-issue the last search.
    pub async fn refresh(&mut self) -> ConsoleResult<()> {
        self.fetch().await
    }

    async fn fetch(&self) -> ConsoleResult<()> {
        self.dispatch(SliceAction::Pending(Thunk::Fetch));
        debug!(entity = %E::KIND, filter = ?self.last_search.as_filter(), "Fetching list");
        match self.session.api().list::<E>(self.last_search.as_filter()).await {
            Ok(list) => {
                info!(entity = %E::KIND, count = list.len(), "List loaded");
                self.dispatch(SliceAction::FetchFulfilled(list));
                self.record(Thunk::Fetch, "ok");
                Ok(())
            }
            Err(e) => Err(self.fail(Thunk::Fetch, e)),
        }
    }

    pub fn records(&self) -> Vec<E> {
        E::slice(&self.session.store().read()).list().to_vec()
    }

    pub fn status(&self) -> SliceStatus {
        E::slice(&self.session.store().read()).status()
    }

    pub fn error(&self) -> Option<String> {
        E::slice(&self.session.store().read())
            .error()
            .map(str::to_string)
    }

    pub fn last_search(&self) -> &SearchFilter {
        &self.last_search
    }

    /// Loaded records narrowed by the quick-search box.
    pub fn quick_filtered(&self, search: &QuickSearch) -> Vec<E>
    where
        E: QuickSearchable,
    {
        let records = self.records();
        search.filter(&records).into_iter().cloned().collect()
    }

    // ─── Columns ───────────────────────────────────────────────────────

    pub fn visible_columns(&self) -> Vec<&ColumnDef<E>> {
        visible_table_columns(&self.registry, &self.visibility)
    }

    pub fn visibility(&self) -> &ColumnVisibility {
        &self.visibility
    }

    pub fn column_options(&self) -> Vec<ColumnOption> {
        self.registry.iter().map(ColumnDef::option).collect()
    }

    pub fn toggle_column(&mut self, key: &str, visible: bool) -> ConsoleResult<()> {
        self.visibility.toggle(key, visible)
    }

    pub fn select_all(&mut self) {
        self.visibility.select_all();
    }

    pub fn clear_all(&mut self) {
        self.visibility.clear_all();
    }

    /// Show exactly `keys`, rejecting any key the registry does not define.
    pub fn show_only<S: AsRef<str>>(&mut self, keys: &[S]) -> ConsoleResult<()> {
        if let Some(unknown) = keys
            .iter()
            .find(|k| !self.registry.iter().any(|c| c.key == k.as_ref()))
        {
            return Err(ConsoleError::UnknownColumn(unknown.as_ref().to_string()));
        }
        self.visibility.apply_selection(keys);
        Ok(())
    }

    pub async fn save_preferences(&self) -> ConsoleResult<()> {
        let preference = preferences::snapshot(E::KIND, &self.visibility);
        match self.session.api().save_preference(&preference).await {
            Ok(()) => {
                self.toasts.push_success("Column preferences saved");
                Ok(())
            }
            Err(e) => Err(self.surface(e, "Failed to save column preferences")),
        }
    }

    /// Apply the saved column set, if any. Returns whether one was found.
    pub async fn load_preferences(&mut self) -> ConsoleResult<bool> {
        match self.session.api().load_preference(E::KIND.form_name()).await {
            Ok(Some(preference)) => {
                preferences::apply(&mut self.visibility, &preference);
                debug!(form = %preference.form_name, columns = ?preference.columns, "Column preferences applied");
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => Err(self.surface(e, "Failed to load column preferences")),
        }
    }

    // ─── Export ────────────────────────────────────────────────────────

    /// CSV of the visible columns over the loaded rows.
    pub fn export(&self, today: NaiveDate) -> CsvExport {
        let records = self.records();
        let columns = self.visible_columns();
        CsvExport {
            filename: export_filename(E::KIND.plural(), today),
            content: to_csv(&columns, &records),
        }
    }

    // ─── Mutations ─────────────────────────────────────────────────────

    pub async fn create(&self, values: Value) -> ConsoleResult<E> {
        self.dispatch(SliceAction::Pending(Thunk::Create));
        match self.session.api().create::<E>(&values).await {
            Ok(record) => {
                info!(entity = %E::KIND, id = %record.id(), "Created");
                self.dispatch(SliceAction::CreateFulfilled(record.clone()));
                self.record(Thunk::Create, "ok");
                self.toasts
                    .push_success(format!("Created {} {}", E::KIND.singular(), record.id()));
                Ok(record)
            }
            Err(e) => Err(self.fail(Thunk::Create, e)),
        }
    }

    pub async fn update(&self, id: &EntityId, values: Value) -> ConsoleResult<()> {
        self.dispatch(SliceAction::Pending(Thunk::Update));
        let returned = match self.session.api().update::<E>(id, &values).await {
            Ok(returned) => returned,
            Err(e) => return Err(self.fail(Thunk::Update, e)),
        };
        self.commit(Thunk::Update, id, &values, returned).await?;
        self.toasts
            .push_success(format!("Updated {} {}", E::KIND.singular(), id));
        Ok(())
    }

    pub async fn set_status(&self, id: &EntityId, status: E::Status) -> ConsoleResult<()> {
        self.dispatch(SliceAction::Pending(Thunk::SetStatus));
        let returned = match self.session.api().set_status::<E>(id, status).await {
            Ok(returned) => returned,
            Err(e) => return Err(self.fail(Thunk::SetStatus, e)),
        };
        let sent = json!({ "status": serde_json::to_value(status)? });
        self.commit(Thunk::SetStatus, id, &sent, returned).await?;
        self.toasts.push_success(format!(
            "{} {} is now {}",
            E::KIND.singular(),
            id,
            status
        ));
        Ok(())
    }

    pub async fn remove(&self, id: &EntityId) -> ConsoleResult<()> {
        self.dispatch(SliceAction::Pending(Thunk::Delete));
        match self.session.api().delete::<E>(id).await {
            Ok(()) => {
                info!(entity = %E::KIND, id = %id, "Deleted");
                self.dispatch(SliceAction::DeleteFulfilled(id.clone()));
                self.record(Thunk::Delete, "ok");
                self.toasts
                    .push_success(format!("Deleted {} {}", E::KIND.singular(), id));
                Ok(())
            }
            Err(e) => Err(self.fail(Thunk::Delete, e)),
        }
    }

    /// Fold a mutation the server accepted into the cached row: the sent
    /// values under the reply, else the reply alone, else reload the list.
    async fn commit(
        &self,
        thunk: Thunk,
        id: &EntityId,
        sent: &Value,
        returned: Value,
    ) -> ConsoleResult<()> {
        self.record(thunk, "ok");
        let merged = merge_patch(sent, &returned);
        let patch = if self.merges_cleanly(id, &merged) {
            merged
        } else if self.merges_cleanly(id, &returned) {
            debug!(entity = %E::KIND, id = %id, "Sent values do not fit the record, applying server reply only");
            returned
        } else {
            warn!(entity = %E::KIND, id = %id, "Server reply does not fit the cached record, reloading");
            return self.fetch().await;
        };
        let action = match thunk {
            Thunk::SetStatus => SliceAction::StatusFulfilled { id: id.clone(), patch },
            _ => SliceAction::UpdateFulfilled { id: id.clone(), patch },
        };
        self.dispatch(action);
        Ok(())
    }

    fn merges_cleanly(&self, id: &EntityId, patch: &Value) -> bool {
        E::slice(&self.session.store().read())
            .find(id)
            .map_or(true, |row| shallow_merge(row, patch).is_ok())
    }

    // ─── Plumbing ──────────────────────────────────────────────────────

    fn dispatch(&self, action: SliceAction<E>) {
        self.session.store().write().dispatch(E::action(action));
    }

    fn record(&self, thunk: Thunk, outcome: &'static str) {
        metrics::counter!(
            "console.requests",
            "entity" => E::KIND.plural(),
            "op" => thunk.as_str(),
            "outcome" => outcome
        )
        .increment(1);
    }

    /// Reject the thunk on the slice, then toast and maybe log out.
    fn fail(&self, thunk: Thunk, error: ConsoleError) -> ConsoleError {
        let message = error.user_message(&thunk.fallback_message(E::KIND));
        self.dispatch(SliceAction::Rejected {
            thunk,
            error: message,
        });
        self.record(thunk, "error");
        self.surface(error, &thunk.fallback_message(E::KIND))
    }

    fn surface(&self, error: ConsoleError, fallback: &str) -> ConsoleError {
        surface_failure(&self.session, &self.toasts, error, fallback)
    }
}

/// One error toast per failure; a 401 also logs out.
pub(crate) fn surface_failure<A: ConsoleApi>(
    session: &Session<A>,
    toasts: &ToastCenter,
    error: ConsoleError,
    fallback: &str,
) -> ConsoleError {
    warn!(error = %error, "Request failed");
    toasts.push_error(error.user_message(fallback));
    if error.is_unauthorized() {
        session.logout();
    }
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::Severity;
    use crate::session::SessionVault;
    use crate::store::AppStore;
    use affiliate_api::{
        ColumnPreference, Credentials, DashboardData, DateRange, Failure, MemoryApi,
    };
    use affiliate_core::types::{Advertiser, Campaign, CampaignStatus, PartnerStatus};
    use affiliate_core::Entity;
    use chrono::Utc;

    async fn console() -> (Arc<Session<MemoryApi>>, Arc<ToastCenter>) {
        let vault = SessionVault::new(
            std::env::temp_dir().join(format!("affiliate-ctl-{}", uuid::Uuid::new_v4())),
        );
        let session = Arc::new(Session::new(
            Arc::new(MemoryApi::with_demo_data()),
            AppStore::shared(),
            vault,
        ));
        session
            .login(&Credentials {
                email: "admin@example.com".into(),
                password: "admin".into(),
            })
            .await
            .unwrap();
        session.vault().clear().unwrap();
        (session, Arc::new(ToastCenter::default()))
    }

    fn form(value: Value) -> Filter {
        value.as_object().cloned().unwrap()
    }

    fn ids<E: Entity>(records: &[E]) -> Vec<String> {
        records.iter().map(|r| r.id().to_string()).collect()
    }

    #[tokio::test]
    async fn test_mount_lists_without_filters() {
        let (session, toasts) = console().await;
        let mut ctl = EntityListController::<Campaign, _>::new(session.clone(), toasts);
        ctl.mount().await.unwrap();
        assert_eq!(ids(&ctl.records()), vec!["1", "2", "3"]);
        assert_eq!(ctl.status(), SliceStatus::Succeeded);
        assert!(ctl.last_search().is_empty());
        assert_eq!(session.api().requests().last().unwrap(), "list campaign");
    }

    #[tokio::test]
    async fn test_search_strips_empty_fields_and_replaces_list() {
        let (session, toasts) = console().await;
        let mut ctl = EntityListController::<Campaign, _>::new(session, toasts);
        ctl.mount().await.unwrap();

        ctl.search(form(json!({"status": "paused", "title": "  ", "geo": []})))
            .await
            .unwrap();
        assert_eq!(ctl.last_search().as_filter(), &form(json!({"status": "paused"})));
        assert_eq!(ids(&ctl.records()), vec!["2"]);

        ctl.refresh().await.unwrap();
        assert_eq!(ids(&ctl.records()), vec!["2"]);
    }

    #[tokio::test]
    async fn test_set_status_merges_partial_reply() {
        let (session, toasts) = console().await;
        let mut ctl = EntityListController::<Campaign, _>::new(session, toasts.clone());
        ctl.mount().await.unwrap();
        let before = ctl.records();

        ctl.set_status(&EntityId::from(1), CampaignStatus::Paused)
            .await
            .unwrap();

        let after = ctl.records();
        let mut expected = before[0].clone();
        expected.status = CampaignStatus::Paused;
        assert_eq!(after[0], expected);
        assert_eq!(after[1..], before[1..]);
        assert_eq!(toasts.by_severity(Severity::Success).len(), 1);
    }

    #[tokio::test]
    async fn test_set_status_failure_leaves_list_and_toasts_once() {
        let (session, toasts) = console().await;
        let mut ctl = EntityListController::<Campaign, _>::new(session.clone(), toasts.clone());
        ctl.mount().await.unwrap();
        let before = ctl.records();

        session.api().fail_next(Failure::Server {
            status: 409,
            message: Some("Campaign is locked".into()),
        });
        let err = ctl
            .set_status(&EntityId::from(1), CampaignStatus::Expired)
            .await
            .unwrap_err();
        assert!(matches!(err, ConsoleError::Http { status: 409, .. }));

        assert_eq!(ctl.records(), before);
        let errors = toasts.by_severity(Severity::Error);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Campaign is locked");
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_fetch_failure_uses_fallback_and_empties_list() {
        let (session, toasts) = console().await;
        let mut ctl = EntityListController::<Advertiser, _>::new(session.clone(), toasts.clone());
        ctl.mount().await.unwrap();
        assert_eq!(ctl.records().len(), 3);

        session.api().fail_next(Failure::Timeout);
        assert!(ctl.refresh().await.is_err());
        assert!(ctl.records().is_empty());
        assert_eq!(ctl.error().as_deref(), Some("Failed to load advertisers"));
        assert_eq!(toasts.active(Utc::now())[0].message, "Failed to load advertisers");
    }

    #[tokio::test]
    async fn test_unauthorized_forces_logout() {
        let (session, toasts) = console().await;
        let mut ctl = EntityListController::<Campaign, _>::new(session.clone(), toasts.clone());

        session.api().fail_next(Failure::Unauthorized);
        let err = ctl.mount().await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(!session.is_authenticated());
        assert_eq!(
            toasts.by_severity(Severity::Error)[0].message,
            "Your session has expired. Please log in again."
        );
    }

    #[tokio::test]
    async fn test_remove_drops_exactly_one_row() {
        let (session, toasts) = console().await;
        let mut ctl = EntityListController::<Advertiser, _>::new(session, toasts);
        ctl.mount().await.unwrap();

        ctl.remove(&EntityId::from(11)).await.unwrap();
        assert_eq!(ids(&ctl.records()), vec!["10", "12"]);
    }

    #[tokio::test]
    async fn test_create_prepends_and_update_merges() {
        let (session, toasts) = console().await;
        let mut ctl = EntityListController::<Advertiser, _>::new(session, toasts);
        ctl.mount().await.unwrap();

        let created = ctl
            .create(json!({"name": "Umbrella", "email": "u@example.com", "status": "pending"}))
            .await
            .unwrap();
        assert_eq!(ctl.records()[0].id(), created.id());

        ctl.update(created.id(), json!({"status": "active", "country": "CA"}))
            .await
            .unwrap();
        let row = &ctl.records()[0];
        assert_eq!(row.status, PartnerStatus::Active);
        assert_eq!(row.country.as_deref(), Some("CA"));
        assert_eq!(row.name, "Umbrella");
    }

    /// Delegates to `MemoryApi` but answers every update with a fixed
    /// reply, as a backend that accepts loosely typed form values would.
    struct FixedReplyApi {
        inner: MemoryApi,
        reply: Value,
    }

    #[async_trait::async_trait]
    impl ConsoleApi for FixedReplyApi {
        fn set_token(&self, token: Option<String>) {
            self.inner.set_token(token)
        }

        async fn login(&self, credentials: &Credentials) -> ConsoleResult<String> {
            self.inner.login(credentials).await
        }

        async fn list<E: Entity>(&self, filter: &Filter) -> ConsoleResult<Vec<E>> {
            self.inner.list::<E>(filter).await
        }

        async fn create<E: Entity>(&self, values: &Value) -> ConsoleResult<E> {
            self.inner.create::<E>(values).await
        }

        async fn update<E: Entity>(
            &self,
            _id: &EntityId,
            _values: &Value,
        ) -> ConsoleResult<Value> {
            Ok(self.reply.clone())
        }

        async fn delete<E: Entity>(&self, id: &EntityId) -> ConsoleResult<()> {
            self.inner.delete::<E>(id).await
        }

        async fn set_status<E: Entity>(
            &self,
            id: &EntityId,
            status: E::Status,
        ) -> ConsoleResult<Value> {
            self.inner.set_status::<E>(id, status).await
        }

        async fn save_preference(&self, preference: &ColumnPreference) -> ConsoleResult<()> {
            self.inner.save_preference(preference).await
        }

        async fn load_preference(
            &self,
            form_name: &str,
        ) -> ConsoleResult<Option<ColumnPreference>> {
            self.inner.load_preference(form_name).await
        }

        async fn dashboard(&self, range: &DateRange) -> ConsoleResult<DashboardData> {
            self.inner.dashboard(range).await
        }
    }

    async fn fixed_reply_console(
        reply: Value,
    ) -> (Arc<Session<FixedReplyApi>>, Arc<ToastCenter>) {
        let api = FixedReplyApi {
            inner: MemoryApi::with_demo_data(),
            reply,
        };
        let session = Arc::new(Session::new(
            Arc::new(api),
            AppStore::shared(),
            SessionVault::new(
                std::env::temp_dir().join(format!("affiliate-ctl-{}", uuid::Uuid::new_v4())),
            ),
        ));
        session
            .login(&Credentials {
                email: "admin@example.com".into(),
                password: "admin".into(),
            })
            .await
            .unwrap();
        session.vault().clear().unwrap();
        (session, Arc::new(ToastCenter::default()))
    }

    #[tokio::test]
    async fn test_accepted_update_with_untyped_form_value_applies_reply() {
        let (session, toasts) = fixed_reply_console(json!({"id": 1, "title": "Renamed"})).await;
        let mut ctl = EntityListController::<Campaign, _>::new(session, toasts.clone());
        ctl.mount().await.unwrap();
        let before = ctl.records();

        ctl.update(&EntityId::from(1), json!({"advertiser": "11", "title": "Renamed"}))
            .await
            .unwrap();

        let after = ctl.records();
        assert_eq!(after[0].title, "Renamed");
        assert_eq!(after[0].advertiser, before[0].advertiser);
        assert_eq!(ctl.status(), SliceStatus::Succeeded);
        assert!(toasts.by_severity(Severity::Error).is_empty());
        assert_eq!(toasts.by_severity(Severity::Success).len(), 1);
    }

    #[tokio::test]
    async fn test_accepted_update_with_unusable_reply_reloads_list() {
        let (session, toasts) = fixed_reply_console(json!({"id": 1, "status": "archived"})).await;
        let mut ctl = EntityListController::<Campaign, _>::new(session.clone(), toasts.clone());
        ctl.mount().await.unwrap();
        let lists_before = session
            .api()
            .inner
            .requests()
            .iter()
            .filter(|r| *r == "list campaign")
            .count();

        ctl.update(&EntityId::from(1), json!({"status": "archived"}))
            .await
            .unwrap();

        let lists_after = session
            .api()
            .inner
            .requests()
            .iter()
            .filter(|r| *r == "list campaign")
            .count();
        assert_eq!(lists_after, lists_before + 1);
        assert_eq!(ctl.records().len(), 3);
        assert_eq!(ctl.status(), SliceStatus::Succeeded);
        assert!(toasts.by_severity(Severity::Error).is_empty());
    }

    #[tokio::test]
    async fn test_export_uses_visible_columns_only() {
        let (session, toasts) = console().await;
        let mut ctl = EntityListController::<Campaign, _>::new(session, toasts);
        ctl.mount().await.unwrap();
        ctl.clear_all();
        ctl.toggle_column("id", true).unwrap();
        ctl.toggle_column("title", true).unwrap();
        ctl.toggle_column("geo", true).unwrap();

        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let export = ctl.export(today);
        assert_eq!(export.filename, "campaigns_export_2024-06-01.csv");

        let lines: Vec<&str> = export.content.lines().collect();
        assert_eq!(lines[0], "ID,Title,Geo");
        assert_eq!(lines.len(), 1 + 3);
        assert_eq!(lines[1], "1,Spring Sale CPA,US;CA");
        assert_eq!(lines[2], "2,\"Travel Deals, Europe\",DE;FR");
    }

    #[tokio::test]
    async fn test_column_toggles() {
        let (session, toasts) = console().await;
        let mut ctl = EntityListController::<Campaign, _>::new(session, toasts);

        ctl.select_all();
        assert_eq!(ctl.visible_columns().len(), ctl.column_options().len());
        ctl.clear_all();
        assert!(ctl.visible_columns().is_empty());
        assert!(matches!(
            ctl.toggle_column("nope", true),
            Err(ConsoleError::UnknownColumn(_))
        ));
        assert!(ctl.show_only(&["id", "nope"]).is_err());
        ctl.show_only(&["title", "id"]).unwrap();
        let keys: Vec<_> = ctl.visible_columns().iter().map(|c| c.key).collect();
        assert_eq!(keys, vec!["id", "title"]);
    }

    #[tokio::test]
    async fn test_preferences_roundtrip_through_backend() {
        let (session, toasts) = console().await;
        let mut ctl = EntityListController::<Campaign, _>::new(session.clone(), toasts.clone());
        assert!(!ctl.load_preferences().await.unwrap());

        ctl.show_only(&["id", "status"]).unwrap();
        ctl.save_preferences().await.unwrap();
        assert_eq!(
            session.api().preference("campaignList"),
            Some(vec!["id".to_string(), "status".to_string()])
        );

        let mut fresh = EntityListController::<Campaign, _>::new(session, toasts);
        assert!(fresh.load_preferences().await.unwrap());
        assert_eq!(fresh.visibility().visible_keys(), vec!["id", "status"]);
    }

    #[tokio::test]
    async fn test_quick_search_over_loaded_campaigns() {
        let (session, toasts) = console().await;
        let mut ctl = EntityListController::<Campaign, _>::new(session, toasts);
        ctl.mount().await.unwrap();

        let start = tokio::time::Instant::now();
        let mut quick = QuickSearch::new(std::time::Duration::from_millis(400));
        quick.input("globex", start);
        assert_eq!(ctl.quick_filtered(&quick).len(), 3);
        quick.apply_due(start + std::time::Duration::from_millis(400));
        assert_eq!(ids(&ctl.quick_filtered(&quick)), vec!["2"]);
    }

    #[test]
    fn test_merge_patch_prefers_server_reply() {
        let patch = merge_patch(
            &json!({"status": "paused", "title": "x"}),
            &json!({"id": 5, "status": "expired"}),
        );
        assert_eq!(patch, json!({"id": 5, "status": "expired", "title": "x"}));
        assert_eq!(merge_patch(&json!({"a": 1}), &json!({})), json!({"a": 1}));
    }
}
