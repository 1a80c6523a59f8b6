//! End-to-end console flows against the in-memory backend: login, list,
//! quick search, status change, export, and session restore across restarts.

use std::sync::Arc;
use std::time::Duration;

use affiliate_api::{Claims, Credentials, Failure, MemoryApi};
use affiliate_console::slice::SliceStatus;
use affiliate_console::{
    AppStore, Capability, EntityListController, QuickSearch, Route, Session, SessionVault,
    ToastCenter,
};
use affiliate_core::types::{Campaign, CampaignStatus, Visibility};
use affiliate_core::EntityId;
use chrono::{NaiveDate, Utc};
use tokio::time::Instant;

fn campaign(id: i64, title: &str) -> Campaign {
    Campaign {
        id: EntityId::from(id),
        title: title.into(),
        status: CampaignStatus::Active,
        visibility: Visibility::Public,
        advertiser: None,
        category: vec![],
        geo: vec![],
        device: vec![],
        operating_system: vec![],
        payout: None,
        revenue: None,
        tracking_slug: None,
        tracking_url: None,
        created_date: None,
        start_date: None,
        expiry_date: None,
    }
}

fn backend() -> Arc<MemoryApi> {
    let api = MemoryApi::new();
    api.add_account(
        "secret",
        Claims {
            id: EntityId::from(7),
            name: "Ops".into(),
            email: "ops@example.com".into(),
            role: "operator".into(),
            permissions: vec!["VIEW_CAMPAIGNS".into(), "VIEW_REPORTS".into()],
            exp: (Utc::now() + chrono::Duration::hours(1)).timestamp(),
        },
    );
    for (id, title) in [(1, "Alpha"), (2, "Beta"), (3, "Gamma")] {
        api.insert(&campaign(id, title));
    }
    Arc::new(api)
}

fn vault() -> SessionVault {
    SessionVault::new(std::env::temp_dir().join(format!("affiliate-flow-{}", uuid::Uuid::new_v4())))
}

async fn logged_in(api: Arc<MemoryApi>, vault: SessionVault) -> Arc<Session<MemoryApi>> {
    let session = Arc::new(Session::new(api, AppStore::shared(), vault));
    session
        .login(&Credentials {
            email: "ops@example.com".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();
    session
}

#[tokio::test]
async fn test_quick_search_after_debounce() {
    let vault = vault();
    let session = logged_in(backend(), vault.clone()).await;
    let mut ctl = EntityListController::<Campaign, _>::new(session, Arc::new(ToastCenter::default()));
    ctl.mount().await.unwrap();
    assert_eq!(ctl.records().len(), 3);

    let mut quick = QuickSearch::new(Duration::from_millis(30));
    let start = Instant::now();
    quick.input("a", start);
    quick.input("al", start);
    quick.input("alp", start);
    assert_eq!(ctl.quick_filtered(&quick).len(), 3);

    assert!(quick.settle().await);
    let found = ctl.quick_filtered(&quick);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, EntityId::from(1));
    vault.clear().unwrap();
}

#[tokio::test]
async fn test_session_survives_restart_and_menu_is_gated() {
    let api = backend();
    let vault = vault();
    logged_in(api.clone(), vault.clone()).await;

    let restarted = Session::new(api, AppStore::shared(), vault.clone());
    let identity = restarted.restore().unwrap().unwrap();
    assert_eq!(
        identity.capabilities,
        vec![Capability::ViewCampaigns, Capability::ViewReports]
    );

    let store = restarted.store().read();
    let routes: Vec<Route> = store.auth.menu().iter().map(|m| m.route).collect();
    assert_eq!(routes, vec![Route::Campaigns, Route::Reports]);
    assert!(store.auth.can_access(Route::Dashboard));
    assert!(!store.auth.can_access(Route::Users));
    drop(store);
    vault.clear().unwrap();
}

#[tokio::test]
async fn test_status_change_then_export() {
    let vault = vault();
    let session = logged_in(backend(), vault.clone()).await;
    let mut ctl = EntityListController::<Campaign, _>::new(session, Arc::new(ToastCenter::default()));
    ctl.mount().await.unwrap();
    ctl.show_only(&["id", "title", "status"]).unwrap();

    ctl.set_status(&EntityId::from(2), CampaignStatus::Paused)
        .await
        .unwrap();

    let export = ctl.export(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    assert_eq!(export.filename, "campaigns_export_2024-01-31.csv");
    assert_eq!(
        export.content,
        "ID,Title,Status\n1,Alpha,active\n2,Beta,paused\n3,Gamma,active\n"
    );
    vault.clear().unwrap();
}

#[tokio::test]
async fn test_unauthorized_mid_session_logs_out_and_clears_vault() {
    let api = backend();
    let vault = vault();
    let session = logged_in(api.clone(), vault.clone()).await;
    let toasts = Arc::new(ToastCenter::default());
    let mut ctl = EntityListController::<Campaign, _>::new(session.clone(), toasts.clone());
    ctl.mount().await.unwrap();

    api.fail_next(Failure::Unauthorized);
    assert!(ctl.refresh().await.is_err());

    assert!(!session.is_authenticated());
    assert!(!vault.path().exists());
    assert_eq!(ctl.status(), SliceStatus::Failed);
    assert_eq!(toasts.active(Utc::now()).len(), 1);
}
