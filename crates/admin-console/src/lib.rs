//! Affiliate admin console, headless. Holds the application state and the
//! behaviour behind each screen, independent of how it is rendered.
//!
//! # Modules
//!
//! - [`controller`]: Entity list pages (search, columns, export, mutations)
//! - [`columns`]: Column registries and visibility maps
//! - [`search`]: Advanced search fields and sparse filters
//! - [`quick_search`]: Debounced client-side campaign search
//! - [`export`]: CSV rendering and file output
//! - [`slice`] / [`store`]: Reducer-driven application state
//! - [`auth`] / [`permissions`] / [`session`]: Identity, menu gating, persisted login
//! - [`notifications`]: Toasts
//! - [`dashboard`]: Analytics summary and series
//! - [`preferences`]: Saved column sets

pub mod auth;
pub mod columns;
pub mod controller;
pub mod dashboard;
pub mod export;
pub mod notifications;
pub mod permissions;
pub mod preferences;
pub mod quick_search;
pub mod search;
pub mod session;
pub mod slice;
pub mod store;

pub use auth::{AuthState, Identity};
pub use columns::{ColumnDef, ColumnVisibility, Tabular};
pub use controller::EntityListController;
pub use dashboard::DashboardController;
pub use export::CsvExport;
pub use notifications::{Severity, Toast, ToastCenter};
pub use permissions::{Capability, MenuItem, Route, MENU};
pub use quick_search::QuickSearch;
pub use search::SearchFilter;
pub use session::{Session, SessionVault};
pub use store::{AppAction, AppStore, SharedStore, StoreEntity};
