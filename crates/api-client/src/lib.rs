//! REST access for the affiliate console: typed endpoints, the normalized
//! response envelope, and two `ConsoleApi` backends.
//!
//! [`HttpApi`] talks to the real backend over reqwest. [`MemoryApi`] keeps
//! everything in DashMap and backs demo mode and tests.

pub mod api;
pub mod endpoints;
pub mod envelope;
pub mod http;
pub mod memory;
pub mod models;
pub mod token;

pub use api::ConsoleApi;
pub use http::HttpApi;
pub use memory::{Failure, MemoryApi};
pub use models::{
    ColumnPreference, Credentials, DashboardData, DashboardSummary, DateRange, Filter,
    TimeSeriesPoint,
};
pub use token::Claims;
