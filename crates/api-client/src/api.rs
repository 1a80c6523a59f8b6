use affiliate_core::{ConsoleResult, Entity, EntityId};
use async_trait::async_trait;
use serde_json::Value;

use crate::models::{ColumnPreference, Credentials, DashboardData, DateRange, Filter};

/// Every backend call the console makes.
///
/// `update` and `set_status` return the raw `data` object from the
/// response (possibly partial, possibly empty); callers merge it into the
/// cached row rather than trusting it to be a full record.
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    /// Install or clear the bearer token sent with authenticated calls.
    fn set_token(&self, token: Option<String>);

    /// Exchange credentials for a bearer token.
    async fn login(&self, credentials: &Credentials) -> ConsoleResult<String>;

    async fn list<E: Entity>(&self, filter: &Filter) -> ConsoleResult<Vec<E>>;

    async fn create<E: Entity>(&self, values: &Value) -> ConsoleResult<E>;

    async fn update<E: Entity>(&self, id: &EntityId, values: &Value) -> ConsoleResult<Value>;

    async fn delete<E: Entity>(&self, id: &EntityId) -> ConsoleResult<()>;

    async fn set_status<E: Entity>(&self, id: &EntityId, status: E::Status)
        -> ConsoleResult<Value>;

    async fn save_preference(&self, preference: &ColumnPreference) -> ConsoleResult<()>;

    async fn load_preference(&self, form_name: &str) -> ConsoleResult<Option<ColumnPreference>>;

    async fn dashboard(&self, range: &DateRange) -> ConsoleResult<DashboardData>;
}
