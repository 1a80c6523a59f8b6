//! Entity records managed by the console (campaigns, publishers,
//! advertisers and company users) plus the shared `Entity` contract.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

// ─── Identity ──────────────────────────────────────────────────────────────

/// Opaque backend identifier. Numeric and string ids are both accepted and
/// written back exactly as received; equality compares the textual form so
/// `5` and `"5"` address the same record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl EntityId {
    pub fn as_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{n}"),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl PartialEq for EntityId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (EntityId::Number(a), EntityId::Number(b)) => a == b,
            (EntityId::Text(a), EntityId::Text(b)) => a == b,
            _ => self.as_key() == other.as_key(),
        }
    }
}

impl Eq for EntityId {}

impl Hash for EntityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_key().hash(state);
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        EntityId::Number(n)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId::Text(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        EntityId::Text(s)
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(n) => EntityId::Number(n),
            Err(_) => EntityId::Text(s.to_string()),
        })
    }
}

/// The four record types with list/CRUD screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Campaign,
    Publisher,
    Advertiser,
    User,
}

impl EntityKind {
    pub fn all() -> [EntityKind; 4] {
        [
            EntityKind::Campaign,
            EntityKind::Publisher,
            EntityKind::Advertiser,
            EntityKind::User,
        ]
    }

    /// Singular label used in messages ("advertiser").
    pub fn singular(&self) -> &'static str {
        match self {
            EntityKind::Campaign => "campaign",
            EntityKind::Publisher => "publisher",
            EntityKind::Advertiser => "advertiser",
            EntityKind::User => "user",
        }
    }

    /// Plural label used in messages and export filenames ("advertisers").
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Campaign => "campaigns",
            EntityKind::Publisher => "publishers",
            EntityKind::Advertiser => "advertisers",
            EntityKind::User => "users",
        }
    }

    /// Form name under which column preferences are stored server-side.
    pub fn form_name(&self) -> &'static str {
        match self {
            EntityKind::Campaign => "campaignList",
            EntityKind::Publisher => "publisherList",
            EntityKind::Advertiser => "advertiserList",
            EntityKind::User => "userList",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::all()
            .into_iter()
            .find(|k| s.eq_ignore_ascii_case(k.singular()) || s.eq_ignore_ascii_case(k.plural()))
            .ok_or_else(|| format!("unknown entity: {s}"))
    }
}

/// Contract shared by every record type the console lists and mutates.
pub trait Entity:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Status: Copy
        + Eq
        + fmt::Debug
        + fmt::Display
        + FromStr<Err = String>
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    const KIND: EntityKind;

    fn id(&self) -> &EntityId;
    fn status(&self) -> Self::Status;
}

/// Declares a lowercase wire enum with `as_str`, `Display`, and `FromStr`.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub fn all() -> Vec<$name> {
                vec![$($name::$variant),+]
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($wire => Ok($name::$variant),)+
                    other => Err(format!("unknown {}: {other}", stringify!($name))),
                }
            }
        }
    };
}

wire_enum!(
    /// Campaign lifecycle status.
    CampaignStatus {
        Active => "active",
        Paused => "paused",
        Expired => "expired",
        Draft => "draft",
        Pending => "pending",
    }
);

wire_enum!(
    Visibility {
        Public => "public",
        Private => "private",
    }
);

wire_enum!(
    /// Status shared by publishers and advertisers.
    PartnerStatus {
        Active => "active",
        Inactive => "inactive",
        Pending => "pending",
        Blocked => "blocked",
    }
);

wire_enum!(
    UserStatus {
        Active => "active",
        Inactive => "inactive",
    }
);

// ─── Shared value types ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvertiserRef {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
}

// ─── Campaign ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: EntityId,
    pub title: String,
    pub status: CampaignStatus,
    #[serde(default = "default_visibility")]
    pub visibility: Visibility,
    #[serde(default)]
    pub advertiser: Option<AdvertiserRef>,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub geo: Vec<String>,
    #[serde(default)]
    pub device: Vec<String>,
    #[serde(default)]
    pub operating_system: Vec<String>,
    #[serde(default)]
    pub payout: Option<Money>,
    #[serde(default)]
    pub revenue: Option<Money>,
    #[serde(default)]
    pub tracking_slug: Option<String>,
    #[serde(default)]
    pub tracking_url: Option<String>,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
}

fn default_visibility() -> Visibility {
    Visibility::Public
}

impl Entity for Campaign {
    type Status = CampaignStatus;
    const KIND: EntityKind = EntityKind::Campaign;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn status(&self) -> CampaignStatus {
        self.status
    }
}

// ─── Publisher ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publisher {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub status: PartnerStatus,
    #[serde(default)]
    pub manager: Option<String>,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
}

impl Entity for Publisher {
    type Status = PartnerStatus;
    const KIND: EntityKind = EntityKind::Publisher;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn status(&self) -> PartnerStatus {
        self.status
    }
}

// ─── Advertiser ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advertiser {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub status: PartnerStatus,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
}

impl Entity for Advertiser {
    type Status = PartnerStatus;
    const KIND: EntityKind = EntityKind::Advertiser;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn status(&self) -> PartnerStatus {
        self.status
    }
}

// ─── Company user ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
    pub status: UserStatus,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
}

impl Entity for User {
    type Status = UserStatus;
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn status(&self) -> UserStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_accepts_numbers_and_strings() {
        let a: EntityId = serde_json::from_str("5").unwrap();
        let b: EntityId = serde_json::from_str("\"5\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), "5");
        assert_eq!(serde_json::to_string(&b).unwrap(), "\"5\"");
        assert_eq!("65f0c2".parse::<EntityId>().unwrap(), EntityId::from("65f0c2"));
    }

    #[test]
    fn test_campaign_tolerates_missing_optionals() {
        let campaign: Campaign = serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "Alpha",
            "status": "active"
        }))
        .unwrap();
        assert_eq!(campaign.visibility, Visibility::Public);
        assert!(campaign.geo.is_empty());
        assert!(campaign.advertiser.is_none());
    }

    #[test]
    fn test_campaign_wire_names_are_camel_case() {
        let campaign: Campaign = serde_json::from_value(serde_json::json!({
            "id": "c-1",
            "title": "Summer Sale",
            "status": "paused",
            "operatingSystem": ["ios"],
            "trackingSlug": "summer-sale",
            "payout": {"amount": 2.5}
        }))
        .unwrap();
        assert_eq!(campaign.operating_system, vec!["ios"]);
        assert_eq!(campaign.tracking_slug.as_deref(), Some("summer-sale"));
        assert_eq!(campaign.payout.unwrap().currency, "USD");
        assert_eq!(campaign.status, CampaignStatus::Paused);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Paused".parse::<CampaignStatus>().unwrap(), CampaignStatus::Paused);
        assert!("archived".parse::<CampaignStatus>().is_err());
        assert_eq!(PartnerStatus::Blocked.to_string(), "blocked");
    }

    #[test]
    fn test_entity_kind_parsing() {
        assert_eq!("advertisers".parse::<EntityKind>().unwrap(), EntityKind::Advertiser);
        assert_eq!("Campaign".parse::<EntityKind>().unwrap(), EntityKind::Campaign);
        assert!("offers".parse::<EntityKind>().is_err());
        assert_eq!(EntityKind::User.form_name(), "userList");
    }
}
