//! Column registry and per-entity column visibility.
//!
//! Each entity declares its full, ordered list of columns once. What a
//! table actually renders is that registry intersected with the visibility
//! map, always in registry order.

use std::collections::HashMap;

use affiliate_core::types::{Advertiser, Campaign, Money, Publisher, User};
use affiliate_core::{ConsoleError, ConsoleResult, Entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Date format used for table cells and CSV export.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Raw value of one cell before rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Money(Money),
    Date(DateTime<Utc>),
    List(Vec<String>),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn opt_text(value: Option<&str>) -> Self {
        value.map_or(CellValue::Empty, CellValue::text)
    }

    pub fn opt_date(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(CellValue::Empty, CellValue::Date)
    }

    pub fn opt_money(value: Option<&Money>) -> Self {
        value.map_or(CellValue::Empty, |m| CellValue::Money(m.clone()))
    }

    /// Plain-text rendering: dates as locale dates, lists joined by `;`.
    pub fn render(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Money(m) => m.to_string(),
            CellValue::Date(d) => d.format(DATE_FORMAT).to_string(),
            CellValue::List(items) => items.join(";"),
        }
    }
}

/// `{key, label}` pair offered by the column picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOption {
    pub key: String,
    pub label: String,
}

/// Descriptor for one table column.
pub struct ColumnDef<E> {
    pub key: &'static str,
    pub title: &'static str,
    pub width: Option<u16>,
    pub default_visible: bool,
    value: fn(&E) -> CellValue,
}

impl<E> Clone for ColumnDef<E> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            title: self.title,
            width: self.width,
            default_visible: self.default_visible,
            value: self.value,
        }
    }
}

impl<E> ColumnDef<E> {
    pub fn new(key: &'static str, title: &'static str, value: fn(&E) -> CellValue) -> Self {
        Self {
            key,
            title,
            width: None,
            default_visible: true,
            value,
        }
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.default_visible = false;
        self
    }

    pub fn value(&self, record: &E) -> CellValue {
        (self.value)(record)
    }

    pub fn option(&self) -> ColumnOption {
        ColumnOption {
            key: self.key.to_string(),
            label: self.title.to_string(),
        }
    }
}

/// Entities that render as a table.
pub trait Tabular: Entity {
    fn columns() -> Vec<ColumnDef<Self>>;
}

/// Per-entity `{columnKey: bool}` map. Keys are fixed by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnVisibility {
    order: Vec<&'static str>,
    visible: HashMap<&'static str, bool>,
}

impl ColumnVisibility {
    /// Start from each column's default visibility.
    pub fn from_registry<E>(registry: &[ColumnDef<E>]) -> Self {
        Self {
            order: registry.iter().map(|c| c.key).collect(),
            visible: registry.iter().map(|c| (c.key, c.default_visible)).collect(),
        }
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.visible.get(key).copied().unwrap_or(false)
    }

    pub fn toggle(&mut self, key: &str, visible: bool) -> ConsoleResult<()> {
        match self.visible.get_mut(key) {
            Some(slot) => {
                *slot = visible;
                Ok(())
            }
            None => Err(ConsoleError::UnknownColumn(key.to_string())),
        }
    }

    pub fn select_all(&mut self) {
        self.visible.values_mut().for_each(|v| *v = true);
    }

    pub fn clear_all(&mut self) {
        self.visible.values_mut().for_each(|v| *v = false);
    }

    /// Show exactly `keys`; every other column is hidden. Unknown keys are skipped.
    pub fn apply_selection<S: AsRef<str>>(&mut self, keys: &[S]) {
        for (key, visible) in self.visible.iter_mut() {
            *visible = keys.iter().any(|k| k.as_ref() == *key);
        }
    }

    /// Visible keys in registry order.
    pub fn visible_keys(&self) -> Vec<&'static str> {
        self.order
            .iter()
            .copied()
            .filter(|k| self.is_visible(k))
            .collect()
    }

    /// `(key, visible)` pairs in registry order.
    pub fn entries(&self) -> Vec<(&'static str, bool)> {
        self.order.iter().map(|k| (*k, self.is_visible(k))).collect()
    }
}

/// The registry columns switched on in `visibility`, in registry order.
pub fn visible_table_columns<'a, E>(
    registry: &'a [ColumnDef<E>],
    visibility: &ColumnVisibility,
) -> Vec<&'a ColumnDef<E>> {
    registry
        .iter()
        .filter(|c| visibility.is_visible(c.key))
        .collect()
}

// ─── Registries ────────────────────────────────────────────────────────────

impl Tabular for Campaign {
    fn columns() -> Vec<ColumnDef<Self>> {
        type Col = ColumnDef<Campaign>;
        vec![
            Col::new("id", "ID", |c| CellValue::text(c.id.to_string())).width(80),
            Col::new("title", "Title", |c| CellValue::text(&c.title)).width(240),
            Col::new("status", "Status", |c| CellValue::text(c.status.as_str())).width(100),
            Col::new("visibility", "Visibility", |c| {
                CellValue::text(c.visibility.as_str())
            })
            .hidden(),
            Col::new("advertiser", "Advertiser", |c| {
                CellValue::opt_text(c.advertiser.as_ref().map(|a| a.name.as_str()))
            })
            .width(180),
            Col::new("category", "Category", |c| CellValue::List(c.category.clone())).hidden(),
            Col::new("geo", "Geo", |c| CellValue::List(c.geo.clone())),
            Col::new("device", "Device", |c| CellValue::List(c.device.clone())).hidden(),
            Col::new("operatingSystem", "Operating System", |c| {
                CellValue::List(c.operating_system.clone())
            })
            .hidden(),
            Col::new("payout", "Payout", |c| CellValue::opt_money(c.payout.as_ref())),
            Col::new("revenue", "Revenue", |c| CellValue::opt_money(c.revenue.as_ref())).hidden(),
            Col::new("trackingSlug", "Tracking Slug", |c| {
                CellValue::opt_text(c.tracking_slug.as_deref())
            })
            .hidden(),
            Col::new("trackingUrl", "Tracking URL", |c| {
                CellValue::opt_text(c.tracking_url.as_deref())
            })
            .hidden(),
            Col::new("createdDate", "Created", |c| CellValue::opt_date(c.created_date)),
            Col::new("startDate", "Start Date", |c| CellValue::opt_date(c.start_date)).hidden(),
            Col::new("expiryDate", "Expiry Date", |c| CellValue::opt_date(c.expiry_date)),
        ]
    }
}

impl Tabular for Publisher {
    fn columns() -> Vec<ColumnDef<Self>> {
        type Col = ColumnDef<Publisher>;
        vec![
            Col::new("id", "ID", |p| CellValue::text(p.id.to_string())).width(80),
            Col::new("name", "Name", |p| CellValue::text(&p.name)).width(200),
            Col::new("email", "Email", |p| CellValue::text(&p.email)),
            Col::new("company", "Company", |p| CellValue::opt_text(p.company.as_deref())),
            Col::new("country", "Country", |p| CellValue::opt_text(p.country.as_deref())),
            Col::new("status", "Status", |p| CellValue::text(p.status.as_str())),
            Col::new("manager", "Manager", |p| CellValue::opt_text(p.manager.as_deref())).hidden(),
            Col::new("createdDate", "Created", |p| CellValue::opt_date(p.created_date)),
        ]
    }
}

impl Tabular for Advertiser {
    fn columns() -> Vec<ColumnDef<Self>> {
        type Col = ColumnDef<Advertiser>;
        vec![
            Col::new("id", "ID", |a| CellValue::text(a.id.to_string())).width(80),
            Col::new("name", "Name", |a| CellValue::text(&a.name)).width(200),
            Col::new("email", "Email", |a| CellValue::text(&a.email)),
            Col::new("company", "Company", |a| CellValue::opt_text(a.company.as_deref())),
            Col::new("website", "Website", |a| CellValue::opt_text(a.website.as_deref())).hidden(),
            Col::new("country", "Country", |a| CellValue::opt_text(a.country.as_deref())),
            Col::new("status", "Status", |a| CellValue::text(a.status.as_str())),
            Col::new("createdDate", "Created", |a| CellValue::opt_date(a.created_date)),
        ]
    }
}

impl Tabular for User {
    fn columns() -> Vec<ColumnDef<Self>> {
        type Col = ColumnDef<User>;
        vec![
            Col::new("id", "ID", |u| CellValue::text(u.id.to_string())).width(80),
            Col::new("name", "Name", |u| CellValue::text(&u.name)),
            Col::new("email", "Email", |u| CellValue::text(&u.email)),
            Col::new("role", "Role", |u| CellValue::text(&u.role)),
            Col::new("status", "Status", |u| CellValue::text(u.status.as_str())),
            Col::new("permissions", "Permissions", |u| CellValue::List(u.permissions.clone())).hidden(),
            Col::new("createdDate", "Created", |u| CellValue::opt_date(u.created_date)),
        ]
    }
}
